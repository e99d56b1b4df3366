//! Shared test fixtures for the propbind workspace.
//!
//! Dev-dependency only, never published.
//!
//! - [`environment`]: [`TestEnvironment`], a mock environment with inline property helpers
//! - [`files`]: property files written to a temporary directory

pub mod environment;
pub mod files;

pub use environment::TestEnvironment;
pub use files::property_file;
