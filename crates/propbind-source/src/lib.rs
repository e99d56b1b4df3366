//! Property sources for propbind
//!
//! A property source is a named, flat, read-only set of raw key/value
//! properties. [`PropertySources`] orders them by precedence; the binder in
//! `propbind-core` reads from that aggregate and never mutates it.

pub mod error;
pub mod file;
pub mod inline;
pub mod source;
pub mod sources;

pub use error::{Error, Result};
pub use file::{PropertyFileLoader, flatten};
pub use inline::{INLINED_PROPERTIES_SOURCE_NAME, inlined_source, parse_inlined, parse_properties};
pub use source::{KeyStyle, MapPropertySource, PropertySource, SystemEnvironmentPropertySource};
pub use sources::PropertySources;
