//! Relaxed configuration property binding
//!
//! Binds flat, ordered [`PropertySources`] onto typed configuration targets.
//! Names are matched relaxed (`theValue`, `the-value`, `THE_VALUE`), raw
//! strings are converted to each member's declared [`TypeShape`], optional
//! fallback names are consulted when a property is absent, and bound targets
//! can be validated afterwards.
//!
//! Targets describe themselves through the [`Bindable`] trait:
//!
//! ```
//! use propbind_core::{
//!     Bindable, BoundValue, ConfigurationProperties, ConfigurationPropertiesBinder, MemberLocation,
//!     TypeShape, WriteError,
//! };
//! use propbind_source::{MapPropertySource, PropertySources};
//!
//! #[derive(Default)]
//! struct Person {
//!     name: String,
//! }
//!
//! impl Bindable for Person {
//!     fn configuration(&self) -> Option<ConfigurationProperties> {
//!         Some(ConfigurationProperties::new("person"))
//!     }
//!
//!     fn locations(&self) -> Vec<MemberLocation> {
//!         vec![MemberLocation::field("name", TypeShape::string())]
//!     }
//!
//!     fn write(&mut self, member: &str, value: BoundValue) -> Result<(), WriteError> {
//!         match member {
//!             "name" => self.name = value.try_into()?,
//!             other => return Err(WriteError::UnknownMember(other.to_string())),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let sources = PropertySources::new()
//!     .with(MapPropertySource::from_pairs("inline", [("PERSON.NAME", "John Smith")]));
//! let mut person = Person::default();
//! ConfigurationPropertiesBinder::new(sources).bind(&mut person).unwrap();
//! assert_eq!(person.name, "John Smith");
//! ```

pub mod binder;
pub mod convert;
pub mod descriptor;
pub mod error;
pub mod logging;
pub mod name;
pub mod relaxed;
pub mod shape;
pub mod target;
pub mod validation;
pub mod value;

pub use binder::{BindState, ConfigurationPropertiesBinder};
pub use convert::{ConversionService, TypeConverter};
pub use descriptor::{MemberDescriptor, describe};
pub use error::{
    BindError, BindFailure, BindValidationError, ConflictReason, ConversionError, MemberWriteError, Result,
    StructuralConflictError, UnknownFieldError, WriteError,
};
pub use name::PropertyName;
pub use relaxed::{ListResolution, RelaxedResolver, ResolvedProperty};
pub use shape::{ScalarKind, TypeShape};
pub use target::{
    Bindable, ConfigurationProperties, InvalidFieldScope, LocationKind, MemberLocation, TargetType, ValueMarker,
};
pub use validation::{Constraint, Errors, ValidationErrors, Validator, Violation};
pub use value::BoundValue;

pub use propbind_source::{PropertySource, PropertySources};
