//! The binding contract implemented by configuration targets.
//!
//! Rust has no runtime reflection, so a target describes its own bindable
//! locations through [`Bindable::locations`] and applies converted values
//! through [`Bindable::write`]. The descriptor builder validates those raw
//! locations before any value is resolved.

use std::any::{Any, TypeId};

use crate::error::WriteError;
use crate::shape::TypeShape;
use crate::validation::Constraint;
use crate::value::BoundValue;

/// Runtime type information for a target. Implemented for every `'static` type.
pub trait TargetType: Any {
    fn as_any(&self) -> &dyn Any;

    /// Fully qualified type name, used in bind error messages.
    fn target_type_name(&self) -> &'static str;

    fn target_type_id(&self) -> TypeId;
}

impl<T: Any> TargetType for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn target_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn target_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }
}

/// A type whose members can be populated from property sources.
///
/// Every method has a default so that nested-only or read-only targets only
/// implement what they need. A type that returns `None` from
/// [`configuration`](Self::configuration) is not a configuration target and
/// binding it does nothing.
pub trait Bindable: TargetType {
    /// Binding options, when this type is a configuration target.
    fn configuration(&self) -> Option<ConfigurationProperties> {
        None
    }

    /// Raw candidate locations, in declaration order, unfiltered.
    fn locations(&self) -> Vec<MemberLocation> {
        Vec::new()
    }

    /// Apply a converted value to the member identified by `member`.
    fn write(&mut self, member: &str, _value: BoundValue) -> Result<(), WriteError> {
        Err(WriteError::UnknownMember(member.to_string()))
    }

    /// Current value of a member, used by constraints and validators.
    fn read(&self, _member: &str) -> Option<BoundValue> {
        None
    }

    /// The nested object behind a [`TypeShape::Nested`] member.
    fn nested_mut(&mut self, _member: &str) -> Option<&mut dyn Bindable> {
        None
    }
}

/// Whether ignore-invalid-fields also covers failures raised by a member's writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidFieldScope {
    /// Only conversion failures are ignored; writer failures still fail the bind.
    ConversionOnly,
    #[default]
    ConversionAndWrites,
}

/// Binding options of a configuration target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationProperties {
    /// Namespace the members are resolved under. Empty binds at the root.
    pub prefix: String,
    pub ignore_unknown_fields: bool,
    pub ignore_invalid_fields: bool,
    pub invalid_field_scope: InvalidFieldScope,
    /// Run member constraints after binding.
    pub validated: bool,
}

impl Default for ConfigurationProperties {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            ignore_unknown_fields: true,
            ignore_invalid_fields: false,
            invalid_field_scope: InvalidFieldScope::default(),
            validated: false,
        }
    }
}

impl ConfigurationProperties {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn with_ignore_unknown_fields(mut self, ignore: bool) -> Self {
        self.ignore_unknown_fields = ignore;
        self
    }

    pub fn with_ignore_invalid_fields(mut self, ignore: bool) -> Self {
        self.ignore_invalid_fields = ignore;
        self
    }

    pub fn with_invalid_field_scope(mut self, scope: InvalidFieldScope) -> Self {
        self.invalid_field_scope = scope;
        self
    }

    pub fn with_validated(mut self, validated: bool) -> Self {
        self.validated = validated;
        self
    }
}

/// Where a candidate location sits on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    Field,
    Getter,
    Setter,
    /// A method that is neither a getter nor a setter.
    Method,
}

impl std::fmt::Display for LocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LocationKind::Field => "field",
            LocationKind::Getter => "getter",
            LocationKind::Setter => "setter",
            LocationKind::Method => "method",
        };
        f.write_str(name)
    }
}

/// Marks a location as the declaration of a configuration property value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueMarker {
    /// Absolute name consulted when the member's own name has no value.
    pub fallback: Option<String>,
}

impl ValueMarker {
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }
}

/// One raw candidate location reported by a target.
#[derive(Debug, Clone)]
pub struct MemberLocation {
    /// Property spelling as declared, e.g. `theValue`.
    pub property: String,
    pub kind: LocationKind,
    /// Declared type; getters of write-only members may omit it.
    pub shape: Option<TypeShape>,
    pub marker: Option<ValueMarker>,
    pub constraints: Vec<Constraint>,
}

impl MemberLocation {
    fn new(property: impl Into<String>, kind: LocationKind, shape: Option<TypeShape>) -> Self {
        Self {
            property: property.into(),
            kind,
            shape,
            marker: None,
            constraints: Vec::new(),
        }
    }

    pub fn field(property: impl Into<String>, shape: TypeShape) -> Self {
        Self::new(property, LocationKind::Field, Some(shape))
    }

    pub fn getter(property: impl Into<String>, shape: TypeShape) -> Self {
        Self::new(property, LocationKind::Getter, Some(shape))
    }

    pub fn setter(property: impl Into<String>, shape: TypeShape) -> Self {
        Self::new(property, LocationKind::Setter, Some(shape))
    }

    pub fn method(name: impl Into<String>) -> Self {
        Self::new(name, LocationKind::Method, None)
    }

    /// Mark this location as the property's declaration.
    pub fn marked(mut self) -> Self {
        self.marker.get_or_insert_with(ValueMarker::default);
        self
    }

    /// Mark this location and declare a fallback name.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.marker = Some(self.marker.take().unwrap_or_default().with_fallback(fallback));
        self
    }

    pub fn constrained(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn is_marked(&self) -> bool {
        self.marker.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl Bindable for Plain {}

    #[test]
    fn defaults_make_a_plain_type_inert() {
        let mut plain = Plain;
        assert!(plain.configuration().is_none());
        assert!(plain.locations().is_empty());
        assert_eq!(
            plain.write("name", BoundValue::from("x")),
            Err(WriteError::UnknownMember("name".into()))
        );
        assert!(plain.target_type_name().ends_with("Plain"));
    }

    #[test]
    fn configuration_defaults() {
        let config = ConfigurationProperties::new("person");
        assert_eq!(config.prefix, "person");
        assert!(config.ignore_unknown_fields);
        assert!(!config.ignore_invalid_fields);
        assert_eq!(config.invalid_field_scope, InvalidFieldScope::ConversionAndWrites);
        assert!(!config.validated);
    }

    #[test]
    fn fallback_implies_marker() {
        let location = MemberLocation::field("value", TypeShape::string()).with_fallback("test.bar");
        assert!(location.is_marked());
        assert_eq!(location.marker.and_then(|m| m.fallback).as_deref(), Some("test.bar"));
    }
}
