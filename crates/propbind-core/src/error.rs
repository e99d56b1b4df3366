//! Error types for propbind-core
//!
//! Every failure of a bind call surfaces as one [`BindError`] whose message
//! names the namespace and the target type. The typed cause stays reachable
//! through [`BindError::root_cause`] and the `std::error::Error` source chain.

use std::fmt;

use crate::target::LocationKind;
use crate::validation::ValidationErrors;

/// Result type for bind operations
pub type Result<T> = std::result::Result<T, BindError>;

/// The single error returned by a failed bind.
#[derive(Debug, thiserror::Error)]
#[error("Failed to bind properties under '{prefix}' to {target_type}")]
pub struct BindError {
    target_type: String,
    prefix: String,
    #[source]
    cause: BindFailure,
}

impl BindError {
    pub fn new(target_type: impl Into<String>, prefix: impl Into<String>, cause: BindFailure) -> Self {
        Self {
            target_type: target_type.into(),
            prefix: prefix.into(),
            cause,
        }
    }

    /// Fully qualified name of the bound type.
    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    /// Namespace the target was bound under.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn root_cause(&self) -> &BindFailure {
        &self.cause
    }

    pub fn into_root_cause(self) -> BindFailure {
        self.cause
    }

    /// The violations, when the bind failed validation.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match &self.cause {
            BindFailure::Validation(e) => Some(e.errors()),
            _ => None,
        }
    }
}

/// Why a bind failed.
#[derive(Debug, thiserror::Error)]
pub enum BindFailure {
    /// A member is declared bindable in an ambiguous or invalid way.
    #[error(transparent)]
    StructuralConflict(#[from] StructuralConflictError),

    /// A property under the namespace matches no member.
    #[error(transparent)]
    UnknownField(#[from] UnknownFieldError),

    /// A raw value could not be converted to the member's shape.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The member's writer rejected a converted value.
    #[error(transparent)]
    Write(#[from] MemberWriteError),

    /// Post-bind constraints were violated.
    #[error(transparent)]
    Validation(#[from] BindValidationError),
}

/// What makes a member declaration invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    /// The same property is marked on more than one location.
    MultipleMarkers(Vec<LocationKind>),
    /// The marker sits on a method that is neither a getter nor a setter.
    InvalidLocation,
    /// The property is writable but no location declares its type.
    MissingType,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::MultipleMarkers(kinds) => {
                let kinds: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
                write!(f, "marked on more than one location ({})", kinds.join(", "))
            }
            ConflictReason::InvalidLocation => {
                f.write_str("marker is only allowed on a field, getter or setter")
            }
            ConflictReason::MissingType => f.write_str("no location declares the property type"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid configuration property value declaration '{property}': {reason}")]
pub struct StructuralConflictError {
    pub property: String,
    pub reason: ConflictReason,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Property '{name}' from {origin} does not match any member")]
pub struct UnknownFieldError {
    pub name: String,
    pub origin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to convert property '{name}' with value '{value}' to {target}: {reason}")]
pub struct ConversionError {
    pub name: String,
    pub target: String,
    pub value: String,
    pub reason: String,
}

impl ConversionError {
    pub fn new(
        name: impl fmt::Display,
        target: impl fmt::Display,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            target: target.to_string(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to write property '{name}'")]
pub struct MemberWriteError {
    pub name: String,
    #[source]
    pub source: WriteError,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Binding validation errors on {}: {} violation(s)", .errors.name(), .errors.len())]
pub struct BindValidationError {
    errors: ValidationErrors,
}

impl BindValidationError {
    pub fn new(errors: ValidationErrors) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }
}

/// Errors returned by a target's member writer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    #[error("no writable member '{0}'")]
    UnknownMember(String),

    #[error("expected {expected} value, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("value {value} is out of range for {target}")]
    OutOfRange { target: &'static str, value: String },

    #[error("{0}")]
    Rejected(String),
}

impl WriteError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}
