//! Post-bind validation: member constraints and custom validators.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::descriptor::MemberDescriptor;
use crate::target::Bindable;
use crate::value::BoundValue;

/// A built-in constraint declared on a member.
#[derive(Debug, Clone)]
pub enum Constraint {
    NotNull,
    /// Text, list or map with at least one element.
    NotEmpty,
    Min(i64),
    Max(i64),
    /// The whole text value must match.
    Pattern(Regex),
}

impl Constraint {
    /// Build a pattern constraint anchored at both ends.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{pattern})$")).map(Constraint::Pattern)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Constraint::NotNull => "NotNull",
            Constraint::NotEmpty => "NotEmpty",
            Constraint::Min(_) => "Min",
            Constraint::Max(_) => "Max",
            Constraint::Pattern(_) => "Pattern",
        }
    }

    /// Check a member's current value, returning the violation message if any.
    ///
    /// Only `NotNull` and `NotEmpty` reject an absent value.
    fn check(&self, value: Option<&BoundValue>) -> Option<String> {
        match (self, value) {
            (Constraint::NotNull, None) => Some("must not be null".to_string()),
            (Constraint::NotEmpty, None) => Some("must not be empty".to_string()),
            (Constraint::NotEmpty, Some(v)) if v.is_empty() => Some("must not be empty".to_string()),
            (Constraint::Min(min), Some(v)) => match v.as_f64() {
                Some(n) if n < *min as f64 => Some(format!("must be greater than or equal to {min}")),
                _ => None,
            },
            (Constraint::Max(max), Some(v)) => match v.as_f64() {
                Some(n) if n > *max as f64 => Some(format!("must be less than or equal to {max}")),
                _ => None,
            },
            (Constraint::Pattern(regex), Some(v)) => match v.as_str() {
                Some(text) if !regex.is_match(text) => Some(format!("must match \"{}\"", regex.as_str())),
                _ => None,
            },
            _ => None,
        }
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Constraint::Min(a), Constraint::Min(b)) | (Constraint::Max(a), Constraint::Max(b)) => a == b,
            (Constraint::Pattern(a), Constraint::Pattern(b)) => a.as_str() == b.as_str(),
            _ => self.code() == other.code(),
        }
    }
}

/// One constraint violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub object_name: String,
    /// Member the violation refers to; `None` for object-level errors.
    pub field: Option<String>,
    pub code: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}.{}: {} [{}]", self.object_name, field, self.message, self.code),
            None => write!(f, "{}: {} [{}]", self.object_name, self.message, self.code),
        }
    }
}

/// Every violation found for one bound target, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    name: String,
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn new(name: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self {
            name: name.into(),
            violations,
        }
    }

    /// Object name, which is the bind prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn all_errors(&self) -> &[Violation] {
        &self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    fn extend(&mut self, violations: impl IntoIterator<Item = Violation>) {
        self.violations.extend(violations);
    }
}

/// Accumulator handed to custom validators.
pub struct Errors<'a> {
    object_name: String,
    target: &'a dyn Bindable,
    violations: Vec<Violation>,
}

impl<'a> Errors<'a> {
    pub fn new(object_name: impl Into<String>, target: &'a dyn Bindable) -> Self {
        Self {
            object_name: object_name.into(),
            target,
            violations: Vec::new(),
        }
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// Record an object-level error.
    pub fn reject(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation {
            object_name: self.object_name.clone(),
            field: None,
            code: code.into(),
            message: message.into(),
        });
    }

    /// Record an error against one member.
    pub fn reject_value(&mut self, field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation {
            object_name: self.object_name.clone(),
            field: Some(field.into()),
            code: code.into(),
            message: message.into(),
        });
    }

    /// Reject `field` when the target reports no value or an empty one.
    pub fn reject_if_empty(&mut self, field: &str, code: impl Into<String>, message: impl Into<String>) {
        let empty = self.target.read(field).is_none_or(|v| v.is_empty());
        if empty {
            self.reject_value(field, code, message);
        }
    }

    pub fn field_value(&self, field: &str) -> Option<BoundValue> {
        self.target.read(field)
    }

    pub fn has_errors(&self) -> bool {
        !self.violations.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.violations.len()
    }

    fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Debug for Errors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Errors")
            .field("object_name", &self.object_name)
            .field("violations", &self.violations)
            .finish_non_exhaustive()
    }
}

/// A custom validator applied after binding.
///
/// Validators are shared across binds and threads, so they must be stateless
/// or synchronize internally.
pub trait Validator: Send + Sync {
    /// Whether this validator applies to targets of the given type.
    fn supports(&self, type_id: TypeId) -> bool;

    fn validate(&self, target: &dyn Bindable, errors: &mut Errors<'_>);
}

/// Runs constraints and supporting validators over a bound target.
pub(crate) struct ValidationStage<'a> {
    validators: &'a [Arc<dyn Validator>],
}

impl<'a> ValidationStage<'a> {
    pub(crate) fn new(validators: &'a [Arc<dyn Validator>]) -> Self {
        Self { validators }
    }

    /// Whether there is anything to run for this target.
    pub(crate) fn applies_to(&self, target: &dyn Bindable, validated: bool) -> bool {
        validated
            || self
                .validators
                .iter()
                .any(|v| v.supports(target.target_type_id()))
    }

    pub(crate) fn validate(
        &self,
        object_name: &str,
        target: &dyn Bindable,
        members: &[MemberDescriptor],
        validated: bool,
    ) -> ValidationErrors {
        let mut result = ValidationErrors::new(object_name, Vec::new());

        if validated {
            for member in members {
                if member.constraints.is_empty() {
                    continue;
                }
                let value = target.read(&member.member);
                for constraint in &member.constraints {
                    if let Some(message) = constraint.check(value.as_ref()) {
                        result.extend([Violation {
                            object_name: object_name.to_string(),
                            field: Some(member.name.to_string()),
                            code: constraint.code().to_string(),
                            message,
                        }]);
                    }
                }
            }
        }

        let type_id = target.target_type_id();
        for validator in self.validators.iter().filter(|v| v.supports(type_id)) {
            let mut errors = Errors::new(object_name, target);
            validator.validate(target, &mut errors);
            result.extend(errors.into_violations());
        }

        if !result.is_empty() {
            tracing::debug!(object = object_name, violations = result.len(), "Validation failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::PropertyName;
    use crate::shape::{ScalarKind, TypeShape};
    use rstest::rstest;

    #[rstest]
    #[case(Constraint::NotNull, None, true)]
    #[case(Constraint::NotNull, Some(BoundValue::from("")), false)]
    #[case(Constraint::NotEmpty, Some(BoundValue::from("")), true)]
    #[case(Constraint::NotEmpty, Some(BoundValue::List(vec![])), true)]
    #[case(Constraint::Min(5), Some(BoundValue::Int(4)), true)]
    #[case(Constraint::Min(5), Some(BoundValue::Int(5)), false)]
    #[case(Constraint::Max(5), Some(BoundValue::UInt(6)), true)]
    #[case(Constraint::Min(5), None, false)]
    fn constraint_checks(#[case] constraint: Constraint, #[case] value: Option<BoundValue>, #[case] violated: bool) {
        assert_eq!(constraint.check(value.as_ref()).is_some(), violated);
    }

    #[test]
    fn pattern_matches_whole_value() {
        let constraint = Constraint::pattern("[a-z]+").unwrap();
        assert!(constraint.check(Some(&BoundValue::from("abc"))).is_none());
        assert!(constraint.check(Some(&BoundValue::from("abc1"))).is_some());
    }

    struct Holder {
        name: Option<String>,
        count: i64,
    }

    impl Bindable for Holder {
        fn read(&self, member: &str) -> Option<BoundValue> {
            match member {
                "name" => self.name.clone().map(BoundValue::Text),
                "count" => Some(BoundValue::Int(self.count)),
                _ => None,
            }
        }
    }

    struct RejectAll;

    impl Validator for RejectAll {
        fn supports(&self, type_id: TypeId) -> bool {
            type_id == TypeId::of::<Holder>()
        }

        fn validate(&self, _target: &dyn Bindable, errors: &mut Errors<'_>) {
            errors.reject_if_empty("name", "required", "name is required");
        }
    }

    fn descriptor(name: &str, shape: TypeShape, constraints: Vec<Constraint>) -> MemberDescriptor {
        MemberDescriptor {
            name: PropertyName::of(name),
            member: name.to_string(),
            shape,
            fallback: None,
            constraints,
        }
    }

    #[test]
    fn merges_constraints_and_validator_violations() {
        let holder = Holder { name: None, count: 1 };
        let validators: Vec<Arc<dyn Validator>> = vec![Arc::new(RejectAll)];
        let stage = ValidationStage::new(&validators);
        let members = vec![
            descriptor("name", TypeShape::string(), vec![Constraint::NotNull]),
            descriptor("count", TypeShape::scalar(ScalarKind::I64), vec![Constraint::Min(2)]),
        ];

        let errors = stage.validate("holder", &holder, &members, true);

        let codes: Vec<&str> = errors.iter().map(|v| v.code.as_str()).collect();
        assert_eq!(codes, vec!["NotNull", "Min", "required"]);
        assert_eq!(errors.name(), "holder");
    }

    #[test]
    fn constraints_skipped_unless_validated() {
        let holder = Holder { name: None, count: 1 };
        let stage = ValidationStage::new(&[]);
        let members = vec![descriptor("name", TypeShape::string(), vec![Constraint::NotNull])];

        assert!(!stage.applies_to(&holder, false));
        assert!(stage.validate("holder", &holder, &members, false).is_empty());
    }
}
