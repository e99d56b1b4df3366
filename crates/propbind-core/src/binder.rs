//! The binder engine.
//!
//! A bind walks `Init -> DescribingTarget -> ResolvingMembers -> Validating
//! -> Done`, leaving for `Failed` on the first fatal error. Every failure is
//! wrapped in a [`BindError`] naming the prefix and the target type.

use std::fmt;
use std::sync::Arc;

use propbind_source::{KeyStyle, PropertySources};
use tracing::{debug, trace, warn};

use crate::convert::{ConversionService, TypeConverter};
use crate::descriptor::{MemberDescriptor, TargetGraph, describe_graph};
use crate::error::{
    BindError, BindFailure, BindValidationError, ConversionError, MemberWriteError, Result, UnknownFieldError,
};
use crate::name::PropertyName;
use crate::relaxed::RelaxedResolver;
use crate::shape::TypeShape;
use crate::target::{Bindable, ConfigurationProperties, InvalidFieldScope, TargetType};
use crate::validation::{ValidationStage, Validator};
use crate::value::BoundValue;

/// Progress of a single bind call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindState {
    Init,
    DescribingTarget,
    ResolvingMembers,
    Validating,
    Done,
    Failed,
}

/// Binds property sources onto configuration targets.
///
/// The binder only reads its sources, so one instance can serve concurrent
/// binds as long as each target is owned by a single call.
#[derive(Clone)]
pub struct ConfigurationPropertiesBinder {
    sources: PropertySources,
    conversions: ConversionService,
    validators: Vec<Arc<dyn Validator>>,
}

impl ConfigurationPropertiesBinder {
    pub fn new(sources: PropertySources) -> Self {
        Self {
            sources,
            conversions: ConversionService::default(),
            validators: Vec::new(),
        }
    }

    /// Register a custom validator, consulted for every bound target.
    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Use `conversions` for [`TypeShape::Custom`] members.
    pub fn with_conversion_service(mut self, conversions: ConversionService) -> Self {
        self.conversions = conversions;
        self
    }

    pub fn sources(&self) -> &PropertySources {
        &self.sources
    }

    /// Bind `target` under its declared prefix.
    ///
    /// A target without configuration options is left untouched.
    pub fn bind(&self, target: &mut dyn Bindable) -> Result<()> {
        match target.configuration() {
            Some(options) => self.bind_with_options(target, options),
            None => {
                debug!(
                    target_type = TargetType::target_type_name(&*target),
                    "Target has no configuration properties, nothing to bind"
                );
                Ok(())
            }
        }
    }

    /// Bind `target` under `prefix` instead of its declared prefix.
    pub fn bind_with_prefix(&self, target: &mut dyn Bindable, prefix: &str) -> Result<()> {
        match target.configuration() {
            Some(mut options) => {
                options.prefix = prefix.to_string();
                self.bind_with_options(target, options)
            }
            None => Ok(()),
        }
    }

    fn bind_with_options(&self, target: &mut dyn Bindable, options: ConfigurationProperties) -> Result<()> {
        let target_type = TargetType::target_type_name(&*target);
        debug!(prefix = %options.prefix, target_type, "Binding configuration properties");

        let mut run = BindRun {
            resolver: RelaxedResolver::new(&self.sources),
            converter: TypeConverter::new(&self.conversions),
            stage: ValidationStage::new(&self.validators),
            options: &options,
            state: BindState::Init,
        };

        match run.execute(target) {
            Ok(()) => {
                run.transition(BindState::Done);
                Ok(())
            }
            Err(cause) => {
                run.transition(BindState::Failed);
                debug!(prefix = %options.prefix, target_type, error = %cause, "Bind failed");
                Err(BindError::new(target_type, options.prefix.clone(), cause))
            }
        }
    }
}

impl fmt::Debug for ConfigurationPropertiesBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationPropertiesBinder")
            .field("sources", &self.sources)
            .field("conversions", &self.conversions)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// State of one bind call.
struct BindRun<'b> {
    resolver: RelaxedResolver<'b>,
    converter: TypeConverter<'b>,
    stage: ValidationStage<'b>,
    options: &'b ConfigurationProperties,
    state: BindState,
}

impl BindRun<'_> {
    fn transition(&mut self, next: BindState) {
        trace!(from = ?self.state, to = ?next, "Bind state transition");
        self.state = next;
    }

    fn execute(&mut self, target: &mut dyn Bindable) -> std::result::Result<(), BindFailure> {
        self.transition(BindState::DescribingTarget);
        let graph = describe_graph(target)?;

        self.transition(BindState::ResolvingMembers);
        let prefix = PropertyName::of(&self.options.prefix);
        self.bind_members(target, &prefix, &graph)?;

        let validated = self.options.validated;
        if self.stage.applies_to(&*target, validated) {
            self.transition(BindState::Validating);
            let errors = self.stage.validate(&self.options.prefix, &*target, &graph.members, validated);
            if !errors.is_empty() {
                return Err(BindValidationError::new(errors).into());
            }
        }
        Ok(())
    }

    fn bind_members(
        &self,
        target: &mut dyn Bindable,
        prefix: &PropertyName,
        graph: &TargetGraph,
    ) -> std::result::Result<(), BindFailure> {
        if !self.options.ignore_unknown_fields {
            self.check_unknown_fields(prefix, &graph.members)?;
        }

        for member in &graph.members {
            let name = prefix.append(&member.name);

            if member.is_nested() {
                let (Some(nested_graph), Some(nested)) =
                    (graph.nested.get(&member.member), target.nested_mut(&member.member))
                else {
                    debug!(property = %name, "No nested object to bind into");
                    continue;
                };
                self.bind_members(nested, &name, nested_graph)?;
                continue;
            }

            let value = match self.resolve_member(&name, member) {
                Ok(Some(value)) => value,
                Ok(None) => continue,
                Err(error) if self.options.ignore_invalid_fields => {
                    warn!(property = %name, %error, "Ignoring invalid property value");
                    continue;
                }
                Err(error) => return Err(error.into()),
            };

            if let Err(source) = target.write(&member.member, value) {
                let error = MemberWriteError {
                    name: name.to_string(),
                    source,
                };
                if self.options.ignore_invalid_fields
                    && self.options.invalid_field_scope == InvalidFieldScope::ConversionAndWrites
                {
                    warn!(property = %name, %error, "Ignoring rejected property value");
                    continue;
                }
                return Err(error.into());
            }
        }
        Ok(())
    }

    /// Value for the member's own name, or for its fallback when the own name is absent.
    fn resolve_member(
        &self,
        name: &PropertyName,
        member: &MemberDescriptor,
    ) -> std::result::Result<Option<BoundValue>, ConversionError> {
        if let Some(value) = self.converter.bind(&self.resolver, name, &member.shape)? {
            return Ok(Some(value));
        }
        match &member.fallback {
            Some(fallback) => {
                debug!(property = %name, %fallback, "Trying fallback property");
                self.converter.bind(&self.resolver, fallback, &member.shape)
            }
            None => Ok(None),
        }
    }

    fn check_unknown_fields(
        &self,
        prefix: &PropertyName,
        members: &[MemberDescriptor],
    ) -> std::result::Result<(), UnknownFieldError> {
        for (key, origin, style) in self.resolver.all_keys() {
            let Some(rest) = PropertyName::adapt(key, style).strip_prefix(prefix, style) else {
                continue;
            };
            if rest.is_empty() || members.iter().any(|m| accepts(m, &rest, style)) {
                continue;
            }
            return Err(UnknownFieldError {
                name: prefix.append(&rest).to_string(),
                origin: format!("{origin} [{key}]"),
            });
        }
        Ok(())
    }
}

/// Whether `rest`, a key relative to the prefix, belongs to `member`.
fn accepts(member: &MemberDescriptor, rest: &PropertyName, style: KeyStyle) -> bool {
    let Some(after) = rest.strip_prefix(&member.name, style) else {
        return false;
    };
    match &member.shape {
        shape if shape.is_structured() => true,
        TypeShape::List(_) | TypeShape::Set(_) => {
            after.is_empty() || (after.len() == 1 && after.elements()[0].is_numeric_index())
        }
        _ => after.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ScalarKind;
    use crate::target::MemberLocation;
    use propbind_source::MapPropertySource;

    #[derive(Default)]
    struct Server {
        port: u16,
        hosts: Vec<String>,
    }

    impl Bindable for Server {
        fn configuration(&self) -> Option<ConfigurationProperties> {
            Some(ConfigurationProperties::new("server").with_ignore_unknown_fields(false))
        }

        fn locations(&self) -> Vec<MemberLocation> {
            vec![
                MemberLocation::field("port", TypeShape::scalar(ScalarKind::U16)),
                MemberLocation::field("hosts", TypeShape::list(TypeShape::string())),
            ]
        }

        fn write(&mut self, member: &str, value: BoundValue) -> std::result::Result<(), crate::WriteError> {
            match member {
                "port" => self.port = value.try_into()?,
                "hosts" => self.hosts = value.try_into()?,
                other => return Err(crate::WriteError::UnknownMember(other.to_string())),
            }
            Ok(())
        }
    }

    fn binder(pairs: &[(&str, &str)]) -> ConfigurationPropertiesBinder {
        let source = MapPropertySource::from_pairs("test", pairs.iter().copied());
        ConfigurationPropertiesBinder::new(PropertySources::new().with(source))
    }

    #[test]
    fn indexed_list_keys_are_known_fields() {
        let mut server = Server::default();
        binder(&[("server.port", "8080"), ("server.hosts[0]", "a"), ("server.hosts[1]", "b")])
            .bind(&mut server)
            .unwrap();

        assert_eq!(server.port, 8080);
        assert_eq!(server.hosts, vec!["a", "b"]);
    }

    #[test]
    fn unknown_key_reports_origin() {
        let mut server = Server::default();
        let err = binder(&[("server.timeout", "5")]).bind(&mut server).unwrap_err();

        match err.root_cause() {
            BindFailure::UnknownField(e) => {
                assert_eq!(e.name, "server.timeout");
                assert_eq!(e.origin, "test [server.timeout]");
            }
            other => panic!("unexpected cause: {other:?}"),
        }
    }

    #[test]
    fn accepts_matches_shapes() {
        let member = MemberDescriptor {
            name: PropertyName::of("hosts"),
            member: "hosts".into(),
            shape: TypeShape::list(TypeShape::string()),
            fallback: None,
            constraints: Vec::new(),
        };
        assert!(accepts(&member, &PropertyName::of("hosts"), KeyStyle::Dotted));
        assert!(accepts(&member, &PropertyName::of("hosts[2]"), KeyStyle::Dotted));
        assert!(!accepts(&member, &PropertyName::of("hosts.name"), KeyStyle::Dotted));
        assert!(accepts(&member, &PropertyName::from_environment("HOSTS_0"), KeyStyle::Environment));

        let map = MemberDescriptor {
            shape: TypeShape::map(TypeShape::string()),
            ..member
        };
        assert!(accepts(&map, &PropertyName::of("hosts.primary.name"), KeyStyle::Dotted));
    }
}
