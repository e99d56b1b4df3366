//! Builds member descriptors from a target's raw candidate locations.

use std::collections::BTreeMap;

use crate::error::{ConflictReason, StructuralConflictError};
use crate::name::PropertyName;
use crate::shape::TypeShape;
use crate::target::{Bindable, LocationKind, MemberLocation};
use crate::validation::Constraint;

/// A validated, writable member of a target.
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    /// Canonical name relative to the bind prefix.
    pub name: PropertyName,
    /// Key passed to [`Bindable::write`] and [`Bindable::read`].
    pub member: String,
    pub shape: TypeShape,
    pub fallback: Option<PropertyName>,
    pub constraints: Vec<Constraint>,
}

impl MemberDescriptor {
    pub fn is_nested(&self) -> bool {
        self.shape == TypeShape::Nested
    }
}

/// Describe `target`, failing on the first structural conflict.
///
/// Locations are grouped by canonical property name and the groups keep the
/// order in which each property first appears. Conflicts are detected for
/// every group before any descriptor is returned.
pub fn describe(target: &dyn Bindable) -> Result<Vec<MemberDescriptor>, StructuralConflictError> {
    let mut groups: Vec<(PropertyName, Vec<MemberLocation>)> = Vec::new();
    for location in target.locations() {
        let name = PropertyName::of(&location.property);
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, group)) => group.push(location),
            None => groups.push((name, vec![location])),
        }
    }

    let mut descriptors = Vec::with_capacity(groups.len());
    for (name, group) in groups {
        if let Some(descriptor) = describe_property(name, group)? {
            descriptors.push(descriptor);
        }
    }
    Ok(descriptors)
}

/// Descriptors of a target together with those of every nested object
/// reachable from it, keyed by the nested member.
#[derive(Debug, Clone, Default)]
pub(crate) struct TargetGraph {
    pub members: Vec<MemberDescriptor>,
    pub nested: BTreeMap<String, TargetGraph>,
}

/// Describe `target` and, recursively, its nested objects.
///
/// The whole graph is described before anything is resolved, so a conflict
/// deep in a nested object leaves every member untouched.
pub(crate) fn describe_graph(target: &mut dyn Bindable) -> Result<TargetGraph, StructuralConflictError> {
    let members = describe(&*target)?;
    let mut nested = BTreeMap::new();
    for member in members.iter().filter(|m| m.is_nested()) {
        if let Some(object) = target.nested_mut(&member.member) {
            nested.insert(member.member.clone(), describe_graph(object)?);
        }
    }
    Ok(TargetGraph { members, nested })
}

fn describe_property(
    name: PropertyName,
    group: Vec<MemberLocation>,
) -> Result<Option<MemberDescriptor>, StructuralConflictError> {
    let property = group[0].property.clone();
    let conflict = |reason| StructuralConflictError {
        property: property.clone(),
        reason,
    };

    let marked: Vec<&MemberLocation> = group.iter().filter(|l| l.is_marked()).collect();
    if marked.iter().any(|l| l.kind == LocationKind::Method) {
        return Err(conflict(ConflictReason::InvalidLocation));
    }
    if marked.len() > 1 {
        let kinds = marked.iter().map(|l| l.kind).collect();
        return Err(conflict(ConflictReason::MultipleMarkers(kinds)));
    }

    let find = |kind: LocationKind| group.iter().find(|l| l.kind == kind);
    let writable = find(LocationKind::Field).is_some()
        || find(LocationKind::Setter).is_some()
        || find(LocationKind::Getter).is_some_and(|l| l.shape == Some(TypeShape::Nested));
    if !writable {
        tracing::trace!(property = %name, "Skipping member without a writable location");
        return Ok(None);
    }

    let shape = [LocationKind::Setter, LocationKind::Field, LocationKind::Getter]
        .into_iter()
        .filter_map(|kind| find(kind).and_then(|l| l.shape.clone()))
        .next()
        .ok_or_else(|| conflict(ConflictReason::MissingType))?;

    let fallback = marked
        .first()
        .and_then(|l| l.marker.as_ref())
        .and_then(|m| m.fallback.as_deref())
        .map(PropertyName::of);

    let constraints = group.iter().flat_map(|l| l.constraints.iter().cloned()).collect();

    Ok(Some(MemberDescriptor {
        name,
        member: property,
        shape,
        fallback,
        constraints,
    }))
}
