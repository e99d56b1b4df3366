//! Conversion of raw property strings into [`BoundValue`]s.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ConversionError;
use crate::name::PropertyName;
use crate::relaxed::{ListResolution, RelaxedResolver, SourceEntry};
use crate::shape::{ScalarKind, TypeShape};
use crate::value::BoundValue;

pub type ConverterFn = dyn Fn(&str) -> Result<BoundValue, String> + Send + Sync;

/// Named converters for [`TypeShape::Custom`] members.
#[derive(Clone, Default)]
pub struct ConversionService {
    converters: BTreeMap<String, Arc<ConverterFn>>,
}

impl ConversionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `converter` under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, converter: F)
    where
        F: Fn(&str) -> Result<BoundValue, String> + Send + Sync + 'static,
    {
        self.converters.insert(name.into(), Arc::new(converter));
    }

    pub fn with<F>(mut self, name: impl Into<String>, converter: F) -> Self
    where
        F: Fn(&str) -> Result<BoundValue, String> + Send + Sync + 'static,
    {
        self.register(name, converter);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ConverterFn>> {
        self.converters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.converters.contains_key(name)
    }
}

impl fmt::Debug for ConversionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionService")
            .field("converters", &self.converters.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Normalise an enum constant or raw value for relaxed comparison.
fn enum_form(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Converts raw values, and assembles structured values from several keys.
#[derive(Debug, Clone, Copy)]
pub struct TypeConverter<'a> {
    conversions: &'a ConversionService,
}

impl<'a> TypeConverter<'a> {
    pub fn new(conversions: &'a ConversionService) -> Self {
        Self { conversions }
    }

    /// Convert one raw value to `shape`. Values are not trimmed.
    pub fn convert(&self, name: &PropertyName, raw: &str, shape: &TypeShape) -> Result<BoundValue, ConversionError> {
        let fail = |reason: String| ConversionError::new(name, shape, raw, reason);

        match shape {
            TypeShape::Scalar(kind) => parse_scalar(raw, *kind).map_err(fail),
            TypeShape::CharArray => Ok(BoundValue::Chars(raw.chars().collect())),
            TypeShape::Enum(candidates) => {
                let wanted = enum_form(raw);
                candidates
                    .iter()
                    .find(|c| enum_form(c) == wanted)
                    .map(|c| BoundValue::Enum(c.clone()))
                    .ok_or_else(|| fail(format!("not one of [{}]", candidates.join(", "))))
            }
            TypeShape::List(element) => self.convert_list(name, raw, element, false),
            TypeShape::Set(element) => self.convert_list(name, raw, element, true),
            TypeShape::Custom(converter) => match self.conversions.get(converter) {
                Some(convert) => convert(raw).map_err(fail),
                None => Err(fail(format!("no converter registered for '{converter}'"))),
            },
            TypeShape::Map(_) | TypeShape::NestedMap(_) | TypeShape::Nested => {
                Err(fail("a single value cannot populate a structured member".to_string()))
            }
        }
    }

    fn convert_list(
        &self,
        name: &PropertyName,
        raw: &str,
        element: &TypeShape,
        distinct: bool,
    ) -> Result<BoundValue, ConversionError> {
        if raw.is_empty() {
            return Ok(BoundValue::List(Vec::new()));
        }
        let mut items = Vec::new();
        for (index, part) in raw.split(',').enumerate() {
            let item = self.convert(&name.append_index(index), part.trim(), element)?;
            push_item(&mut items, item, distinct);
        }
        Ok(BoundValue::List(items))
    }

    /// Resolve and convert the value for `name`.
    ///
    /// Returns `Ok(None)` when nothing is bound under the name, so the member
    /// keeps its default. Nested objects are bound by the binder itself.
    pub fn bind(
        &self,
        resolver: &RelaxedResolver<'_>,
        name: &PropertyName,
        shape: &TypeShape,
    ) -> Result<Option<BoundValue>, ConversionError> {
        match shape {
            TypeShape::Nested => Ok(None),
            TypeShape::Map(value) => self.bind_map(resolver, name, value),
            TypeShape::NestedMap(value) => self.bind_nested_map(resolver, name, value),
            TypeShape::List(element) => self.bind_list(resolver, name, shape, element, false),
            TypeShape::Set(element) => self.bind_list(resolver, name, shape, element, true),
            _ => resolver
                .resolve(name)
                .map(|found| self.convert(name, found.value, shape))
                .transpose(),
        }
    }

    fn bind_list(
        &self,
        resolver: &RelaxedResolver<'_>,
        name: &PropertyName,
        shape: &TypeShape,
        element: &TypeShape,
        distinct: bool,
    ) -> Result<Option<BoundValue>, ConversionError> {
        match resolver.resolve_list(name) {
            None => Ok(None),
            Some(ListResolution::Whole(found)) => self.convert(name, found.value, shape).map(Some),
            Some(ListResolution::Elements(elements)) => {
                let mut items = Vec::with_capacity(elements.len());
                for (element_name, found) in elements {
                    let item = self.convert(&element_name, found.value, element)?;
                    push_item(&mut items, item, distinct);
                }
                Ok(Some(BoundValue::List(items)))
            }
        }
    }

    fn bind_map(
        &self,
        resolver: &RelaxedResolver<'_>,
        name: &PropertyName,
        value: &TypeShape,
    ) -> Result<Option<BoundValue>, ConversionError> {
        let entries = distinct_entries(resolver.entries_under(name));
        if entries.is_empty() {
            return Ok(None);
        }

        let mut map = BTreeMap::new();
        for entry in entries {
            let converted = self.convert(&name.append(&entry.rest), entry.value, value)?;
            map.insert(entry.rest.to_key(), converted);
        }
        Ok(Some(BoundValue::Map(map)))
    }

    fn bind_nested_map(
        &self,
        resolver: &RelaxedResolver<'_>,
        name: &PropertyName,
        value: &TypeShape,
    ) -> Result<Option<BoundValue>, ConversionError> {
        let entries = distinct_entries(resolver.entries_under(name));
        if entries.is_empty() {
            return Ok(None);
        }

        let mut outer: BTreeMap<String, BTreeMap<String, BoundValue>> = BTreeMap::new();
        for entry in entries {
            let full_name = name.append(&entry.rest);
            if entry.rest.len() < 2 {
                return Err(ConversionError::new(
                    &full_name,
                    TypeShape::nested_map(value.clone()),
                    entry.value,
                    "expected a key for each map level",
                ));
            }
            let converted = self.convert(&full_name, entry.value, value)?;
            let outer_key = entry.rest.elements()[0].original().to_string();
            outer
                .entry(outer_key)
                .or_default()
                .insert(entry.rest.skip(1).to_key(), converted);
        }

        let map = outer
            .into_iter()
            .map(|(key, inner)| (key, BoundValue::Map(inner)))
            .collect();
        Ok(Some(BoundValue::Map(map)))
    }
}

fn push_item(items: &mut Vec<BoundValue>, item: BoundValue, distinct: bool) {
    if !distinct || !items.contains(&item) {
        items.push(item);
    }
}

/// Keep the first entry for each canonical key; entries arrive in source precedence order.
fn distinct_entries(entries: Vec<SourceEntry<'_>>) -> Vec<SourceEntry<'_>> {
    let mut seen = std::collections::HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.rest.uniform()))
        .collect()
}

fn parse_scalar(raw: &str, kind: ScalarKind) -> Result<BoundValue, String> {
    fn parse<T>(raw: &str) -> Result<T, String>
    where
        T: std::str::FromStr,
        T::Err: fmt::Display,
    {
        raw.parse::<T>().map_err(|e| e.to_string())
    }

    Ok(match kind {
        ScalarKind::String => BoundValue::Text(raw.to_string()),
        ScalarKind::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" => BoundValue::Bool(true),
            "false" => BoundValue::Bool(false),
            _ => return Err("expected 'true' or 'false'".to_string()),
        },
        ScalarKind::Char => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => BoundValue::Char(c),
                _ => return Err("expected exactly one character".to_string()),
            }
        }
        ScalarKind::I8 => BoundValue::Int(parse::<i8>(raw)?.into()),
        ScalarKind::I16 => BoundValue::Int(parse::<i16>(raw)?.into()),
        ScalarKind::I32 => BoundValue::Int(parse::<i32>(raw)?.into()),
        ScalarKind::I64 => BoundValue::Int(parse::<i64>(raw)?),
        ScalarKind::U8 => BoundValue::UInt(parse::<u8>(raw)?.into()),
        ScalarKind::U16 => BoundValue::UInt(parse::<u16>(raw)?.into()),
        ScalarKind::U32 => BoundValue::UInt(parse::<u32>(raw)?.into()),
        ScalarKind::U64 => BoundValue::UInt(parse::<u64>(raw)?),
        ScalarKind::F32 => BoundValue::Float(parse::<f32>(raw)?.into()),
        ScalarKind::F64 => BoundValue::Float(parse::<f64>(raw)?),
    })
}
