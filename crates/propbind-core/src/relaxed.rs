//! Relaxed lookup of property names across ordered sources.
//!
//! A name is looked up in each source, in precedence order, under a fixed list
//! of spellings. When none of them is stored verbatim the source's keys are
//! scanned and compared in canonical form, which catches mixed spellings such
//! as `test.BAR-B-A-Z`. The first source with a match wins, so source order
//! always beats spelling preference.

use propbind_source::{KeyStyle, PropertySource, PropertySources};

use crate::name::PropertyName;

/// A value found for a name, with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProperty<'a> {
    pub value: &'a str,
    /// Name of the source the value came from.
    pub source: &'a str,
    /// Raw key as stored in that source.
    pub key: &'a str,
}

/// What a list member resolved to in the first source that has it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListResolution<'a> {
    /// One value under the list name itself, split on commas by the converter.
    Whole(ResolvedProperty<'a>),
    /// Indexed elements `name[0]`, `name[1]`, ... up to the first gap.
    Elements(Vec<(PropertyName, ResolvedProperty<'a>)>),
}

/// One raw property found beneath a prefix.
#[derive(Debug, Clone)]
pub struct SourceEntry<'a> {
    /// Elements after the prefix, never empty.
    pub rest: PropertyName,
    pub value: &'a str,
    pub source: &'a str,
    pub key: &'a str,
    pub style: KeyStyle,
}

/// Resolves property names against an aggregate of sources.
#[derive(Debug, Clone, Copy)]
pub struct RelaxedResolver<'a> {
    sources: &'a PropertySources,
}

impl<'a> RelaxedResolver<'a> {
    pub fn new(sources: &'a PropertySources) -> Self {
        Self { sources }
    }

    /// Spellings looked up verbatim for `name`, in preference order.
    pub fn variants(name: &PropertyName) -> Vec<String> {
        let candidates = [
            name.to_string(),
            name.to_camel_case(),
            name.to_snake_case(),
            name.to_environment(false),
            name.to_environment(true),
            name.to_dotted_index(),
        ];
        let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !candidate.is_empty() && !variants.contains(&candidate) {
                variants.push(candidate);
            }
        }
        variants
    }

    /// Find the value for `name`, or `None` when no source has it.
    pub fn resolve(&self, name: &PropertyName) -> Option<ResolvedProperty<'a>> {
        if name.is_empty() {
            return None;
        }
        let variants = Self::variants(name);
        for source in self.sources.iter() {
            if let Some(found) = Self::resolve_in(source, name, &variants) {
                tracing::debug!(
                    property = %name,
                    source = found.source,
                    key = found.key,
                    "Resolved property"
                );
                return Some(found);
            }
        }
        None
    }

    fn resolve_in(
        source: &'a dyn PropertySource,
        name: &PropertyName,
        variants: &[String],
    ) -> Option<ResolvedProperty<'a>> {
        for variant in variants {
            if let Some((key, value)) = source.get_key_value(variant) {
                return Some(ResolvedProperty {
                    value,
                    source: source.name(),
                    key,
                });
            }
        }

        let style = source.key_style();
        source.keys().into_iter().find_map(|key| {
            let rest = PropertyName::adapt(key, style).strip_prefix(name, style)?;
            if !rest.is_empty() {
                return None;
            }
            Some(ResolvedProperty {
                value: source.get(key)?,
                source: source.name(),
                key,
            })
        })
    }

    /// Find the values for the list member `name`.
    ///
    /// Each source is asked for the list name itself and then for its indexed
    /// elements before the next source is consulted, so an earlier source wins
    /// whichever form it uses.
    pub fn resolve_list(&self, name: &PropertyName) -> Option<ListResolution<'a>> {
        if name.is_empty() {
            return None;
        }
        let variants = Self::variants(name);
        for source in self.sources.iter() {
            if let Some(found) = Self::resolve_in(source, name, &variants) {
                tracing::debug!(property = %name, source = found.source, key = found.key, "Resolved list");
                return Some(ListResolution::Whole(found));
            }

            let mut elements = Vec::new();
            for index in 0.. {
                let element = name.append_index(index);
                let Some(found) = Self::resolve_in(source, &element, &Self::variants(&element)) else {
                    break;
                };
                elements.push((element, found));
            }
            if !elements.is_empty() {
                tracing::debug!(
                    property = %name,
                    source = source.name(),
                    count = elements.len(),
                    "Resolved indexed list"
                );
                return Some(ListResolution::Elements(elements));
            }
        }
        None
    }

    /// Every property strictly beneath `prefix`, in source precedence order.
    pub fn entries_under(&self, prefix: &PropertyName) -> Vec<SourceEntry<'a>> {
        let mut entries = Vec::new();
        for source in self.sources.iter() {
            let style = source.key_style();
            for key in source.keys() {
                let Some(rest) = PropertyName::adapt(key, style).strip_prefix(prefix, style) else {
                    continue;
                };
                if rest.is_empty() {
                    continue;
                }
                if let Some(value) = source.get(key) {
                    entries.push(SourceEntry {
                        rest,
                        value,
                        source: source.name(),
                        key,
                        style,
                    });
                }
            }
        }
        entries
    }

    /// Every raw key of every source, with its origin.
    pub(crate) fn all_keys(&self) -> Vec<(&'a str, &'a str, KeyStyle)> {
        self.sources
            .iter()
            .flat_map(|source| {
                let style = source.key_style();
                let name = source.name();
                source.keys().into_iter().map(move |key| (key, name, style))
            })
            .collect()
    }
}
