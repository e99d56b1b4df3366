//! Ordered aggregate of property sources.

use std::sync::Arc;

use crate::source::PropertySource;

/// An ordered list of property sources.
///
/// Order is precedence: a source earlier in the list shadows later sources
/// for the same property. Cloning is cheap; sources are shared.
#[derive(Debug, Clone, Default)]
pub struct PropertySources {
    sources: Vec<Arc<dyn PropertySource>>,
}

impl PropertySources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source with the highest precedence, replacing any source of the same name.
    pub fn add_first(&mut self, source: impl PropertySource + 'static) {
        self.remove(source.name());
        self.sources.insert(0, Arc::new(source));
    }

    /// Add a source with the lowest precedence, replacing any source of the same name.
    pub fn add_last(&mut self, source: impl PropertySource + 'static) {
        self.remove(source.name());
        self.sources.push(Arc::new(source));
    }

    /// Builder form of [`add_last`](Self::add_last).
    pub fn with(mut self, source: impl PropertySource + 'static) -> Self {
        self.add_last(source);
        self
    }

    /// Remove the source called `name`, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn PropertySource>> {
        let idx = self.sources.iter().position(|s| s.name() == name)?;
        Some(self.sources.remove(idx))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn PropertySource>> {
        self.sources.iter().find(|s| s.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sources in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn PropertySource> {
        self.sources.iter().map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
