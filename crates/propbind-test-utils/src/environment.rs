//! [`TestEnvironment`]: property sources assembled the way tests need them.

use std::collections::BTreeMap;

use propbind_source::{
    INLINED_PROPERTIES_SOURCE_NAME, MapPropertySource, PropertySource, PropertySources, parse_inlined,
};

/// A mock environment.
///
/// Inline `key=value` properties accumulate in one source that always has
/// the highest precedence. Other sources follow in the order they were added.
///
/// # Example
///
/// ```rust
/// use propbind_test_utils::TestEnvironment;
///
/// let mut env = TestEnvironment::new();
/// env.add_inlined_properties(&["person.name=John Smith", "person.age=42"]);
/// assert_eq!(env.property_sources().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TestEnvironment {
    inlined: BTreeMap<String, String>,
    others: PropertySources,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key=value` pairs to the inline source. A repeated key keeps the last value.
    ///
    /// # Panics
    ///
    /// Panics if a pair has an empty key.
    pub fn add_inlined_properties<S: AsRef<str>>(&mut self, pairs: &[S]) -> &mut Self {
        let parsed = parse_inlined(pairs)
            .unwrap_or_else(|e| panic!("TestEnvironment: invalid inlined properties: {e}"));
        self.inlined.extend(parsed);
        self
    }

    /// Builder form of [`add_inlined_properties`](Self::add_inlined_properties).
    pub fn with_inlined<S: AsRef<str>>(mut self, pairs: &[S]) -> Self {
        self.add_inlined_properties(pairs);
        self
    }

    /// Add a source after every source added so far.
    pub fn add_last(&mut self, source: impl PropertySource + 'static) -> &mut Self {
        self.others.add_last(source);
        self
    }

    /// Snapshot of the environment's sources, inline properties first.
    pub fn property_sources(&self) -> PropertySources {
        let mut sources = self.others.clone();
        if !self.inlined.is_empty() {
            sources.add_first(MapPropertySource::new(
                INLINED_PROPERTIES_SOURCE_NAME,
                self.inlined.clone(),
            ));
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propbind_source::SystemEnvironmentPropertySource;

    #[test]
    fn inline_source_comes_first_and_keeps_last_value() {
        let mut env = TestEnvironment::new();
        env.add_last(SystemEnvironmentPropertySource::new("system", [("TEST_FOO", "env")]));
        env.add_inlined_properties(&["test.foo=first", "test.foo=second"]);

        let sources = env.property_sources();
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();

        assert_eq!(names, vec![INLINED_PROPERTIES_SOURCE_NAME, "system"]);
        assert_eq!(
            sources.get(INLINED_PROPERTIES_SOURCE_NAME).and_then(|s| s.get("test.foo")),
            Some("second")
        );
    }

    #[test]
    #[should_panic(expected = "invalid inlined properties")]
    fn empty_key_panics() {
        TestEnvironment::new().add_inlined_properties(&["=value"]);
    }
}
