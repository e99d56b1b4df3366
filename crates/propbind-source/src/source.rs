//! The property source contract and its in-memory implementations.

use std::collections::BTreeMap;
use std::fmt;

/// How the keys of a source are spelled.
///
/// Dotted sources use `a.b-c[0]` style keys. Environment sources use
/// `A_B_C_0` style keys where `_` separates segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyStyle {
    #[default]
    Dotted,
    Environment,
}

/// A named, read-only set of raw key/value properties.
///
/// Sources are snapshots: nothing in the binder mutates them, so they must be
/// shareable across threads.
pub trait PropertySource: fmt::Debug + Send + Sync {
    /// Name used for diagnostics and for lookup inside an aggregate.
    fn name(&self) -> &str;

    /// The stored key and raw value for exactly `key`.
    fn get_key_value(&self, key: &str) -> Option<(&str, &str)>;

    /// Raw value stored under exactly `key`.
    fn get(&self, key: &str) -> Option<&str> {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Whether exactly `key` is present.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// All raw keys, in the source's iteration order.
    fn keys(&self) -> Vec<&str>;

    /// Spelling convention of the keys.
    fn key_style(&self) -> KeyStyle {
        KeyStyle::Dotted
    }
}

/// A source backed by an in-memory map of dotted keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapPropertySource {
    name: String,
    properties: BTreeMap<String, String>,
}

impl MapPropertySource {
    pub fn new(name: impl Into<String>, properties: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }

    /// Build a source from `(key, value)` pairs. A repeated key keeps the last value.
    pub fn from_pairs<K, V>(name: impl Into<String>, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let properties = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(name, properties)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Merge `other` into this source; keys in `other` replace existing ones.
    pub fn extend(&mut self, other: BTreeMap<String, String>) {
        self.properties.extend(other);
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_key_value(&self, key: &str) -> Option<(&str, &str)> {
        self.properties
            .get_key_value(key)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn keys(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }
}

/// A source holding environment variables such as `PERSON_NAME`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemEnvironmentPropertySource {
    name: String,
    variables: BTreeMap<String, String>,
}

impl SystemEnvironmentPropertySource {
    /// Default name of the process environment source.
    pub const SYSTEM_ENVIRONMENT: &'static str = "systemEnvironment";

    pub fn new<K, V>(name: impl Into<String>, variables: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            variables: variables
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Snapshot the current process environment. Variables that are not
    /// valid unicode are skipped.
    pub fn from_process_env() -> Self {
        let variables: BTreeMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        tracing::debug!(count = variables.len(), "Captured process environment");
        Self {
            name: Self::SYSTEM_ENVIRONMENT.to_string(),
            variables,
        }
    }
}

impl PropertySource for SystemEnvironmentPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_key_value(&self, key: &str) -> Option<(&str, &str)> {
        self.variables
            .get_key_value(key)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn keys(&self) -> Vec<&str> {
        self.variables.keys().map(String::as_str).collect()
    }

    fn key_style(&self) -> KeyStyle {
        KeyStyle::Environment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pairs_keeps_last_value_for_repeated_key() {
        let source = MapPropertySource::from_pairs(
            "test",
            [("test.foo", "first"), ("test.foo", "second")],
        );
        assert_eq!(source.get("test.foo"), Some("second"));
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn environment_source_reports_environment_style() {
        let source = SystemEnvironmentPropertySource::new("system", [("PERSON_NAME", "Jane")]);
        assert_eq!(source.key_style(), KeyStyle::Environment);
        assert!(source.contains("PERSON_NAME"));
        assert!(!source.contains("person.name"));
        assert_eq!(source.keys(), vec!["PERSON_NAME"]);
    }

    #[test]
    fn get_key_value_returns_stored_key() {
        let source = MapPropertySource::from_pairs("test", [("test.theValue", "foo")]);
        assert_eq!(source.get_key_value("test.theValue"), Some(("test.theValue", "foo")));
        assert_eq!(source.get_key_value("test.the-value"), None);
    }

    #[test]
    fn map_source_extend_overrides_existing_keys() {
        let mut source = MapPropertySource::from_pairs("test", [("a", "1"), ("b", "2")]);
        source.extend(BTreeMap::from([("b".to_string(), "3".to_string())]));
        assert_eq!(source.get("a"), Some("1"));
        assert_eq!(source.get("b"), Some("3"));
    }
}
