//! Format-agnostic loading of property files.
//!
//! Structured documents are flattened into dotted keys so that every file
//! source looks the same to the binder:
//!
//! ```text
//! [person]            person.name = "John"
//! name = "John"   =>  person.tags[0] = "a"
//! tags = ["a"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::inline::parse_properties;
use crate::source::MapPropertySource;
use crate::{Error, Result};

/// Loads property files into [`MapPropertySource`]s.
///
/// Format is detected from the file extension:
/// - `.toml` -> TOML
/// - `.json` -> JSON
/// - `.yaml`, `.yml` -> YAML
/// - `.properties` -> `key=value` lines
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyFileLoader;

impl PropertyFileLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load `path` into a source named after the file.
    pub fn load(&self, path: &Path) -> Result<MapPropertySource> {
        let name = format!("file [{}]", path.display());
        self.load_named(name, path)
    }

    /// Load `path` into a source with an explicit name.
    pub fn load_named(&self, name: impl Into<String>, path: &Path) -> Result<MapPropertySource> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let properties = match extension.as_str() {
            "toml" => {
                let value: toml::Value =
                    toml::from_str(&content).map_err(|e| Error::parse(path, "TOML", e.to_string()))?;
                flatten(&toml_to_json(value))
            }
            "json" => {
                let value: Value = serde_json::from_str(&content)
                    .map_err(|e| Error::parse(path, "JSON", e.to_string()))?;
                flatten(&value)
            }
            "yaml" | "yml" => {
                let value: Value = serde_yaml::from_str(&content)
                    .map_err(|e| Error::parse(path, "YAML", e.to_string()))?;
                flatten(&value)
            }
            "properties" => parse_properties(&path.display().to_string(), &content)?,
            _ => {
                return Err(Error::UnsupportedFormat { extension });
            }
        };

        tracing::debug!(?path, count = properties.len(), "Loaded property file");
        Ok(MapPropertySource::new(name, properties))
    }
}

/// Flatten a structured document into dotted keys with `[n]` list indices.
///
/// Nulls are dropped; an empty table or list produces no keys.
pub fn flatten(value: &Value) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    flatten_into(value, String::new(), &mut out);
    out
}

fn flatten_into(value: &Value, path: String, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                flatten_into(val, child, out);
            }
        }
        Value::Array(items) => {
            for (i, val) in items.iter().enumerate() {
                flatten_into(val, format!("{}[{}]", path, i), out);
            }
        }
        Value::Null => {}
        Value::String(s) => {
            out.insert(path, s.clone());
        }
        other => {
            out.insert(path, other.to_string());
        }
    }
}

fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn flatten_nested_objects_and_arrays() {
        let value = json!({
            "person": {
                "name": "John",
                "age": 42,
                "tags": ["a", "b"],
                "active": true,
                "nothing": null
            }
        });

        let flat = flatten(&value);

        let expected: BTreeMap<String, String> = [
            ("person.active", "true"),
            ("person.age", "42"),
            ("person.name", "John"),
            ("person.tags[0]", "a"),
            ("person.tags[1]", "b"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(flat, expected);
    }

    #[test]
    fn toml_datetime_becomes_string() {
        let value: toml::Value = toml::from_str("at = 1979-05-27T07:32:00Z").unwrap();
        let flat = flatten(&toml_to_json(value));
        assert_eq!(flat["at"], "1979-05-27T07:32:00Z");
    }
}
