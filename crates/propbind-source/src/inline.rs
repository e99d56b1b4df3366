//! Parsing of `key=value` property text.
//!
//! Used both for inline properties (`"person.name=John Smith"`) and for
//! `.properties` files.

use std::collections::BTreeMap;

use crate::source::MapPropertySource;
use crate::{Error, Result};

/// Name of the source that holds inline properties.
pub const INLINED_PROPERTIES_SOURCE_NAME: &str = "Inlined Test Properties";

/// Parse a single `key=value` (or `key: value`) line.
///
/// Returns `Ok(None)` for blank lines and `#`/`!` comments. A line with no
/// separator is a key with an empty value.
pub fn parse_line(origin: &str, number: usize, line: &str) -> Result<Option<(String, String)>> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
        return Ok(None);
    }

    let (key, value) = match trimmed.find(['=', ':']) {
        Some(idx) => (&trimmed[..idx], trimmed[idx + 1..].trim_start()),
        None => (trimmed, ""),
    };

    let key = key.trim_end();
    if key.is_empty() {
        return Err(Error::InvalidLine {
            origin: origin.to_string(),
            line: number,
            content: line.to_string(),
        });
    }

    Ok(Some((key.to_string(), value.to_string())))
}

/// Parse properties text into a map. Later lines override earlier ones.
pub fn parse_properties(origin: &str, content: &str) -> Result<BTreeMap<String, String>> {
    let mut properties = BTreeMap::new();
    for (idx, line) in content.lines().enumerate() {
        if let Some((key, value)) = parse_line(origin, idx + 1, line)? {
            properties.insert(key, value);
        }
    }
    Ok(properties)
}

/// Parse inline `key=value` pairs, in order.
pub fn parse_inlined<S: AsRef<str>>(pairs: &[S]) -> Result<BTreeMap<String, String>> {
    let mut properties = BTreeMap::new();
    for (idx, pair) in pairs.iter().enumerate() {
        if let Some((key, value)) = parse_line(INLINED_PROPERTIES_SOURCE_NAME, idx + 1, pair.as_ref())? {
            properties.insert(key, value);
        }
    }
    Ok(properties)
}

/// Build the inline properties source from `key=value` pairs.
pub fn inlined_source<S: AsRef<str>>(pairs: &[S]) -> Result<MapPropertySource> {
    Ok(MapPropertySource::new(
        INLINED_PROPERTIES_SOURCE_NAME,
        parse_inlined(pairs)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropertySource;
    use rstest::rstest;

    #[rstest]
    #[case("person.name=John Smith", "person.name", "John Smith")]
    #[case("person.age: 42", "person.age", "42")]
    #[case("  test.key =  value ", "test.key", "value ")]
    #[case("flag", "flag", "")]
    #[case("url=http://host:80/a=b", "url", "http://host:80/a=b")]
    fn parses_key_value_lines(#[case] line: &str, #[case] key: &str, #[case] value: &str) {
        let parsed = parse_line("test", 1, line).unwrap().unwrap();
        assert_eq!(parsed, (key.to_string(), value.to_string()));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("# comment")]
    #[case("! also a comment")]
    fn skips_blank_and_comment_lines(#[case] line: &str) {
        assert!(parse_line("test", 1, line).unwrap().is_none());
    }

    #[test]
    fn rejects_line_without_key() {
        let err = parse_line("inline", 3, "=value").unwrap_err();
        assert!(err.to_string().contains("line 3"), "got: {err}");
    }

    #[test]
    fn later_inline_pairs_override_earlier_ones() {
        let source = inlined_source(&["test.FOO_BAR=test1", "test.FOO_BAR=test2"]).unwrap();
        assert_eq!(source.name(), INLINED_PROPERTIES_SOURCE_NAME);
        assert_eq!(source.get("test.FOO_BAR"), Some("test2"));
    }

    #[test]
    fn parse_properties_reads_multiple_lines() {
        let content = "# header\nperson.name=John\n\nperson.age=42\n";
        let properties = parse_properties("file", content).unwrap();
        assert_eq!(properties.len(), 2);
        assert_eq!(properties["person.age"], "42");
    }
}
