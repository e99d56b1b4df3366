//! Canonical property names and their relaxed comparison.
//!
//! A [`PropertyName`] is a sequence of elements. Dashed elements hold a
//! lowercase kebab-case segment (`the-value`); indexed elements hold the text
//! between brackets (`[0]`, `[foo.bar]`). Two names are equal when every
//! element has the same *uniform* form: lowercase with `-` dropped, so that
//! `theValue`, `the-value`, `the_value` and `THE_VALUE` all compare equal.

use std::fmt;
use std::hash::{Hash, Hasher};

use propbind_source::KeyStyle;

/// Whether an element came from a dotted segment or from brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Dashed,
    Indexed,
}

/// One element of a [`PropertyName`].
#[derive(Debug, Clone)]
pub struct Element {
    kind: ElementKind,
    original: String,
    canonical: String,
}

impl Element {
    pub fn dashed(text: &str) -> Self {
        Self {
            kind: ElementKind::Dashed,
            original: text.to_string(),
            canonical: to_kebab_case(text),
        }
    }

    pub fn indexed(text: &str) -> Self {
        Self {
            kind: ElementKind::Indexed,
            original: text.to_string(),
            canonical: text.to_string(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// The element as it was spelled in the source.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Lowercase kebab-case for dashed elements, the raw index otherwise.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Form used for comparison.
    pub fn uniform(&self) -> String {
        match self.kind {
            ElementKind::Dashed => self.canonical.replace('-', ""),
            ElementKind::Indexed => self.canonical.to_lowercase(),
        }
    }

    /// True for `[0]`-style elements and for all-digit environment segments.
    pub fn is_numeric_index(&self) -> bool {
        !self.canonical.is_empty() && self.canonical.chars().all(|c| c.is_ascii_digit())
    }

    fn camel_case(&self) -> String {
        let mut out = String::with_capacity(self.canonical.len());
        let mut upper_next = false;
        for c in self.canonical.chars() {
            if c == '-' {
                upper_next = true;
            } else if upper_next {
                out.extend(c.to_uppercase());
                upper_next = false;
            } else {
                out.push(c);
            }
        }
        out
    }
}

/// Convert a segment spelled in camelCase, snake_case, kebab-case or
/// UPPER_SNAKE into lowercase kebab-case.
pub fn to_kebab_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if c == '_' || c == '-' {
            out.push('-');
        } else if c.is_uppercase() {
            if prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

/// A canonical, dot-delimited property name.
#[derive(Debug, Clone, Default)]
pub struct PropertyName {
    elements: Vec<Element>,
}

impl PropertyName {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a dotted name such as `test.theValue` or `test.map[foo.bar]`.
    ///
    /// Parsing is lenient: empty segments are skipped and an unclosed bracket
    /// takes the rest of the input as its index.
    pub fn of(name: &str) -> Self {
        let mut elements = Vec::new();
        let mut buffer = String::new();
        let mut chars = name.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if !buffer.is_empty() {
                        elements.push(Element::dashed(&buffer));
                        buffer.clear();
                    }
                }
                '[' => {
                    if !buffer.is_empty() {
                        elements.push(Element::dashed(&buffer));
                        buffer.clear();
                    }
                    let mut index = String::new();
                    for c in chars.by_ref() {
                        if c == ']' {
                            break;
                        }
                        index.push(c);
                    }
                    elements.push(Element::indexed(&index));
                    if chars.peek() == Some(&'.') {
                        chars.next();
                    }
                }
                _ => buffer.push(c),
            }
        }
        if !buffer.is_empty() {
            elements.push(Element::dashed(&buffer));
        }

        Self { elements }
    }

    /// Parse an environment variable name such as `TEST_MAP_FOO_BAR`.
    ///
    /// Every `_` separates an element and all-digit segments become indices.
    pub fn from_environment(key: &str) -> Self {
        let elements = key
            .split('_')
            .filter(|s| !s.is_empty())
            .map(|s| {
                let lower = s.to_lowercase();
                if lower.chars().all(|c| c.is_ascii_digit()) {
                    Element::indexed(&lower)
                } else {
                    Element::dashed(&lower)
                }
            })
            .collect();
        Self { elements }
    }

    /// Parse a raw source key according to the source's spelling.
    pub fn adapt(key: &str, style: KeyStyle) -> Self {
        match style {
            KeyStyle::Dotted => Self::of(key),
            KeyStyle::Environment => Self::from_environment(key),
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn last(&self) -> Option<&Element> {
        self.elements.last()
    }

    pub fn append(&self, other: &PropertyName) -> Self {
        let mut elements = self.elements.clone();
        elements.extend(other.elements.iter().cloned());
        Self { elements }
    }

    pub fn append_index(&self, index: usize) -> Self {
        let mut elements = self.elements.clone();
        elements.push(Element::indexed(&index.to_string()));
        Self { elements }
    }

    /// Elements after the first `count`.
    pub fn skip(&self, count: usize) -> Self {
        Self {
            elements: self.elements.iter().skip(count).cloned().collect(),
        }
    }

    /// If `prefix` names this property or one of its ancestors, return what
    /// remains after it.
    ///
    /// For environment-style names several `_`-separated elements may make up
    /// one element of `prefix`: `THE_VALUE` matches the single element
    /// `the-value`.
    pub fn strip_prefix(&self, prefix: &PropertyName, style: KeyStyle) -> Option<PropertyName> {
        let mut pos = 0;
        for wanted in &prefix.elements {
            let wanted_form = wanted.uniform();
            match style {
                KeyStyle::Dotted => {
                    let element = self.elements.get(pos)?;
                    if element.uniform() != wanted_form {
                        return None;
                    }
                    pos += 1;
                }
                KeyStyle::Environment => {
                    let mut joined = String::new();
                    loop {
                        let element = self.elements.get(pos)?;
                        joined.push_str(&element.uniform());
                        pos += 1;
                        if joined == wanted_form {
                            break;
                        }
                        if wanted.kind == ElementKind::Indexed || !wanted_form.starts_with(&joined) {
                            return None;
                        }
                    }
                }
            }
        }
        Some(self.skip(pos))
    }

    /// Render with indices in brackets, each dashed element passed through `f`.
    fn render(&self, separator: &str, f: impl Fn(&Element) -> String) -> String {
        let mut out = String::new();
        for element in &self.elements {
            match element.kind {
                ElementKind::Dashed => {
                    if !out.is_empty() {
                        out.push_str(separator);
                    }
                    out.push_str(&f(element));
                }
                ElementKind::Indexed => {
                    out.push('[');
                    out.push_str(element.original());
                    out.push(']');
                }
            }
        }
        out
    }

    /// `test.theValue`
    pub fn to_camel_case(&self) -> String {
        self.render(".", Element::camel_case)
    }

    /// `test.the_value`
    pub fn to_snake_case(&self) -> String {
        self.render(".", |e| e.canonical.replace('-', "_"))
    }

    /// `test.the-value.0`: indices as plain dotted segments.
    pub fn to_dotted_index(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.canonical.clone())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// `TEST_THE_VALUE_0`, or `TEST_THEVALUE_0` when `fold_dashes` is set.
    pub fn to_environment(&self, fold_dashes: bool) -> String {
        self.elements
            .iter()
            .map(|e| {
                let segment = match (e.kind, fold_dashes) {
                    (ElementKind::Dashed, true) => e.canonical.replace('-', ""),
                    _ => e.canonical.replace('-', "_"),
                };
                segment.to_uppercase()
            })
            .collect::<Vec<_>>()
            .join("_")
    }

    /// The remaining elements as a map key, spelled as in the source.
    pub fn to_key(&self) -> String {
        self.elements
            .iter()
            .map(Element::original)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Uniform form of the whole name, used to de-duplicate keys.
    pub fn uniform(&self) -> String {
        self.elements
            .iter()
            .map(Element::uniform)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl PartialEq for PropertyName {
    fn eq(&self, other: &Self) -> bool {
        self.elements.len() == other.elements.len()
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(a, b)| a.uniform() == b.uniform())
    }
}

impl Eq for PropertyName {}

impl Hash for PropertyName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for element in &self.elements {
            element.uniform().hash(state);
        }
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(".", |e| e.canonical.clone()))
    }
}

impl From<&str> for PropertyName {
    fn from(name: &str) -> Self {
        Self::of(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("theValue", "the-value")]
    #[case("the-value", "the-value")]
    #[case("the_value", "the-value")]
    #[case("THE_VALUE", "the-value")]
    #[case("barBAZ", "bar-baz")]
    #[case("BAR-B-A-Z", "bar-b-a-z")]
    #[case("value2Go", "value2-go")]
    fn kebab_case_conversion(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_kebab_case(input), expected);
    }

    #[test]
    fn parses_dotted_and_indexed_elements() {
        let name = PropertyName::of("test.theValues[0].name");
        assert_eq!(name.len(), 4);
        assert_eq!(name.to_string(), "test.the-values[0].name");
        assert_eq!(name.elements()[2].kind(), ElementKind::Indexed);
    }

    #[test]
    fn bracketed_map_key_keeps_dots() {
        let name = PropertyName::of("test.map[foo.bar]");
        assert_eq!(name.len(), 3);
        assert_eq!(name.elements()[2].original(), "foo.bar");
    }

    #[rstest]
    #[case("test.FOO_BAR", "test.fooBar")]
    #[case("test.BAR-B-A-Z", "test.barBAZ")]
    #[case("person.NAME", "person.name")]
    fn relaxed_equality(#[case] left: &str, #[case] right: &str) {
        assert_eq!(PropertyName::of(left), PropertyName::of(right));
    }

    #[test]
    fn environment_keys_split_on_underscore() {
        let name = PropertyName::from_environment("TEST_VALUES_0");
        assert_eq!(name.to_string(), "test.values[0]");
        assert!(name.elements()[2].is_numeric_index());
    }

    #[test]
    fn renders_variants() {
        let name = PropertyName::of("test.the-value").append_index(0);
        assert_eq!(name.to_camel_case(), "test.theValue[0]");
        assert_eq!(name.to_snake_case(), "test.the_value[0]");
        assert_eq!(name.to_dotted_index(), "test.the-value.0");
        assert_eq!(name.to_environment(false), "TEST_THE_VALUE_0");
        assert_eq!(name.to_environment(true), "TEST_THEVALUE_0");
    }

    #[test]
    fn strip_prefix_dotted() {
        let key = PropertyName::of("test.map.foo");
        let rest = key
            .strip_prefix(&PropertyName::of("test.map"), KeyStyle::Dotted)
            .unwrap();
        assert_eq!(rest.to_key(), "foo");
        assert!(key.strip_prefix(&PropertyName::of("other"), KeyStyle::Dotted).is_none());
    }

    #[test]
    fn strip_prefix_environment_joins_elements() {
        let key = PropertyName::from_environment("DIFFERENT_NAMESPACE_THE_VALUE");
        let prefix = PropertyName::of("different-namespace.theValue");
        let rest = key.strip_prefix(&prefix, KeyStyle::Environment).unwrap();
        assert!(rest.is_empty());

        let key = PropertyName::from_environment("TEST_MAP_FOO_BAR");
        let rest = key
            .strip_prefix(&PropertyName::of("test.map"), KeyStyle::Environment)
            .unwrap();
        assert_eq!(rest.to_key(), "foo.bar");
    }

    #[test]
    fn strip_prefix_environment_rejects_partial_element() {
        let key = PropertyName::from_environment("TEST_THEVALUES");
        assert!(
            key.strip_prefix(&PropertyName::of("test.the-value"), KeyStyle::Environment)
                .is_none()
        );
    }
}
