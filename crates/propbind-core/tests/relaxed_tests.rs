//! Relaxed name resolution across spellings and sources.

use propbind_core::{PropertyName, RelaxedResolver};
use propbind_source::{MapPropertySource, PropertySource, PropertySources, SystemEnvironmentPropertySource};
use proptest::prelude::*;
use rstest::rstest;

fn dotted(key: &str, value: &str) -> PropertySources {
    PropertySources::new().with(MapPropertySource::from_pairs("inline", [(key, value)]))
}

fn environment(key: &str, value: &str) -> PropertySources {
    PropertySources::new().with(SystemEnvironmentPropertySource::new("system", [(key, value)]))
}

#[rstest]
#[case("person.name")]
#[case("person.NAME")]
#[case("PERSON.name")]
#[case("person.Name")]
fn test_simple_name_spellings(#[case] key: &str) {
    let sources = dotted(key, "John Smith");
    let found = RelaxedResolver::new(&sources).resolve(&PropertyName::of("person.name"));

    assert_eq!(found.map(|f| f.value), Some("John Smith"));
}

#[rstest]
#[case("test.theValue")]
#[case("test.the-value")]
#[case("test.the_value")]
#[case("test.THE_VALUE")]
#[case("test.THE-VALUE")]
fn test_compound_name_spellings(#[case] key: &str) {
    let sources = dotted(key, "foo");
    let found = RelaxedResolver::new(&sources).resolve(&PropertyName::of("test.theValue"));

    assert_eq!(found.map(|f| f.key), Some(key));
}

#[rstest]
#[case("TEST_THE_VALUE")]
#[case("TEST_THEVALUE")]
#[case("test_the_value")]
fn test_environment_spellings(#[case] key: &str) {
    let sources = environment(key, "foo");
    let found = RelaxedResolver::new(&sources).resolve(&PropertyName::of("test.the-value"));

    assert_eq!(found.map(|f| f.source), Some("system"));
}

#[rstest]
#[case("test.values[0]")]
#[case("test.values.0")]
fn test_indexed_spellings(#[case] key: &str) {
    let sources = dotted(key, "a");
    let name = PropertyName::of("test.values").append_index(0);

    assert_eq!(RelaxedResolver::new(&sources).resolve(&name).map(|f| f.value), Some("a"));
}

#[test]
fn test_environment_index_spelling() {
    let sources = environment("TEST_VALUES_0", "a");
    let name = PropertyName::of("test.values").append_index(0);

    assert_eq!(RelaxedResolver::new(&sources).resolve(&name).map(|f| f.value), Some("a"));
}

#[test]
fn test_different_member_is_not_matched() {
    let sources = dotted("test.the-values", "foo");

    assert!(
        RelaxedResolver::new(&sources)
            .resolve(&PropertyName::of("test.the-value"))
            .is_none()
    );
}

#[test]
fn test_source_order_beats_spelling() {
    let sources = PropertySources::new()
        .with(MapPropertySource::from_pairs("first", [("test.THE_VALUE", "relaxed")]))
        .with(MapPropertySource::from_pairs("second", [("test.the-value", "canonical")]));

    let found = RelaxedResolver::new(&sources)
        .resolve(&PropertyName::of("test.the-value"))
        .unwrap();

    assert_eq!(found.value, "relaxed");
    assert_eq!(found.source, "first");
}

#[test]
fn test_entries_under_preserve_source_order() {
    let sources = PropertySources::new()
        .with(MapPropertySource::from_pairs("first", [("test.map.b", "1")]))
        .with(MapPropertySource::from_pairs("second", [("test.map.a", "2"), ("test.mapping", "3")]));
    let entries = RelaxedResolver::new(&sources).entries_under(&PropertyName::of("test.map"));

    let seen: Vec<(&str, String)> = entries.iter().map(|e| (e.source, e.rest.to_key())).collect();
    assert_eq!(seen, vec![("first", "b".to_string()), ("second", "a".to_string())]);
}

fn segment() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z0-9]{0,5}", 1..4)
}

fn camel(words: &[String]) -> String {
    let mut out = words[0].clone();
    for word in &words[1..] {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

proptest! {
    #[test]
    fn prop_every_spelling_resolves(prefix in "[a-z]{1,6}", words in segment()) {
        let canonical = format!("{prefix}.{}", words.join("-"));
        let name = PropertyName::of(&canonical);
        let spellings = [
            canonical.clone(),
            format!("{prefix}.{}", camel(&words)),
            format!("{prefix}.{}", words.join("_")),
            format!("{}.{}", prefix.to_uppercase(), words.join("_").to_uppercase()),
        ];

        for key in &spellings {
            let sources = dotted(key, "v");
            let found = RelaxedResolver::new(&sources).resolve(&name);
            prop_assert_eq!(found.map(|f| f.value), Some("v"), "key {}", key);
        }

        let env_key = format!("{}_{}", prefix, words.join("_")).to_uppercase();
        let sources = environment(&env_key, "v");
        let found = RelaxedResolver::new(&sources).resolve(&name);
        prop_assert_eq!(found.map(|f| f.value), Some("v"), "key {}", env_key);
    }

    #[test]
    fn prop_relaxed_names_compare_equal(prefix in "[a-z]{1,6}", words in segment()) {
        let kebab = PropertyName::of(&format!("{prefix}.{}", words.join("-")));
        let camel_name = PropertyName::of(&format!("{prefix}.{}", camel(&words)));
        let upper = PropertyName::of(&format!("{prefix}.{}", words.join("_").to_uppercase()));

        prop_assert_eq!(&kebab, &camel_name);
        prop_assert_eq!(&kebab, &upper);
    }
}

#[test]
fn test_sources_expose_names() {
    let sources = dotted("a", "b");
    assert_eq!(sources.iter().map(|s| s.name()).collect::<Vec<_>>(), vec!["inline"]);
}
