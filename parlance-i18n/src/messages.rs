//! Phrase tables.
//!
//! A table maps phrase keys to entries. Entries are plain text or a set of
//! variants selected by plural category. Nested JSON objects that are not
//! entries become sections, addressed by dot-joined paths (`index`,
//! `api.v1*0`, the universe section).

use crate::{I18nError, PluralCategory, Result};
use parlance_config::PluralKeywords;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Variants of one phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variants {
    pub translated: Option<String>,
    pub plural: Option<String>,
    pub default: Option<String>,
    pub categories: BTreeMap<PluralCategory, String>,
}

/// A single phrase definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhraseEntry {
    Text(String),
    Variants(Variants),
}

impl PhraseEntry {
    /// Whether the entry declares plural forms.
    pub fn has_plural(&self) -> bool {
        match self {
            PhraseEntry::Text(_) => false,
            PhraseEntry::Variants(v) => v.plural.is_some() || !v.categories.is_empty(),
        }
    }

    /// Pick the text for `category`.
    ///
    /// With a category the chain is: exact category, the plural form (for
    /// anything but `one`), the singular translation, the default. Without a
    /// category the singular forms are preferred.
    pub fn select(&self, category: Option<PluralCategory>) -> Option<&str> {
        let v = match self {
            PhraseEntry::Text(text) => return Some(text),
            PhraseEntry::Variants(v) => v,
        };

        let by_category = |c: PluralCategory| v.categories.get(&c).map(String::as_str);

        match category {
            Some(c) => by_category(c)
                .or_else(|| match c {
                    PluralCategory::One => None,
                    _ => v.plural.as_deref(),
                })
                .or(v.translated.as_deref())
                .or(v.default.as_deref())
                .or_else(|| by_category(PluralCategory::Other)),
            None => v
                .translated
                .as_deref()
                .or(v.default.as_deref())
                .or_else(|| by_category(PluralCategory::One))
                .or_else(|| by_category(PluralCategory::Other)),
        }
    }
}

impl From<&str> for PhraseEntry {
    fn from(text: &str) -> Self {
        PhraseEntry::Text(text.to_string())
    }
}

impl From<String> for PhraseEntry {
    fn from(text: String) -> Self {
        PhraseEntry::Text(text)
    }
}

/// Phrases for one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhraseTable {
    entries: HashMap<String, PhraseEntry>,
}

impl PhraseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON phrase file.
    ///
    /// The top level must be an object. An object value is an entry when
    /// every key is a keyword (`translated`, `plural`, `default`). The plural
    /// keyword holds either one string or an object of category forms
    /// (`{"one": .., "few": .., "other": ..}`). Any other object is a section,
    /// so phrase keys such as `one` or `other` stay ordinary phrases.
    pub fn from_json(json: &str, keywords: &PluralKeywords) -> Result<Self> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(map) => {
                let mut table = Self::new();
                table.absorb(None, map, keywords);
                Ok(table)
            }
            other => Err(I18nError::ParseError(format!(
                "expected an object at the top level, found {}",
                kind(&other)
            ))),
        }
    }

    fn absorb(&mut self, prefix: Option<&str>, map: Map<String, Value>, keywords: &PluralKeywords) {
        for (key, value) in map {
            let path = match prefix {
                Some(prefix) => format!("{}.{}", prefix, key),
                None => key,
            };

            match value {
                Value::String(text) => {
                    self.entries.insert(path, PhraseEntry::Text(text));
                }
                Value::Object(obj) => match variants(&obj, keywords) {
                    Some(v) => {
                        self.entries.insert(path, PhraseEntry::Variants(v));
                    }
                    None => self.absorb(Some(&path), obj, keywords),
                },
                Value::Number(_) | Value::Bool(_) => {
                    self.entries.insert(path, PhraseEntry::Text(value.to_string()));
                }
                Value::Null | Value::Array(_) => {
                    tracing::trace!(key = %path, "Ignoring phrase value of unsupported type");
                }
            }
        }
    }

    /// Insert an entry under a full key (sections joined with `.`).
    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<PhraseEntry>) {
        self.entries.insert(key.into(), entry.into());
    }

    pub fn with(mut self, key: impl Into<String>, entry: impl Into<PhraseEntry>) -> Self {
        self.insert(key, entry);
        self
    }

    pub fn get(&self, key: &str) -> Option<&PhraseEntry> {
        self.entries.get(key)
    }

    /// Look `key` up under each section in turn, then at the root.
    pub fn lookup(&self, key: &str, sections: &[&str]) -> Option<&PhraseEntry> {
        sections
            .iter()
            .filter(|s| !s.is_empty())
            .find_map(|section| self.entries.get(&format!("{}.{}", section, key)))
            .or_else(|| self.entries.get(key))
    }

    /// Add every entry of `other`, replacing existing keys.
    pub fn merge(&mut self, other: PhraseTable) {
        self.entries.extend(other.entries);
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn variants(obj: &Map<String, Value>, keywords: &PluralKeywords) -> Option<Variants> {
    let is_keyword = |key: &str| {
        key == keywords.translated || key == keywords.plural || key == keywords.default
    };
    if obj.is_empty() || !obj.keys().all(|key| is_keyword(key)) {
        return None;
    }

    let mut variants = Variants::default();
    for (key, value) in obj {
        match value {
            Value::String(text) if *key == keywords.translated => variants.translated = Some(text.clone()),
            Value::String(text) if *key == keywords.default => variants.default = Some(text.clone()),
            Value::String(text) if *key == keywords.plural => variants.plural = Some(text.clone()),
            Value::Object(forms) if *key == keywords.plural => variants.categories = categories(forms)?,
            _ => return None,
        }
    }
    Some(variants)
}

/// Category forms nested under the plural keyword.
fn categories(forms: &Map<String, Value>) -> Option<BTreeMap<PluralCategory, String>> {
    forms
        .iter()
        .map(|(key, value)| match (key.parse::<PluralCategory>(), value) {
            (Ok(category), Value::String(text)) => Some((category, text.clone())),
            _ => None,
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASES: &str = r#"{
        "Hello": "Bonjour",
        "apple": { "translated": "une pomme", "plural": "%d pommes" },
        "items": { "plural": { "one": "{n} article", "other": "{n} articles" } },
        "global": { "Welcome": "Bienvenue" },
        "index": {
            "title": "Accueil",
            "nested": { "deep": "profond" }
        },
        "count": 3,
        "ignored": null
    }"#;

    fn table() -> PhraseTable {
        PhraseTable::from_json(PHRASES, &PluralKeywords::default()).unwrap()
    }

    #[test]
    fn test_from_json_entries_and_sections() {
        let table = table();

        assert_eq!(table.get("Hello"), Some(&PhraseEntry::from("Bonjour")));
        assert_eq!(table.get("global.Welcome"), Some(&PhraseEntry::from("Bienvenue")));
        assert_eq!(table.get("index.nested.deep"), Some(&PhraseEntry::from("profond")));
        assert_eq!(table.get("count"), Some(&PhraseEntry::from("3")));
        assert!(table.get("ignored").is_none());
        assert!(table.get("apple").unwrap().has_plural());
        assert!(!table.get("Hello").unwrap().has_plural());
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let keywords = PluralKeywords::default();
        assert!(matches!(
            PhraseTable::from_json("[1, 2]", &keywords),
            Err(I18nError::ParseError(_))
        ));
        assert!(matches!(
            PhraseTable::from_json("{ broken", &keywords),
            Err(I18nError::JsonError(_))
        ));
    }

    #[test]
    fn test_custom_keywords() {
        let keywords = PluralKeywords {
            translated: "singular".to_string(),
            ..PluralKeywords::default()
        };
        let table = PhraseTable::from_json(r#"{"cat": {"singular": "chat", "plural": "chats"}}"#, &keywords)
            .unwrap();

        let entry = table.get("cat").unwrap();
        assert_eq!(entry.select(None), Some("chat"));
        assert_eq!(entry.select(Some(PluralCategory::Other)), Some("chats"));
    }

    #[test]
    fn test_select_chain() {
        let table = table();
        let apple = table.get("apple").unwrap();
        assert_eq!(apple.select(None), Some("une pomme"));
        assert_eq!(apple.select(Some(PluralCategory::One)), Some("une pomme"));
        assert_eq!(apple.select(Some(PluralCategory::Many)), Some("%d pommes"));

        let items = table.get("items").unwrap();
        assert_eq!(items.select(Some(PluralCategory::One)), Some("{n} article"));
        assert_eq!(items.select(Some(PluralCategory::Few)), Some("{n} articles"));
        assert_eq!(items.select(None), Some("{n} article"));
    }

    #[test]
    fn test_lookup_sections() {
        let table = table();
        assert_eq!(
            table.lookup("title", &["index", "global"]),
            Some(&PhraseEntry::from("Accueil"))
        );
        assert_eq!(
            table.lookup("Welcome", &["index", "global"]),
            Some(&PhraseEntry::from("Bienvenue"))
        );
        assert_eq!(table.lookup("Hello", &["index"]), Some(&PhraseEntry::from("Bonjour")));
        assert!(table.lookup("title", &[]).is_none());
    }

    #[test]
    fn test_category_words_in_sections_stay_phrases() {
        let table = PhraseTable::from_json(
            r#"{"index": {"one": "Un", "other": "Autre"}, "pick": {"translated": "x", "few": "y"}}"#,
            &PluralKeywords::default(),
        )
        .unwrap();

        assert_eq!(table.get("index.one"), Some(&PhraseEntry::from("Un")));
        assert_eq!(table.lookup("other", &["index"]), Some(&PhraseEntry::from("Autre")));
        assert!(table.get("index").is_none());
        // Category names only count under the plural keyword
        assert_eq!(table.get("pick.few"), Some(&PhraseEntry::from("y")));
    }

    #[test]
    fn test_plural_forms_must_be_categories() {
        let table = PhraseTable::from_json(
            r#"{"odd": {"plural": {"one": "a", "lots": "b"}}}"#,
            &PluralKeywords::default(),
        )
        .unwrap();
        assert_eq!(table.get("odd.plural.one"), Some(&PhraseEntry::from("a")));
        assert!(table.get("odd").is_none());
    }

    #[test]
    fn test_merge() {
        let mut base = PhraseTable::new().with("a", "1").with("b", "2");
        base.merge(PhraseTable::new().with("b", "3"));
        assert_eq!(base.len(), 2);
        assert_eq!(base.get("b"), Some(&PhraseEntry::from("3")));
    }
}
