//! Locale values and the canonical locale registry.
//!
//! Every spelling of a locale identifier a request may carry (`en_US`,
//! `EN-us`, the legacy `iw` for Hebrew) maps to a single canonical
//! [`Locale`] through the [`LocaleRegistry`].

use crate::{I18nError, Result};
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A canonical locale.
///
/// Immutable and cheap to clone. Two locales are equal when their canonical
/// tags are equal; aliases do not take part in comparison.
#[derive(Clone)]
pub struct Locale {
    inner: Arc<LocaleInner>,
}

#[derive(Debug)]
struct LocaleInner {
    tag: String,
    language: String,
    script: Option<String>,
    region: Option<String>,
    aliases: Vec<String>,
}

impl Locale {
    /// Build a locale from a BCP 47 tag (e.g. `en-US`, `zh-Hans-CN`).
    ///
    /// The tag is re-cased canonically: lowercase language, title-case
    /// script, uppercase region.
    pub fn new<I, S>(tag: &str, aliases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (language, script, region) = parse_tag(tag)?;

        let mut canonical = language.clone();
        if let Some(ref script) = script {
            canonical.push('-');
            canonical.push_str(script);
        }
        if let Some(ref region) = region {
            canonical.push('-');
            canonical.push_str(region);
        }

        Ok(Self {
            inner: Arc::new(LocaleInner {
                tag: canonical,
                language,
                script,
                region,
                aliases: aliases.into_iter().map(Into::into).collect(),
            }),
        })
    }

    /// Parse a tag without aliases.
    pub fn parse(tag: &str) -> Result<Self> {
        Self::new(tag, std::iter::empty::<String>())
    }

    /// Canonical tag (e.g. `en-US`).
    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    pub fn aliases(&self) -> &[String] {
        &self.inner.aliases
    }

    /// ISO 639 language subtag, lowercase.
    pub fn language(&self) -> &str {
        &self.inner.language
    }

    pub fn script(&self) -> Option<&str> {
        self.inner.script.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.inner.region.as_deref()
    }
}

impl PartialEq for Locale {
    fn eq(&self, other: &Self) -> bool {
        self.inner.tag == other.inner.tag
    }
}

impl Eq for Locale {}

impl Hash for Locale {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.tag.hash(state);
    }
}

impl fmt::Debug for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Locale").field(&self.inner.tag).finish()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.tag)
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

/// Split a tag into language, script and region subtags.
fn parse_tag(tag: &str) -> Result<(String, Option<String>, Option<String>)> {
    let mut parts = tag.trim().split(['-', '_']);

    let language = parts
        .next()
        .map(str::to_lowercase)
        .filter(|l| (2..=3).contains(&l.len()) && l.chars().all(|c| c.is_ascii_alphabetic()))
        .ok_or_else(|| I18nError::InvalidLocale(tag.to_string()))?;

    let mut script = None;
    let mut region = None;

    for part in parts {
        if part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic()) {
            let mut chars = part.chars();
            script = chars.next().map(|first| {
                first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect()
            });
        } else if part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()) {
            region = Some(part.to_uppercase());
        } else if part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()) {
            // UN M.49 area code
            region = Some(part.to_string());
        } else {
            return Err(I18nError::InvalidLocale(tag.to_string()));
        }
    }

    Ok((language, script, region))
}

/// Lookup key for an identifier: trimmed, lowercase, `_` folded into `-`.
pub fn normalize(identifier: &str) -> String {
    identifier.trim().to_lowercase().replace('_', "-")
}

// ============================================================================
// Registry
// ============================================================================

/// Canonical table mapping locale identifiers to [`Locale`] values.
///
/// Built once at setup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct LocaleRegistry {
    locales: Vec<Locale>,
    index: HashMap<String, usize>,
}

static STANDARD: Lazy<LocaleRegistry> = Lazy::new(|| {
    let mut builder = LocaleRegistry::builder();
    for (tag, aliases) in STANDARD_LOCALES {
        builder = match builder.clone().register(tag, aliases.iter().copied()) {
            Ok(next) => next,
            Err(e) => {
                tracing::error!(tag = %tag, error = %e, "Skipping invalid built-in locale");
                builder
            }
        };
    }
    builder.build()
});

impl LocaleRegistry {
    /// The built-in registry of common locales.
    pub fn standard() -> &'static LocaleRegistry {
        &STANDARD
    }

    pub fn builder() -> LocaleRegistryBuilder {
        LocaleRegistryBuilder::default()
    }

    /// Resolve an identifier to its canonical locale.
    ///
    /// Separators and case are normalized first. Unknown identifiers return
    /// `None`; callers decide the fallback.
    pub fn resolve(&self, identifier: &str) -> Option<&Locale> {
        let key = normalize(identifier);
        if key.is_empty() {
            return None;
        }
        self.index.get(&key).map(|&i| &self.locales[i])
    }

    /// Resolve or fail with [`I18nError::UnknownLocale`].
    pub fn require(&self, identifier: &str) -> Result<Locale> {
        self.resolve(identifier)
            .cloned()
            .ok_or_else(|| I18nError::UnknownLocale(identifier.to_string()))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.resolve(identifier).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Locale> {
        self.locales.iter()
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}

/// Builder for [`LocaleRegistry`].
#[derive(Debug, Clone, Default)]
pub struct LocaleRegistryBuilder {
    registry: LocaleRegistry,
}

impl LocaleRegistryBuilder {
    /// Start from the built-in table.
    pub fn standard() -> Self {
        Self {
            registry: LocaleRegistry::standard().clone(),
        }
    }

    /// Register a canonical tag and its aliases.
    ///
    /// Re-registering a tag replaces it; an alias already claimed by another
    /// locale is moved to the new one.
    pub fn register<I, S>(mut self, tag: &str, aliases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let locale = Locale::new(tag, aliases)?;
        let registry = &mut self.registry;

        let slot = match registry.index.get(&normalize(locale.tag())) {
            Some(&i) if registry.locales[i] == locale => {
                registry.locales[i] = locale.clone();
                i
            }
            _ => {
                registry.locales.push(locale.clone());
                registry.locales.len() - 1
            }
        };

        registry.index.insert(normalize(locale.tag()), slot);
        for alias in locale.aliases() {
            registry.index.insert(normalize(alias), slot);
        }

        Ok(self)
    }

    pub fn build(self) -> LocaleRegistry {
        self.registry
    }
}

/// Built-in canonical tags and their alternative spellings.
const STANDARD_LOCALES: &[(&str, &[&str])] = &[
    ("en", &[]),
    ("en-US", &[]),
    ("en-GB", &["en-UK"]),
    ("en-AU", &[]),
    ("en-CA", &[]),
    ("en-IE", &[]),
    ("en-IN", &[]),
    ("en-NZ", &[]),
    ("fr", &[]),
    ("fr-FR", &[]),
    ("fr-BE", &[]),
    ("fr-CA", &[]),
    ("fr-CH", &[]),
    ("de", &[]),
    ("de-DE", &[]),
    ("de-AT", &[]),
    ("de-CH", &[]),
    ("es", &[]),
    ("es-ES", &[]),
    ("es-MX", &[]),
    ("es-AR", &[]),
    ("es-419", &[]),
    ("it", &[]),
    ("it-IT", &[]),
    ("pt", &[]),
    ("pt-BR", &[]),
    ("pt-PT", &[]),
    ("nl", &[]),
    ("nl-NL", &[]),
    ("nl-BE", &[]),
    ("sv", &[]),
    ("sv-SE", &[]),
    ("da", &[]),
    ("da-DK", &[]),
    ("nb", &["no"]),
    ("nb-NO", &["no-NO"]),
    ("fi", &[]),
    ("fi-FI", &[]),
    ("pl", &[]),
    ("pl-PL", &[]),
    ("cs", &[]),
    ("cs-CZ", &[]),
    ("sk", &[]),
    ("sk-SK", &[]),
    ("hu", &[]),
    ("hu-HU", &[]),
    ("ro", &[]),
    ("ro-RO", &[]),
    ("bg", &[]),
    ("bg-BG", &[]),
    ("el", &[]),
    ("el-GR", &[]),
    ("ru", &[]),
    ("ru-RU", &[]),
    ("uk", &[]),
    ("uk-UA", &[]),
    ("tr", &[]),
    ("tr-TR", &[]),
    ("he", &["iw"]),
    ("he-IL", &["iw-IL"]),
    ("yi", &["ji"]),
    ("ar", &[]),
    ("ar-SA", &[]),
    ("ar-EG", &[]),
    ("hi", &[]),
    ("hi-IN", &[]),
    ("id", &["in"]),
    ("id-ID", &["in-ID"]),
    ("ms", &[]),
    ("ms-MY", &[]),
    ("th", &[]),
    ("th-TH", &[]),
    ("vi", &[]),
    ("vi-VN", &[]),
    ("cy", &[]),
    ("cy-GB", &[]),
    ("ja", &[]),
    ("ja-JP", &[]),
    ("ko", &[]),
    ("ko-KR", &[]),
    ("zh", &[]),
    ("zh-Hans", &["zh-CHS"]),
    ("zh-Hant", &["zh-CHT"]),
    ("zh-CN", &["zh-Hans-CN"]),
    ("zh-TW", &["zh-Hant-TW"]),
    ("zh-HK", &["zh-Hant-HK"]),
];
