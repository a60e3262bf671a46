//! Phrase table loading.
//!
//! A [`PhraseLoader`] produces the table for one locale. It is awaited once
//! per request scope; a failed load never fails the request, the scope falls
//! back to an empty table and phrases resolve to their own keys.

use crate::{I18nError, Locale, PhraseTable, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use parlance_config::PluralKeywords;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Source of phrase tables.
#[async_trait]
pub trait PhraseLoader: Send + Sync {
    /// Load the table for `locale`.
    async fn load(&self, locale: &Locale) -> Result<Arc<PhraseTable>>;
}

/// Load a table, degrading any failure to an empty one.
pub async fn load_or_empty(loader: &dyn PhraseLoader, locale: &Locale) -> Arc<PhraseTable> {
    match loader.load(locale).await {
        Ok(table) => table,
        Err(e) => {
            warn!(locale = %locale, error = %e, "Failed to load phrases, using empty table");
            Arc::new(PhraseTable::new())
        }
    }
}

/// In-memory tables keyed by locale tag.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    tables: HashMap<String, Arc<PhraseTable>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, locale: &Locale, table: PhraseTable) -> Self {
        self.insert(locale, table);
        self
    }

    pub fn insert(&mut self, locale: &Locale, table: PhraseTable) {
        self.tables.insert(locale.tag().to_string(), Arc::new(table));
    }
}

#[async_trait]
impl PhraseLoader for MemoryLoader {
    async fn load(&self, locale: &Locale) -> Result<Arc<PhraseTable>> {
        self.tables
            .get(locale.tag())
            .cloned()
            .ok_or_else(|| I18nError::PhrasesNotFound(locale.tag().to_string()))
    }
}

/// Reads `<directory>/<tag>.json`, falling back to `<directory>/<language>.json`.
///
/// Loaded tables and missing files are both cached until [`clear_cache`].
/// Parse and I/O errors are not cached.
///
/// [`clear_cache`]: JsonDirLoader::clear_cache
#[derive(Debug)]
pub struct JsonDirLoader {
    directory: PathBuf,
    keywords: PluralKeywords,
    // `None` marks a locale with no phrase file
    cache: RwLock<HashMap<String, Option<Arc<PhraseTable>>>>,
}

impl JsonDirLoader {
    pub fn new(directory: impl Into<PathBuf>, keywords: PluralKeywords) -> Self {
        Self {
            directory: directory.into(),
            keywords,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Drop cached tables and missing-file markers so the next load reads from disk.
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    fn candidates(&self, locale: &Locale) -> Vec<PathBuf> {
        let mut paths = vec![self.directory.join(format!("{}.json", locale.tag()))];
        if locale.tag() != locale.language() {
            paths.push(self.directory.join(format!("{}.json", locale.language())));
        }
        paths
    }
}

#[async_trait]
impl PhraseLoader for JsonDirLoader {
    async fn load(&self, locale: &Locale) -> Result<Arc<PhraseTable>> {
        let cached = self.cache.read().get(locale.tag()).cloned();
        match cached {
            Some(Some(table)) => return Ok(table),
            Some(None) => return Err(I18nError::PhrasesNotFound(locale.tag().to_string())),
            None => {}
        }

        for path in self.candidates(locale) {
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            let table = Arc::new(PhraseTable::from_json(&content, &self.keywords)?);
            debug!(
                locale = %locale,
                path = %path.display(),
                phrases = table.len(),
                "Loaded phrase table"
            );
            self.cache
                .write()
                .insert(locale.tag().to_string(), Some(table.clone()));
            return Ok(table);
        }

        debug!(locale = %locale, "No phrase file found");
        self.cache.write().insert(locale.tag().to_string(), None);
        Err(I18nError::PhrasesNotFound(locale.tag().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn locale(tag: &str) -> Locale {
        Locale::parse(tag).unwrap()
    }

    #[tokio::test]
    async fn test_memory_loader() {
        let fr = locale("fr");
        let loader = MemoryLoader::new().with_table(&fr, PhraseTable::new().with("Hello", "Bonjour"));

        let table = loader.load(&fr).await.unwrap();
        assert_eq!(table.len(), 1);
        assert!(matches!(
            loader.load(&locale("de")).await,
            Err(I18nError::PhrasesNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_json_dir_loader_language_fallback() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("en-US.json"), r#"{"Hello": "Howdy"}"#).unwrap();
        fs::write(dir.path().join("fr.json"), r#"{"Hello": "Bonjour"}"#).unwrap();

        let loader = JsonDirLoader::new(dir.path(), PluralKeywords::default());

        let en = loader.load(&locale("en-US")).await.unwrap();
        assert!(en.get("Hello").is_some());

        let fr_ca = loader.load(&locale("fr-CA")).await.unwrap();
        assert_eq!(fr_ca.get("Hello"), Some(&"Bonjour".into()));
    }

    #[tokio::test]
    async fn test_json_dir_loader_caches() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("de.json");
        fs::write(&path, r#"{"Hello": "Hallo"}"#).unwrap();

        let loader = JsonDirLoader::new(dir.path(), PluralKeywords::default());
        let de = locale("de");
        loader.load(&de).await.unwrap();

        fs::remove_file(&path).unwrap();
        assert!(loader.load(&de).await.is_ok());

        loader.clear_cache();
        assert!(matches!(loader.load(&de).await, Err(I18nError::PhrasesNotFound(_))));
    }

    #[tokio::test]
    async fn test_json_dir_loader_caches_missing_files() {
        let dir = TempDir::new().unwrap();
        let loader = JsonDirLoader::new(dir.path(), PluralKeywords::default());
        let pt = locale("pt-BR");

        assert!(matches!(loader.load(&pt).await, Err(I18nError::PhrasesNotFound(_))));

        // A file written later is not seen until the cache is cleared
        fs::write(dir.path().join("pt.json"), r#"{"Hello": "Olá"}"#).unwrap();
        assert!(matches!(loader.load(&pt).await, Err(I18nError::PhrasesNotFound(_))));

        loader.clear_cache();
        let table = loader.load(&pt).await.unwrap();
        assert_eq!(table.get("Hello"), Some(&"Olá".into()));
    }

    #[tokio::test]
    async fn test_load_or_empty_degrades() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ja.json"), "not json").unwrap();

        let loader = JsonDirLoader::new(dir.path(), PluralKeywords::default());
        assert!(matches!(loader.load(&locale("ja")).await, Err(I18nError::JsonError(_))));

        let table = load_or_empty(&loader, &locale("ja")).await;
        assert!(table.is_empty());
    }
}
