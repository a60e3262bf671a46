// Configuration for Parlance locale negotiation and phrase resolution

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment prefix used by [`I18nConfig::from_env`].
pub const ENV_PREFIX: &str = "PARLANCE";

/// A place a locale preference may be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectSource {
    Query,
    Cookie,
    Header,
    #[serde(alias = "url")]
    Path,
}

impl DetectSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectSource::Query => "query",
            DetectSource::Cookie => "cookie",
            DetectSource::Header => "header",
            DetectSource::Path => "path",
        }
    }

    /// Every source in the default detection order.
    pub fn all() -> Vec<DetectSource> {
        vec![
            DetectSource::Query,
            DetectSource::Cookie,
            DetectSource::Header,
            DetectSource::Path,
        ]
    }
}

impl fmt::Display for DetectSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "query" => Ok(DetectSource::Query),
            "cookie" => Ok(DetectSource::Cookie),
            "header" => Ok(DetectSource::Header),
            "path" | "url" => Ok(DetectSource::Path),
            _ => Err(ConfigError::UnknownSource(s.to_string())),
        }
    }
}

/// Field and section names recognised inside phrase tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluralKeywords {
    /// Fallback text used when no better variant exists
    pub default: String,
    /// Singular translation of an entry
    pub translated: String,
    /// Section holding route-independent phrases
    pub universe: String,
    /// Plural translation of an entry
    pub plural: String,
}

impl Default for PluralKeywords {
    fn default() -> Self {
        Self {
            default: "default".to_string(),
            translated: "translated".to_string(),
            universe: "global".to_string(),
            plural: "plural".to_string(),
        }
    }
}

/// Locale negotiation settings.
///
/// Loaded once at setup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Capability name for translation
    pub global_name: String,
    /// Capability name for the format delegate
    pub localize_name: String,
    /// Capability name for the locale getter
    pub locale_name: String,
    /// Phrase file root
    pub directory: PathBuf,
    /// Supported locale tags
    pub supported: Vec<String>,
    /// Default locale tag
    pub default: String,
    /// Detection order
    pub detect: Vec<DetectSource>,
    pub cookie_name: String,
    pub query_name: String,
    /// Look phrases up under the request's route section
    pub router: bool,
    pub keywords: PluralKeywords,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            global_name: "__".to_string(),
            localize_name: "l".to_string(),
            locale_name: "locale".to_string(),
            directory: PathBuf::from("locales"),
            supported: vec!["en-US".to_string()],
            default: "en-US".to_string(),
            detect: DetectSource::all(),
            cookie_name: "locale".to_string(),
            query_name: "locale".to_string(),
            router: false,
            keywords: PluralKeywords::default(),
        }
    }
}

impl I18nConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON or TOML file, picked by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ConfigLoader::auto(path)?.load_file(path)
    }

    pub fn from_str(content: &str, format: FileFormat) -> Result<Self> {
        ConfigLoader::new(format).parse(content)
    }

    /// Defaults overlaid with `PARLANCE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env(ENV_PREFIX)
    }

    /// Read a `.env` file (if any) and then apply the environment.
    pub fn load_dotenv(self, path: Option<&Path>, prefix: &str) -> Result<Self> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        self.apply_env(prefix)
    }

    /// Overlay `PREFIX_*` environment variables onto this configuration.
    pub fn apply_env(mut self, prefix: &str) -> Result<Self> {
        let env = EnvLoader::new(Some(prefix.to_string()));

        if let Some(default) = env.var("DEFAULT") {
            self.default = default;
        }
        if let Some(supported) = env.list("SUPPORTED") {
            self.supported = supported;
        }
        if let Some(detect) = env.list("DETECT") {
            self.detect = detect
                .iter()
                .map(|s| s.parse())
                .collect::<Result<Vec<_>>>()?;
        }
        if let Some(name) = env.var("COOKIE_NAME") {
            self.cookie_name = name;
        }
        if let Some(name) = env.var("QUERY_NAME") {
            self.query_name = name;
        }
        if let Some(directory) = env.var("DIRECTORY") {
            self.directory = PathBuf::from(directory);
        }
        if let Some(router) = env.flag("ROUTER")? {
            self.router = router;
        }

        Ok(self)
    }

    pub fn with_supported<I, S>(mut self, supported: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported = supported.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    pub fn with_detect(mut self, detect: impl IntoIterator<Item = DetectSource>) -> Self {
        self.detect = detect.into_iter().collect();
        self
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_query_name(mut self, name: impl Into<String>) -> Self {
        self.query_name = name.into();
        self
    }

    pub fn with_global_name(mut self, name: impl Into<String>) -> Self {
        self.global_name = name.into();
        self
    }

    pub fn with_localize_name(mut self, name: impl Into<String>) -> Self {
        self.localize_name = name.into();
        self
    }

    pub fn with_router(mut self, router: bool) -> Self {
        self.router = router;
        self
    }

    pub fn with_keywords(mut self, keywords: PluralKeywords) -> Self {
        self.keywords = keywords;
        self
    }
}

impl Validate for I18nConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.global_name, "global_name")?;
        ConfigValidator::not_empty(&self.localize_name, "localize_name")?;
        ConfigValidator::not_empty(&self.locale_name, "locale_name")?;
        ConfigValidator::unique(
            &[&self.global_name, &self.localize_name, &self.locale_name],
            "capability names",
        )?;
        ConfigValidator::not_empty(&self.default, "default")?;
        ConfigValidator::not_empty_list(&self.supported, "supported")?;
        for tag in &self.supported {
            ConfigValidator::not_empty(tag, "supported")?;
        }
        ConfigValidator::not_empty_list(&self.detect, "detect")?;
        ConfigValidator::unique(&self.detect, "detect")?;
        ConfigValidator::not_empty(&self.cookie_name, "cookie_name")?;
        ConfigValidator::not_empty(&self.query_name, "query_name")?;
        ConfigValidator::not_empty(&self.keywords.universe, "keywords.universe")?;
        Ok(())
    }
}
