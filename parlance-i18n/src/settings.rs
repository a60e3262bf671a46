//! Configuration resolved against a locale registry.

use crate::{I18nError, Locale, LocaleRegistry, Result};
use parlance_config::{DetectSource, I18nConfig, PluralKeywords, Validate};
use tracing::{debug, warn};

/// An [`I18nConfig`] whose locale tags have been resolved to canonical
/// [`Locale`] values.
///
/// The supported set always contains the default locale.
#[derive(Debug, Clone)]
pub struct Settings {
    config: I18nConfig,
    supported: Vec<Locale>,
    default: Locale,
}

impl Settings {
    /// Validate `config` and resolve its tags through `registry`.
    ///
    /// Fails when a configured tag is unknown to the registry.
    pub fn new(config: I18nConfig, registry: &LocaleRegistry) -> Result<Self> {
        config.validate()?;

        let default = registry.require(&config.default)?;

        let mut supported: Vec<Locale> = Vec::with_capacity(config.supported.len() + 1);
        for tag in &config.supported {
            let locale = registry.require(tag)?;
            if !supported.contains(&locale) {
                supported.push(locale);
            }
        }

        if !supported.contains(&default) {
            warn!(
                default = %default,
                "Default locale missing from supported locales, adding it"
            );
            supported.push(default.clone());
        }

        debug!(
            default = %default,
            supported = supported.len(),
            detect = ?config.detect,
            "Resolved i18n settings"
        );

        Ok(Self {
            config,
            supported,
            default,
        })
    }

    /// Resolve with the built-in registry.
    pub fn standard(config: I18nConfig) -> Result<Self> {
        Self::new(config, LocaleRegistry::standard())
    }

    pub fn config(&self) -> &I18nConfig {
        &self.config
    }

    pub fn supported(&self) -> &[Locale] {
        &self.supported
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default
    }

    pub fn detect(&self) -> &[DetectSource] {
        &self.config.detect
    }

    pub fn keywords(&self) -> &PluralKeywords {
        &self.config.keywords
    }

    pub fn is_supported(&self, locale: &Locale) -> bool {
        self.supported.contains(locale)
    }

    /// Resolve an identifier and keep it only if supported.
    pub fn supported_match<'a>(
        &'a self,
        registry: &LocaleRegistry,
        identifier: &str,
    ) -> Option<&'a Locale> {
        let locale = registry.resolve(identifier)?;
        self.supported.iter().find(|s| *s == locale)
    }
}

impl TryFrom<I18nConfig> for Settings {
    type Error = I18nError;

    fn try_from(config: I18nConfig) -> Result<Self> {
        Settings::standard(config)
    }
}
