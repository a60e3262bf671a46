//! Error types for i18n operations

use thiserror::Error;

/// Errors that can occur while setting up negotiation or loading phrases.
///
/// Request-time negotiation and resolution never fail; these surface at
/// setup or from a [`PhraseLoader`](crate::PhraseLoader) before they are
/// degraded to an empty phrase table.
#[derive(Debug, Error)]
pub enum I18nError {
    /// Malformed locale identifier
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// Identifier not present in the locale registry
    #[error("Unknown locale: {0}")]
    UnknownLocale(String),

    /// No phrase table exists for a locale
    #[error("No phrases for locale: {0}")]
    PhrasesNotFound(String),

    /// Failed to parse a phrase table
    #[error("Failed to parse phrase table: {0}")]
    ParseError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parse error
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] parlance_config::ConfigError),
}
