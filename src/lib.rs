// Parlance - locale negotiation middleware for Rust
//
// This library negotiates a request's locale, strips it from the route and
// resolves phrases through a replaceable parser pipeline.

// Re-export the negotiation engine
pub use parlance_i18n::*;

// Re-export member crates
pub use parlance_config;
pub use parlance_i18n;

// Re-exported for implementing `PhraseLoader`
pub use async_trait::async_trait;

/// Prelude module for convenient imports
pub mod prelude {
    pub use parlance_config::{ConfigError, DetectSource, I18nConfig, PluralKeywords, Validate};
    pub use parlance_i18n::logging::{LogConfig, LogFormat, LogLevel};
    pub use parlance_i18n::prelude::*;
    pub use parlance_i18n::{
        FormatValue, Formatter, JsonDirLoader, MemoryLoader, Parser, PhraseContext, PhraseLoader,
        Pipeline,
    };

    pub use async_trait::async_trait;
}
