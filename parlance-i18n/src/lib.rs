//! Locale negotiation and phrase resolution middleware.
//!
//! - **Negotiation**: pick one supported locale per request from the query
//!   string, a cookie, the Accept-Language header or the first path segment,
//!   in configured order, falling back to the default locale
//! - **Route segments**: strip the locale token from the path and expose the
//!   rest as segments and as an escaped dot path (`/api/v1.0/en-us` becomes
//!   `api.v1*0`)
//! - **Phrase resolution**: a replaceable parser pipeline; the default parser
//!   looks phrases up, picks plural variants and interpolates arguments
//! - **Capabilities**: translate, localize and current-locale handles
//!   attached to host objects without clobbering existing ones
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use parlance_i18n::{Arg, I18n, SimpleRequest};
//! use parlance_config::I18nConfig;
//!
//! let config = I18nConfig::from_file("i18n.toml")?;
//! let i18n = I18n::new(config)?;
//!
//! let request = SimpleRequest::new("/fr/about").with_header("Accept-Language", "de;q=0.5");
//! let scope = i18n.scope(&request).await;
//!
//! scope.translate("You have %d messages", vec![Arg::from(3)]);
//! scope.route().dot();  // "about"
//! ```
//!
//! # Accept-Language Parsing
//!
//! ```
//! use parlance_i18n::parse_accept_language;
//!
//! let tags = parse_accept_language("en-US,en;q=0.9,fr;q=0.8");
//! assert_eq!(tags[0].tag, "en-US");
//! ```

mod accept;
mod error;
mod facade;
mod format;
mod loader;
mod locale;
mod messages;
mod phrase;
mod pipeline;
mod plural;
mod request;
mod route;
mod settings;

pub mod logging;

pub use accept::{
    ACCEPT_LANGUAGE, AcceptResolver, Candidate, NegotiationResult, QualifiedTag, collect_candidates,
    parse_accept_language,
};
pub use error::I18nError;
pub use facade::{
    Capability, CapabilitySet, CapabilityTarget, I18n, I18nBuilder, LocaleGetter, Localizer,
    RequestScope, Translator,
};
pub use format::{BasicFormatter, FormatValue, Formatter};
pub use loader::{JsonDirLoader, MemoryLoader, PhraseLoader, load_or_empty};
pub use locale::{Locale, LocaleRegistry, LocaleRegistryBuilder, normalize};
pub use messages::{PhraseEntry, PhraseTable, Variants};
pub use phrase::{Arg, Phrase, PhraseContext, PhraseRequest};
pub use pipeline::{DefaultParser, MiddlewareStack, Parser, Pipeline, interpolate};
pub use plural::{PluralCategory, PluralRule, plural_category};
pub use request::{RequestView, SimpleRequest};
pub use route::{DOT_ESCAPE, INDEX, Route, RouteSegmenter, escape_segment};
pub use settings::Settings;

pub use parlance_config::{DetectSource, I18nConfig, PluralKeywords};

/// Result type for i18n operations
pub type Result<T> = std::result::Result<T, I18nError>;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Arg, Capability, CapabilitySet, CapabilityTarget, DetectSource, I18n, I18nConfig, I18nError,
        Locale, LocaleRegistry, Phrase, PhraseTable, RequestScope, RequestView, Result, Route,
        SimpleRequest, parse_accept_language, plural_category,
    };
}
