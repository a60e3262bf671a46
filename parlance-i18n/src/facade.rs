//! Per-request negotiation facade.
//!
//! [`I18n`] is built once at setup and shared. For every request it
//! negotiates a locale, segments the route, loads the phrase table and hands
//! back a [`RequestScope`]. The scope's three capabilities (translate,
//! localize, current locale) are attached to host objects through the
//! [`CapabilityTarget`] adapter.
//!
//! # Example
//!
//! ```
//! use parlance_config::I18nConfig;
//! use parlance_i18n::{Arg, I18n, Locale, MemoryLoader, PhraseTable, SimpleRequest};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let fr = Locale::parse("fr").unwrap();
//! let loader = MemoryLoader::new()
//!     .with_table(&fr, PhraseTable::new().with("Hello, %s", "Bonjour, %s"));
//!
//! let config = I18nConfig::new().with_supported(["en-US", "fr"]);
//! let i18n = I18n::builder(config).loader(loader).build().unwrap();
//!
//! let scope = i18n.scope(&SimpleRequest::new("/fr/about")).await;
//! assert_eq!(scope.translate("Hello, %s", vec![Arg::from("Ada")]), "Bonjour, Ada");
//! assert_eq!(scope.route().dot(), "about");
//! # }
//! ```

use crate::format::{BasicFormatter, FormatValue, Formatter};
use crate::loader::{load_or_empty, JsonDirLoader, PhraseLoader};
use crate::phrase::{Arg, Phrase, PhraseContext, PhraseRequest};
use crate::pipeline::{MiddlewareStack, Parser, Pipeline};
use crate::{
    AcceptResolver, Locale, LocaleRegistry, NegotiationResult, PhraseTable, RequestView, Result, Route,
    RouteSegmenter, Settings,
};
use parlance_config::I18nConfig;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, trace};

// ============================================================================
// Engine
// ============================================================================

struct Inner {
    settings: Settings,
    registry: Arc<LocaleRegistry>,
    loader: Arc<dyn PhraseLoader>,
    formatter: Arc<dyn Formatter>,
    stack: MiddlewareStack,
}

/// Shared negotiation engine.
///
/// Cloning is cheap; clones share configuration, registry, loader and the
/// installed pipeline.
#[derive(Clone)]
pub struct I18n {
    inner: Arc<Inner>,
}

impl I18n {
    /// Engine with the built-in registry, a [`JsonDirLoader`] over the
    /// configured directory and the [`BasicFormatter`].
    pub fn new(config: I18nConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: I18nConfig) -> I18nBuilder {
        I18nBuilder {
            config,
            registry: None,
            loader: None,
            formatter: None,
            pipeline: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn config(&self) -> &I18nConfig {
        self.inner.settings.config()
    }

    pub fn registry(&self) -> &LocaleRegistry {
        &self.inner.registry
    }

    /// Replace the active pipeline with a single parser.
    pub fn use_parser<P: Parser + 'static>(&self, parser: P) {
        self.inner.stack.install_parser(parser);
    }

    /// Replace the active pipeline.
    pub fn use_pipeline(&self, pipeline: Pipeline) {
        self.inner.stack.install(pipeline);
    }

    pub fn negotiate(&self, request: &dyn RequestView) -> NegotiationResult {
        AcceptResolver::new(&self.inner.registry).negotiate_request(&self.inner.settings, request)
    }

    pub fn segment(&self, path: &str) -> Route {
        RouteSegmenter::new(&self.inner.registry).segment_with(path, &self.inner.settings)
    }

    /// Negotiate, segment, then load phrases for one request.
    ///
    /// Negotiation and segmentation run before the returned future is first
    /// polled; only the phrase load is awaited.
    pub fn scope(
        &self,
        request: &dyn RequestView,
    ) -> impl Future<Output = Arc<RequestScope>> + Send + use<> {
        let negotiation = self.negotiate(request);
        let route = self.segment(request.path());
        let engine = self.clone();

        async move {
            let table = load_or_empty(engine.inner.loader.as_ref(), &negotiation.locale).await;
            debug!(
                locale = %negotiation.locale,
                source = ?negotiation.source,
                route = %route.dot(),
                phrases = table.len(),
                "Request scope ready"
            );
            Arc::new(RequestScope {
                engine,
                negotiation,
                route,
                table,
            })
        }
    }

    /// Install the scope's capabilities on `target` under the configured
    /// names, skipping names the target already has.
    ///
    /// Returns how many capabilities were installed.
    pub fn attach(&self, scope: &Arc<RequestScope>, target: &mut dyn CapabilityTarget) -> usize {
        let config = self.config();
        let offers = [
            (&config.global_name, Capability::Translate(Translator(scope.clone()))),
            (&config.localize_name, Capability::Localize(Localizer(scope.clone()))),
            (&config.locale_name, Capability::Locale(LocaleGetter(scope.clone()))),
        ];

        let mut installed = 0;
        for (name, capability) in offers {
            if target.has_capability(name) {
                trace!(name = %name, "Capability already present, leaving it");
                continue;
            }
            target.set_capability(name, capability);
            installed += 1;
        }
        installed
    }

    /// Scope the request, attach capabilities to every target, then continue
    /// with `next`.
    pub async fn handle<F, Fut>(
        &self,
        request: &dyn RequestView,
        targets: Vec<&mut dyn CapabilityTarget>,
        next: F,
    ) -> Fut::Output
    where
        F: FnOnce(Arc<RequestScope>) -> Fut,
        Fut: Future,
    {
        let scope = self.scope(request).await;
        for target in targets {
            self.attach(&scope, target);
        }
        next(scope).await
    }

    /// Run the pipeline against explicit inputs, bypassing negotiation and
    /// the loader.
    pub fn resolve_with(
        &self,
        locale: &Locale,
        table: &PhraseTable,
        route: &Route,
        request: PhraseRequest,
    ) -> String {
        let ctx = PhraseContext::new(request, locale, route, table, &self.inner.settings);
        self.inner.stack.resolve(ctx)
    }

    /// Translate outside a request, loading phrases for `locale`.
    pub async fn translate_in(&self, locale: &Locale, phrase: impl Into<Phrase>, args: Vec<Arg>) -> String {
        let table = load_or_empty(self.inner.loader.as_ref(), locale).await;
        self.resolve_with(locale, &table, &Route::index(), PhraseRequest::new(phrase, args))
    }

    /// Format `value` for `locale` with the installed formatter.
    pub fn localize_in(&self, locale: &Locale, value: impl Into<FormatValue>) -> String {
        self.inner.formatter.format(&value.into(), locale)
    }
}

impl fmt::Debug for I18n {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("I18n")
            .field("settings", &self.inner.settings)
            .field("stack", &self.inner.stack)
            .finish()
    }
}

/// Builder for [`I18n`].
pub struct I18nBuilder {
    config: I18nConfig,
    registry: Option<LocaleRegistry>,
    loader: Option<Arc<dyn PhraseLoader>>,
    formatter: Option<Arc<dyn Formatter>>,
    pipeline: Option<Pipeline>,
}

impl I18nBuilder {
    pub fn registry(mut self, registry: LocaleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn loader<L: PhraseLoader + 'static>(mut self, loader: L) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn formatter<F: Formatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Validate the configuration and resolve its locales.
    pub fn build(self) -> Result<I18n> {
        let registry = self
            .registry
            .unwrap_or_else(|| LocaleRegistry::standard().clone());
        let settings = Settings::new(self.config, &registry)?;

        let loader = self.loader.unwrap_or_else(|| {
            Arc::new(JsonDirLoader::new(
                settings.config().directory.clone(),
                settings.keywords().clone(),
            ))
        });
        let formatter = self
            .formatter
            .unwrap_or_else(|| Arc::new(BasicFormatter::default()));

        let stack = MiddlewareStack::new();
        if let Some(pipeline) = self.pipeline {
            stack.install(pipeline);
        }

        debug!(
            default = %settings.default_locale(),
            supported = settings.supported().len(),
            registry = registry.len(),
            "I18n engine built"
        );

        Ok(I18n {
            inner: Arc::new(Inner {
                settings,
                registry: Arc::new(registry),
                loader,
                formatter,
                stack,
            }),
        })
    }
}

// ============================================================================
// Request Scope
// ============================================================================

/// Everything resolved for one request.
pub struct RequestScope {
    engine: I18n,
    negotiation: NegotiationResult,
    route: Route,
    table: Arc<PhraseTable>,
}

impl RequestScope {
    pub fn locale(&self) -> &Locale {
        &self.negotiation.locale
    }

    pub fn negotiation(&self) -> &NegotiationResult {
        &self.negotiation
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn phrases(&self) -> &PhraseTable {
        &self.table
    }

    pub fn translate(&self, phrase: impl Into<Phrase>, args: Vec<Arg>) -> String {
        self.engine.resolve_with(
            &self.negotiation.locale,
            &self.table,
            &self.route,
            PhraseRequest::new(phrase, args),
        )
    }

    pub fn localize(&self, value: impl Into<FormatValue>) -> String {
        self.engine.localize_in(&self.negotiation.locale, value)
    }

    /// A detached translate capability bound to this scope.
    pub fn translator(self: &Arc<Self>) -> Translator {
        Translator(self.clone())
    }
}

impl fmt::Debug for RequestScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestScope")
            .field("negotiation", &self.negotiation)
            .field("route", &self.route)
            .field("phrases", &self.table.len())
            .finish()
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// Translate capability.
#[derive(Debug, Clone)]
pub struct Translator(Arc<RequestScope>);

impl Translator {
    pub fn translate(&self, phrase: impl Into<Phrase>, args: Vec<Arg>) -> String {
        self.0.translate(phrase, args)
    }
}

/// Format-delegate capability.
#[derive(Debug, Clone)]
pub struct Localizer(Arc<RequestScope>);

impl Localizer {
    pub fn localize(&self, value: impl Into<FormatValue>) -> String {
        self.0.localize(value)
    }
}

/// Current-locale capability.
#[derive(Debug, Clone)]
pub struct LocaleGetter(Arc<RequestScope>);

impl LocaleGetter {
    pub fn get(&self) -> Locale {
        self.0.locale().clone()
    }
}

/// A capability bound to one request scope.
#[derive(Debug, Clone)]
pub enum Capability {
    Translate(Translator),
    Localize(Localizer),
    Locale(LocaleGetter),
}

impl Capability {
    /// The scope the capability is bound to.
    pub fn scope(&self) -> &Arc<RequestScope> {
        match self {
            Capability::Translate(t) => &t.0,
            Capability::Localize(l) => &l.0,
            Capability::Locale(g) => &g.0,
        }
    }

    pub fn as_translator(&self) -> Option<&Translator> {
        match self {
            Capability::Translate(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_localizer(&self) -> Option<&Localizer> {
        match self {
            Capability::Localize(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_locale(&self) -> Option<&LocaleGetter> {
        match self {
            Capability::Locale(g) => Some(g),
            _ => None,
        }
    }
}

/// Host object that can receive capabilities.
pub trait CapabilityTarget {
    fn has_capability(&self, name: &str) -> bool;

    fn set_capability(&mut self, name: &str, capability: Capability);
}

/// Name to capability map, usable as a ready-made [`CapabilityTarget`].
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    entries: HashMap<String, Capability>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.entries.get(name)
    }

    pub fn translator(&self, name: &str) -> Option<&Translator> {
        self.get(name)?.as_translator()
    }

    pub fn localizer(&self, name: &str) -> Option<&Localizer> {
        self.get(name)?.as_localizer()
    }

    pub fn locale(&self, name: &str) -> Option<Locale> {
        self.get(name)?.as_locale().map(LocaleGetter::get)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CapabilityTarget for CapabilitySet {
    fn has_capability(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn set_capability(&mut self, name: &str, capability: Capability) {
        self.entries.insert(name.to_string(), capability);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryLoader, SimpleRequest};
    use parlance_config::DetectSource;

    fn engine() -> I18n {
        let registry = LocaleRegistry::standard();
        let fr = registry.require("fr").unwrap();
        let en = registry.require("en-US").unwrap();

        let loader = MemoryLoader::new()
            .with_table(&fr, PhraseTable::new().with("Hello", "Bonjour"))
            .with_table(&en, PhraseTable::new().with("Hello", "Hello"));

        I18n::builder(I18nConfig::new().with_supported(["en-US", "fr"]))
            .loader(loader)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_scope_negotiates_and_loads() {
        let i18n = engine();
        let request = SimpleRequest::new("/docs/fr").with_header("Accept-Language", "fr");

        let scope = i18n.scope(&request).await;
        assert_eq!(scope.locale().tag(), "fr");
        assert_eq!(scope.negotiation().source, Some(DetectSource::Header));
        assert_eq!(scope.route().segments(), ["docs"]);
        assert_eq!(scope.translate("Hello", vec![]), "Bonjour");
    }

    #[tokio::test]
    async fn test_attach_idempotent() {
        let i18n = engine();
        let first = i18n.scope(&SimpleRequest::new("/?locale=fr")).await;
        let second = i18n.scope(&SimpleRequest::new("/?locale=en-US")).await;

        let mut target = CapabilitySet::new();
        assert_eq!(i18n.attach(&first, &mut target), 3);
        assert_eq!(i18n.attach(&second, &mut target), 0);

        assert_eq!(target.len(), 3);
        assert_eq!(target.locale("locale").unwrap().tag(), "fr");
        for name in ["__", "l", "locale"] {
            assert!(Arc::ptr_eq(target.get(name).unwrap().scope(), &first));
        }
    }

    #[tokio::test]
    async fn test_attach_keeps_host_state() {
        let i18n = engine();
        let scope = i18n.scope(&SimpleRequest::new("/?locale=fr")).await;
        let other = i18n.scope(&SimpleRequest::new("/")).await;

        let mut target = CapabilitySet::new();
        target.set_capability("l", Capability::Locale(LocaleGetter(other.clone())));

        assert_eq!(i18n.attach(&scope, &mut target), 2);
        assert!(target.localizer("l").is_none());
        assert!(target.translator("__").is_some());
    }

    #[tokio::test]
    async fn test_handle_runs_next_after_attach() {
        let i18n = engine();
        let request = SimpleRequest::new("/fr/welcome");
        let mut ctx = CapabilitySet::new();
        let mut req = CapabilitySet::new();

        let targets: Vec<&mut dyn CapabilityTarget> = vec![&mut ctx, &mut req];
        let out = i18n
            .handle(&request, targets, |scope| async move {
                scope.translate("Hello", vec![])
            })
            .await;

        assert_eq!(out, "Bonjour");
        assert_eq!(ctx.translator("__").unwrap().translate("Hello", vec![]), "Bonjour");
        assert_eq!(req.locale("locale").unwrap().tag(), "fr");
    }

    #[test]
    fn test_builder_rejects_unknown_locale() {
        let result = I18n::builder(I18nConfig::new().with_supported(["en-US", "zz-ZZ"])).build();
        assert!(result.is_err());
    }
}
