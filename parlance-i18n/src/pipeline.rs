//! Phrase resolution pipeline.
//!
//! A [`MiddlewareStack`] holds at most one active [`Pipeline`]. Installing a
//! pipeline replaces the previous one. Resolving with nothing installed
//! installs the [`DefaultParser`] first.

use crate::phrase::{Arg, PhraseContext, PhraseRequest};
use crate::plural_category;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::{Captures, Regex};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// One step of a pipeline.
///
/// Parsers run synchronously and in order, each seeing what earlier ones
/// wrote to the context.
pub trait Parser: Send + Sync {
    fn parse(&self, ctx: &mut PhraseContext<'_>);
}

impl<F> Parser for F
where
    F: Fn(&mut PhraseContext<'_>) + Send + Sync,
{
    fn parse(&self, ctx: &mut PhraseContext<'_>) {
        self(ctx)
    }
}

/// An ordered list of parsers.
#[derive(Clone, Default)]
pub struct Pipeline {
    parsers: Vec<Arc<dyn Parser>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in pipeline: just the [`DefaultParser`].
    pub fn standard() -> Self {
        Self::new().with(DefaultParser)
    }

    pub fn with<P: Parser + 'static>(mut self, parser: P) -> Self {
        self.push(parser);
        self
    }

    pub fn push<P: Parser + 'static>(&mut self, parser: P) {
        self.parsers.push(Arc::new(parser));
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Run every parser against `ctx`.
    pub fn run(&self, ctx: &mut PhraseContext<'_>) {
        for (index, parser) in self.parsers.iter().enumerate() {
            trace!(parser_index = index, phrase = %ctx.request.phrase, "Running parser");
            parser.parse(ctx);
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("parsers", &self.parsers.len())
            .finish()
    }
}

/// Holder of the single active pipeline.
#[derive(Debug, Default)]
pub struct MiddlewareStack {
    active: RwLock<Option<Arc<Pipeline>>>,
}

impl MiddlewareStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `pipeline`, discarding whatever was active.
    pub fn install(&self, pipeline: Pipeline) {
        let replaced = self.active.write().replace(Arc::new(pipeline)).is_some();
        trace!(replaced, "Installed phrase pipeline");
    }

    /// Install a single parser as the whole pipeline.
    pub fn install_parser<P: Parser + 'static>(&self, parser: P) {
        self.install(Pipeline::new().with(parser));
    }

    pub fn is_active(&self) -> bool {
        self.active.read().is_some()
    }

    /// The active pipeline, installing the standard one if none is.
    pub fn active(&self) -> Arc<Pipeline> {
        let current = self.active.read().clone();
        match current {
            Some(pipeline) => pipeline,
            None => self
                .active
                .write()
                .get_or_insert_with(|| Arc::new(Pipeline::standard()))
                .clone(),
        }
    }

    /// Run the active pipeline and return the accumulated result.
    pub fn resolve(&self, mut ctx: PhraseContext<'_>) -> String {
        self.active().run(&mut ctx);
        ctx.result
    }
}

// ============================================================================
// Default Parser
// ============================================================================

/// Table lookup, plural selection and interpolation.
///
/// Lookup order is the structured section, the route section (when the
/// `router` option is on), the universe section, then the table root. A
/// missing key leaves the phrase text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParser;

impl Parser for DefaultParser {
    fn parse(&self, ctx: &mut PhraseContext<'_>) {
        let key = ctx.request.phrase.text();
        let keywords = ctx.settings.keywords();

        let mut sections: Vec<&str> = Vec::with_capacity(3);
        if let Some(section) = ctx.request.phrase.section() {
            sections.push(section);
        }
        if ctx.settings.config().router {
            sections.push(ctx.route.dot());
        }
        sections.push(&keywords.universe);

        let Some(entry) = ctx.table.lookup(key, &sections) else {
            trace!(key = %key, locale = %ctx.locale, "Phrase not found");
            ctx.result = key.to_string();
            return;
        };

        let count = ctx.request.count();
        let category = count
            .filter(|_| entry.has_plural())
            .map(|n| plural_category(n, ctx.locale));
        let template = entry.select(category).unwrap_or(key);

        ctx.result = interpolate(template, &ctx.request, count);
    }
}

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%%|%[sd]|\{\{\s*(\w+)\s*\}\}|\{(\w+)\}").unwrap());

/// Substitute arguments into `template`.
///
/// `%s` and `%d` consume positional arguments in order, `{0}` indexes them,
/// `{name}` and `{{name}}` read named arguments. `count` and `n` fall back to
/// the plural count. Placeholders without a value are left as written.
pub fn interpolate(template: &str, request: &PhraseRequest, count: Option<f64>) -> String {
    if !template.contains(['%', '{']) {
        return template.to_string();
    }

    let positional: Vec<&Arg> = request.positional().collect();
    let mut next = 0;

    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let whole = &caps[0];
            if whole == "%%" {
                return "%".to_string();
            }
            if whole.starts_with('%') {
                let value = positional.get(next).map(ToString::to_string);
                next += 1;
                return value.unwrap_or_else(|| whole.to_string());
            }

            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();

            let value = match name.parse::<usize>() {
                Ok(index) => positional.get(index).map(ToString::to_string),
                Err(_) => request.named(name).map(str::to_string).or_else(|| match name {
                    "count" | "n" => count.map(|n| n.to_string()),
                    _ => None,
                }),
            };
            value.unwrap_or_else(|| whole.to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Locale, PhraseTable, Phrase, Route, Settings};
    use parlance_config::I18nConfig;

    fn settings(router: bool) -> Settings {
        Settings::standard(
            I18nConfig::new()
                .with_supported(["en-US", "fr", "ru"])
                .with_router(router),
        )
        .unwrap()
    }

    fn table() -> PhraseTable {
        PhraseTable::from_json(
            r#"{
                "Hello": "Hello, {name}!",
                "apple": { "translated": "one apple", "plural": "%d apples" },
                "file": { "plural": { "one": "{n} file", "few": "{n} files (few)", "other": "{n} files" } },
                "title": "Site",
                "global": { "Welcome": "Welcome" },
                "about": { "title": "About us" }
            }"#,
            &Default::default(),
        )
        .unwrap()
    }

    fn run(phrase: impl Into<Phrase>, args: Vec<Arg>, locale: &str, path: &str, router: bool) -> String {
        let settings = settings(router);
        let locale = Locale::parse(locale).unwrap();
        let route = crate::RouteSegmenter::new(crate::LocaleRegistry::standard())
            .segment_with(path, &settings);
        let table = table();
        let mut ctx = PhraseContext::new(PhraseRequest::new(phrase, args), &locale, &route, &table, &settings);
        DefaultParser.parse(&mut ctx);
        ctx.result
    }

    #[test]
    fn test_interpolation_forms() {
        let request = PhraseRequest::new(
            "x",
            vec!["Ada".into(), 3.into(), Arg::named([("city", "Paris")])],
        );
        assert_eq!(interpolate("%s has %d", &request, None), "Ada has 3");
        assert_eq!(interpolate("{1} / {0}", &request, None), "3 / Ada");
        assert_eq!(interpolate("{city} and {{ city }}", &request, None), "Paris and Paris");
        assert_eq!(interpolate("100%% {missing} %s %s %s", &request, None), "100% {missing} Ada 3 %s");
        assert_eq!(interpolate("{n} left", &request, Some(2.0)), "2 left");
    }

    #[test]
    fn test_unknown_key_unchanged() {
        assert_eq!(run("No such %s {key}", vec!["x".into()], "en-US", "/", false), "No such %s {key}");
    }

    #[test]
    fn test_named_args() {
        let out = run("Hello", vec![Arg::named([("name", "Ada")])], "en-US", "/", false);
        assert_eq!(out, "Hello, Ada!");
    }

    #[test]
    fn test_plural_keywords() {
        assert_eq!(run("apple", vec![1.into()], "en-US", "/", false), "one apple");
        assert_eq!(run("apple", vec![4.into()], "en-US", "/", false), "4 apples");
        assert_eq!(run("apple", vec![], "en-US", "/", false), "one apple");
    }

    #[test]
    fn test_plural_categories_by_locale() {
        assert_eq!(run("file", vec![3.into()], "ru", "/", false), "3 files (few)");
        assert_eq!(run("file", vec![3.into()], "en-US", "/", false), "3 files");
        assert_eq!(run("file", vec![0.into()], "fr", "/", false), "0 file");
    }

    #[test]
    fn test_router_sections() {
        assert_eq!(run("title", vec![], "en-US", "/about", true), "About us");
        assert_eq!(run("title", vec![], "en-US", "/about", false), "Site");
        assert_eq!(run("title", vec![], "en-US", "/contact", true), "Site");
        assert_eq!(
            run(Phrase::from("title").with_section("about"), vec![], "en-US", "/", false),
            "About us"
        );
    }

    #[test]
    fn test_universe_section() {
        assert_eq!(run("Welcome", vec![], "en-US", "/", false), "Welcome");
    }

    #[test]
    fn test_stack_installs_default() {
        let stack = MiddlewareStack::new();
        assert!(!stack.is_active());
        assert_eq!(stack.active().len(), 1);
        assert!(stack.is_active());
    }

    #[test]
    fn test_stack_replaces() {
        let settings = settings(false);
        let locale = Locale::parse("en-US").unwrap();
        let route = Route::index();
        let table = PhraseTable::new();

        let stack = MiddlewareStack::new();
        stack.install_parser(|ctx: &mut PhraseContext<'_>| ctx.result = "A".to_string());
        stack.install_parser(|ctx: &mut PhraseContext<'_>| ctx.result.push('B'));

        let ctx = PhraseContext::new(PhraseRequest::new("key", vec![]), &locale, &route, &table, &settings);
        assert_eq!(stack.resolve(ctx), "keyB");
    }

    #[test]
    fn test_pipeline_order() {
        let settings = settings(false);
        let locale = Locale::parse("en-US").unwrap();
        let route = Route::index();
        let table = PhraseTable::new().with("key", "value");

        let pipeline = Pipeline::standard()
            .with(|ctx: &mut PhraseContext<'_>| ctx.result = ctx.result.to_uppercase());

        let stack = MiddlewareStack::new();
        stack.install(pipeline);

        let ctx = PhraseContext::new(PhraseRequest::new("key", vec![]), &locale, &route, &table, &settings);
        assert_eq!(stack.resolve(ctx), "VALUE");
    }
}
