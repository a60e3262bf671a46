//! Locale-stripped route segments.
//!
//! A request path is split on `/`, the first token naming a supported locale
//! is removed, and literal dots inside the remaining tokens are escaped to
//! `*` so the dot-joined form stays unambiguous:
//!
//! | path                  | segments          | dot          |
//! |-----------------------|-------------------|--------------|
//! | `/`                   | `["index"]`       | `index`      |
//! | `/hello/world`        | `["hello","world"]` | `hello.world` |
//! | `/api/v1.0/en-us`     | `["api","v1*0"]`  | `api.v1*0`   |

use crate::{Locale, LocaleRegistry, Settings};
use serde::Serialize;
use tracing::trace;

/// Canonical name of the empty route.
pub const INDEX: &str = "index";

/// Replacement for literal `.` inside a segment.
pub const DOT_ESCAPE: char = '*';

/// Route of a request with the locale token removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    segments: Vec<String>,
    dot: String,
    #[serde(skip)]
    stripped: Option<Locale>,
}

impl Route {
    /// The empty route.
    pub fn index() -> Self {
        Self {
            segments: vec![INDEX.to_string()],
            dot: INDEX.to_string(),
            stripped: None,
        }
    }

    /// Escaped segments, `["index"]` for the empty route.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Escaped segments joined with `.`.
    pub fn dot(&self) -> &str {
        &self.dot
    }

    pub fn is_index(&self) -> bool {
        self.dot == INDEX
    }

    /// Locale whose token was removed from the path, if any.
    pub fn stripped(&self) -> Option<&Locale> {
        self.stripped.as_ref()
    }

    pub fn into_segments(self) -> Vec<String> {
        self.segments
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::index()
    }
}

/// Escape literal dots in one segment.
pub fn escape_segment(segment: &str) -> String {
    segment.replace('.', &DOT_ESCAPE.to_string())
}

/// Derives [`Route`]s from request paths.
#[derive(Debug, Clone, Copy)]
pub struct RouteSegmenter<'r> {
    registry: &'r LocaleRegistry,
}

impl<'r> RouteSegmenter<'r> {
    pub fn new(registry: &'r LocaleRegistry) -> Self {
        Self { registry }
    }

    /// Segment `path`, stripping at most one supported locale token.
    ///
    /// The token may sit anywhere in the path. When several tokens name
    /// supported locales only the first one found is removed. Tokens that
    /// look like locales but are not supported stay as ordinary content.
    pub fn segment(&self, path: &str, supported: &[Locale]) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let mut tokens: Vec<&str> = path.split('/').filter(|t| !t.is_empty()).collect();

        let mut stripped = None;
        let hit = tokens.iter().enumerate().find_map(|(i, token)| {
            self.registry
                .resolve(token)
                .filter(|locale| supported.contains(locale))
                .map(|locale| (i, locale.clone()))
        });
        if let Some((i, locale)) = hit {
            trace!(token = %tokens[i], locale = %locale, "Stripping locale from route");
            tokens.remove(i);
            stripped = Some(locale);
        }

        if tokens.is_empty() {
            return Route {
                stripped,
                ..Route::index()
            };
        }

        let segments: Vec<String> = tokens.into_iter().map(escape_segment).collect();
        let dot = segments.join(".");

        Route {
            segments,
            dot,
            stripped,
        }
    }

    /// Segment against the supported locales of `settings`.
    pub fn segment_with(&self, path: &str, settings: &Settings) -> Route {
        self.segment(path, settings.supported())
    }
}
