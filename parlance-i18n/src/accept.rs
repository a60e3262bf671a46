//! Locale negotiation across ordered candidate sources.
//!
//! Sources are consulted in the configured detection order. The first one
//! that yields a supported locale wins; when none does, the default locale is
//! used. Negotiation never fails.

use crate::{Locale, LocaleRegistry, RequestView, Settings};
use parlance_config::DetectSource;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Header carrying weighted language preferences.
pub const ACCEPT_LANGUAGE: &str = "accept-language";

/// A raw locale preference read from one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub source: DetectSource,
    pub raw: Option<String>,
}

impl Candidate {
    pub fn new(source: DetectSource, raw: Option<impl Into<String>>) -> Self {
        Self {
            source,
            raw: raw.map(Into::into),
        }
    }
}

/// Outcome of negotiation for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NegotiationResult {
    pub locale: Locale,
    /// Source that produced the locale; `None` when the default was used.
    pub source: Option<DetectSource>,
}

/// Read every configured source from a request, in detection order.
pub fn collect_candidates(request: &dyn RequestView, settings: &Settings) -> Vec<Candidate> {
    let config = settings.config();

    settings
        .detect()
        .iter()
        .map(|&source| {
            let raw = match source {
                DetectSource::Query => request.query(&config.query_name),
                DetectSource::Cookie => request.cookie(&config.cookie_name),
                DetectSource::Header => request.header(ACCEPT_LANGUAGE),
                DetectSource::Path => Some(request.path()),
            };
            Candidate::new(source, raw)
        })
        .collect()
}

// ============================================================================
// Accept-Language Parsing
// ============================================================================

/// One `tag;q=value` entry of an Accept-Language header.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedTag {
    pub tag: String,
    pub quality: f32,
}

/// Parse an Accept-Language header.
///
/// Entries come back sorted by quality, highest first, keeping header order
/// among equal qualities. A missing or unparsable `q` counts as 1.0 and
/// values are clamped to `[0, 1]`. Empty tags, the `*` wildcard and `q=0`
/// entries are dropped.
///
/// # Example
///
/// ```
/// use parlance_i18n::parse_accept_language;
///
/// let tags = parse_accept_language("en-US;q=0.5, fr;q=0.9, de");
/// let order: Vec<&str> = tags.iter().map(|t| t.tag.as_str()).collect();
/// assert_eq!(order, vec!["de", "fr", "en-US"]);
/// ```
pub fn parse_accept_language(header: &str) -> Vec<QualifiedTag> {
    let mut entries: Vec<QualifiedTag> = header
        .split(',')
        .filter_map(|part| {
            let mut params = part.split(';').map(str::trim);
            let tag = params.next().filter(|t| !t.is_empty() && *t != "*")?;

            let quality = params
                .find_map(|p| p.strip_prefix("q=").or_else(|| p.strip_prefix("Q=")))
                .map(|q| q.trim().parse::<f32>().unwrap_or(1.0))
                .filter(|q| q.is_finite())
                .unwrap_or(1.0)
                .clamp(0.0, 1.0);

            if quality <= 0.0 {
                trace!(tag = %tag, "Dropping Accept-Language entry with q=0");
                return None;
            }

            Some(QualifiedTag {
                tag: tag.to_string(),
                quality,
            })
        })
        .collect();

    // sort_by is stable: equal qualities keep header order
    entries.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));
    entries
}

// ============================================================================
// Resolver
// ============================================================================

/// Picks one supported locale from a request's candidates.
#[derive(Debug, Clone, Copy)]
pub struct AcceptResolver<'r> {
    registry: &'r LocaleRegistry,
}

impl<'r> AcceptResolver<'r> {
    pub fn new(registry: &'r LocaleRegistry) -> Self {
        Self { registry }
    }

    /// Negotiate a locale.
    ///
    /// Candidates are visited in the order given; callers build them in
    /// detection order with [`collect_candidates`].
    pub fn negotiate(&self, settings: &Settings, candidates: &[Candidate]) -> NegotiationResult {
        for candidate in candidates {
            let Some(raw) = candidate.raw.as_deref() else {
                continue;
            };

            let found = match candidate.source {
                DetectSource::Query | DetectSource::Cookie => self.direct(settings, raw),
                DetectSource::Header => self.weighted(settings, raw),
                DetectSource::Path => self.first_segment(settings, raw),
            };

            match found {
                Some(locale) => {
                    debug!(
                        locale = %locale,
                        source = %candidate.source,
                        "Negotiated locale"
                    );
                    return NegotiationResult {
                        locale: locale.clone(),
                        source: Some(candidate.source),
                    };
                }
                None => trace!(source = %candidate.source, raw = %raw, "Candidate not supported"),
            }
        }

        debug!(locale = %settings.default_locale(), "No supported candidate, using default locale");
        NegotiationResult {
            locale: settings.default_locale().clone(),
            source: None,
        }
    }

    /// Negotiate straight from a request.
    pub fn negotiate_request(
        &self,
        settings: &Settings,
        request: &dyn RequestView,
    ) -> NegotiationResult {
        self.negotiate(settings, &collect_candidates(request, settings))
    }

    fn direct<'s>(&self, settings: &'s Settings, raw: &str) -> Option<&'s Locale> {
        settings.supported_match(self.registry, raw)
    }

    fn weighted<'s>(&self, settings: &'s Settings, header: &str) -> Option<&'s Locale> {
        parse_accept_language(header)
            .iter()
            .find_map(|entry| settings.supported_match(self.registry, &entry.tag))
    }

    fn first_segment<'s>(&self, settings: &'s Settings, path: &str) -> Option<&'s Locale> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segment = path.split('/').find(|s| !s.is_empty())?;
        settings.supported_match(self.registry, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimpleRequest;
    use parlance_config::I18nConfig;

    fn settings(supported: &[&str], detect: &[DetectSource]) -> Settings {
        let config = I18nConfig::new()
            .with_supported(supported.iter().copied())
            .with_default(supported[0])
            .with_detect(detect.iter().copied());
        Settings::standard(config).unwrap()
    }

    fn resolver() -> AcceptResolver<'static> {
        AcceptResolver::new(LocaleRegistry::standard())
    }

    #[test]
    fn test_parse_accept_language() {
        let tags = parse_accept_language("en-US,en;q=0.9,fr;q=0.8");
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].tag, "en-US");
        assert_eq!(tags[1].tag, "en");
        assert_eq!(tags[2].tag, "fr");
        assert!((tags[1].quality - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_accept_language_stable_ties() {
        let tags = parse_accept_language("de;q=0.5, ja, fr;q=0.5, ko");
        let order: Vec<&str> = tags.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(order, vec!["ja", "ko", "de", "fr"]);
    }

    #[test]
    fn test_parse_accept_language_malformed() {
        let tags = parse_accept_language(" , *;q=0.1, fr;q=abc, ;q=0.4, de;q=0, it;q=7");
        let order: Vec<(&str, f32)> = tags.iter().map(|t| (t.tag.as_str(), t.quality)).collect();
        assert_eq!(order, vec![("fr", 1.0), ("it", 1.0)]);
    }

    #[test]
    fn test_header_quality_wins() {
        let settings = settings(&["en-US", "fr"], &[DetectSource::Header]);
        let candidates = vec![Candidate::new(DetectSource::Header, Some("en-US;q=0.5,fr;q=0.9"))];

        let result = resolver().negotiate(&settings, &candidates);
        assert_eq!(result.locale.tag(), "fr");
        assert_eq!(result.source, Some(DetectSource::Header));
    }

    #[test]
    fn test_header_skips_unsupported() {
        let settings = settings(&["en-US", "ja"], &[DetectSource::Header]);
        let candidates = vec![Candidate::new(DetectSource::Header, Some("de, xx-ZZ;q=0.9, ja_JP;q=0.2, ja;q=0.1"))];

        let result = resolver().negotiate(&settings, &candidates);
        assert_eq!(result.locale.tag(), "ja");
    }

    #[test]
    fn test_header_region_does_not_match_language() {
        let settings = settings(&["en-US", "de"], &[DetectSource::Header]);
        let candidates = vec![Candidate::new(DetectSource::Header, Some("de-CH"))];

        let result = resolver().negotiate(&settings, &candidates);
        assert_eq!(result.locale.tag(), "en-US");
        assert_eq!(result.source, None);
    }

    #[test]
    fn test_every_supported_tag_negotiates_from_header() {
        let tags = ["en-US", "fr", "de-DE", "ja", "zh-TW", "pt-BR"];
        let settings = settings(&tags, &[DetectSource::Header]);

        for tag in tags {
            let candidates = vec![Candidate::new(DetectSource::Header, Some(format!("{};q=1", tag)))];
            let result = resolver().negotiate(&settings, &candidates);
            assert_eq!(result.locale.tag(), tag);
        }
    }

    #[test]
    fn test_detect_order_priority() {
        let settings = settings(
            &["en-US", "fr", "de"],
            &[DetectSource::Cookie, DetectSource::Query, DetectSource::Header],
        );
        let request = SimpleRequest::new("/?locale=de")
            .with_cookie("locale", "fr")
            .with_header("Accept-Language", "en-US");

        let result = resolver().negotiate_request(&settings, &request);
        assert_eq!(result.locale.tag(), "fr");
        assert_eq!(result.source, Some(DetectSource::Cookie));
    }

    #[test]
    fn test_encoded_query_value() {
        let settings = settings(&["en-US", "zh-TW"], &[DetectSource::Query]);
        let result = resolver().negotiate_request(&settings, &SimpleRequest::new("/?locale=zh%2DTW"));
        assert_eq!(result.locale.tag(), "zh-TW");
        assert_eq!(result.source, Some(DetectSource::Query));
    }

    #[test]
    fn test_unsupported_source_falls_through() {
        let settings = settings(&["en-US", "fr"], &DetectSource::all());
        let request = SimpleRequest::new("/?locale=klingon")
            .with_cookie("locale", "de")
            .with_header("Accept-Language", "fr");

        let result = resolver().negotiate_request(&settings, &request);
        assert_eq!(result.locale.tag(), "fr");
        assert_eq!(result.source, Some(DetectSource::Header));
    }

    #[test]
    fn test_path_first_segment() {
        let settings = settings(&["en-US", "fr"], &[DetectSource::Path]);

        let result = resolver().negotiate_request(&settings, &SimpleRequest::new("/fr/about"));
        assert_eq!(result.locale.tag(), "fr");
        assert_eq!(result.source, Some(DetectSource::Path));

        // Only the first segment is a detection channel
        let result = resolver().negotiate_request(&settings, &SimpleRequest::new("/about/fr"));
        assert_eq!(result.source, None);
    }

    #[test]
    fn test_default_fallback() {
        let settings = settings(&["en-US", "fr"], &DetectSource::all());
        let result = resolver().negotiate_request(&settings, &SimpleRequest::new("/"));

        assert_eq!(result.locale.tag(), "en-US");
        assert_eq!(result.source, None);
    }

    #[test]
    fn test_sources_not_in_detect_are_ignored() {
        let settings = settings(&["en-US", "fr"], &[DetectSource::Header]);
        let request = SimpleRequest::new("/fr?locale=fr").with_cookie("locale", "fr");

        let result = resolver().negotiate_request(&settings, &request);
        assert_eq!(result.locale.tag(), "en-US");
    }
}
