//! Phrase requests and the per-request resolution context.

use crate::{Locale, PhraseTable, Route, Settings};
use std::collections::BTreeMap;
use std::fmt;

/// What to translate: a bare key or a key with a count and section.
#[derive(Debug, Clone, PartialEq)]
pub enum Phrase {
    Text(String),
    Structured {
        phrase: String,
        count: Option<f64>,
        section: Option<String>,
    },
}

impl Phrase {
    pub fn structured(phrase: impl Into<String>) -> Self {
        Phrase::Structured {
            phrase: phrase.into(),
            count: None,
            section: None,
        }
    }

    pub fn with_count(self, n: impl Into<f64>) -> Self {
        match self {
            Phrase::Text(phrase) => Phrase::Structured {
                phrase,
                count: Some(n.into()),
                section: None,
            },
            Phrase::Structured { phrase, section, .. } => Phrase::Structured {
                phrase,
                count: Some(n.into()),
                section,
            },
        }
    }

    pub fn with_section(self, section: impl Into<String>) -> Self {
        match self {
            Phrase::Text(phrase) => Phrase::Structured {
                phrase,
                count: None,
                section: Some(section.into()),
            },
            Phrase::Structured { phrase, count, .. } => Phrase::Structured {
                phrase,
                count,
                section: Some(section.into()),
            },
        }
    }

    /// The lookup key.
    pub fn text(&self) -> &str {
        match self {
            Phrase::Text(text) => text,
            Phrase::Structured { phrase, .. } => phrase,
        }
    }

    pub fn count(&self) -> Option<f64> {
        match self {
            Phrase::Text(_) => None,
            Phrase::Structured { count, .. } => *count,
        }
    }

    pub fn section(&self) -> Option<&str> {
        match self {
            Phrase::Text(_) => None,
            Phrase::Structured { section, .. } => section.as_deref(),
        }
    }
}

impl From<&str> for Phrase {
    fn from(text: &str) -> Self {
        Phrase::Text(text.to_string())
    }
}

impl From<String> for Phrase {
    fn from(text: String) -> Self {
        Phrase::Text(text)
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// One extra argument of a translate call.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Str(String),
    Num(f64),
    Named(BTreeMap<String, String>),
}

impl Arg {
    /// A map of named values.
    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        Arg::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Arg::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Arg::Named(_))
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => f.write_str(s),
            Arg::Num(n) => write!(f, "{}", n),
            Arg::Named(map) => {
                let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                f.write_str(&pairs.join(", "))
            }
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Str(s)
    }
}

macro_rules! numeric_arg {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Arg {
                fn from(n: $t) -> Self {
                    Arg::Num(n as f64)
                }
            }
        )*
    };
}

numeric_arg!(i32, i64, u32, u64, usize, f32, f64);

/// A single translate call.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseRequest {
    pub phrase: Phrase,
    pub args: Vec<Arg>,
    pub arg_count: usize,
}

impl PhraseRequest {
    pub fn new(phrase: impl Into<Phrase>, args: Vec<Arg>) -> Self {
        let arg_count = args.len();
        Self {
            phrase: phrase.into(),
            args,
            arg_count,
        }
    }

    /// Positional (non-named) arguments in call order.
    pub fn positional(&self) -> impl Iterator<Item = &Arg> {
        self.args.iter().filter(|a| !a.is_named())
    }

    /// A named value; the last map that defines `name` wins.
    pub fn named(&self, name: &str) -> Option<&str> {
        self.args.iter().rev().find_map(|arg| match arg {
            Arg::Named(map) => map.get(name).map(String::as_str),
            _ => None,
        })
    }

    /// The count driving plural selection.
    ///
    /// A structured count wins, then a named `count` or `n`, then the first
    /// numeric positional argument.
    pub fn count(&self) -> Option<f64> {
        self.phrase
            .count()
            .or_else(|| {
                ["count", "n"]
                    .iter()
                    .find_map(|name| self.named(name)?.trim().parse::<f64>().ok())
            })
            .or_else(|| self.positional().find_map(Arg::as_number))
    }
}

/// Per-request state shared by the parsers of one resolution.
///
/// `result` starts as the phrase text, so a pipeline that finds nothing
/// leaves the key itself as the output.
pub struct PhraseContext<'a> {
    pub request: PhraseRequest,
    pub locale: &'a Locale,
    pub route: &'a Route,
    pub table: &'a PhraseTable,
    pub settings: &'a Settings,
    pub result: String,
}

impl<'a> PhraseContext<'a> {
    pub fn new(
        request: PhraseRequest,
        locale: &'a Locale,
        route: &'a Route,
        table: &'a PhraseTable,
        settings: &'a Settings,
    ) -> Self {
        let result = request.phrase.text().to_string();
        Self {
            request,
            locale,
            route,
            table,
            settings,
            result,
        }
    }
}

impl fmt::Debug for PhraseContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhraseContext")
            .field("request", &self.request)
            .field("locale", self.locale)
            .field("route", &self.route.dot())
            .field("phrases", &self.table.len())
            .field("result", &self.result)
            .finish()
    }
}
