//! Framework adapter seam.
//!
//! The negotiation core never touches a server framework's request type.
//! Adapters implement [`RequestView`] to hand over the raw values a locale
//! may be read from.

use std::collections::HashMap;
use url::form_urlencoded;

/// Read-only view of the parts of an incoming request used for detection.
pub trait RequestView {
    /// Request path without query string (e.g. `/fr/about`).
    fn path(&self) -> &str;

    /// A query parameter value.
    fn query(&self, name: &str) -> Option<&str>;

    /// A cookie value.
    fn cookie(&self, name: &str) -> Option<&str>;

    /// A header value; names are matched case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;
}

/// Plain request value for hosts without their own request type, and for tests.
#[derive(Debug, Clone, Default)]
pub struct SimpleRequest {
    path: String,
    query: HashMap<String, String>,
    headers: HashMap<String, String>,
}

impl SimpleRequest {
    /// Create from a request target such as `/about?locale=fr`.
    ///
    /// Query names and values are percent-decoded; the path is kept as given.
    pub fn new(target: &str) -> Self {
        let target = target.split('#').next().unwrap_or_default();
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };

        let query = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Self {
            path: path.to_string(),
            query,
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Append a cookie to the `Cookie` header.
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        let pair = format!("{}={}", name, value);
        self.headers
            .entry("cookie".to_string())
            .and_modify(|c| {
                c.push_str("; ");
                c.push_str(&pair);
            })
            .or_insert(pair);
        self
    }
}

impl RequestView for SimpleRequest {
    fn path(&self) -> &str {
        &self.path
    }

    fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.header("cookie")?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| k.trim() == name)
            .map(|(_, v)| v.trim().trim_matches('"'))
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }
}
