//! Form payloads for POST requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::form_urlencoded;

/// MIME type sent with encoded form bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Ordered `key=value` pairs of an HTML form submission.
///
/// Parsed from the `a=1&b=2` shape callers hand in; pairs are
/// percent-decoded on parse and re-encoded on [`FormData::encode`], so a
/// payload that was already encoded round-trips unchanged. Pair order is
/// preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `&`-joined payload.
    ///
    /// A segment without `=` becomes a key with an empty value; empty
    /// segments are skipped.
    pub fn parse(raw: &str) -> Self {
        let pairs = form_urlencoded::parse(raw.trim().as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// Appends a pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Returns the decoded pairs in submission order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Returns the first value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there is nothing to submit.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encodes the pairs as an `application/x-www-form-urlencoded` body.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

impl From<String> for FormData {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for FormData {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<FormData> for String {
    fn from(form: FormData) -> Self {
        form.encode()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl fmt::Display for FormData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
