//! URL composition.
//!
//! Joins a base URL, a path suffix and query items into one URL. The path is
//! appended verbatim; query items are appended after any query the base
//! already carries, preserving order.

use crate::error::{Result, UrlManagerError};
use url::Url;

/// Incremental URL builder.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: String,
    path: String,
    query: Vec<(String, String)>,
}

impl UrlBuilder {
    /// Start from a base URL string. Parsing is deferred to [`build`](Self::build).
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            path: String::new(),
            query: Vec::new(),
        }
    }

    /// Start from an already parsed URL.
    pub fn from_url(base: &Url) -> Self {
        Self::new(base.as_str())
    }

    /// Append a path suffix.
    pub fn adding_path(mut self, path: &str) -> Self {
        self.path.push_str(path);
        self
    }

    /// Append query items.
    pub fn adding_query<I, K, V>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(items.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Resolve into a URL. Fails when the base does not parse or has no authority.
    pub fn build(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base)?;
        if url.cannot_be_a_base() || !url.has_host() {
            return Err(UrlManagerError::InvalidUrl(format!(
                "base URL has no authority: {}",
                self.base
            )));
        }

        if !self.path.is_empty() {
            // The url crate reports an empty base path as "/".
            let joined = if url.path() == "/" && self.path.starts_with('/') {
                self.path.clone()
            } else {
                format!("{}{}", url.path(), self.path)
            };
            url.set_path(&joined);
        }

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }

        Ok(url)
    }
}

/// One-shot composition of base, path and query.
pub fn compose(base: &str, path: &str, query: &[(String, String)]) -> Result<Url> {
    UrlBuilder::new(base)
        .adding_path(path)
        .adding_query(query.iter().cloned())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build() {
        let u = UrlBuilder::new("https://api.com").adding_path("/v1").build().unwrap();
        assert_eq!(u.as_str(), "https://api.com/v1");
    }

    #[test]
    fn path_is_appended_to_existing_base_path() {
        let u = compose("https://api.com/api", "/v1/items", &[]).unwrap();
        assert_eq!(u.as_str(), "https://api.com/api/v1/items");
    }

    #[test]
    fn path_segments_accumulate_in_order() {
        let u = UrlBuilder::new("https://api.com")
            .adding_path("/v1")
            .adding_path("/users/42")
            .build()
            .unwrap();
        assert_eq!(u.path(), "/v1/users/42");
    }

    #[test]
    fn query_items_follow_base_query() {
        let u = UrlBuilder::new("https://api.com/search?a=1&b=2")
            .adding_query([("k", "v"), ("a", "3")])
            .build()
            .unwrap();
        assert_eq!(u.query(), Some("a=1&b=2&k=v&a=3"));
    }

    #[test]
    fn query_values_are_encoded() {
        let u = compose(
            "https://api.com",
            "/q",
            &[("term".to_string(), "a b&c".to_string())],
        )
        .unwrap();
        assert_eq!(u.as_str(), "https://api.com/q?term=a+b%26c");
    }

    #[test]
    fn no_query_means_no_question_mark() {
        let u = compose("https://api.com", "/v1", &[]).unwrap();
        assert!(u.query().is_none());
    }

    #[test]
    fn malformed_base_is_invalid_url() {
        let err = UrlBuilder::new("not a url").build().unwrap_err();
        assert!(matches!(err, UrlManagerError::InvalidUrl(_)));
    }

    #[test]
    fn base_without_authority_is_invalid_url() {
        let err = UrlBuilder::new("mailto:someone@example.com")
            .adding_path("/x")
            .build()
            .unwrap_err();
        assert!(matches!(err, UrlManagerError::InvalidUrl(_)));
    }
}
