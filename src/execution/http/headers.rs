//! HTTP Headers Utility

use crate::error::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;

/// Build a header map from string pairs.
pub fn headers_from_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        map.insert(
            HeaderName::from_bytes(name.as_bytes())?,
            HeaderValue::from_str(value)?,
        );
    }
    Ok(map)
}

/// Merge `overrides` over `base`. A name present in `overrides` replaces
/// every value `base` has for it.
pub fn merge_headers(base: &HeaderMap, overrides: &HeaderMap) -> HeaderMap {
    let mut merged = base.clone();
    for name in overrides.keys() {
        merged.remove(name);
    }
    for (name, value) in overrides {
        merged.append(name.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_base_values() {
        let mut base = HeaderMap::new();
        base.insert("accept", HeaderValue::from_static("text/plain"));
        base.insert("x-client", HeaderValue::from_static("sdk"));

        let mut overrides = HeaderMap::new();
        overrides.insert("accept", HeaderValue::from_static("application/json"));

        let merged = merge_headers(&base, &overrides);
        assert_eq!(merged.get("accept").unwrap(), "application/json");
        assert_eq!(merged.get("x-client").unwrap(), "sdk");
        assert_eq!(merged.get_all("accept").iter().count(), 1);
    }

    #[test]
    fn multi_valued_overrides_are_kept() {
        let mut overrides = HeaderMap::new();
        overrides.append("x-tag", HeaderValue::from_static("a"));
        overrides.append("x-tag", HeaderValue::from_static("b"));
        let merged = merge_headers(&HeaderMap::new(), &overrides);
        assert_eq!(merged.get_all("x-tag").iter().count(), 2);
    }

    #[test]
    fn map_conversion_rejects_invalid_names() {
        let mut raw = HashMap::new();
        raw.insert("ok".to_string(), "1".to_string());
        assert_eq!(headers_from_map(&raw).unwrap().len(), 1);
        raw.insert("not ok".to_string(), "1".to_string());
        assert!(headers_from_map(&raw).is_err());
    }
}
