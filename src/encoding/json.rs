//! JSON codec.
//!
//! Rust types use snake_case field names. The codec rewrites object keys so
//! the wire can use a different convention. Timestamps are left to the
//! caller's serde impls; `chrono`'s `DateTime<Utc>` round-trips as RFC 3339.

use crate::error::{Result, UrlManagerError};
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Key naming convention used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyCase {
    /// Keys are sent and read as-is.
    Preserve,
    /// `snake_case` keys.
    #[default]
    Snake,
    /// `camelCase` keys.
    Camel,
}

/// JSON encoder/decoder with configurable wire key case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonCodec {
    pub wire_keys: KeyCase,
    /// Pretty-print encoded output.
    pub pretty: bool,
}

impl JsonCodec {
    pub const fn new(wire_keys: KeyCase) -> Self {
        Self {
            wire_keys,
            pretty: false,
        }
    }

    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Serialize `value`, rewriting keys to the wire case.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes> {
        let mut json =
            serde_json::to_value(value).map_err(|e| UrlManagerError::EncodingError(e.to_string()))?;
        match self.wire_keys {
            KeyCase::Preserve => {}
            KeyCase::Snake => rename_keys(&mut json, &to_snake_case),
            KeyCase::Camel => rename_keys(&mut json, &to_camel_case),
        }
        let out = if self.pretty {
            serde_json::to_vec_pretty(&json)
        } else {
            serde_json::to_vec(&json)
        }
        .map_err(|e| UrlManagerError::EncodingError(e.to_string()))?;
        Ok(Bytes::from(out))
    }

    /// Parse `bytes` into `T`, rewriting wire keys to snake_case first.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        if bytes.is_empty() {
            return Err(UrlManagerError::DecodingError(
                "response body is empty".to_string(),
            ));
        }
        let mut json: Value = serde_json::from_slice(bytes)?;
        if self.wire_keys != KeyCase::Preserve {
            rename_keys(&mut json, &to_snake_case);
        }
        Ok(serde_json::from_value(json)?)
    }
}

fn rename_keys(value: &mut Value, convert: &dyn Fn(&str) -> String) {
    match value {
        Value::Object(map) => {
            let old = std::mem::take(map);
            let mut renamed = Map::with_capacity(old.len());
            for (key, mut inner) in old {
                rename_keys(&mut inner, convert);
                renamed.insert(convert(&key), inner);
            }
            *map = renamed;
        }
        Value::Array(items) => {
            for item in items {
                rename_keys(item, convert);
            }
        }
        _ => {}
    }
}

/// `userId` -> `user_id`, `HTTPStatus` -> `http_status`.
pub fn to_snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p == '_' => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `user_id` -> `userId`. Leading underscores are kept.
pub fn to_camel_case(key: &str) -> String {
    let trimmed = key.trim_start_matches('_');
    let mut out = String::with_capacity(key.len());
    out.push_str(&key[..key.len() - trimmed.len()]);
    let mut upper_next = false;
    for c in trimmed.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Account {
        user_id: u32,
        display_name: String,
        created_at: DateTime<Utc>,
    }

    fn account() -> Account {
        Account {
            user_id: 7,
            display_name: "Ada".into(),
            created_at: Utc.with_ymd_and_hms(2025, 4, 26, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn key_case_conversions() {
        assert_eq!(to_snake_case("userId"), "user_id");
        assert_eq!(to_snake_case("HTTPStatus"), "http_status");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("item2Count"), "item2_count");
        assert_eq!(to_camel_case("user_id"), "userId");
        assert_eq!(to_camel_case("_private_key"), "_privateKey");
        assert_eq!(to_camel_case("plain"), "plain");
    }

    #[test]
    fn snake_wire_round_trip_with_iso8601_dates() {
        let codec = JsonCodec::default();
        let bytes = codec.encode(&account()).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains("\"created_at\":\"2025-04-26T12:30:00Z\""));
        let back: Account = codec.decode(&bytes).unwrap();
        assert_eq!(back, account());
    }

    #[test]
    fn camel_wire_keys() {
        let codec = JsonCodec::new(KeyCase::Camel);
        let bytes = codec.encode(&account()).unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["userId"], 7);
        assert_eq!(json["displayName"], "Ada");

        let wire = br#"{"userId":9,"displayName":"Bo","createdAt":"2024-01-02T03:04:05Z"}"#;
        let decoded: Account = codec.decode(wire).unwrap();
        assert_eq!(decoded.user_id, 9);
        assert_eq!(decoded.display_name, "Bo");
    }

    #[test]
    fn nested_objects_and_arrays_are_renamed() {
        let codec = JsonCodec::new(KeyCase::Camel);
        let bytes = codec
            .encode(&serde_json::json!({"outer_key": [{"inner_key": 1}]}))
            .unwrap();
        assert_eq!(&bytes[..], br#"{"outerKey":[{"innerKey":1}]}"#);
    }

    #[test]
    fn decode_errors() {
        let codec = JsonCodec::default();
        let empty = codec.decode::<Account>(b"").unwrap_err();
        assert!(matches!(empty, UrlManagerError::DecodingError(_)));
        let shape = codec.decode::<Account>(br#"{"user_id":"x"}"#).unwrap_err();
        assert!(matches!(shape, UrlManagerError::DecodingError(_)));
    }
}
