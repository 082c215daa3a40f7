//! Blob codec for persisting, exporting and importing the collection.
//!
//! The stored form and the export form share one shape: a JSON array of
//! `{id?, text, category}` objects. Reading is tolerant at item level. A
//! corrupt item is dropped, never reported.

use crate::{error::Result, Error, Quote};
use serde_json::Value;

/// Outcome of a soft-fail decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Well-formed quotes, in stored order
    pub quotes: Vec<Quote>,
    /// False if the blob itself was unreadable
    pub valid: bool,
    /// Items discarded for having the wrong shape
    pub dropped: usize,
}

/// Serialize a collection compactly.
pub fn encode(quotes: &[Quote]) -> Result<String> {
    serde_json::to_string(quotes).map_err(|e| Error::Serialization(e.to_string()))
}

/// Serialize a collection as pretty-printed JSON (export format).
pub fn encode_pretty(quotes: &[Quote]) -> Result<String> {
    serde_json::to_string_pretty(quotes).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode a stored collection, failing if the top level is not an array.
pub fn decode(blob: &str) -> Result<Vec<Quote>> {
    let value: Value =
        serde_json::from_str(blob).map_err(|e| Error::StorageParse(e.to_string()))?;
    let items = value
        .as_array()
        .ok_or_else(|| Error::StorageParse("expected an array of quotes".into()))?;

    Ok(items.iter().filter_map(Quote::from_value).collect())
}

/// Decode a stored collection, falling back to an empty one.
pub fn decode_lenient(blob: &str) -> Decoded {
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(blob) else {
        return Decoded::default();
    };

    let quotes: Vec<Quote> = items.iter().filter_map(Quote::from_value).collect();
    Decoded {
        dropped: items.len() - quotes.len(),
        quotes,
        valid: true,
    }
}

/// Parse a user-supplied import file.
///
/// Anything but a JSON array is rejected. Malformed items are skipped and
/// imported quotes lose their id.
pub fn parse_import(blob: &str) -> Result<Vec<Quote>> {
    let value: Value = serde_json::from_str(blob)
        .map_err(|e| Error::ImportFormat(format!("not valid JSON: {}", e)))?;
    let items = value
        .as_array()
        .ok_or_else(|| Error::ImportFormat("expected an array of quotes".into()))?;

    Ok(items
        .iter()
        .filter_map(Quote::from_value)
        .map(Quote::without_id)
        .collect())
}

/// Serialize a single quote (last-viewed echo).
pub fn encode_quote(quote: &Quote) -> Result<String> {
    serde_json::to_string(quote).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode a single quote, `None` if unreadable or malformed.
pub fn decode_quote(blob: &str) -> Option<Quote> {
    let value: Value = serde_json::from_str(blob).ok()?;
    Quote::from_value(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::default_quotes;

    #[test]
    fn roundtrip_defaults() {
        let quotes = default_quotes();
        let blob = encode(&quotes).unwrap();
        assert_eq!(decode(&blob).unwrap(), quotes);
        assert_eq!(decode_lenient(&blob).quotes, quotes);
    }

    #[test]
    fn roundtrip_preserves_ids() {
        let quotes = vec![Quote::from_remote(1, "a"), Quote::new_local("b", "c").unwrap()];
        let decoded = decode_lenient(&encode(&quotes).unwrap());
        assert!(decoded.valid);
        assert_eq!(decoded.quotes, quotes);
    }

    #[test]
    fn export_is_pretty() {
        let blob = encode_pretty(&[Quote::new_local("a", "b").unwrap()]).unwrap();
        assert!(blob.starts_with("[\n"));
        assert!(blob.contains("  {"));
    }

    #[test]
    fn lenient_drops_malformed_items() {
        let blob = r#"[
            {"text": "ok", "category": "C"},
            {"text": 5, "category": "C"},
            {"text": "no category"},
            {"id": "7", "text": "coerced", "category": "C"},
            42
        ]"#;

        let decoded = decode_lenient(blob);

        assert!(decoded.valid);
        assert_eq!(decoded.dropped, 3);
        assert_eq!(decoded.quotes.len(), 2);
        assert_eq!(decoded.quotes[1].id, None);
    }

    #[test]
    fn lenient_soft_fails() {
        for blob in ["", "not json", "{\"text\":\"a\"}", "null", "\"[]\""] {
            let decoded = decode_lenient(blob);
            assert!(!decoded.valid, "accepted {:?}", blob);
            assert!(decoded.quotes.is_empty());
        }
    }

    #[test]
    fn strict_decode_reports_parse_errors() {
        assert!(matches!(decode("{}"), Err(Error::StorageParse(_))));
        assert!(matches!(decode("[1,"), Err(Error::StorageParse(_))));
    }

    #[test]
    fn import_skips_bad_items() {
        let blob = r#"[{"text":"Q","category":"C"},{"text":123,"category":"C"}]"#;
        let quotes = parse_import(blob).unwrap();
        assert_eq!(quotes, vec![Quote::new_local("Q", "C").unwrap()]);
    }

    #[test]
    fn import_strips_ids() {
        let blob = r#"[{"id": 4, "text":"Q","category":"C"}]"#;
        assert_eq!(parse_import(blob).unwrap()[0].id, None);
    }

    #[test]
    fn import_rejects_non_array() {
        assert!(matches!(
            parse_import(r#"{"text":"Q","category":"C"}"#),
            Err(Error::ImportFormat(_))
        ));
        assert!(matches!(parse_import("garbage"), Err(Error::ImportFormat(_))));
    }

    #[test]
    fn last_viewed_roundtrip() {
        let quote = Quote::from_remote(3, "t");
        assert_eq!(decode_quote(&encode_quote(&quote).unwrap()), Some(quote));
        assert_eq!(decode_quote("{broken"), None);
        assert_eq!(decode_quote(r#"{"text": "only"}"#), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_quote() -> impl Strategy<Value = Quote> {
            (
                proptest::option::of(any::<i64>()),
                "\\PC{1,24}",
                "\\PC{1,12}",
            )
                .prop_map(|(id, text, category)| Quote { id, text, category })
        }

        proptest! {
            #[test]
            fn prop_roundtrip(quotes in proptest::collection::vec(arb_quote(), 0..16)) {
                let blob = encode(&quotes).unwrap();
                let decoded = decode_lenient(&blob);
                prop_assert!(decoded.valid);
                prop_assert_eq!(decoded.dropped, 0);
                prop_assert_eq!(decoded.quotes, quotes);
            }
        }
    }
}
