//! Quote records.

use crate::{error::Result, Error, QuoteId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category assigned to every record that came from the remote endpoint.
pub const REMOTE_CATEGORY: &str = "Server";

/// The text and category of a quote, without its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteFields {
    pub text: String,
    pub category: String,
}

/// A quote in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Remote identity. `None` until the remote side has assigned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QuoteId>,
    /// Quote body
    pub text: String,
    /// Free-form category label
    pub category: String,
}

impl Quote {
    /// Create a locally authored quote.
    ///
    /// Both fields are trimmed and must be non-empty afterwards.
    pub fn new_local(text: &str, category: &str) -> Result<Self> {
        let text = text.trim();
        let category = category.trim();

        if text.is_empty() {
            return Err(Error::EmptyField { field: "text" });
        }
        if category.is_empty() {
            return Err(Error::EmptyField { field: "category" });
        }

        Ok(Self {
            id: None,
            text: text.to_string(),
            category: category.to_string(),
        })
    }

    /// Create a quote from a remote item.
    pub fn from_remote(id: QuoteId, title: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            text: title.into(),
            category: REMOTE_CATEGORY.to_string(),
        }
    }

    /// Build a quote from an untrusted JSON value.
    ///
    /// Returns `None` unless the value is an object whose `text` and
    /// `category` are strings. A missing or non-integer `id` becomes `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = obj.get("text")?.as_str()?;
        let category = obj.get("category")?.as_str()?;

        Some(Self {
            id: obj.get("id").and_then(Value::as_i64),
            text: text.to_string(),
            category: category.to_string(),
        })
    }

    /// Same quote without its remote identity.
    pub fn without_id(mut self) -> Self {
        self.id = None;
        self
    }

    /// Text and category of this quote.
    pub fn fields(&self) -> QuoteFields {
        QuoteFields {
            text: self.text.clone(),
            category: self.category.clone(),
        }
    }

    /// Whether text and category both equal those of `other`.
    pub fn same_content(&self, other: &Quote) -> bool {
        self.text == other.text && self.category == other.category
    }
}

/// The collection a fresh installation starts with.
pub fn default_quotes() -> Vec<Quote> {
    [
        (
            "The only limit to our realization of tomorrow is our doubts of today.",
            "Motivation",
        ),
        (
            "Reading is to the mind what exercise is to the body.",
            "Reading",
        ),
        (
            "A room without books is like a body without a soul.",
            "Books",
        ),
        ("The future depends on what you do today.", "Motivation"),
    ]
    .into_iter()
    .map(|(text, category)| Quote {
        id: None,
        text: text.to_string(),
        category: category.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_local_trims_fields() {
        let quote = Quote::new_local("  Stay hungry.  ", "\tMotivation\n").unwrap();
        assert_eq!(quote.id, None);
        assert_eq!(quote.text, "Stay hungry.");
        assert_eq!(quote.category, "Motivation");
    }

    #[test]
    fn new_local_rejects_blank_fields() {
        assert_eq!(
            Quote::new_local("", "X"),
            Err(Error::EmptyField { field: "text" })
        );
        assert_eq!(
            Quote::new_local("Y", "   "),
            Err(Error::EmptyField { field: "category" })
        );
    }

    #[test]
    fn from_remote_uses_server_category() {
        let quote = Quote::from_remote(7, "qui est esse");
        assert_eq!(quote.id, Some(7));
        assert_eq!(quote.text, "qui est esse");
        assert_eq!(quote.category, REMOTE_CATEGORY);
    }

    #[test]
    fn from_value_accepts_well_formed() {
        let quote = Quote::from_value(&json!({"id": 3, "text": "A", "category": "B"})).unwrap();
        assert_eq!(quote.id, Some(3));

        let quote = Quote::from_value(&json!({"text": "A", "category": "B"})).unwrap();
        assert_eq!(quote.id, None);
    }

    #[test]
    fn from_value_coerces_bad_ids() {
        for id in [json!("12"), json!(1.5), json!(null), json!([1])] {
            let quote = Quote::from_value(&json!({"id": id, "text": "A", "category": "B"}));
            assert_eq!(quote.unwrap().id, None);
        }
    }

    #[test]
    fn from_value_rejects_malformed() {
        assert!(Quote::from_value(&json!({"text": 123, "category": "C"})).is_none());
        assert!(Quote::from_value(&json!({"text": "Q"})).is_none());
        assert!(Quote::from_value(&json!({"category": "C"})).is_none());
        assert!(Quote::from_value(&json!("just a string")).is_none());
        assert!(Quote::from_value(&json!(null)).is_none());
    }

    #[test]
    fn serialization_omits_missing_id() {
        let local = Quote::new_local("A", "B").unwrap();
        assert_eq!(
            serde_json::to_value(&local).unwrap(),
            json!({"text": "A", "category": "B"})
        );

        let remote = Quote::from_remote(1, "A");
        assert_eq!(
            serde_json::to_value(&remote).unwrap(),
            json!({"id": 1, "text": "A", "category": "Server"})
        );
    }

    #[test]
    fn default_collection() {
        let quotes = default_quotes();
        assert_eq!(quotes.len(), 4);
        assert!(quotes.iter().all(|q| q.id.is_none()));
        assert_eq!(
            quotes.iter().filter(|q| q.category == "Motivation").count(),
            2
        );
    }
}
