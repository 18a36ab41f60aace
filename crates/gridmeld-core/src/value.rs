use serde::{Deserialize, Serialize};
use std::{borrow::Cow, cmp::Ordering};

///
/// Value
///
/// Runtime value vocabulary for result cells and resolved merge values.
///
/// Null → the field's value is absent on the record (i.e., SQL NULL).
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Render this value as a query literal for merge substitution.
    ///
    /// Numbers and booleans render bare; text renders single-quoted with
    /// no escaping of embedded quote characters. Substituted text is
    /// spliced into the query string verbatim, so callers own any
    /// hardening they need beyond this contract.
    #[must_use]
    pub fn literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Text(s) => format!("'{s}'"),
        }
    }

    /// Textual form used for client-side ordinal comparison.
    ///
    /// Null compares as the empty string so absent cells sort together
    /// ahead of every populated cell.
    #[must_use]
    pub fn ordinal_text(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Bool(b) => Cow::Owned(b.to_string()),
            Self::Int(n) => Cow::Owned(n.to_string()),
            Self::Float(n) => Cow::Owned(n.to_string()),
            Self::Text(s) => Cow::Borrowed(s),
        }
    }

    /// Ordinal comparison over optional cells; a missing cell compares
    /// exactly like an explicit null.
    #[must_use]
    pub fn ordinal_cmp(a: Option<&Self>, b: Option<&Self>) -> Ordering {
        let left = a.map_or(Cow::Borrowed(""), Self::ordinal_text);
        let right = b.map_or(Cow::Borrowed(""), Self::ordinal_text);
        left.cmp(&right)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

///
/// TESTS
///
