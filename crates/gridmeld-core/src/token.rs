use crate::obs;
use derive_more::Deref;

/// Sigil prefixing a context-field merge token (`$record.<field>`).
pub const RECORD_SIGIL: &str = "$record.";

/// Singleton placeholder for the id of the viewer running the query.
pub const CURRENT_USER_TOKEN: &str = "$currentUserId";

/// Singleton placeholder for the id of the record the view is shown on.
pub const CURRENT_RECORD_TOKEN: &str = "$currentRecordId";

///
/// MergeToken
///
/// One distinct context-field reference found in a compiled query.
/// Identity is the referenced field name; the placeholder text is the
/// literal substring substitution operates on.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MergeToken {
    field_name: String,
}

impl MergeToken {
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The literal placeholder text as it appears in the query.
    #[must_use]
    pub fn placeholder(&self) -> String {
        format!("{RECORD_SIGIL}{}", self.field_name)
    }
}

///
/// TokenSet
///
/// Distinct merge tokens in first-appearance order. Duplicate references
/// collapse onto the first occurrence.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq)]
pub struct TokenSet(Vec<MergeToken>);

impl TokenSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MergeToken> {
        self.0.iter()
    }

    #[must_use]
    pub fn contains(&self, field_name: &str) -> bool {
        self.0.iter().any(|t| t.field_name == field_name)
    }

    /// Referenced field names in first-appearance order.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.0.iter().map(|t| t.field_name.clone()).collect()
    }

    fn insert(&mut self, field_name: &str) {
        if !self.contains(field_name) {
            self.0.push(MergeToken {
                field_name: field_name.to_string(),
            });
        }
    }
}

impl<'a> IntoIterator for &'a TokenSet {
    type Item = &'a MergeToken;
    type IntoIter = std::slice::Iter<'a, MergeToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Extract the distinct context-field tokens from a compiled query.
///
/// A token is the sigil immediately followed by a maximal run of
/// `[A-Za-z0-9_]` identifier characters. A sigil with no identifier run
/// after it is not a token.
#[must_use]
pub fn scan(query: &str) -> TokenSet {
    let mut tokens = TokenSet::new();

    for (start, _) in query.match_indices(RECORD_SIGIL) {
        let rest = &query[start + RECORD_SIGIL.len()..];
        let end = rest
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(rest.len());
        if end > 0 {
            tokens.insert(&rest[..end]);
        }
    }

    obs::metrics::record_token_scan();
    tokens
}

///
/// TESTS
///
