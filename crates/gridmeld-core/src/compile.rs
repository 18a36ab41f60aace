use crate::{DEFAULT_ROW_LIMIT, field::FieldSet, obs};

/// Compile a field configuration and raw filter clause into a query string.
///
/// Returns the empty string when there is nothing executable: no object
/// name, or no visible field. Otherwise the visible fields are selected in
/// set order and the filter clause is spliced in verbatim — an empty
/// clause leaves two consecutive spaces between the object name and
/// `LIMIT`, which downstream consumers must tolerate rather than trim.
/// A zero row limit falls back to [`DEFAULT_ROW_LIMIT`].
#[must_use]
pub fn compile(object_name: &str, fields: &FieldSet, filter_clause: &str, row_limit: u32) -> String {
    if object_name.is_empty() {
        return String::new();
    }

    let selected: Vec<&str> = fields
        .visible_fields()
        .map(|f| f.field_name.as_str())
        .collect();
    if selected.is_empty() {
        return String::new();
    }

    let limit = if row_limit == 0 {
        DEFAULT_ROW_LIMIT
    } else {
        row_limit
    };

    obs::metrics::record_compile();

    format!(
        "SELECT {} FROM {object_name} {filter_clause} LIMIT {limit}",
        selected.join(", ")
    )
}

///
/// ColumnLabelMap
///
/// Ordered `field_name → label` pairs for the visible fields of a
/// configuration, used to override server-provided column labels at
/// render time and transferred between components as a delimited string.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ColumnLabelMap(Vec<(String, String)>);

impl ColumnLabelMap {
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

    /// Return an iterator over `(field_name, label)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, l)| (n.as_str(), l.as_str()))
    }

    /// Look up the label override for a field name.
    #[must_use]
    pub fn label_for(&self, field_name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == field_name)
            .map(|(_, label)| label.as_str())
    }

    /// Serialize as `name=>label` pairs joined by `,`.
    #[must_use]
    pub fn encode(&self) -> String {
        let pairs: Vec<String> = self
            .0
            .iter()
            .map(|(name, label)| format!("{name}=>{label}"))
            .collect();
        pairs.join(",")
    }

    /// Parse the delimited transfer format. A segment with no `=>` is
    /// ignored; later pairs for an already-seen name are ignored too.
    #[must_use]
    pub fn decode(encoded: &str) -> Self {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for segment in encoded.split(',') {
            let Some((name, label)) = segment.split_once("=>") else {
                continue;
            };
            if name.is_empty() || pairs.iter().any(|(seen, _)| seen == name) {
                continue;
            }
            pairs.push((name.to_string(), label.to_string()));
        }
        Self(pairs)
    }
}

/// Ordered label map for the visible fields of a configuration.
#[must_use]
pub fn column_label_map(fields: &FieldSet) -> ColumnLabelMap {
    ColumnLabelMap(
        fields
            .visible_fields()
            .map(|f| (f.field_name.clone(), f.label.clone()))
            .collect(),
    )
}

///
/// TESTS
///
