use crate::{compile::ColumnLabelMap, obs, value::Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column name treated as the natural row identifier when present.
pub const ID_FIELD: &str = "Id";

/// Prefix of synthesized positional row keys.
const ROW_KEY_PREFIX: &str = "row-";

///
/// SortDirection
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

///
/// ResultSet
///
/// Shape returned by query execution: column metadata plus one value
/// mapping per row.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<ResultColumn>,
    pub rows: Vec<Row>,
}

///
/// ResultColumn
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResultColumn {
    pub field_name: String,
    pub label: String,
}

impl ResultColumn {
    pub fn new(field_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            label: label.into(),
        }
    }
}

/// One executed row: field name to cell value.
pub type Row = BTreeMap<String, Value>;

///
/// RenderColumn
/// Display-ready column: label resolved against overrides, always sortable.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderColumn {
    pub field_name: String,
    pub label: String,
    pub sortable: bool,
}

///
/// RenderRow
///

#[derive(Clone, Debug, PartialEq)]
pub struct RenderRow {
    pub key: String,
    pub cells: Row,
}

///
/// RenderedTable
///
/// Client-side view over an executed result set. Sorting re-orders the
/// row buffer in place; it never re-executes the underlying query.
///

#[derive(Clone, Debug, PartialEq)]
pub struct RenderedTable {
    columns: Vec<RenderColumn>,
    rows: Vec<RenderRow>,
    synthetic_keys: bool,
}

impl RenderedTable {
    /// Shape an executed result set for display.
    ///
    /// Labels come from the override map when the field name is present
    /// there, else from the server-provided column label. Row keys use
    /// the identifier column's value when one exists; otherwise every
    /// row gets a positional `row-<index>` key, and the table records
    /// that mode so hosts never confuse synthesized keys with real
    /// identifier values.
    #[must_use]
    pub fn new(result: ResultSet, overrides: &ColumnLabelMap) -> Self {
        let synthetic_keys = !result.columns.iter().any(|c| c.field_name == ID_FIELD);

        let columns = result
            .columns
            .into_iter()
            .map(|c| {
                let label = overrides
                    .label_for(&c.field_name)
                    .map_or(c.label, str::to_string);
                RenderColumn {
                    field_name: c.field_name,
                    label,
                    sortable: true,
                }
            })
            .collect();

        let rows = result
            .rows
            .into_iter()
            .enumerate()
            .map(|(index, cells)| RenderRow {
                key: row_key(&cells, index, synthetic_keys),
                cells,
            })
            .collect();

        obs::metrics::record_render();
        Self {
            columns,
            rows,
            synthetic_keys,
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[RenderColumn] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[RenderRow] {
        &self.rows
    }

    #[must_use]
    pub const fn has_synthetic_keys(&self) -> bool {
        self.synthetic_keys
    }

    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Stable re-sort of the row buffer by ordinal comparison of one
    /// field's textual value; missing and null cells compare as empty.
    /// Positional keys are re-assigned to follow the sorted order.
    pub fn sort(&mut self, field_name: &str, direction: SortDirection) {
        self.rows.sort_by(|a, b| {
            let ordering = Value::ordinal_cmp(a.cells.get(field_name), b.cells.get(field_name));
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        if self.synthetic_keys {
            for (index, row) in self.rows.iter_mut().enumerate() {
                row.key = format!("{ROW_KEY_PREFIX}{index}");
            }
        }

        obs::metrics::record_sort();
    }
}

fn row_key(cells: &Row, index: usize, synthetic: bool) -> String {
    if synthetic {
        return format!("{ROW_KEY_PREFIX}{index}");
    }
    cells
        .get(ID_FIELD)
        .map_or_else(String::new, |v| v.ordinal_text().into_owned())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entries: &[(&str, Value)]) -> Row {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn result_without_id() -> ResultSet {
        ResultSet {
            columns: vec![
                ResultColumn::new("Name", "Name"),
                ResultColumn::new("Industry", "Industry"),
            ],
            rows: vec![
                row(&[("Name", Value::from("Acme")), ("Industry", Value::from("Energy"))]),
                row(&[("Name", Value::from("Zeta")), ("Industry", Value::Null)]),
                row(&[("Name", Value::from("Mids")), ("Industry", Value::from("Retail"))]),
            ],
        }
    }

    #[test]
    fn synthesizes_positional_keys_without_id_column() {
        let table = RenderedTable::new(result_without_id(), &ColumnLabelMap::new());

        assert!(table.has_synthetic_keys());
        let keys: Vec<&str> = table.rows().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["row-0", "row-1", "row-2"]);
    }

    #[test]
    fn uses_id_values_as_keys_when_id_column_exists() {
        let result = ResultSet {
            columns: vec![
                ResultColumn::new("Id", "Id"),
                ResultColumn::new("Name", "Name"),
            ],
            rows: vec![
                row(&[("Id", Value::from("001A")), ("Name", Value::from("Acme"))]),
                row(&[("Id", Value::from("001B")), ("Name", Value::from("Zeta"))]),
            ],
        };

        let table = RenderedTable::new(result, &ColumnLabelMap::new());

        assert!(!table.has_synthetic_keys());
        let keys: Vec<&str> = table.rows().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["001A", "001B"]);
    }

    #[test]
    fn label_overrides_win_over_server_labels() {
        let overrides = ColumnLabelMap::decode("Name=>Account Name");
        let table = RenderedTable::new(result_without_id(), &overrides);

        let labels: Vec<&str> = table.columns().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Account Name", "Industry"]);
        assert!(table.columns().iter().all(|c| c.sortable));
    }

    #[test]
    fn sort_ascending_treats_null_as_empty() {
        let mut table = RenderedTable::new(result_without_id(), &ColumnLabelMap::new());

        table.sort("Industry", SortDirection::Asc);

        let industries: Vec<&Value> = table
            .rows()
            .iter()
            .map(|r| r.cells.get("Industry").unwrap_or(&Value::Null))
            .collect();
        assert_eq!(
            industries,
            vec![&Value::Null, &Value::from("Energy"), &Value::from("Retail")]
        );
    }

    #[test]
    fn sort_descending_reverses() {
        let mut table = RenderedTable::new(result_without_id(), &ColumnLabelMap::new());

        table.sort("Name", SortDirection::Desc);

        let names: Vec<String> = table
            .rows()
            .iter()
            .map(|r| r.cells["Name"].ordinal_text().into_owned())
            .collect();
        assert_eq!(names, ["Zeta", "Mids", "Acme"]);
    }

    #[test]
    fn sort_reassigns_positional_keys_in_display_order() {
        let mut table = RenderedTable::new(result_without_id(), &ColumnLabelMap::new());

        table.sort("Name", SortDirection::Desc);

        let keys: Vec<&str> = table.rows().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["row-0", "row-1", "row-2"]);
        assert_eq!(
            table.rows()[0].cells.get("Name"),
            Some(&Value::from("Zeta"))
        );
    }

    #[test]
    fn sort_is_stable_for_equal_values() {
        let result = ResultSet {
            columns: vec![
                ResultColumn::new("Group", "Group"),
                ResultColumn::new("Seq", "Seq"),
            ],
            rows: vec![
                row(&[("Group", Value::from("a")), ("Seq", Value::Int(1))]),
                row(&[("Group", Value::from("a")), ("Seq", Value::Int(2))]),
                row(&[("Group", Value::from("a")), ("Seq", Value::Int(3))]),
            ],
        };
        let mut table = RenderedTable::new(result, &ColumnLabelMap::new());

        table.sort("Group", SortDirection::Desc);

        let seqs: Vec<&Value> = table
            .rows()
            .iter()
            .map(|r| &r.cells["Seq"])
            .collect();
        assert_eq!(seqs, vec![&Value::Int(1), &Value::Int(2), &Value::Int(3)]);
    }

    #[test]
    fn sorting_never_changes_row_count() {
        let mut table = RenderedTable::new(result_without_id(), &ColumnLabelMap::new());
        table.sort("Industry", SortDirection::Desc);
        assert_eq!(table.row_count(), 3);
    }
}
