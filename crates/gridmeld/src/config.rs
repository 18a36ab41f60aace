//! Persisted table configuration.
//!
//! The on-disk shape has evolved: v1 payloads predate per-field
//! sortability and sort defaults, v2 payloads predate display options
//! and view state. Reads default every absent key instead of failing;
//! saves always write the current version's full shape.

use gridmeld_core::{
    DEFAULT_ROW_LIMIT,
    field::{FieldDescriptor, VisibilityFilter},
    reconcile::SavedField,
    render::SortDirection,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Version stamped into every saved payload.
pub const CONFIG_SCHEMA_VERSION: u32 = 3;

///
/// TableConfig
/// The serializable snapshot of one configured table view.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    /// Absent on v1 payloads, which predate the version stamp.
    #[serde(default = "schema_version_v1")]
    pub schema_version: u32,
    pub object_name: String,
    #[serde(default)]
    pub fields: Vec<SavedFieldConfig>,
    #[serde(default)]
    pub filter_clause: String,
    #[serde(default = "default_row_limit")]
    pub row_limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sort_field: Option<String>,
    #[serde(default)]
    pub default_sort_direction: SortDirection,
    #[serde(default)]
    pub display_options: DisplayOptions,
    #[serde(default)]
    pub view_state: ViewState,
}

impl TableConfig {
    /// Parse a persisted payload. Any malformed byte aborts the load;
    /// defaults cover absent keys, never broken ones.
    pub fn decode(payload: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(payload).map_err(ConfigError::Parse)
    }

    /// Serialize the full current shape.
    pub fn encode(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(ConfigError::Serialize)
    }

    /// Saved rows converted for reconciliation against a fresh discovery.
    #[must_use]
    pub fn saved_fields(&self) -> Vec<SavedField> {
        self.fields.iter().map(SavedFieldConfig::to_saved).collect()
    }
}

///
/// SavedFieldConfig
/// One persisted field row. `sortable` arrived in v2 and defaults on.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFieldConfig {
    pub field_name: String,
    pub label: String,
    pub visible: bool,
    #[serde(default = "default_true")]
    pub sortable: bool,
}

impl SavedFieldConfig {
    #[must_use]
    pub fn to_saved(&self) -> SavedField {
        SavedField {
            field_name: self.field_name.clone(),
            label: self.label.clone(),
            visible: self.visible,
            sortable: self.sortable,
        }
    }
}

impl From<&FieldDescriptor> for SavedFieldConfig {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            field_name: field.field_name.clone(),
            label: field.label.clone(),
            visible: field.visible,
            sortable: field.sortable,
        }
    }
}

///
/// DisplayOptions
/// Viewer chrome toggles. A fresh view shows everything.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    #[serde(default = "default_true")]
    pub show_record_count: bool,
    #[serde(default = "default_true")]
    pub show_search: bool,
    #[serde(default = "default_true")]
    pub show_refresh: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_record_count: true,
            show_search: true,
            show_refresh: true,
        }
    }
}

///
/// ViewState
/// Builder-session state worth restoring when a saved view is reopened.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    #[serde(default)]
    pub field_visibility_filter: VisibilityFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_object_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_object_label: Option<String>,
    #[serde(default)]
    pub context_search_term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_record_id: Option<String>,
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("malformed configuration payload: {0}")]
    Parse(serde_json::Error),
    #[error("configuration serialization failed: {0}")]
    Serialize(serde_json::Error),
}

const fn schema_version_v1() -> u32 {
    1
}

const fn default_row_limit() -> u32 {
    DEFAULT_ROW_LIMIT
}

const fn default_true() -> bool {
    true
}

///
/// TESTS
///
