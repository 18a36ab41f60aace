//! gridmeld: declarative tabular query templates with merge-token
//! resolution.
//!
//! An operator declares, at configuration time, a parameterized query
//! over a columnar source: object name, ordered visible columns, a raw
//! filter clause that may reference fields of a "context" record, a row
//! limit, and sort defaults. At render time the engine compiles that
//! configuration into a query string, resolves the context-field
//! placeholders against the selected record, and shapes the executed
//! result for a sortable table.
//!
//! This crate is the public surface: the error taxonomy, the persisted
//! configuration schema, the collaborator traits hosts implement, and
//! the [`session::ConfigSession`] that orchestrates one builder session.
//! The pure engine lives in `gridmeld-core`.

pub mod config;
pub mod error;
pub mod interface;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Error, ErrorKind, ErrorOrigin};

// Core vocabulary, re-exported so most hosts depend on this crate alone.
pub use gridmeld_core::{
    DEFAULT_ROW_LIMIT,
    compile::ColumnLabelMap,
    field::{DiscoveredField, FieldDescriptor, FieldSet, VisibilityFilter},
    obs,
    preview::Placeholders,
    render::{RenderColumn, RenderRow, RenderedTable, ResultColumn, ResultSet, Row, SortDirection},
    resolve::{ContextSelection, ResolutionState, Resolver, ValueFetchRequest},
    token::{CURRENT_RECORD_TOKEN, CURRENT_USER_TOKEN, MergeToken, RECORD_SIGIL, TokenSet},
    value::Value,
};

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
///

pub mod prelude {
    pub use crate::{
        config::{DisplayOptions, SavedFieldConfig, TableConfig, ViewState},
        error::Error,
        interface::{
            ConfigId, ConfigStore, ConfigSummary, ContextObject, ContextSearch, ContextValues,
            QueryExecutor, SchemaDiscovery,
        },
        session::{ConfigSession, SessionState},
    };
    pub use gridmeld_core::prelude::*;
}
