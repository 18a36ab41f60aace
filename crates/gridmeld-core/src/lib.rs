//! Core engine for gridmeld: ordered field configuration, saved-config
//! reconciliation, query compilation, merge-token resolution, preview
//! assembly, and client-side table rendering.
//!
//! Everything here is pure, single-threaded state machinery. Anything
//! that talks to the outside world (schema discovery, persistence, value
//! lookup, execution) lives behind the facade crate's interface traits.

pub mod compile;
pub mod error;
pub mod field;
pub mod obs;
pub mod preview;
pub mod reconcile;
pub mod render;
pub mod resolve;
pub mod token;
pub mod value;

///
/// CONSTANTS
///

/// Row limit applied when a configuration has no usable limit of its own.
pub const DEFAULT_ROW_LIMIT: u32 = 100;

///
/// Prelude
///
/// Prelude contains only domain vocabulary. No errors or observability
/// helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        field::{DiscoveredField, FieldDescriptor, FieldSet, VisibilityFilter},
        preview::Placeholders,
        render::{RenderedTable, ResultSet, SortDirection},
        resolve::{ResolutionState, Resolver, ValueFetchRequest},
        value::Value,
    };
}
