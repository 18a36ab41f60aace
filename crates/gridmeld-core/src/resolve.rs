use crate::{
    error::ResolveError,
    obs,
    token::{self, TokenSet},
    value::Value,
};
use std::collections::BTreeMap;

///
/// ResolutionState
///
/// Derived readiness of merge-token resolution. Computed on demand from
/// the token set, the context selection, and the value map; never stored
/// and never persisted.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolutionState {
    /// The compiled query references no context fields.
    NoTokens,
    /// Tokens exist but no context record is selected yet.
    AwaitingRecord,
    /// Tokens and a record exist; values have not arrived.
    AwaitingValues,
    /// Every token can be substituted from the value map.
    Resolved,
    /// The last value fetch failed; tokens are intact, values are not.
    Error,
}

///
/// ContextSelection
///
/// The context object and record the operator has picked. Field values
/// live on the resolver, not here: they are cleared on every selection
/// change and must never survive a record switch.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ContextSelection {
    pub object_name: Option<String>,
    pub record_id: Option<String>,
}

///
/// ValueFetchRequest
///
/// Identity snapshot taken when a fetch starts. A completion is applied
/// only while its snapshot still matches the live selection; anything
/// else arrives out of order and is discarded.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValueFetchRequest {
    object_name: String,
    record_id: String,
    field_names: Vec<String>,
}

impl ValueFetchRequest {
    #[must_use]
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    #[must_use]
    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    #[must_use]
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }
}

///
/// Resolver
///
/// Owns the merge-token set, the context selection, and the resolved
/// value map, and decides when a value fetch must start. Single-writer:
/// one configuration session owns one resolver; out-of-order fetch
/// completions are handled by the snapshot check in [`Self::apply_values`],
/// not by locking.
///

#[derive(Clone, Debug, Default)]
pub struct Resolver {
    tokens: TokenSet,
    selection: ContextSelection,
    values: BTreeMap<String, Value>,
    fetch_error: Option<ResolveError>,
}

impl Resolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn tokens(&self) -> &TokenSet {
        &self.tokens
    }

    #[must_use]
    pub const fn selection(&self) -> &ContextSelection {
        &self.selection
    }

    #[must_use]
    pub const fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    #[must_use]
    pub const fn last_error(&self) -> Option<&ResolveError> {
        self.fetch_error.as_ref()
    }

    /// Derive the current resolution state.
    #[must_use]
    pub fn state(&self) -> ResolutionState {
        if self.tokens.is_empty() {
            ResolutionState::NoTokens
        } else if self.fetch_error.is_some() {
            ResolutionState::Error
        } else if self.selection.record_id.is_none() {
            ResolutionState::AwaitingRecord
        } else if self.values.is_empty() {
            ResolutionState::AwaitingValues
        } else {
            ResolutionState::Resolved
        }
    }

    /// Re-scan the compiled query after an edit.
    ///
    /// An unchanged token set keeps the current values: nothing the edit
    /// did could stale them. A changed set clears the value map and, when
    /// a record is already selected and tokens remain, starts a fetch.
    pub fn rescan(&mut self, compiled_query: &str) -> Option<ValueFetchRequest> {
        let tokens = token::scan(compiled_query);
        if tokens == self.tokens {
            return None;
        }

        self.tokens = tokens;
        self.values.clear();
        self.fetch_error = None;
        self.fetch_request()
    }

    /// Select the context object, dropping any record of a previous one.
    pub fn select_object(&mut self, object_name: impl Into<String>) {
        self.selection = ContextSelection {
            object_name: Some(object_name.into()),
            record_id: None,
        };
        self.values.clear();
        self.fetch_error = None;
    }

    /// Clear the context object and record.
    pub fn clear_object(&mut self) {
        self.selection = ContextSelection::default();
        self.values.clear();
        self.fetch_error = None;
    }

    /// Select the context record, clearing stale values unconditionally.
    /// Returns the fetch to start when tokens are waiting on it.
    pub fn select_record(
        &mut self,
        object_name: impl Into<String>,
        record_id: impl Into<String>,
    ) -> Option<ValueFetchRequest> {
        self.selection = ContextSelection {
            object_name: Some(object_name.into()),
            record_id: Some(record_id.into()),
        };
        self.values.clear();
        self.fetch_error = None;
        self.fetch_request()
    }

    /// Clear the record selection, keeping the object.
    pub fn clear_record(&mut self) {
        self.selection.record_id = None;
        self.values.clear();
        self.fetch_error = None;
    }

    /// Apply a fetch completion, successful or failed.
    ///
    /// A completion whose request snapshot no longer matches the live
    /// selection is discarded without touching any state: the selection
    /// it was fetched for is gone. A fresh failure clears the value map,
    /// records the error, and leaves the token set intact so callers can
    /// still show the unresolved query. No retry is scheduled.
    pub fn apply_values(
        &mut self,
        request: &ValueFetchRequest,
        result: Result<BTreeMap<String, Value>, ResolveError>,
    ) -> Result<(), ResolveError> {
        if !self.is_current(request) {
            obs::metrics::record_value_fetch_stale();
            return Ok(());
        }

        match result {
            Ok(values) => {
                self.values = values;
                self.fetch_error = None;
                obs::metrics::record_value_fetch_applied();
                Ok(())
            }
            Err(err) => {
                self.values.clear();
                self.fetch_error = Some(err.clone());
                obs::metrics::record_value_fetch_failed();
                Err(err)
            }
        }
    }

    fn is_current(&self, request: &ValueFetchRequest) -> bool {
        self.selection.object_name.as_deref() == Some(request.object_name())
            && self.selection.record_id.as_deref() == Some(request.record_id())
    }

    fn fetch_request(&self) -> Option<ValueFetchRequest> {
        if self.tokens.is_empty() {
            return None;
        }
        let object_name = self.selection.object_name.clone()?;
        let record_id = self.selection.record_id.clone()?;

        obs::metrics::record_value_fetch_started();
        Some(ValueFetchRequest {
            object_name,
            record_id,
            field_names: self.tokens.field_names(),
        })
    }
}

///
/// TESTS
///
