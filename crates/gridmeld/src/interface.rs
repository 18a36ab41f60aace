//! Collaborator contracts the engine consumes.
//!
//! Hosts implement these traits over their transport and storage of
//! choice. Calls are modeled as plain call-with-result: the session's
//! begin/apply flow keeps out-of-order completion safe even when a host
//! completes them asynchronously.

use crate::config::TableConfig;
use gridmeld_core::{
    field::DiscoveredField,
    render::ResultSet,
    resolve::ValueFetchRequest,
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;
use ulid::Ulid;

///
/// SchemaDiscovery
/// Lists the queryable fields of an object.
///

pub trait SchemaDiscovery {
    fn list_fields(&self, object_name: &str) -> Result<Vec<DiscoveredField>, DiscoveryError>;
}

///
/// DiscoveryError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DiscoveryError {
    #[error("object not found: {0}")]
    ObjectNotFound(String),
    #[error("object has no queryable fields: {0}")]
    EmptyResult(String),
    #[error("schema discovery failed: {0}")]
    Backend(String),
}

/// Identifier of a saved configuration.
pub type ConfigId = Ulid;

///
/// ConfigSummary
/// One row of the saved-view picker.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ConfigSummary {
    pub id: ConfigId,
    pub name: String,
}

///
/// ConfigStore
/// Persistence for named table configurations.
///
/// `save` always receives the current schema version's full shape;
/// `load` may hand back payloads written by any earlier version.
///

pub trait ConfigStore {
    fn save(&mut self, name: &str, config: &TableConfig) -> Result<ConfigId, ConfigStoreError>;
    fn load(&self, id: ConfigId) -> Result<TableConfig, ConfigStoreError>;
    fn delete(&mut self, id: ConfigId) -> Result<(), ConfigStoreError>;
    fn list(&self) -> Result<Vec<ConfigSummary>, ConfigStoreError>;
}

///
/// ConfigStoreError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigStoreError {
    #[error("configuration not found: {0}")]
    NotFound(ConfigId),
    #[error("malformed configuration payload: {0}")]
    Malformed(String),
    #[error("configuration store failed: {0}")]
    Backend(String),
}

///
/// ContextObject
/// One context-object search hit.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ContextObject {
    pub api_name: String,
    pub label: String,
}

impl ContextObject {
    pub fn new(api_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            label: label.into(),
        }
    }
}

///
/// ContextSearch
/// Free-text object search. No matches is an empty list, never an error.
///

pub trait ContextSearch {
    fn search_objects(&self, term: &str) -> Vec<ContextObject>;
}

///
/// ContextValues
/// Fetches the referenced field values of one context record.
///

pub trait ContextValues {
    fn field_values(
        &self,
        request: &ValueFetchRequest,
    ) -> Result<BTreeMap<String, Value>, ValueFetchError>;
}

///
/// ValueFetchError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("value fetch failed for {object_name}/{record_id}: {message}")]
pub struct ValueFetchError {
    pub object_name: String,
    pub record_id: String,
    pub message: String,
}

///
/// QueryExecutor
/// Runs an assembled query string and returns its rows and columns.
///

pub trait QueryExecutor {
    fn execute(&self, query: &str) -> Result<ResultSet, ExecuteError>;
}

///
/// ExecuteError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("query execution failed: {message}")]
pub struct ExecuteError {
    pub message: String,
}

impl ExecuteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
