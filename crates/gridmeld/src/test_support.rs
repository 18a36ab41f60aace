//! Test-only in-memory collaborators.

use crate::{
    config::TableConfig,
    interface::{
        ConfigId, ConfigStore, ConfigStoreError, ConfigSummary, ContextObject, ContextSearch,
        ContextValues, DiscoveryError, ExecuteError, QueryExecutor, SchemaDiscovery,
        ValueFetchError,
    },
};
use gridmeld_core::{
    field::DiscoveredField, render::ResultSet, resolve::ValueFetchRequest, value::Value,
};
use std::{cell::RefCell, collections::BTreeMap};
use ulid::Ulid;

///
/// StaticSchema
/// Fixed object → field listing.
///

#[derive(Default)]
pub(crate) struct StaticSchema {
    objects: BTreeMap<String, Vec<DiscoveredField>>,
}

impl StaticSchema {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_object(mut self, name: &str, fields: &[(&str, &str)]) -> Self {
        self.objects.insert(
            name.to_string(),
            fields
                .iter()
                .map(|(field_name, label)| DiscoveredField::new(*field_name, *label))
                .collect(),
        );
        self
    }
}

impl SchemaDiscovery for StaticSchema {
    fn list_fields(&self, object_name: &str) -> Result<Vec<DiscoveredField>, DiscoveryError> {
        match self.objects.get(object_name) {
            None => Err(DiscoveryError::ObjectNotFound(object_name.to_string())),
            Some(fields) if fields.is_empty() => {
                Err(DiscoveryError::EmptyResult(object_name.to_string()))
            }
            Some(fields) => Ok(fields.clone()),
        }
    }
}

///
/// MemoryConfigStore
/// Serializes through the real payload format so loads exercise decode.
///

#[derive(Default)]
pub(crate) struct MemoryConfigStore {
    next: u64,
    entries: BTreeMap<ConfigId, (String, String)>,
}

impl MemoryConfigStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn mint(&mut self) -> ConfigId {
        self.next += 1;
        Ulid::from_parts(self.next, u128::from(self.next))
    }

    /// Inject a raw payload, bypassing encode, for malformed-load tests.
    pub(crate) fn insert_raw(&mut self, name: &str, payload: &str) -> ConfigId {
        let id = self.mint();
        self.entries
            .insert(id, (name.to_string(), payload.to_string()));
        id
    }
}

impl ConfigStore for MemoryConfigStore {
    fn save(&mut self, name: &str, config: &TableConfig) -> Result<ConfigId, ConfigStoreError> {
        let payload = config
            .encode()
            .map_err(|err| ConfigStoreError::Backend(err.to_string()))?;
        let id = self.mint();
        self.entries.insert(id, (name.to_string(), payload));
        Ok(id)
    }

    fn load(&self, id: ConfigId) -> Result<TableConfig, ConfigStoreError> {
        let (_, payload) = self
            .entries
            .get(&id)
            .ok_or(ConfigStoreError::NotFound(id))?;
        TableConfig::decode(payload).map_err(|err| ConfigStoreError::Malformed(err.to_string()))
    }

    fn delete(&mut self, id: ConfigId) -> Result<(), ConfigStoreError> {
        self.entries
            .remove(&id)
            .map(|_| ())
            .ok_or(ConfigStoreError::NotFound(id))
    }

    fn list(&self) -> Result<Vec<ConfigSummary>, ConfigStoreError> {
        Ok(self
            .entries
            .iter()
            .map(|(id, (name, _))| ConfigSummary {
                id: *id,
                name: name.clone(),
            })
            .collect())
    }
}

///
/// StaticSearch
///

#[derive(Default)]
pub(crate) struct StaticSearch {
    objects: Vec<ContextObject>,
}

impl StaticSearch {
    pub(crate) fn new(objects: &[(&str, &str)]) -> Self {
        Self {
            objects: objects
                .iter()
                .map(|(api_name, label)| ContextObject::new(*api_name, *label))
                .collect(),
        }
    }
}

impl ContextSearch for StaticSearch {
    fn search_objects(&self, term: &str) -> Vec<ContextObject> {
        let needle = term.to_lowercase();
        self.objects
            .iter()
            .filter(|o| {
                o.label.to_lowercase().contains(&needle)
                    || o.api_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }
}

///
/// StaticContext
/// Field values per (object, record); optionally fails every fetch.
///

#[derive(Default)]
pub(crate) struct StaticContext {
    values: BTreeMap<(String, String), BTreeMap<String, Value>>,
    failure: Option<String>,
}

impl StaticContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_record(
        mut self,
        object_name: &str,
        record_id: &str,
        values: &[(&str, Value)],
    ) -> Self {
        self.values.insert(
            (object_name.to_string(), record_id.to_string()),
            values
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
        );
        self
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            values: BTreeMap::new(),
            failure: Some(message.to_string()),
        }
    }
}

impl ContextValues for StaticContext {
    fn field_values(
        &self,
        request: &ValueFetchRequest,
    ) -> Result<BTreeMap<String, Value>, ValueFetchError> {
        if let Some(message) = &self.failure {
            return Err(ValueFetchError {
                object_name: request.object_name().to_string(),
                record_id: request.record_id().to_string(),
                message: message.clone(),
            });
        }

        let key = (
            request.object_name().to_string(),
            request.record_id().to_string(),
        );
        let record = self.values.get(&key).cloned().unwrap_or_default();
        // A real lookup only returns the requested fields.
        Ok(request
            .field_names()
            .iter()
            .filter_map(|name| record.get(name).map(|v| (name.clone(), v.clone())))
            .collect())
    }
}

///
/// ScriptedExecutor
/// Returns a fixed outcome and records every query it was handed.
///

pub(crate) struct ScriptedExecutor {
    outcome: Result<ResultSet, ExecuteError>,
    seen: RefCell<Vec<String>>,
}

impl ScriptedExecutor {
    pub(crate) fn returning(result: ResultSet) -> Self {
        Self {
            outcome: Ok(result),
            seen: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            outcome: Err(ExecuteError::new(message)),
            seen: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }
}

impl QueryExecutor for ScriptedExecutor {
    fn execute(&self, query: &str) -> Result<ResultSet, ExecuteError> {
        self.seen.borrow_mut().push(query.to_string());
        self.outcome.clone()
    }
}
