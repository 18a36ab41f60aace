
use crate::{
    config::{CONFIG_SCHEMA_VERSION, DisplayOptions, TableConfig, ViewState},
    error::{Error, ErrorKind, ErrorOrigin},
    interface::{
        ConfigId, ConfigStore, ContextObject, ContextSearch, ContextValues, QueryExecutor,
        SchemaDiscovery, ValueFetchError,
    },
};
use gridmeld_core::{
    DEFAULT_ROW_LIMIT, compile,
    error::ResolveError,
    field::{FieldDescriptor, FieldSet, VisibilityFilter},
    preview::{self, Placeholders},
    reconcile::reconcile,
    render::{RenderedTable, SortDirection},
    resolve::{ResolutionState, Resolver, ValueFetchRequest},
    value::Value,
};
use std::collections::BTreeMap;

///
/// SessionState
///
/// Transient builder-session state: everything the operator fiddles with
/// that is not part of the persisted configuration's core shape. Kept as
/// its own aggregate so persistence and session concerns never blur.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SessionState {
    pub visibility_filter: VisibilityFilter,
    pub context_search_term: String,
    pub context_object_label: Option<String>,
}

///
/// ConfigSession
///
/// One configuration-builder session: owns the field set, the filter
/// clause, the context selection, and the resolution machinery, and
/// drives the collaborators. Single-writer; a fetch completion arriving
/// after the state it was fetched for has changed is discarded by the
/// resolver's snapshot check.
///
/// Suspension points are exactly schema discovery, context value
/// fetches, and query execution — each is an explicit collaborator
/// argument on the method that needs it.
///

#[derive(Clone, Debug)]
pub struct ConfigSession {
    object_name: String,
    fields: FieldSet,
    filter_clause: String,
    row_limit: u32,
    default_sort_field: Option<String>,
    default_sort_direction: SortDirection,
    display_options: DisplayOptions,
    state: SessionState,
    resolver: Resolver,
    placeholders: Placeholders,
    pending_fetch: Option<ValueFetchRequest>,
}

impl Default for ConfigSession {
    fn default() -> Self {
        Self {
            object_name: String::new(),
            fields: FieldSet::new(),
            filter_clause: String::new(),
            row_limit: DEFAULT_ROW_LIMIT,
            default_sort_field: None,
            default_sort_direction: SortDirection::default(),
            display_options: DisplayOptions::default(),
            state: SessionState::default(),
            resolver: Resolver::new(),
            placeholders: Placeholders::default(),
            pending_fetch: None,
        }
    }
}

impl ConfigSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session with host-supplied singleton placeholder identities.
    #[must_use]
    pub fn with_placeholders(placeholders: Placeholders) -> Self {
        Self {
            placeholders,
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    #[must_use]
    pub const fn fields(&self) -> &FieldSet {
        &self.fields
    }

    #[must_use]
    pub fn filter_clause(&self) -> &str {
        &self.filter_clause
    }

    #[must_use]
    pub const fn row_limit(&self) -> u32 {
        self.row_limit
    }

    #[must_use]
    pub const fn display_options(&self) -> &DisplayOptions {
        &self.display_options
    }

    #[must_use]
    pub const fn session_state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    #[must_use]
    pub fn resolution_state(&self) -> ResolutionState {
        self.resolver.state()
    }

    // ------------------------------------------------------------------
    // Object and field configuration
    // ------------------------------------------------------------------

    /// Point the session at a different object. The field set is
    /// replaced wholesale by the next discovery; stale fields from the
    /// previous object never leak into a compile.
    pub fn set_object_name(&mut self, object_name: impl Into<String>) {
        let object_name = object_name.into();
        if object_name != self.object_name {
            self.object_name = object_name;
            self.fields = FieldSet::new();
            self.sync_tokens();
        }
    }

    /// Fetch the object's fields and replace the field set.
    ///
    /// On discovery failure the field set is cleared and the error
    /// surfaced; the operator corrects the input and retries manually.
    pub fn reload_fields(&mut self, discovery: &impl SchemaDiscovery) -> Result<(), Error> {
        if self.object_name.is_empty() {
            return Err(Error::validation("select an object before loading fields"));
        }

        let outcome = discovery
            .list_fields(&self.object_name)
            .map_err(Error::from)
            .and_then(|rows| FieldSet::load_from(rows).map_err(Error::from));

        match outcome {
            Ok(fields) => {
                self.fields = fields;
                self.sync_tokens();
                Ok(())
            }
            Err(err) => {
                self.fields = FieldSet::new();
                self.sync_tokens();
                Err(err)
            }
        }
    }

    pub fn set_field_visible(&mut self, field_name: &str, visible: bool) {
        self.fields.set_visible(field_name, visible);
        self.sync_tokens();
    }

    pub fn set_field_label(&mut self, field_name: &str, label: impl Into<String>) {
        self.fields.set_label(field_name, label);
    }

    pub fn set_field_sortable(&mut self, field_name: &str, sortable: bool) {
        self.fields.set_sortable(field_name, sortable);
    }

    pub fn move_field_up(&mut self, field_name: &str) {
        self.fields.move_up(field_name);
    }

    pub fn move_field_down(&mut self, field_name: &str) {
        self.fields.move_down(field_name);
    }

    /// Drop-style reorder: whatever input mechanism the host uses, the
    /// data transformation is this one pure operation.
    pub fn reorder_fields(&mut self, moved: &str, target: &str, insert_after: bool) {
        self.fields.reorder(moved, target, insert_after);
    }

    pub fn select_all_fields(&mut self) {
        self.fields.select_all();
        self.sync_tokens();
    }

    pub fn deselect_all_fields(&mut self) {
        self.fields.deselect_all();
        self.sync_tokens();
    }

    pub const fn set_visibility_filter(&mut self, filter: VisibilityFilter) {
        self.state.visibility_filter = filter;
    }

    /// The field list as the operator's current visibility filter shows it.
    pub fn filtered_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.filtered_view(self.state.visibility_filter)
    }

    // ------------------------------------------------------------------
    // Filter clause, limits, sort defaults, display options
    // ------------------------------------------------------------------

    /// Replace the raw filter clause. Re-scans merge tokens; when a
    /// context record is already selected and the token set changed, a
    /// value fetch is queued for [`Self::take_pending_fetch`].
    pub fn set_filter_clause(&mut self, clause: impl Into<String>) {
        self.filter_clause = clause.into();
        self.sync_tokens();
    }

    pub fn set_row_limit(&mut self, row_limit: u32) {
        self.row_limit = row_limit;
        self.sync_tokens();
    }

    pub fn set_default_sort(&mut self, field: Option<String>, direction: SortDirection) {
        self.default_sort_field = field;
        self.default_sort_direction = direction;
    }

    pub const fn set_display_options(&mut self, options: DisplayOptions) {
        self.display_options = options;
    }

    // ------------------------------------------------------------------
    // Context selection and value resolution
    // ------------------------------------------------------------------

    pub fn set_context_search_term(&mut self, term: impl Into<String>) {
        self.state.context_search_term = term.into();
    }

    /// Free-text search for candidate context objects.
    pub fn search_context_objects(&self, search: &impl ContextSearch) -> Vec<ContextObject> {
        search.search_objects(&self.state.context_search_term)
    }

    pub fn select_context_object(&mut self, object: &ContextObject) {
        self.state.context_object_label = Some(object.label.clone());
        self.resolver.select_object(object.api_name.clone());
        self.pending_fetch = None;
    }

    pub fn clear_context_object(&mut self) {
        self.state.context_object_label = None;
        self.resolver.clear_object();
        self.pending_fetch = None;
    }

    /// Select the context record whose field values fill merge tokens.
    /// Queues a value fetch when unresolved tokens are waiting on one.
    pub fn select_context_record(&mut self, record_id: impl Into<String>) -> Result<(), Error> {
        let Some(object_name) = self.resolver.selection().object_name.clone() else {
            return Err(Error::validation(
                "select a context object before choosing a record",
            ));
        };

        if let Some(request) = self.resolver.select_record(object_name, record_id.into()) {
            self.pending_fetch = Some(request);
        }
        Ok(())
    }

    pub fn clear_context_record(&mut self) {
        self.resolver.clear_record();
        self.pending_fetch = None;
    }

    /// Take the queued value fetch, if any. The host performs it and
    /// hands the completion to [`Self::apply_context_values`]; a newer
    /// queued fetch supersedes an untaken older one.
    pub fn take_pending_fetch(&mut self) -> Option<ValueFetchRequest> {
        self.pending_fetch.take()
    }

    /// Apply a value-fetch completion. Out-of-order completions for a
    /// selection that has since changed are discarded inside the
    /// resolver; fresh failures surface as resolution errors.
    pub fn apply_context_values(
        &mut self,
        request: &ValueFetchRequest,
        result: Result<BTreeMap<String, Value>, ValueFetchError>,
    ) -> Result<(), Error> {
        self.resolver
            .apply_values(request, result.map_err(|err| ResolveError::new(err.to_string())))
            .map_err(Error::from)
    }

    /// Convenience driver: perform the queued fetch (if any) against a
    /// synchronous collaborator and apply its completion.
    pub fn resolve_pending(&mut self, source: &impl ContextValues) -> Result<(), Error> {
        let Some(request) = self.take_pending_fetch() else {
            return Ok(());
        };
        let result = source.field_values(&request);
        self.apply_context_values(&request, result)
    }

    // ------------------------------------------------------------------
    // Compilation, preview, execution
    // ------------------------------------------------------------------

    /// The template query with placeholder text still embedded.
    #[must_use]
    pub fn compiled_query(&self) -> String {
        compile::compile(
            &self.object_name,
            &self.fields,
            &self.filter_clause,
            self.row_limit,
        )
    }

    /// The human-visible preview: empty while resolution is pending.
    #[must_use]
    pub fn preview(&self) -> String {
        preview::assemble(&self.compiled_query(), &self.resolver, &self.placeholders)
    }

    /// The executable query, or the reason there is none yet.
    pub fn executable_query(&self) -> Result<String, Error> {
        let compiled = self.compiled_query();
        if compiled.is_empty() {
            return Err(Error::new(
                ErrorKind::Validation,
                ErrorOrigin::Compile,
                "nothing to execute: select an object and at least one visible field",
            ));
        }

        let assembled = preview::assemble(&compiled, &self.resolver, &self.placeholders);
        if assembled.is_empty() {
            return Err(match self.resolver.state() {
                ResolutionState::AwaitingRecord => Error::new(
                    ErrorKind::Resolution,
                    ErrorOrigin::Resolve,
                    "select a context record to resolve merge fields",
                ),
                ResolutionState::AwaitingValues => Error::new(
                    ErrorKind::Resolution,
                    ErrorOrigin::Resolve,
                    "context record values have not been fetched yet",
                ),
                ResolutionState::Error => self.resolver.last_error().map_or_else(
                    || {
                        Error::new(
                            ErrorKind::Resolution,
                            ErrorOrigin::Resolve,
                            "context value fetch failed",
                        )
                    },
                    |err| Error::from(err.clone()),
                ),
                ResolutionState::NoTokens | ResolutionState::Resolved => Error::new(
                    ErrorKind::Internal,
                    ErrorOrigin::Session,
                    "assembled query is empty for a resolved template",
                ),
            });
        }

        Ok(assembled)
    }

    /// Execute the assembled query and shape the result for display,
    /// applying the configured label overrides and default sort.
    ///
    /// An execution failure returns the error and nothing else: callers
    /// drop previously rendered data rather than keep it stale.
    pub fn run(&self, executor: &impl QueryExecutor) -> Result<RenderedTable, Error> {
        let query = self.executable_query()?;
        let result = executor.execute(&query).map_err(Error::from)?;

        let overrides = compile::column_label_map(&self.fields);
        let mut table = RenderedTable::new(result, &overrides);
        if let Some(field) = &self.default_sort_field {
            table.sort(field, self.default_sort_direction);
        }
        Ok(table)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Full current-shape snapshot for persistence.
    #[must_use]
    pub fn snapshot(&self) -> TableConfig {
        TableConfig {
            schema_version: CONFIG_SCHEMA_VERSION,
            object_name: self.object_name.clone(),
            fields: self.fields.iter().map(Into::into).collect(),
            filter_clause: self.filter_clause.clone(),
            row_limit: self.row_limit,
            default_sort_field: self.default_sort_field.clone(),
            default_sort_direction: self.default_sort_direction,
            display_options: self.display_options.clone(),
            view_state: ViewState {
                field_visibility_filter: self.state.visibility_filter,
                context_object_name: self.resolver.selection().object_name.clone(),
                context_object_label: self.state.context_object_label.clone(),
                context_search_term: self.state.context_search_term.clone(),
                context_record_id: self.resolver.selection().record_id.clone(),
            },
        }
    }

    /// Apply a loaded configuration, reconciling its saved field list
    /// against a fresh discovery of the same object.
    ///
    /// Nothing is mutated until discovery and reconciliation have both
    /// succeeded: a failed load leaves the previous state untouched.
    /// Resolved context values never survive a load; the selection
    /// identity is restored and a fresh fetch queued when tokens need it.
    pub fn load_config(
        &mut self,
        config: TableConfig,
        discovery: &impl SchemaDiscovery,
    ) -> Result<(), Error> {
        let discovered_rows = discovery
            .list_fields(&config.object_name)
            .map_err(Error::from)?;
        let discovered = FieldSet::load_from(discovered_rows).map_err(Error::from)?;
        let fields = reconcile(&config.saved_fields(), &discovered);

        self.object_name = config.object_name;
        self.fields = fields;
        self.filter_clause = config.filter_clause;
        self.row_limit = config.row_limit;
        self.default_sort_field = config.default_sort_field;
        self.default_sort_direction = config.default_sort_direction;
        self.display_options = config.display_options;
        self.state = SessionState {
            visibility_filter: config.view_state.field_visibility_filter,
            context_search_term: config.view_state.context_search_term,
            context_object_label: config.view_state.context_object_label,
        };
        self.resolver = Resolver::new();
        self.pending_fetch = None;

        if let Some(object_name) = config.view_state.context_object_name {
            match config.view_state.context_record_id {
                // No tokens are known yet, so this never starts a fetch;
                // sync_tokens below queues one when the template needs it.
                Some(record_id) => drop(self.resolver.select_record(object_name, record_id)),
                None => self.resolver.select_object(object_name),
            }
        }
        self.sync_tokens();
        Ok(())
    }

    /// Persist the current snapshot under `name`.
    pub fn save_to(
        &self,
        store: &mut impl ConfigStore,
        name: &str,
    ) -> Result<ConfigId, Error> {
        store.save(name, &self.snapshot()).map_err(Error::from)
    }

    /// Load a stored configuration into this session.
    pub fn load_from(
        &mut self,
        store: &impl ConfigStore,
        id: ConfigId,
        discovery: &impl SchemaDiscovery,
    ) -> Result<(), Error> {
        let config = store.load(id).map_err(Error::from)?;
        self.load_config(config, discovery)
    }

    /// Discard everything except the placeholder identities.
    pub fn reset(&mut self) {
        *self = Self {
            placeholders: self.placeholders.clone(),
            ..Self::default()
        };
    }

    // ------------------------------------------------------------------
    // Internal
    // ------------------------------------------------------------------

    /// Re-scan merge tokens against the current compiled query and queue
    /// any fetch the resolver asks for.
    fn sync_tokens(&mut self) {
        let compiled = self.compiled_query();
        if let Some(request) = self.resolver.rescan(&compiled) {
            self.pending_fetch = Some(request);
        }
    }
}
