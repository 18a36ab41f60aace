use serde::Serialize;
use std::cell::RefCell;

///
/// Metrics
/// Ephemeral, in-memory counters for engine operations.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventState {
    pub ops: EventOps,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventOps {
    // Template assembly
    pub compiles: u64,
    pub token_scans: u64,
    pub previews_assembled: u64,

    // Context value resolution
    pub value_fetches_started: u64,
    pub value_fetches_applied: u64,
    pub value_fetches_stale: u64,
    pub value_fetch_failures: u64,

    // Client-side rendering
    pub tables_rendered: u64,
    pub client_sorts: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Point-in-time snapshot of all counters.
#[must_use]
pub fn report() -> EventState {
    with_state(Clone::clone)
}

/// Reset all counters (useful in tests).
pub fn reset() {
    with_state_mut(|m| *m = EventState::default());
}

pub(crate) fn record_compile() {
    with_state_mut(|m| m.ops.compiles += 1);
}

pub(crate) fn record_token_scan() {
    with_state_mut(|m| m.ops.token_scans += 1);
}

pub(crate) fn record_preview() {
    with_state_mut(|m| m.ops.previews_assembled += 1);
}

pub(crate) fn record_value_fetch_started() {
    with_state_mut(|m| m.ops.value_fetches_started += 1);
}

pub(crate) fn record_value_fetch_applied() {
    with_state_mut(|m| m.ops.value_fetches_applied += 1);
}

pub(crate) fn record_value_fetch_stale() {
    with_state_mut(|m| m.ops.value_fetches_stale += 1);
}

pub(crate) fn record_value_fetch_failed() {
    with_state_mut(|m| m.ops.value_fetch_failures += 1);
}

pub(crate) fn record_render() {
    with_state_mut(|m| m.ops.tables_rendered += 1);
}

pub(crate) fn record_sort() {
    with_state_mut(|m| m.ops.client_sorts += 1);
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_reset() {
        reset();
        record_compile();
        record_compile();
        record_value_fetch_stale();

        let snapshot = report();
        assert_eq!(snapshot.ops.compiles, 2);
        assert_eq!(snapshot.ops.value_fetches_stale, 1);

        reset();
        assert_eq!(report().ops.compiles, 0);
    }
}
