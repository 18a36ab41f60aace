//! Observability: ephemeral in-memory counters for engine activity.
//!
//! This module never reaches into engine state; the engine records events
//! into it as they happen. Hosts read point-in-time snapshots through
//! [`report`] and ship them wherever they ship telemetry.

pub(crate) mod metrics;

pub use metrics::{EventOps, EventState, report, reset};
