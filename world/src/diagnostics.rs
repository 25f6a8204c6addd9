//! Injected sink for network synchronisation diagnostics.
//!
//! Movement predicates may report the context of a decision so replicas can
//! be compared after a desync. Messages are only built when the installed
//! sink reports itself enabled, and nothing recorded here feeds back into a
//! query result.

use std::fmt;
use std::thread::{self, ThreadId};

use skirmish_core::UnitId;

/// Receives synchronisation diagnostics emitted by grid queries.
pub trait SyncDiagnostics: fmt::Debug + Send + Sync {
    /// Whether callers should build and record messages at all.
    fn enabled(&self) -> bool;

    /// Records a message about the decision taken for `unit`.
    fn record(&self, unit: UnitId, message: fmt::Arguments<'_>);
}

/// Sink that drops everything. Installed by default.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDiagnostics;

impl SyncDiagnostics for NoopDiagnostics {
    fn enabled(&self) -> bool {
        false
    }

    fn record(&self, _unit: UnitId, _message: fmt::Arguments<'_>) {}
}

/// Sink that forwards messages to `tracing`.
///
/// Messages recorded on the thread that created the sink go to the
/// `world_synch` target; messages from any other thread go to
/// `world_synch::threaded` so worker output can be filtered separately.
#[derive(Clone, Debug)]
pub struct TracingDiagnostics {
    primary: ThreadId,
}

impl TracingDiagnostics {
    /// Creates a sink that treats the calling thread as the primary
    /// simulation thread.
    #[must_use]
    pub fn new() -> Self {
        Self {
            primary: thread::current().id(),
        }
    }

    /// Reports whether the calling thread is the primary simulation thread.
    #[must_use]
    pub fn on_primary_thread(&self) -> bool {
        thread::current().id() == self.primary
    }
}

impl Default for TracingDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncDiagnostics for TracingDiagnostics {
    fn enabled(&self) -> bool {
        true
    }

    fn record(&self, unit: UnitId, message: fmt::Arguments<'_>) {
        if self.on_primary_thread() {
            tracing::debug!(target: "world_synch", unit = unit.get(), "{message}");
        } else {
            tracing::debug!(target: "world_synch::threaded", unit = unit.get(), "{message}");
        }
    }
}
