//! Process-wide engine
//!
//! For callers that want a single shared delegate table instead of passing an
//! engine around. The engine is created on first use and lives until the
//! process exits; [`reset`] is the only way to release its records.

use crate::engine::{EngineStats, InheritanceEngine};
use once_cell::sync::Lazy;
use parking_lot::Mutex;

static ENGINE: Lazy<Mutex<InheritanceEngine>> = Lazy::new(|| Mutex::new(InheritanceEngine::new()));

/// Run `f` with exclusive access to the process-wide engine
///
/// Record handles stay valid across calls until [`reset`]. The lock is not
/// reentrant: calling [`with_engine`], [`reset`] or [`stats`] from inside `f`
/// deadlocks. Use the `&mut InheritanceEngine` passed to `f` instead.
pub fn with_engine<R>(f: impl FnOnce(&mut InheritanceEngine) -> R) -> R {
    let mut engine = ENGINE.lock();
    f(&mut engine)
}

/// Drop every record of the process-wide engine
pub fn reset() {
    ENGINE.lock().reset();
}

/// Sizes of the process-wide engine
pub fn stats() -> EngineStats {
    ENGINE.lock().stats()
}
