//! Mock provider implementations for testing.
//!
//! In-memory, deterministic implementations of every provider trait. The
//! user service behaves like a small backend; the others record what they
//! were asked to do.

pub mod recording;
pub mod user;

pub use recording::{ConfigEvent, RecordingConfigAdapter, RecordingNotifier, RecordingOrderList};
pub use user::MockUserService;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mock's shared state, ignoring poisoning from a panicked test.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
