//! # Importer Testing
//!
//! Testing utilities for reducers built on `importer-core`.
//!
//! - [`ReducerTest`]: Given-When-Then builder for pure reducer transitions
//! - [`assertions`]: helpers for inspecting returned effects
//! - [`run_effects`]: drive effects to completion without a `Store`
//! - [`init_test_tracing`]: opt-in log output for a test run
//!
//! ## Example
//!
//! ```ignore
//! use importer_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(SessionReducer::new())
//!     .with_env(test_environment())
//!     .given_state(SessionState::default())
//!     .when_action(SessionAction::FacilityUpdated { facility })
//!     .then_state(|state| assert!(state.current_facility.is_some()))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```


pub use reducer_test::{ReducerTest, assertions, run_effects};

/// Install a `tracing` subscriber for tests, honouring `RUST_LOG`
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
