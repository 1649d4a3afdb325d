//! # Importer Session
//!
//! Session, preferences, and field-mapping state for the importer client.
//!
//! The UI talks to a [`SessionController`]. Every operation becomes an action
//! reduced by the [`SessionReducer`]; remote calls run as effects against a
//! [`UserService`](providers::UserService) and come back as outcome actions
//! that the reducer commits.
//!
//! ```text
//! UI → SessionController → Store → SessionReducer → Effects → UserService
//!                             ▲                                    │
//!                             └──────────── outcome action ◄───────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use importer_session::mocks::{
//!     MockUserService, RecordingConfigAdapter, RecordingNotifier, RecordingOrderList,
//! };
//! use importer_session::{SessionConfig, SessionController};
//!
//! # tokio_test::block_on(async {
//! let controller = SessionController::new(
//!     MockUserService::new().with_account("alice", "secret"),
//!     RecordingNotifier::new(),
//!     RecordingConfigAdapter::new(),
//!     RecordingOrderList::new(),
//!     SessionConfig::default(),
//! );
//!
//! controller.login("alice", "secret").await?;
//! assert!(controller.is_authenticated().await);
//!
//! controller.logout().await;
//! assert!(!controller.is_authenticated().await);
//! # Ok::<(), importer_session::SessionError>(())
//! # }).unwrap();
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod actions;
pub mod api;
pub mod codec;
pub mod config;
pub mod constants;
pub mod controller;
pub mod effects;
pub mod environment;
pub mod error;
pub mod providers;
pub mod reducer;
pub mod state;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use actions::SessionAction;
pub use api::ApiResponse;
pub use config::SessionConfig;
pub use controller::{SessionController, SessionStore};
pub use environment::SessionEnvironment;
pub use error::{CodecError, ErrorKind, Operation, Result, ServiceError, SessionError};
pub use reducer::SessionReducer;
pub use state::SessionState;
pub use types::{
    Facility, FieldMapping, FieldMappingDraft, FieldMappingId, FieldMappingValue, LoginPayload,
    Password, UserProfile,
};
