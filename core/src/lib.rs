//! # Importer Core
//!
//! Core traits and types for the importer session store.
//!
//! The session layer is built as a reducer over a single owned state value:
//!
//! - **State**: everything the UI reads (token, profile, preferences, mappings)
//! - **Action**: commands issued by the UI and the commits they produce
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: descriptions of remote calls and notifications
//! - **Environment**: the collaborators, injected via traits
//!
//! ## Example
//!
//! ```
//! use importer_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Default)]
//! struct FacilityState {
//!     facility: Option<String>,
//! }
//!
//! enum FacilityAction {
//!     Select(String),
//! }
//!
//! struct FacilityReducer;
//!
//! impl Reducer for FacilityReducer {
//!     type State = FacilityState;
//!     type Action = FacilityAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut FacilityState,
//!         action: FacilityAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<FacilityAction>; 4]> {
//!         match action {
//!             FacilityAction::Select(id) => {
//!                 state.facility = Some(id);
//!                 smallvec![Effect::None]
//!             }
//!         }
//!     }
//! }
//!
//! let mut state = FacilityState::default();
//! let effects = FacilityReducer.reduce(&mut state, FacilityAction::Select("WH-1".into()), &());
//! assert_eq!(state.facility.as_deref(), Some("WH-1"));
//! assert_eq!(effects.len(), 1);
//! ```

pub use smallvec::{SmallVec, smallvec};

/// Reducer module - the trait that owns all state transitions
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected collaborators this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Updates state in place and returns effect descriptions for the
        /// runtime to execute. Must not perform I/O itself.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
///
/// Effects are values, not execution. The runtime decides when and how they
/// run, and feeds any produced action back into the reducer.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Run effects one after another; each completes, feedback included,
        /// before the next starts
        Sequential(Vec<Effect<Action>>),

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Wrap an async block as an `Effect::Future`
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Wrap a synchronous side effect that produces no action
        ///
        /// Used for fire-and-forget collaborators (toasts, configuration
        /// updates) so the reducer itself stays free of I/O.
        pub fn run<F>(f: F) -> Effect<Action>
        where
            F: FnOnce() + Send + 'static,
            Action: 'static,
        {
            Effect::Future(Box::pin(async move {
                f();
                None
            }))
        }

        /// Dispatch an action back into the store as a follow-up
        pub fn send(action: Action) -> Effect<Action>
        where
            Action: Send + 'static,
        {
            Effect::Future(Box::pin(async move { Some(action) }))
        }

        /// Returns `true` for `Effect::None`
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}
