//! # Importer Runtime
//!
//! Store runtime for the importer session layer.
//!
//! The [`Store`] owns the session state, runs the reducer for every action,
//! and executes the effects the reducer returns. Actions produced by effects
//! are fed back into the reducer, and once an action and everything it caused
//! have finished, it is broadcast to observers. Request/response callers use
//! [`Store::send_and_wait_for`] to wait on their terminal action.
//!
//! ## Example
//!
//! ```ignore
//! use importer_runtime::Store;
//!
//! let store = Store::new(SessionState::default(), reducer, environment);
//!
//! // Local commit
//! store.send(SessionAction::FacilityUpdated { facility }).await.wait().await;
//!
//! // Read state
//! let token = store.state(|s| s.token.clone()).await;
//! ```

use importer_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur while waiting on the Store
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Timeout waiting for terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`]. Because feedback actions are fully
/// processed inside the effect that produced them, waiting on a handle
/// covers the whole cascade started by the original action.
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a handle together with the tracking context that feeds it
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (handle, _tracking) = Self::new();
        handle
    }

    /// Number of effects still running for this handle
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracker is gone, so nothing can still be running.
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    /// Register a running effect; the returned guard marks it finished on drop
    fn start(&self) -> DecrementGuard {
        self.counter.fetch_add(1, Ordering::SeqCst);
        DecrementGuard(self.clone())
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Runs even if the effect panics, so waiters are never stranded.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        if self.0.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.0.notifier.send(());
        }
    }
}

/// Store module - the runtime for reducers
pub mod store {
    use super::{
        Arc, Duration, Effect, EffectHandle, EffectTracking, Reducer, RwLock, StoreError,
        broadcast,
    };

    struct Inner<S, A, E, R> {
        state: RwLock<S>,
        reducer: R,
        environment: E,
        action_broadcast: broadcast::Sender<A>,
    }

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; the reducer is the only writer)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected collaborators)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Cloning a Store is cheap and every clone shares the same state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        inner: Arc<Inner<S, A, E, R>>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + std::fmt::Debug + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// The action broadcast buffers 64 actions; use
        /// [`Store::with_broadcast_capacity`] when observers may lag further.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, environment, 64)
        }

        /// Create a new Store with custom action broadcast capacity
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity.max(1));

            Self {
                inner: Arc::new(Inner {
                    state: RwLock::new(initial_state),
                    reducer,
                    environment,
                    action_broadcast,
                }),
            }
        }

        /// Access the environment the reducer runs with
        #[must_use]
        pub fn environment(&self) -> &E {
            &self.inner.environment
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Starts the returned effects
        ///
        /// Returns once the effects are started; wait on the returned
        /// [`EffectHandle`] to know when they (and their feedback) are done.
        ///
        /// # Panics
        ///
        /// If the reducer panics, the panic propagates to the caller.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> EffectHandle {
            metrics::counter!("store.commands.total").increment(1);
            tracing::debug!(?action, "Processing action");

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.inner.state.write().await;
                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();
                self.inner
                    .reducer
                    .reduce(&mut state, action, &self.inner.environment)
            };

            tracing::trace!("Reducer returned {} effects", effects.len());
            for effect in effects {
                self.execute_effect(effect, &tracking);
            }

            handle
        }

        /// Send an action and wait for a matching result action
        ///
        /// Subscribes to the action broadcast before sending, then returns the
        /// first broadcast action matching `predicate`. Only actions produced by
        /// effects are broadcast, after their own effects have finished.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action within `timeout`
        /// - [`StoreError::ChannelClosed`]: the broadcast channel closed
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            // Subscribe BEFORE sending to avoid race condition
            let mut rx = self.inner.action_broadcast.subscribe();

            let _handle = self.send(action).await;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to every action produced by effects
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.inner.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.field_mappings.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.inner.state.read().await;
            f(&state)
        }

        /// Reduce a feedback action, wait for its effects, then broadcast it
        async fn feedback(&self, action: A) {
            let mut handle = self.send(action.clone()).await;
            handle.wait().await;

            // No receivers is not an error: nobody is waiting on this action.
            let _ = self.inner.action_broadcast.send(action);
        }

        /// Execute an effect with tracking
        ///
        /// - `None`: No-op
        /// - `Future`: spawned; a produced action goes through [`Self::feedback`]
        /// - `Parallel`: each child started under the same tracking
        /// - `Sequential`: spawned; each child runs to completion before the next
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    let guard = tracking.start();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, feeding back");
                            store.feedback(action).await;
                        }
                    });
                },
                Effect::Parallel(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect, tracking);
                    }
                },
                Effect::Sequential(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "sequential")
                        .increment(1);
                    let guard = tracking.start();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        let total = effects.len();
                        for (idx, effect) in effects.into_iter().enumerate() {
                            tracing::trace!("Executing sequential effect {} of {}", idx + 1, total);
                            let (mut step, step_tracking) = EffectHandle::new();
                            store.execute_effect(effect, &step_tracking);
                            drop(step_tracking);
                            step.wait().await;
                        }
                    });
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }
}

pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;
    use importer_core::{SmallVec, smallvec};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct TestState {
        value: i32,
        log: Vec<&'static str>,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Increment,
        Record(&'static str),
        ProduceEffect,
        ProduceParallelEffects,
        ProduceSequentialEffects,
        StartChain { id: u32 },
        ChainStep { id: u32 },
        ChainDone { id: u32 },
        ProducePanickingEffect,
    }

    #[derive(Clone, Default)]
    struct TestEnv {
        calls: Arc<Mutex<Vec<u32>>>,
    }

    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::Record(entry) => {
                    state.log.push(entry);
                    smallvec![Effect::None]
                },
                TestAction::ProduceEffect => smallvec![Effect::send(TestAction::Increment)],
                TestAction::ProduceParallelEffects => smallvec![Effect::merge(vec![
                    Effect::send(TestAction::Increment),
                    Effect::send(TestAction::Increment),
                    Effect::send(TestAction::Increment),
                ])],
                TestAction::ProduceSequentialEffects => smallvec![Effect::chain(vec![
                    Effect::future(async {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Some(TestAction::Record("slow"))
                    }),
                    Effect::send(TestAction::Record("fast")),
                    Effect::send(TestAction::Record("last")),
                ])],
                TestAction::StartChain { id } => {
                    smallvec![Effect::send(TestAction::ChainStep { id })]
                },
                TestAction::ChainStep { id } => {
                    let calls = Arc::clone(&env.calls);
                    smallvec![Effect::future(async move {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        if let Ok(mut calls) = calls.lock() {
                            calls.push(id);
                        }
                        Some(TestAction::ChainDone { id })
                    })]
                },
                TestAction::ChainDone { .. } => {
                    state.value += 10;
                    smallvec![Effect::None]
                },
                TestAction::ProducePanickingEffect => {
                    #[allow(clippy::panic)] // Intentional panic for testing isolation
                    {
                        smallvec![Effect::future(async {
                            panic!("Intentional panic in effect for testing");
                        })]
                    }
                },
            }
        }
    }

    fn test_store() -> Store<TestState, TestAction, TestEnv, TestReducer> {
        Store::new(TestState::default(), TestReducer, TestEnv::default())
    }

    #[tokio::test]
    async fn test_send_action() {
        let store = test_store();

        let handle = store.send(TestAction::Increment).await;
        assert_eq!(handle.pending(), 0);
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_effect_future_feeds_back() {
        let store = test_store();

        let mut handle = store.send(TestAction::ProduceEffect).await;
        handle.wait().await;

        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_effect_parallel() {
        let store = test_store();

        let mut handle = store.send(TestAction::ProduceParallelEffects).await;
        handle.wait().await;

        assert_eq!(store.state(|s| s.value).await, 3);
    }

    #[tokio::test]
    async fn test_effect_sequential_preserves_order() {
        let store = test_store();

        let mut handle = store.send(TestAction::ProduceSequentialEffects).await;
        handle.wait().await;

        let log = store.state(|s| s.log.clone()).await;
        assert_eq!(log, vec!["slow", "fast", "last"]);
    }

    #[tokio::test]
    async fn test_wait_covers_feedback_cascade() {
        let store = test_store();

        let mut handle = store.send(TestAction::StartChain { id: 1 }).await;
        handle.wait().await;

        assert_eq!(store.state(|s| s.value).await, 10);
        assert_eq!(*store.environment().calls.lock().unwrap_or_else(std::sync::PoisonError::into_inner), vec![1]);
    }

    #[tokio::test]
    async fn test_send_and_wait_for_matches_terminal_action() -> Result<(), StoreError> {
        let store = test_store();

        let result = store
            .send_and_wait_for(
                TestAction::StartChain { id: 7 },
                |a| matches!(a, TestAction::ChainDone { id: 7 }),
                Duration::from_secs(1),
            )
            .await?;

        assert_eq!(result, TestAction::ChainDone { id: 7 });
        // The terminal action was reduced before it was broadcast
        assert_eq!(store.state(|s| s.value).await, 10);
        Ok(())
    }

    #[tokio::test]
    async fn test_send_and_wait_for_ignores_other_correlations() -> Result<(), StoreError> {
        let store = test_store();

        let (first, second) = tokio::join!(
            store.send_and_wait_for(
                TestAction::StartChain { id: 1 },
                |a| matches!(a, TestAction::ChainDone { id: 1 }),
                Duration::from_secs(1),
            ),
            store.send_and_wait_for(
                TestAction::StartChain { id: 2 },
                |a| matches!(a, TestAction::ChainDone { id: 2 }),
                Duration::from_secs(1),
            ),
        );

        assert_eq!(first?, TestAction::ChainDone { id: 1 });
        assert_eq!(second?, TestAction::ChainDone { id: 2 });
        Ok(())
    }

    #[tokio::test]
    async fn test_send_and_wait_for_times_out() {
        let store = test_store();

        let result = store
            .send_and_wait_for(
                TestAction::Increment,
                |a| matches!(a, TestAction::ChainDone { .. }),
                Duration::from_millis(20),
            )
            .await;

        assert_eq!(result, Err(StoreError::Timeout));
    }

    #[tokio::test]
    async fn test_store_clone_shares_state() {
        let store1 = test_store();
        let store2 = store1.clone();

        let _ = store1.send(TestAction::Increment).await;
        assert_eq!(store2.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_effect_panic_isolation() {
        let store = test_store();

        let mut handle = store.send(TestAction::ProducePanickingEffect).await;
        handle.wait().await;

        // Store keeps working after a panicking effect
        let _ = store.send(TestAction::Increment).await;
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_completed_handle_does_not_block() -> Result<(), StoreError> {
        let mut handle = EffectHandle::completed();
        handle.wait_with_timeout(Duration::from_millis(10)).await
    }
}
