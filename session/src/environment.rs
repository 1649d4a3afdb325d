//! Session environment.
//!
//! Holds the collaborators and configuration the session reducer runs with.

use crate::config::SessionConfig;
use crate::providers::{ConfigAdapter, Notifier, OrderList, UserService};

/// Session environment.
///
/// # Type Parameters
///
/// - `U`: Remote user service
/// - `N`: Notifier (translation and toasts)
/// - `C`: Configuration adapter
/// - `O`: Sibling order list
#[derive(Clone, Debug)]
pub struct SessionEnvironment<U, N, C, O>
where
    U: UserService + Clone,
    N: Notifier + Clone,
    C: ConfigAdapter + Clone,
    O: OrderList + Clone,
{
    /// Remote user service.
    pub users: U,

    /// Translation and toasts.
    pub notifier: N,

    /// Process-wide token and instance URL.
    pub config_adapter: C,

    /// Order list cleared on logout.
    pub orders: O,

    /// Session configuration.
    pub config: SessionConfig,
}

impl<U, N, C, O> SessionEnvironment<U, N, C, O>
where
    U: UserService + Clone,
    N: Notifier + Clone,
    C: ConfigAdapter + Clone,
    O: OrderList + Clone,
{
    /// Create a new session environment.
    #[must_use]
    pub const fn new(
        users: U,
        notifier: N,
        config_adapter: C,
        orders: O,
        config: SessionConfig,
    ) -> Self {
        Self {
            users,
            notifier,
            config_adapter,
            orders,
            config,
        }
    }
}
