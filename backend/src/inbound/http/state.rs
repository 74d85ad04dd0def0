//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    TrackingCommand, TrackingQuery, UserAccountsCommand, UserAccountsQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Entity writes.
    pub tracking: Arc<dyn TrackingCommand>,
    /// Entity reads, listings, logs and raw documents.
    pub tracking_query: Arc<dyn TrackingQuery>,
    /// Account writes.
    pub users: Arc<dyn UserAccountsCommand>,
    /// Account lookups.
    pub users_query: Arc<dyn UserAccountsQuery>,
}

impl HttpState {
    /// Bundle the entity and account ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use seqtrack::domain::{EntityConfig, TrackingService, UserAccountsService};
    /// use seqtrack::inbound::http::state::HttpState;
    /// use seqtrack::outbound::persistence::MemoryDocumentStore;
    ///
    /// let store = Arc::new(MemoryDocumentStore::default());
    /// let clock = Arc::new(DefaultClock);
    /// let tracking = Arc::new(TrackingService::new(
    ///     store.clone(),
    ///     EntityConfig::default(),
    ///     clock.clone(),
    /// ));
    /// let users = Arc::new(UserAccountsService::new(store, clock));
    /// let _state = HttpState::new(tracking.clone(), tracking, users.clone(), users);
    /// ```
    #[must_use]
    pub fn new(
        tracking: Arc<dyn TrackingCommand>,
        tracking_query: Arc<dyn TrackingQuery>,
        users: Arc<dyn UserAccountsCommand>,
        users_query: Arc<dyn UserAccountsQuery>,
    ) -> Self {
        Self {
            tracking,
            tracking_query,
            users,
            users_query,
        }
    }
}
