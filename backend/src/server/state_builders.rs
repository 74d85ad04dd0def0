//! Builders wiring the store adapter into the HTTP state ports.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use seqtrack::domain::ports::DocumentStore;
use seqtrack::domain::{EntityConfig, TrackingService, UserAccountsService};
use seqtrack::inbound::http::state::HttpState;

/// Build the handler state over `store`, sharing one clock between services.
pub fn build_http_state(store: Arc<dyn DocumentStore>, entity: EntityConfig) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tracking = Arc::new(TrackingService::new(store.clone(), entity, clock.clone()));
    let users = Arc::new(UserAccountsService::new(store, clock));
    HttpState::new(tracking.clone(), tracking, users.clone(), users)
}
