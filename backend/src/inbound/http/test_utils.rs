//! Helpers for handler tests built on mocked driving ports.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::domain::ports::{
    MockTrackingCommand, MockTrackingQuery, MockUserAccountsCommand, MockUserAccountsQuery,
};
use crate::inbound::http::routes::api_scope;
use crate::inbound::http::state::HttpState;

/// Mocks backing one test application; unset expectations fail the test.
#[derive(Default)]
pub struct MockPorts {
    /// Entity writes.
    pub tracking: MockTrackingCommand,
    /// Entity reads.
    pub tracking_query: MockTrackingQuery,
    /// Account writes.
    pub users: MockUserAccountsCommand,
    /// Account lookups.
    pub users_query: MockUserAccountsQuery,
}

impl MockPorts {
    /// Bundle the mocks as handler state.
    pub fn into_state(self) -> HttpState {
        HttpState::new(
            Arc::new(self.tracking),
            Arc::new(self.tracking_query),
            Arc::new(self.users),
            Arc::new(self.users_query),
        )
    }
}

/// Application serving the full API over `ports`.
pub fn test_app(
    ports: MockPorts,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .service(api_scope())
}
