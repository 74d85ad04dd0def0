//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use tracing::info;

use seqtrack::inbound::http::routes::api_scope;
use seqtrack::inbound::http::trace::RequestTrace;
use seqtrack::outbound::persistence::MemoryDocumentStore;
use state_builders::build_http_state;

/// Construct an Actix HTTP server from `config`.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: &ServerConfig) -> std::io::Result<Server> {
    let store = Arc::new(MemoryDocumentStore::new());
    let http_state = web::Data::new(build_http_state(store, config.entity));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(http_state.clone())
            .wrap(RequestTrace)
            .service(api_scope())
    })
    .bind(config.bind_addr())?
    .run();

    info!(
        bind_addr = %config.bind_addr(),
        seqrun_id_policy = %config.entity.seqrun_id_policy(),
        "server listening"
    );
    Ok(server)
}
