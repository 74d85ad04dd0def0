//! Route table for the `/api/v1` scope.

use actix_web::{Scope, web};

use crate::inbound::http::documents::get_document;
use crate::inbound::http::error::malformed_json;
use crate::inbound::http::libpreps::{
    create_libprep, delete_libprep, get_libprep, list_project_libpreps, list_sample_libpreps,
    update_libprep,
};
use crate::inbound::http::logs::get_logs;
use crate::inbound::http::payload::API_PREFIX;
use crate::inbound::http::projects::{
    create_project, delete_project, get_project, list_projects, update_project,
};
use crate::inbound::http::samples::{
    create_sample, delete_sample, get_sample, list_samples, update_sample,
};
use crate::inbound::http::seqruns::{
    create_seqrun, delete_seqrun, get_seqrun, list_libprep_seqruns, list_project_seqruns,
    list_sample_seqruns, update_seqrun,
};
use crate::inbound::http::users::{get_user, issue_api_token, register_user, update_user};

/// Every entity, listing, log, document and account endpoint.
///
/// Handlers expect [`HttpState`](crate::inbound::http::state::HttpState) in
/// the application data.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use seqtrack::inbound::http::routes::api_scope;
///
/// let _app = App::new().service(api_scope());
/// ```
#[must_use]
pub fn api_scope() -> Scope {
    web::scope(API_PREFIX)
        .app_data(
            web::JsonConfig::default().error_handler(|err, _req| malformed_json(&err).into()),
        )
        .service(create_project)
        .service(get_project)
        .service(update_project)
        .service(delete_project)
        .service(list_projects)
        .service(create_sample)
        .service(get_sample)
        .service(update_sample)
        .service(delete_sample)
        .service(list_samples)
        .service(create_libprep)
        .service(get_libprep)
        .service(update_libprep)
        .service(delete_libprep)
        .service(list_project_libpreps)
        .service(list_sample_libpreps)
        .service(create_seqrun)
        .service(get_seqrun)
        .service(update_seqrun)
        .service(delete_seqrun)
        .service(list_project_seqruns)
        .service(list_sample_seqruns)
        .service(list_libprep_seqruns)
        .service(get_logs)
        .service(get_document)
        .service(register_user)
        .service(issue_api_token)
        .service(get_user)
        .service(update_user)
}
