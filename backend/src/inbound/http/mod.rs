//! HTTP inbound adapter exposing REST endpoints.

pub mod documents;
pub mod error;
pub mod libpreps;
pub mod logs;
pub mod payload;
pub mod projects;
pub mod routes;
pub mod samples;
pub mod seqruns;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod trace;
pub mod users;

pub use error::ApiResult;
