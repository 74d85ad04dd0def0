//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven: [`DocumentStore`], the revisioned document persistence the core
//! writes through. Driving: the tracking and user account command/query
//! traits that inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod document_store;
mod entity_path;
mod tracking_command;
mod tracking_query;
mod user_accounts_command;
mod user_accounts_query;

#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    DocumentStore, DocumentStoreError, IndexKey, IndexName, IndexRow, KeyPart, KeyRange,
};
pub use entity_path::{
    LibPrepPath, LibPrepScope, ProjectPath, SamplePath, SeqRunPath, SeqRunScope,
};
#[cfg(test)]
pub use tracking_command::MockTrackingCommand;
pub use tracking_command::{SaveRequest, TrackingCommand};
#[cfg(test)]
pub use tracking_query::MockTrackingQuery;
pub use tracking_query::TrackingQuery;
#[cfg(test)]
pub use user_accounts_command::MockUserAccountsCommand;
pub use user_accounts_command::UserAccountsCommand;
#[cfg(test)]
pub use user_accounts_query::MockUserAccountsQuery;
pub use user_accounts_query::UserAccountsQuery;
