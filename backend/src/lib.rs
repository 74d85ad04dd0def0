//! Sequencing lab entity tracking.
//!
//! Projects, samples, library preparations and sequencing runs are stored as
//! revisioned documents. The [`domain`] core validates field values, enforces
//! identifier uniqueness within a parent, cascades deletes, keeps sample
//! totals rolled up and writes an audit log. [`inbound::http`] exposes it as
//! a REST API; [`outbound::persistence`] provides the document store.

pub mod domain;
pub mod inbound;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
