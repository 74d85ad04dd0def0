//! Persistence adapters implementing the document store port.
//!
//! Index rows are derived from document bodies (`views`), so adapters agree
//! on key layout with the domain without sharing view definitions.

mod memory_store;
mod views;

pub use memory_store::MemoryDocumentStore;
