//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). Only
//! compiled for tests or with the `test-support` feature.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{DocumentStore, DocumentStoreError, IndexName, IndexRow, KeyRange};
use crate::domain::{DocId, Document, EntityConfig, Operator, RequestContext, Revision};
use crate::outbound::persistence::MemoryDocumentStore;

/// Clock pinned to an instant that tests advance by hand.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock reading `now` until advanced.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed starting instant used across suites.
#[must_use]
pub fn fixture_timestamp() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).single() {
        Some(timestamp) => timestamp,
        None => panic!("fixture timestamp"),
    }
}

/// Store, clock and operator wiring for one suite.
pub struct Harness {
    /// Shared in-memory store.
    pub store: Arc<MemoryDocumentStore>,
    /// Hand-advanced clock; every new context ticks it by one second.
    pub clock: Arc<MutableClock>,
    /// Entity configuration handed to services.
    pub config: EntityConfig,
}

impl Harness {
    /// Empty store and a clock at [`fixture_timestamp`].
    #[must_use]
    pub fn new(config: EntityConfig) -> Self {
        Self {
            store: Arc::new(MemoryDocumentStore::new()),
            clock: Arc::new(MutableClock::new(fixture_timestamp())),
            config,
        }
    }

    /// Fresh request context as operator `per@example.org`.
    #[must_use]
    pub fn context(&self) -> RequestContext {
        self.context_over(self.store.clone())
    }

    /// Fresh request context over another store handle.
    #[must_use]
    pub fn context_over(&self, store: Arc<dyn DocumentStore>) -> RequestContext {
        self.clock.advance_seconds(1);
        RequestContext::new(store, self.config, self.clock.clone())
            .with_operator(Some(Operator::new("per@example.org")))
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new(EntityConfig::default())
    }
}

/// Store wrapper whose deletes start failing after a set number succeed.
///
/// Simulates an outage in the middle of a cascade.
pub struct FailingDeletes {
    inner: Arc<MemoryDocumentStore>,
    remaining: AtomicUsize,
}

impl FailingDeletes {
    /// Wrap `inner`, letting `successful_deletes` deletes through.
    #[must_use]
    pub const fn new(inner: Arc<MemoryDocumentStore>, successful_deletes: usize) -> Self {
        Self {
            inner,
            remaining: AtomicUsize::new(successful_deletes),
        }
    }
}

#[async_trait]
impl DocumentStore for FailingDeletes {
    async fn get(&self, id: &DocId) -> Result<Document, DocumentStoreError> {
        self.inner.get(id).await
    }

    async fn save(&self, document: &Document) -> Result<Revision, DocumentStoreError> {
        self.inner.save(document).await
    }

    async fn delete(&self, id: &DocId) -> Result<(), DocumentStoreError> {
        let allowed = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if !allowed {
            return Err(DocumentStoreError::connection("store went away"));
        }
        self.inner.delete(id).await
    }

    async fn range_query(
        &self,
        index: IndexName,
        range: &KeyRange,
    ) -> Result<Vec<IndexRow>, DocumentStoreError> {
        self.inner.range_query(index, range).await
    }
}
