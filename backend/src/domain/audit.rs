//! Append-only audit log keyed by owner document.
//!
//! Entries are written by the saver after a successful commit and removed
//! only as part of their owner's cascade.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::domain::context::map_store_error;
use crate::domain::entities::{LogEntry, from_document, to_document};
use crate::domain::ports::{DocumentStoreError, IndexKey, IndexName, KeyRange};
use crate::domain::{DocId, DomainError, RequestContext};

/// Render a timestamp as a lexically ordered index key component.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use seqtrack::domain::audit::timestamp_key;
///
/// let early = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single().expect("valid");
/// let late = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).single().expect("valid");
/// assert!(timestamp_key(early) < timestamp_key(late));
/// ```
#[must_use]
pub fn timestamp_key(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn owner_range(owner: &DocId) -> KeyRange {
    KeyRange::prefix(IndexKey::new([owner.as_str()]))
}

/// Persist a new entry.
pub async fn append(ctx: &RequestContext, entry: &LogEntry) -> Result<(), DomainError> {
    let document = to_document(entry)?;
    ctx.store()
        .save(&document)
        .await
        .map_err(map_store_error)?;
    debug!(owner = %entry.doc, log = %entry.meta.id, "log entry appended");
    Ok(())
}

/// Entries describing `owner`, newest first.
pub async fn entries_for(ctx: &RequestContext, owner: &DocId) -> Result<Vec<LogEntry>, DomainError> {
    let rows = ctx.cached_range(IndexName::LogOwner, &owner_range(owner)).await?;
    let mut entries = rows
        .into_iter()
        .map(|row| from_document::<LogEntry>(row.document))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
    Ok(entries)
}

/// Delete every entry describing `owner`; returns how many were removed.
pub(crate) async fn purge(ctx: &RequestContext, owner: &DocId) -> Result<usize, DomainError> {
    let rows = ctx.fresh_range(IndexName::LogOwner, &owner_range(owner)).await?;
    let mut removed = 0;
    for row in rows {
        match ctx.store().delete(&row.document.id).await {
            Ok(()) => removed += 1,
            // Already gone: a concurrent cascade got there first.
            Err(DocumentStoreError::NotFound { .. }) => {}
            Err(err) => return Err(map_store_error(err)),
        }
    }
    debug!(owner = %owner, removed, "log entries purged");
    Ok(removed)
}
