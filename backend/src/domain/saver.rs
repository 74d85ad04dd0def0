//! Unit of work for one create or update of one document.
//!
//! A [`Saver`] wraps either a fresh draft or a fetched entity. [`Saver::apply`]
//! runs every field in the entity's table against a [`FieldSource`] and
//! stages the results; nothing is touched until every field has passed.
//! [`Saver::commit`] writes the document with a compare-and-swap on its
//! revision and appends a single log entry describing what changed.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::audit;
use crate::domain::context::map_store_error;
use crate::domain::entities::{Entity, LogEntry, to_document};
use crate::domain::field::{FieldKind, FieldSource, FieldSpec, FieldValue, is_blank};
use crate::domain::hierarchy::{ensure_unique, next_position};
use crate::domain::ports::DocumentStoreError;
use crate::domain::{DomainError, RequestContext};

/// Placeholder logged in place of secret values.
const REDACTED: &str = "<redacted>";

/// Scoped transactional context for one entity.
pub struct Saver<'a, E: Entity> {
    ctx: &'a RequestContext,
    entity: E,
    changed: BTreeMap<String, Value>,
    deleted: BTreeMap<String, Value>,
}

impl<'a, E: Entity> Saver<'a, E> {
    /// Start a new entity from an unsaved draft.
    #[must_use]
    pub const fn create(ctx: &'a RequestContext, draft: E) -> Self {
        Self::wrap(ctx, draft)
    }

    /// Edit an entity fetched from the store.
    #[must_use]
    pub const fn update(ctx: &'a RequestContext, entity: E) -> Self {
        Self::wrap(ctx, entity)
    }

    const fn wrap(ctx: &'a RequestContext, entity: E) -> Self {
        Self {
            ctx,
            entity,
            changed: BTreeMap::new(),
            deleted: BTreeMap::new(),
        }
    }

    /// Entity with every staged change applied.
    #[must_use]
    pub const fn entity(&self) -> &E {
        &self.entity
    }

    /// Whether the entity has never been saved.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.entity.meta().is_new()
    }

    /// New values of changed fields.
    #[must_use]
    pub const fn changed(&self) -> &BTreeMap<String, Value> {
        &self.changed
    }

    /// Previous values of cleared fields.
    #[must_use]
    pub const fn deleted(&self) -> &BTreeMap<String, Value> {
        &self.deleted
    }

    /// Whether anything is staged.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty() || !self.deleted.is_empty()
    }

    /// Validate and stage every field from `source`.
    ///
    /// Non-editable fields are skipped on existing entities, as are keys the
    /// source does not mention. Any failure leaves the saver untouched.
    pub async fn apply(&mut self, source: &dyn FieldSource) -> Result<(), DomainError> {
        let is_new = self.is_new();
        let mut staged = Vec::new();
        for spec in E::field_specs(self.ctx.config()) {
            if !is_new && !spec.editable {
                continue;
            }
            let raw = match spec.kind {
                FieldKind::Position { index } if is_new => Some(Value::String(
                    next_position(self.ctx, index, self.entity.scope()).await?,
                )),
                _ => source.lookup(spec.key),
            };
            let Some(value) = self.candidate(spec, raw, is_new)? else {
                continue;
            };
            self.check_unique(spec, value.as_ref()).await?;
            staged.push((spec.key, value));
        }

        let mut entity = self.entity.clone();
        let mut changed = self.changed.clone();
        let mut deleted = self.deleted.clone();
        for (key, value) in staged {
            record(&mut entity, &mut changed, &mut deleted, key, value)?;
        }
        self.entity = entity;
        self.changed = changed;
        self.deleted = deleted;
        Ok(())
    }

    /// Computed value for one field: `None` to leave it alone, `Some(None)`
    /// to clear it.
    fn candidate(
        &self,
        spec: &FieldSpec,
        raw: Option<Value>,
        is_new: bool,
    ) -> Result<Option<Option<FieldValue>>, DomainError> {
        if !is_new && raw.is_none() {
            return Ok(None);
        }
        let submitted = raw.filter(|value| !is_blank(value));
        spec.check_mandatory(submitted.as_ref())?;
        let value = submitted
            .map(|present| spec.check_valid(&present))
            .transpose()?
            .or_else(|| spec.default_value());
        Ok(Some(value))
    }

    async fn check_unique(&self, spec: &FieldSpec, value: Option<&FieldValue>) -> Result<(), DomainError> {
        let (Some(index), Some(FieldValue::Text(text))) = (spec.identifier_index(), value) else {
            return Ok(());
        };
        if self.entity.field(spec.key).as_ref() == value {
            return Ok(());
        }
        ensure_unique(
            self.ctx,
            spec.key,
            index,
            self.entity.scope(),
            text,
            &self.entity.meta().id,
        )
        .await
    }

    /// Stage a value computed by the core rather than submitted by a client.
    pub fn set(&mut self, key: &str, value: Option<FieldValue>) -> Result<(), DomainError> {
        record(
            &mut self.entity,
            &mut self.changed,
            &mut self.deleted,
            key,
            value,
        )
    }

    /// Stage a secret value; the log entry records a placeholder.
    pub fn set_secret(&mut self, key: &str, value: Option<FieldValue>) -> Result<(), DomainError> {
        self.set(key, value)?;
        for map in [&mut self.changed, &mut self.deleted] {
            if let Some(logged) = map.get_mut(key) {
                *logged = Value::String(REDACTED.to_owned());
            }
        }
        Ok(())
    }

    /// Persist staged changes and append one log entry.
    ///
    /// An existing entity with nothing staged is returned as-is without a
    /// store write. A revision mismatch fails with a conflict and writes
    /// nothing.
    pub async fn commit(self) -> Result<E, DomainError> {
        let Self {
            ctx,
            mut entity,
            changed,
            deleted,
        } = self;
        let doctype = E::DOCTYPE;
        let is_new = entity.meta().is_new();
        if !is_new && changed.is_empty() && deleted.is_empty() {
            debug!(doctype = %doctype, id = %entity.meta().id, "nothing to commit");
            return Ok(entity);
        }

        let now = ctx.now();
        entity.meta_mut().modified = Some(now);
        let document = to_document(&entity)?;
        let revision = ctx.store().save(&document).await.map_err(|err| {
            if matches!(err, DocumentStoreError::RevisionConflict { .. }) {
                warn!(doctype = %doctype, id = %document.id, "revision conflict on commit");
            }
            map_store_error(err)
        })?;
        entity.meta_mut().rev = Some(revision);
        ctx.invalidate();

        let fields = changed.len() + deleted.len();
        if fields > 0 {
            let entry = LogEntry::new(
                entity.meta(),
                changed,
                deleted,
                ctx.operator().map(|operator| operator.email.clone()),
                now,
            );
            audit::append(ctx, &entry).await?;
        }
        info!(
            doctype = %doctype,
            id = %entity.meta().id,
            created = is_new,
            fields,
            "entity committed"
        );
        Ok(entity)
    }
}

fn record<E: Entity>(
    entity: &mut E,
    changed: &mut BTreeMap<String, Value>,
    deleted: &mut BTreeMap<String, Value>,
    key: &str,
    value: Option<FieldValue>,
) -> Result<(), DomainError> {
    let current = entity.field(key);
    if current == value {
        return Ok(());
    }
    match (&value, &current) {
        (Some(new), _) => {
            changed.insert(key.to_owned(), new.to_json());
            deleted.remove(key);
        }
        (None, Some(old)) => {
            deleted.insert(key.to_owned(), old.to_json());
            changed.remove(key);
        }
        (None, None) => {}
    }
    entity.set_field(key, value)?;
    debug!(doctype = %E::DOCTYPE, field = key, "field staged");
    Ok(())
}

#[cfg(test)]
#[path = "saver_tests.rs"]
mod tests;
