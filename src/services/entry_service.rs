use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{AccessControl, InfraContext, Paginated, ServiceError, ServiceResult};
use crate::context::Ctx;
use crate::database::{EntryStore, Page};
use crate::domain::{Entry, EntryFilter, EntryInput, Statistics};

/// Trade entries scoped to a journal the caller owns.
///
/// Every operation confirms journal ownership against the store first; a
/// refusal is reported as the journal not existing.
#[derive(Clone)]
pub struct EntryService {
    entries: Arc<dyn EntryStore>,
    access: AccessControl,
}

impl EntryService {
    pub fn new(entries: Arc<dyn EntryStore>, access: AccessControl) -> Self {
        Self { entries, access }
    }

    pub async fn create(
        &self,
        ctx: &Ctx,
        user_id: Uuid,
        journal_id: Uuid,
        input: EntryInput,
    ) -> ServiceResult<Entry> {
        let fields = input.validate(journal_id)?;
        self.access.require_journal(ctx, journal_id, user_id).await?;

        let entry = Entry::new(journal_id, fields);
        ctx.run(self.entries.create(&entry))
            .await?
            .infra("create entry")?;
        info!(entry_id = %entry.id, %journal_id, "entry created");
        Ok(entry)
    }

    /// Detail read: the journal is known to the caller, so a mismatched
    /// entry is `AccessDenied` rather than `NotFound`.
    pub async fn get(
        &self,
        ctx: &Ctx,
        user_id: Uuid,
        journal_id: Uuid,
        entry_id: Uuid,
    ) -> ServiceResult<Entry> {
        self.access.require_journal(ctx, journal_id, user_id).await?;
        self.access
            .require_entry(ctx, entry_id, journal_id, ServiceError::AccessDenied)
            .await?;

        ctx.run(self.entries.find_by_id(entry_id))
            .await?
            .infra("load entry")?
            .ok_or(ServiceError::NotFound("entry"))
    }

    pub async fn list(
        &self,
        ctx: &Ctx,
        user_id: Uuid,
        journal_id: Uuid,
        filter: &EntryFilter,
        page: Page,
    ) -> ServiceResult<Paginated<Entry>> {
        self.access.require_journal(ctx, journal_id, user_id).await?;

        let items = ctx
            .run(self.entries.list_by_journal(journal_id, filter, Some(page)))
            .await?
            .infra("list entries")?;
        let total = ctx
            .run(self.entries.count_by_journal(journal_id, filter))
            .await?
            .infra("count entries")?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn update(
        &self,
        ctx: &Ctx,
        user_id: Uuid,
        journal_id: Uuid,
        entry_id: Uuid,
        input: EntryInput,
    ) -> ServiceResult<Entry> {
        let fields = input.validate(journal_id)?;
        self.access.require_journal(ctx, journal_id, user_id).await?;
        self.access
            .require_entry(ctx, entry_id, journal_id, ServiceError::NotFound("entry"))
            .await?;

        let mut entry = ctx
            .run(self.entries.find_by_id(entry_id))
            .await?
            .infra("load entry")?
            .ok_or(ServiceError::NotFound("entry"))?;
        entry.apply(fields);

        let updated = ctx
            .run(self.entries.update(&entry))
            .await?
            .infra("update entry")?;
        if !updated {
            return Err(ServiceError::NotFound("entry"));
        }
        info!(%entry_id, %journal_id, "entry updated");
        Ok(entry)
    }

    pub async fn delete(
        &self,
        ctx: &Ctx,
        user_id: Uuid,
        journal_id: Uuid,
        entry_id: Uuid,
    ) -> ServiceResult<()> {
        self.access.require_journal(ctx, journal_id, user_id).await?;
        self.access
            .require_entry(ctx, entry_id, journal_id, ServiceError::NotFound("entry"))
            .await?;

        let deleted = ctx
            .run(self.entries.soft_delete(entry_id))
            .await?
            .infra("delete entry")?;
        if !deleted {
            return Err(ServiceError::NotFound("entry"));
        }
        info!(%entry_id, %journal_id, "entry deleted");
        Ok(())
    }

    pub async fn statistics(
        &self,
        ctx: &Ctx,
        user_id: Uuid,
        journal_id: Uuid,
    ) -> ServiceResult<Statistics> {
        self.access.require_journal(ctx, journal_id, user_id).await?;
        ctx.run(self.entries.statistics(journal_id))
            .await?
            .infra("compute statistics")
    }
}
