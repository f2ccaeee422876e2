use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{AccessControl, InfraContext, Paginated, ServiceError, ServiceResult};
use crate::cache::{journal_key, Cache};
use crate::context::Ctx;
use crate::database::{EntryStore, JournalStore, Page};
use crate::domain::{EntryFilter, Journal, JournalInput, JournalWithEntries};

/// Journal operations with a best-effort look-aside cache on reads by id.
///
/// Cache failures never fail a request: lookups fall through to the store
/// and writes/invalidations are logged and dropped.
#[derive(Clone)]
pub struct JournalService {
    journals: Arc<dyn JournalStore>,
    entries: Arc<dyn EntryStore>,
    access: AccessControl,
    cache: Arc<dyn Cache>,
    cache_ttl: Duration,
}

impl JournalService {
    pub fn new(
        journals: Arc<dyn JournalStore>,
        entries: Arc<dyn EntryStore>,
        access: AccessControl,
        cache: Arc<dyn Cache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            journals,
            entries,
            access,
            cache,
            cache_ttl,
        }
    }

    pub async fn create(
        &self,
        ctx: &Ctx,
        user_id: Uuid,
        input: JournalInput,
    ) -> ServiceResult<Journal> {
        input.validate()?;
        let journal = Journal::new(user_id, input);
        journal.validate()?;

        ctx.run(self.journals.create(&journal))
            .await?
            .infra("create journal")?;
        info!(journal_id = %journal.id, %user_id, "journal created");
        Ok(journal)
    }

    /// Cache-first read by id
    pub async fn get_by_id(&self, ctx: &Ctx, id: Uuid) -> ServiceResult<Journal> {
        let key = journal_key(id);
        match ctx.run(self.cache.get(&key)).await? {
            Ok(Some(raw)) => match serde_json::from_str::<Journal>(&raw) {
                Ok(journal) => {
                    debug!(journal_id = %id, "journal cache hit");
                    return Ok(journal);
                }
                Err(e) => warn!(journal_id = %id, error = %e, "discarding undecodable cached journal"),
            },
            Ok(None) => {}
            Err(e) => warn!(journal_id = %id, error = %e, "journal cache lookup failed"),
        }

        let journal = ctx
            .run(self.journals.find_by_id(id))
            .await?
            .infra("load journal")?
            .ok_or(ServiceError::NotFound("journal"))?;

        match serde_json::to_string(&journal) {
            Ok(raw) => {
                if let Err(e) = ctx.run(self.cache.set(&key, &raw, self.cache_ttl)).await? {
                    warn!(journal_id = %id, error = %e, "journal cache write failed");
                }
            }
            Err(e) => warn!(journal_id = %id, error = %e, "journal not cacheable"),
        }
        Ok(journal)
    }

    /// The journal, provided `user_id` owns it; otherwise `NotFound`
    pub async fn get_owned(&self, ctx: &Ctx, user_id: Uuid, id: Uuid) -> ServiceResult<Journal> {
        let journal = self.get_by_id(ctx, id).await?;
        if journal.user_id != user_id {
            warn!(journal_id = %id, %user_id, "journal read refused: not the owner");
            return Err(ServiceError::NotFound("journal"));
        }
        Ok(journal)
    }

    pub async fn list(
        &self,
        ctx: &Ctx,
        user_id: Uuid,
        page: Page,
    ) -> ServiceResult<Paginated<Journal>> {
        let items = ctx
            .run(self.journals.list_by_user(user_id, page))
            .await?
            .infra("list journals")?;
        let total = ctx
            .run(self.journals.count_by_user(user_id))
            .await?
            .infra("count journals")?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn with_entries(
        &self,
        ctx: &Ctx,
        user_id: Uuid,
        id: Uuid,
    ) -> ServiceResult<JournalWithEntries> {
        let journal = self.get_owned(ctx, user_id, id).await?;
        let entries = ctx
            .run(self.entries.list_by_journal(id, &EntryFilter::default(), None))
            .await?
            .infra("list entries")?;
        Ok(JournalWithEntries { journal, entries })
    }

    pub async fn update(
        &self,
        ctx: &Ctx,
        user_id: Uuid,
        id: Uuid,
        input: JournalInput,
    ) -> ServiceResult<Journal> {
        input.validate()?;
        self.access.require_journal(ctx, id, user_id).await?;

        let mut journal = ctx
            .run(self.journals.find_by_id(id))
            .await?
            .infra("load journal")?
            .ok_or(ServiceError::NotFound("journal"))?;
        journal.apply(input);
        journal.validate()?;

        let updated = ctx
            .run(self.journals.update(&journal))
            .await?
            .infra("update journal")?;
        if !updated {
            return Err(ServiceError::NotFound("journal"));
        }

        self.invalidate(ctx, id).await;
        info!(journal_id = %id, %user_id, "journal updated");
        Ok(journal)
    }

    /// Soft-delete the journal and its entries after confirming ownership
    pub async fn delete(&self, ctx: &Ctx, user_id: Uuid, id: Uuid) -> ServiceResult<()> {
        self.access.require_journal(ctx, id, user_id).await?;

        let deleted = ctx
            .run(self.journals.soft_delete(id))
            .await?
            .infra("delete journal")?;
        if !deleted {
            return Err(ServiceError::NotFound("journal"));
        }

        self.invalidate(ctx, id).await;
        info!(journal_id = %id, %user_id, "journal deleted");
        Ok(())
    }

    async fn invalidate(&self, ctx: &Ctx, id: Uuid) {
        // the store mutation already happened; only a failed delete is logged
        match ctx.run(self.cache.delete(&journal_key(id))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(journal_id = %id, error = %e, "journal cache invalidation failed"),
            Err(e) => warn!(journal_id = %id, error = %e, "journal cache invalidation abandoned"),
        }
    }
}
