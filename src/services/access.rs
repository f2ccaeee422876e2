use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use super::{InfraContext, ServiceError, ServiceResult};
use crate::context::Ctx;
use crate::database::{EntryStore, JournalStore};

/// Ownership questions answered straight from the store.
///
/// Both checks only consider live rows. Absence and a foreign owner answer
/// the same `false`; storage failures are the only errors.
#[derive(Clone)]
pub struct AccessControl {
    journals: Arc<dyn JournalStore>,
    entries: Arc<dyn EntryStore>,
}

impl AccessControl {
    pub fn new(journals: Arc<dyn JournalStore>, entries: Arc<dyn EntryStore>) -> Self {
        Self { journals, entries }
    }

    pub async fn journal_belongs_to_user(
        &self,
        ctx: &Ctx,
        journal_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<bool> {
        ctx.run(self.journals.exists_for_user(journal_id, user_id))
            .await?
            .infra("check journal ownership")
    }

    pub async fn entry_belongs_to_journal(
        &self,
        ctx: &Ctx,
        entry_id: Uuid,
        journal_id: Uuid,
    ) -> ServiceResult<bool> {
        ctx.run(self.entries.exists_in_journal(entry_id, journal_id))
            .await?
            .infra("check entry ownership")
    }

    /// Journal ownership or `NotFound("journal")`
    pub async fn require_journal(
        &self,
        ctx: &Ctx,
        journal_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<()> {
        if self.journal_belongs_to_user(ctx, journal_id, user_id).await? {
            return Ok(());
        }
        warn!(%journal_id, %user_id, "journal ownership check refused");
        Err(ServiceError::NotFound("journal"))
    }

    /// Entry membership, failing with `denied` when it does not hold
    pub async fn require_entry(
        &self,
        ctx: &Ctx,
        entry_id: Uuid,
        journal_id: Uuid,
        denied: ServiceError,
    ) -> ServiceResult<()> {
        if self.entry_belongs_to_journal(ctx, entry_id, journal_id).await? {
            return Ok(());
        }
        warn!(%entry_id, %journal_id, "entry ownership check refused");
        Err(denied)
    }
}
