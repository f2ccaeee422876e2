use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::PaginationConfig;
use crate::database::manager::StoreError;
use crate::domain::{Entry, EntryFilter, Journal, Statistics, User};

/// Limit/offset window for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Out-of-range values fall back to the configured defaults
    pub fn from_query(limit: Option<i64>, offset: Option<i64>, config: &PaginationConfig) -> Self {
        let limit = match limit {
            Some(l) if (1..=config.max_limit).contains(&l) => l,
            _ => config.default_limit,
        };
        let offset = match offset {
            Some(o) if o >= 0 => o,
            _ => 0,
        };
        Self { limit, offset }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `StoreError::Conflict` when email or username is taken
    async fn create(&self, user: &User) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn exists_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait JournalStore: Send + Sync {
    async fn create(&self, journal: &Journal) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Journal>, StoreError>;
    /// Newest first
    async fn list_by_user(&self, user_id: Uuid, page: Page) -> Result<Vec<Journal>, StoreError>;
    async fn count_by_user(&self, user_id: Uuid) -> Result<i64, StoreError>;
    /// Writes name/description; false when no live row matched
    async fn update(&self, journal: &Journal) -> Result<bool, StoreError>;
    /// Soft-deletes the journal and its live entries atomically
    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn exists_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn create(&self, entry: &Entry) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Entry>, StoreError>;
    /// Ordered by trade day, newest first; `None` returns every match
    async fn list_by_journal(
        &self,
        journal_id: Uuid,
        filter: &EntryFilter,
        page: Option<Page>,
    ) -> Result<Vec<Entry>, StoreError>;
    async fn count_by_journal(
        &self,
        journal_id: Uuid,
        filter: &EntryFilter,
    ) -> Result<i64, StoreError>;
    async fn update(&self, entry: &Entry) -> Result<bool, StoreError>;
    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn exists_in_journal(&self, id: Uuid, journal_id: Uuid) -> Result<bool, StoreError>;
    /// All aggregates are taken from one consistent view of the rows
    async fn statistics(&self, journal_id: Uuid) -> Result<Statistics, StoreError>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;
}

/// The store handles a running service is wired with
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub journals: Arc<dyn JournalStore>,
    pub entries: Arc<dyn EntryStore>,
    pub health: Arc<dyn HealthCheck>,
}

impl Stores {
    /// Share one backend implementing every store trait
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: UserStore + JournalStore + EntryStore + HealthCheck + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            users: backend.clone(),
            journals: backend.clone(),
            entries: backend.clone(),
            health: backend,
        }
    }
}
