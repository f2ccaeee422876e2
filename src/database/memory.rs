use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::StoreError;
use crate::database::store::{EntryStore, HealthCheck, JournalStore, Page, UserStore};
use crate::domain::{Entry, EntryFilter, Journal, Statistics, User};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    journals: HashMap<Uuid, Journal>,
    entries: HashMap<Uuid, Entry>,
}

/// Process-local backend with the same soft-delete rules as Postgres.
/// Deleted rows stay in the maps with `deleted_at` set.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn window<T>(rows: Vec<T>, page: Option<Page>) -> Vec<T> {
    match page {
        Some(page) => rows
            .into_iter()
            .skip(page.offset.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .collect(),
        None => rows,
    }
}

fn live_entries<'a>(
    tables: &'a Tables,
    journal_id: Uuid,
    filter: &'a EntryFilter,
) -> impl Iterator<Item = &'a Entry> {
    tables.entries.values().filter(move |e| {
        e.deleted_at.is_none() && e.journal_id == journal_id && filter.matches(e)
    })
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: &User) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let live = tables.users.values().filter(|u| u.deleted_at.is_none());
        for existing in live {
            if existing.email == user.email {
                return Err(StoreError::Conflict("users_email_live_key".into()));
            }
            if existing.username == user.username {
                return Err(StoreError::Conflict("users_username_live_key".into()));
            }
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .get(&id)
            .filter(|u| u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.deleted_at.is_none() && u.email == email)
            .cloned())
    }

    async fn exists_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| {
            u.deleted_at.is_none() && (u.email == email || u.username == username)
        }))
    }
}

#[async_trait]
impl JournalStore for MemoryStore {
    async fn create(&self, journal: &Journal) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.journals.contains_key(&journal.id) {
            return Err(StoreError::Conflict("journals_pkey".into()));
        }
        tables.journals.insert(journal.id, journal.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Journal>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .journals
            .get(&id)
            .filter(|j| j.deleted_at.is_none())
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid, page: Page) -> Result<Vec<Journal>, StoreError> {
        let tables = self.tables.read().await;
        let mut journals: Vec<Journal> = tables
            .journals
            .values()
            .filter(|j| j.deleted_at.is_none() && j.user_id == user_id)
            .cloned()
            .collect();
        journals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(window(journals, Some(page)))
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .journals
            .values()
            .filter(|j| j.deleted_at.is_none() && j.user_id == user_id)
            .count() as i64)
    }

    async fn update(&self, journal: &Journal) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables
            .journals
            .get_mut(&journal.id)
            .filter(|j| j.deleted_at.is_none())
        {
            Some(stored) => {
                stored.name = journal.name.clone();
                stored.description = journal.description.clone();
                stored.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        match tables.journals.get_mut(&id).filter(|j| j.deleted_at.is_none()) {
            Some(journal) => {
                journal.deleted_at = Some(now);
                journal.updated_at = now;
            }
            None => return Ok(false),
        }
        for entry in tables
            .entries
            .values_mut()
            .filter(|e| e.journal_id == id && e.deleted_at.is_none())
        {
            entry.deleted_at = Some(now);
            entry.updated_at = now;
        }
        Ok(true)
    }

    async fn exists_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .journals
            .get(&id)
            .map_or(false, |j| j.deleted_at.is_none() && j.user_id == user_id))
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn create(&self, entry: &Entry) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.entries.contains_key(&entry.id) {
            return Err(StoreError::Conflict("entries_pkey".into()));
        }
        tables.entries.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Entry>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .entries
            .get(&id)
            .filter(|e| e.deleted_at.is_none())
            .cloned())
    }

    async fn list_by_journal(
        &self,
        journal_id: Uuid,
        filter: &EntryFilter,
        page: Option<Page>,
    ) -> Result<Vec<Entry>, StoreError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<Entry> = live_entries(&tables, journal_id, filter).cloned().collect();
        entries.sort_by(|a, b| b.day.cmp(&a.day).then(b.id.cmp(&a.id)));
        Ok(window(entries, page))
    }

    async fn count_by_journal(
        &self,
        journal_id: Uuid,
        filter: &EntryFilter,
    ) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        Ok(live_entries(&tables, journal_id, filter).count() as i64)
    }

    async fn update(&self, entry: &Entry) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables
            .entries
            .get_mut(&entry.id)
            .filter(|e| e.deleted_at.is_none() && e.journal_id == entry.journal_id)
        {
            Some(stored) => {
                let created_at = stored.created_at;
                *stored = entry.clone();
                stored.created_at = created_at;
                stored.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.entries.get_mut(&id).filter(|e| e.deleted_at.is_none()) {
            Some(entry) => {
                let now = Utc::now();
                entry.deleted_at = Some(now);
                entry.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn exists_in_journal(&self, id: Uuid, journal_id: Uuid) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .entries
            .get(&id)
            .map_or(false, |e| e.deleted_at.is_none() && e.journal_id == journal_id))
    }

    async fn statistics(&self, journal_id: Uuid) -> Result<Statistics, StoreError> {
        // single read guard: every aggregate sees the same rows
        let tables = self.tables.read().await;
        let no_filter = EntryFilter::default();
        Ok(Statistics::from_entries(live_entries(&tables, journal_id, &no_filter)))
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entry::tests::sample_input;
    use crate::domain::JournalInput;
    use proptest::prelude::*;

    fn journal(owner: Uuid, name: &str) -> Journal {
        Journal::new(
            owner,
            JournalInput {
                name: name.into(),
                description: None,
            },
        )
    }

    fn entry(journal_id: Uuid, result: &str) -> Entry {
        let mut input = sample_input();
        input.result = result.into();
        Entry::new(journal_id, input.validate(journal_id).unwrap())
    }

    #[tokio::test]
    async fn duplicate_identity_conflicts() {
        let store = MemoryStore::new();
        UserStore::create(&store, &User::new("a@example.com", "alice", "h".into()))
            .await
            .unwrap();

        let same_email = User::new("a@example.com", "other", "h".into());
        let err = UserStore::create(&store, &same_email).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let same_username = User::new("b@example.com", "alice", "h".into());
        assert!(UserStore::create(&store, &same_username).await.is_err());
        assert!(store.exists_by_email_or_username("x@example.com", "alice").await.unwrap());
    }

    #[tokio::test]
    async fn journal_delete_cascades_and_hides_rows() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let j = journal(owner, "Forex Main");
        JournalStore::create(&store, &j).await.unwrap();
        let e = entry(j.id, "TP");
        EntryStore::create(&store, &e).await.unwrap();

        assert!(JournalStore::soft_delete(&store, j.id).await.unwrap());
        assert!(JournalStore::find_by_id(&store, j.id).await.unwrap().is_none());
        assert!(EntryStore::find_by_id(&store, e.id).await.unwrap().is_none());
        assert!(!store.exists_for_user(j.id, owner).await.unwrap());
        assert_eq!(store.statistics(j.id).await.unwrap(), Statistics::empty());

        // second delete finds nothing live
        assert!(!JournalStore::soft_delete(&store, j.id).await.unwrap());

        let tables = store.tables.read().await;
        assert!(tables.journals[&j.id].deleted_at.is_some());
        assert!(tables.entries[&e.id].deleted_at.is_some());
    }

    #[tokio::test]
    async fn listings_are_ordered_and_paged() {
        let store = MemoryStore::new();
        let j = journal(Uuid::new_v4(), "Paging");
        JournalStore::create(&store, &j).await.unwrap();
        for offset in 0..5 {
            let mut e = entry(j.id, "BE");
            e.day += chrono::Duration::days(offset);
            EntryStore::create(&store, &e).await.unwrap();
        }

        let all = store
            .list_by_journal(j.id, &EntryFilter::default(), None)
            .await
            .unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.windows(2).all(|w| w[0].day >= w[1].day));

        let page = store
            .list_by_journal(j.id, &EntryFilter::default(), Some(Page { limit: 2, offset: 4 }))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, all[4].id);
    }

    #[tokio::test]
    async fn update_requires_matching_journal() {
        let store = MemoryStore::new();
        let j = journal(Uuid::new_v4(), "A");
        JournalStore::create(&store, &j).await.unwrap();
        let mut e = entry(j.id, "SL");
        EntryStore::create(&store, &e).await.unwrap();

        e.journal_id = Uuid::new_v4();
        assert!(!EntryStore::update(&store, &e).await.unwrap());
    }

    proptest! {
        #[test]
        fn entry_belongs_only_to_its_own_journal(
            placements in prop::collection::vec(0usize..4, 1..20),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let store = MemoryStore::new();
                let owner = Uuid::new_v4();
                let journals: Vec<Journal> = (0..4).map(|i| journal(owner, &format!("J{}", i))).collect();
                for j in &journals {
                    JournalStore::create(&store, j).await.unwrap();
                }
                let mut placed = Vec::new();
                for idx in placements {
                    let e = entry(journals[idx].id, "TP");
                    EntryStore::create(&store, &e).await.unwrap();
                    placed.push((e.id, journals[idx].id));
                }

                for (entry_id, home) in &placed {
                    for j in &journals {
                        let belongs = store.exists_in_journal(*entry_id, j.id).await.unwrap();
                        assert_eq!(belongs, j.id == *home);
                    }
                }
            });
        }
    }
}
