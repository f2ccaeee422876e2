use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::{self, StoreError};
use crate::database::models::{EntryRow, JournalRow, StatisticsRow, UserRow};
use crate::database::query_builder::{LiveQuery, Table};
use crate::database::store::{EntryStore, HealthCheck, JournalStore, Page, UserStore};
use crate::domain::{Entry, EntryFilter, Journal, Statistics, User};
use crate::types::TradeResult;

const ENTRY_COLUMNS: &str = "id, journal_id, day, asset, ltf, htf, entry_charts, session, \
     trade_type, setup, direction, entry_type, realized, max_rr, result, notes, \
     created_at, updated_at, deleted_at";

/// Postgres implementation of every store trait
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn apply_filter<'a>(mut query: LiveQuery<'a>, filter: &EntryFilter) -> LiveQuery<'a> {
    if let Some(asset) = filter.asset {
        query = query.and_eq("asset", asset.as_str());
    }
    if let Some(session) = filter.session {
        query = query.and_eq("session", session.as_str());
    }
    if let Some(result) = filter.result {
        query = query.and_eq("result", result.as_str());
    }
    if let Some(start) = filter.start {
        query = query.and_ge("day", start);
    }
    if let Some(end) = filter.end {
        query = query.and_le("day", end);
    }
    query
}

#[async_trait]
impl UserStore for PgRepository {
    async fn create(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, email, username, password_hash, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = LiveQuery::select(Table::Users, "*")
            .and_eq("id", id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = LiveQuery::select(Table::Users, "*")
            .and_eq("email", email.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn exists_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<bool, StoreError> {
        // OR needs grouping, so this one is written out with the live predicate inline
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE deleted_at IS NULL \
             AND (email = $1 OR username = $2))",
        )
        .bind(email)
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }
}

#[async_trait]
impl JournalStore for PgRepository {
    async fn create(&self, journal: &Journal) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO journals (id, user_id, name, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(journal.id)
        .bind(journal.user_id)
        .bind(&journal.name)
        .bind(&journal.description)
        .bind(journal.created_at)
        .bind(journal.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Journal>, StoreError> {
        let row: Option<JournalRow> = LiveQuery::select(Table::Journals, "*")
            .and_eq("id", id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Journal::from))
    }

    async fn list_by_user(&self, user_id: Uuid, page: Page) -> Result<Vec<Journal>, StoreError> {
        let rows: Vec<JournalRow> = LiveQuery::select(Table::Journals, "*")
            .and_eq("user_id", user_id)
            .order_by_desc("created_at")
            .page(page)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Journal::from).collect())
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64, StoreError> {
        let count = LiveQuery::count(Table::Journals)
            .and_eq("user_id", user_id)
            .fetch_scalar::<i64>(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update(&self, journal: &Journal) -> Result<bool, StoreError> {
        let affected = LiveQuery::update(Table::Journals)
            .set("name", journal.name.clone())
            .set("description", journal.description.clone())
            .and_eq("id", journal.id)
            .execute(&self.pool)
            .await?;
        Ok(affected > 0)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let affected = LiveQuery::soft_delete(Table::Journals)
            .and_eq("id", id)
            .execute(&mut *tx)
            .await?;
        if affected == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let entries = LiveQuery::soft_delete(Table::Entries)
            .and_eq("journal_id", id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!("Soft-deleted journal {} and {} entries", id, entries);
        Ok(true)
    }

    async fn exists_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let found = LiveQuery::exists(Table::Journals)
            .and_eq("id", id)
            .and_eq("user_id", user_id)
            .close_exists()
            .fetch_scalar::<bool>(&self.pool)
            .await?;
        Ok(found)
    }
}

#[async_trait]
impl EntryStore for PgRepository {
    async fn create(&self, entry: &Entry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO entries (id, journal_id, day, asset, ltf, htf, entry_charts, session, \
             trade_type, setup, direction, entry_type, realized, max_rr, result, notes, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        )
        .bind(entry.id)
        .bind(entry.journal_id)
        .bind(entry.day)
        .bind(entry.asset.as_str())
        .bind(entry.ltf.as_str())
        .bind(entry.htf.as_str())
        .bind(&entry.entry_charts)
        .bind(entry.session.as_str())
        .bind(entry.trade_type.as_str())
        .bind(&entry.setup)
        .bind(entry.direction.as_str())
        .bind(entry.entry_type.as_str())
        .bind(entry.realized)
        .bind(entry.max_rr)
        .bind(entry.result.as_str())
        .bind(&entry.notes)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Entry>, StoreError> {
        let row: Option<EntryRow> = LiveQuery::select(Table::Entries, ENTRY_COLUMNS)
            .and_eq("id", id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Entry::try_from).transpose()
    }

    async fn list_by_journal(
        &self,
        journal_id: Uuid,
        filter: &EntryFilter,
        page: Option<Page>,
    ) -> Result<Vec<Entry>, StoreError> {
        let mut query = apply_filter(
            LiveQuery::select(Table::Entries, ENTRY_COLUMNS).and_eq("journal_id", journal_id),
            filter,
        )
        .order_by_desc("day");
        if let Some(page) = page {
            query = query.page(page);
        }
        let rows: Vec<EntryRow> = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Entry::try_from).collect()
    }

    async fn count_by_journal(
        &self,
        journal_id: Uuid,
        filter: &EntryFilter,
    ) -> Result<i64, StoreError> {
        let count = apply_filter(
            LiveQuery::count(Table::Entries).and_eq("journal_id", journal_id),
            filter,
        )
        .fetch_scalar::<i64>(&self.pool)
        .await?;
        Ok(count)
    }

    async fn update(&self, entry: &Entry) -> Result<bool, StoreError> {
        let affected = LiveQuery::update(Table::Entries)
            .set("day", entry.day)
            .set("asset", entry.asset.as_str())
            .set("ltf", entry.ltf.as_str())
            .set("htf", entry.htf.as_str())
            .set("entry_charts", entry.entry_charts.clone())
            .set("session", entry.session.as_str())
            .set("trade_type", entry.trade_type.as_str())
            .set("setup", entry.setup.clone())
            .set("direction", entry.direction.as_str())
            .set("entry_type", entry.entry_type.as_str())
            .set("realized", entry.realized)
            .set("max_rr", entry.max_rr)
            .set("result", entry.result.as_str())
            .set("notes", entry.notes.clone())
            .and_eq("id", entry.id)
            .and_eq("journal_id", entry.journal_id)
            .execute(&self.pool)
            .await?;
        Ok(affected > 0)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let affected = LiveQuery::soft_delete(Table::Entries)
            .and_eq("id", id)
            .execute(&self.pool)
            .await?;
        Ok(affected > 0)
    }

    async fn exists_in_journal(&self, id: Uuid, journal_id: Uuid) -> Result<bool, StoreError> {
        let found = LiveQuery::exists(Table::Entries)
            .and_eq("id", id)
            .and_eq("journal_id", journal_id)
            .close_exists()
            .fetch_scalar::<bool>(&self.pool)
            .await?;
        Ok(found)
    }

    async fn statistics(&self, journal_id: Uuid) -> Result<Statistics, StoreError> {
        // one statement, so every aggregate sees the same snapshot
        let columns = format!(
            "COUNT(*) AS total_trades, \
             COUNT(*) FILTER (WHERE result = '{tp}') AS wins, \
             COUNT(*) FILTER (WHERE result = '{sl}') AS losses, \
             COUNT(*) FILTER (WHERE result = '{be}') AS break_even, \
             COALESCE(SUM(realized), 0) AS total_realized, \
             COALESCE(AVG(max_rr), 0) AS avg_risk_reward",
            tp = TradeResult::TakeProfit.as_str(),
            sl = TradeResult::StopLoss.as_str(),
            be = TradeResult::BreakEven.as_str(),
        );
        let row: StatisticsRow = LiveQuery::select(Table::Entries, &columns)
            .and_eq("journal_id", journal_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(Statistics::from_aggregates(
            row.total_trades,
            row.wins,
            row.losses,
            row.break_even,
            row.total_realized,
            row.avg_risk_reward,
        ))
    }
}

#[async_trait]
impl HealthCheck for PgRepository {
    async fn ping(&self) -> Result<(), StoreError> {
        manager::health_check(&self.pool).await
    }
}
