use sqlx::{postgres::PgRow, Encode, FromRow, PgPool, Postgres, Type};

use crate::database::store::Page;

/// Tables carrying a `deleted_at` soft-delete marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Users,
    Journals,
    Entries,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Journals => "journals",
            Table::Entries => "entries",
        }
    }
}

/// SQL builder over live rows only.
///
/// The `deleted_at IS NULL` predicate is emitted when the WHERE section is
/// opened, and `build` opens it if no condition was added, so no query built
/// here can observe or touch a soft-deleted row.
pub struct LiveQuery<'a> {
    qb: sqlx::QueryBuilder<'a, Postgres>,
    filtering: bool,
}

impl<'a> LiveQuery<'a> {
    /// `SELECT <columns> FROM <table>`
    pub fn select(table: Table, columns: &str) -> Self {
        let mut qb = sqlx::QueryBuilder::new("SELECT ");
        qb.push(columns).push(" FROM ").push(table.as_str());
        Self { qb, filtering: false }
    }

    /// `SELECT COUNT(*) AS count FROM <table>`
    pub fn count(table: Table) -> Self {
        Self::select(table, "COUNT(*) AS count")
    }

    /// `SELECT EXISTS(SELECT 1 FROM <table> ...)`; call `close_exists` after the conditions
    pub fn exists(table: Table) -> Self {
        let mut qb = sqlx::QueryBuilder::new("SELECT EXISTS(SELECT 1 FROM ");
        qb.push(table.as_str());
        Self { qb, filtering: false }
    }

    /// `UPDATE <table> SET updated_at = NOW()`; add columns with `set`
    pub fn update(table: Table) -> Self {
        let mut qb = sqlx::QueryBuilder::new("UPDATE ");
        qb.push(table.as_str()).push(" SET updated_at = NOW()");
        Self { qb, filtering: false }
    }

    /// Marks matching live rows deleted
    pub fn soft_delete(table: Table) -> Self {
        let mut qb = sqlx::QueryBuilder::new("UPDATE ");
        qb.push(table.as_str())
            .push(" SET deleted_at = NOW(), updated_at = NOW()");
        Self { qb, filtering: false }
    }

    pub fn set<T>(mut self, column: &'static str, value: T) -> Self
    where
        T: 'a + Encode<'a, Postgres> + Send + Type<Postgres>,
    {
        debug_assert!(!self.filtering, "SET after WHERE");
        self.qb.push(", ").push(column).push(" = ").push_bind(value);
        self
    }

    fn open_where(&mut self) {
        if !self.filtering {
            self.qb.push(" WHERE deleted_at IS NULL");
            self.filtering = true;
        }
    }

    fn and_cmp<T>(mut self, column: &'static str, op: &'static str, value: T) -> Self
    where
        T: 'a + Encode<'a, Postgres> + Send + Type<Postgres>,
    {
        self.open_where();
        self.qb
            .push(" AND ")
            .push(column)
            .push(op)
            .push_bind(value);
        self
    }

    pub fn and_eq<T>(self, column: &'static str, value: T) -> Self
    where
        T: 'a + Encode<'a, Postgres> + Send + Type<Postgres>,
    {
        self.and_cmp(column, " = ", value)
    }

    pub fn and_ge<T>(self, column: &'static str, value: T) -> Self
    where
        T: 'a + Encode<'a, Postgres> + Send + Type<Postgres>,
    {
        self.and_cmp(column, " >= ", value)
    }

    pub fn and_le<T>(self, column: &'static str, value: T) -> Self
    where
        T: 'a + Encode<'a, Postgres> + Send + Type<Postgres>,
    {
        self.and_cmp(column, " <= ", value)
    }

    /// `column` must be a static identifier
    pub fn order_by_desc(mut self, column: &'static str) -> Self {
        self.open_where();
        self.qb.push(" ORDER BY ").push(column).push(" DESC");
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.open_where();
        self.qb
            .push(" LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);
        self
    }

    /// Closes the subquery opened by `exists`
    pub fn close_exists(mut self) -> Self {
        self.open_where();
        self.qb.push(") AS found");
        self
    }

    /// Finish the statement, guaranteeing the live-row predicate
    pub fn build(mut self) -> sqlx::QueryBuilder<'a, Postgres> {
        self.open_where();
        self.qb
    }

    pub fn sql(self) -> String {
        self.build().sql().to_string()
    }

    pub async fn fetch_all<T>(self, pool: &PgPool) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut qb = self.build();
        qb.build_query_as::<T>().fetch_all(pool).await
    }

    pub async fn fetch_optional<T>(self, pool: &PgPool) -> Result<Option<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut qb = self.build();
        qb.build_query_as::<T>().fetch_optional(pool).await
    }

    pub async fn fetch_one<T>(self, pool: &PgPool) -> Result<T, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut qb = self.build();
        qb.build_query_as::<T>().fetch_one(pool).await
    }

    /// Single-column scalar such as `count` or `found`
    pub async fn fetch_scalar<T>(self, pool: &PgPool) -> Result<T, sqlx::Error>
    where
        T: for<'r> sqlx::Decode<'r, Postgres> + Type<Postgres> + Send + Unpin,
        (T,): for<'r> FromRow<'r, PgRow>,
    {
        let mut qb = self.build();
        qb.build_query_scalar::<T>().fetch_one(pool).await
    }

    /// Rows affected
    pub async fn execute<'c, E>(self, executor: E) -> Result<u64, sqlx::Error>
    where
        E: sqlx::Executor<'c, Database = Postgres>,
    {
        let mut qb = self.build();
        let result = qb.build().execute(executor).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn select_without_conditions_still_filters_deleted() {
        let sql = LiveQuery::select(Table::Journals, "*").sql();
        assert_eq!(sql, "SELECT * FROM journals WHERE deleted_at IS NULL");
    }

    #[test]
    fn conditions_are_appended_after_live_predicate() {
        let sql = LiveQuery::count(Table::Entries)
            .and_eq("journal_id", Uuid::nil())
            .and_eq("asset", "EURUSD")
            .sql();
        assert_eq!(
            sql,
            "SELECT COUNT(*) AS count FROM entries WHERE deleted_at IS NULL AND journal_id = $1 AND asset = $2"
        );
    }

    #[test]
    fn ordering_and_paging() {
        let sql = LiveQuery::select(Table::Journals, "*")
            .and_eq("user_id", Uuid::nil())
            .order_by_desc("created_at")
            .page(Page { limit: 20, offset: 0 })
            .sql();
        assert!(sql.ends_with("AND user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"));
    }

    #[test]
    fn updates_and_soft_deletes_only_touch_live_rows() {
        let sql = LiveQuery::update(Table::Journals)
            .set("name", "Forex Main")
            .and_eq("id", Uuid::nil())
            .sql();
        assert_eq!(
            sql,
            "UPDATE journals SET updated_at = NOW(), name = $1 WHERE deleted_at IS NULL AND id = $2"
        );

        let sql = LiveQuery::soft_delete(Table::Entries)
            .and_eq("journal_id", Uuid::nil())
            .sql();
        assert_eq!(
            sql,
            "UPDATE entries SET deleted_at = NOW(), updated_at = NOW() WHERE deleted_at IS NULL AND journal_id = $1"
        );
    }

    #[test]
    fn exists_wraps_the_live_subquery() {
        let sql = LiveQuery::exists(Table::Journals)
            .and_eq("id", Uuid::nil())
            .and_eq("user_id", Uuid::nil())
            .close_exists()
            .sql();
        assert_eq!(
            sql,
            "SELECT EXISTS(SELECT 1 FROM journals WHERE deleted_at IS NULL AND id = $1 AND user_id = $2) AS found"
        );
    }
}
