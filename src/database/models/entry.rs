use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::manager::StoreError;
use crate::domain::Entry;
use crate::types::UnknownValue;

/// Fixed-value columns are TEXT and are parsed on the way out
#[derive(Debug, Clone, FromRow)]
pub struct EntryRow {
    pub id: Uuid,
    pub journal_id: Uuid,
    pub day: DateTime<Utc>,
    pub asset: String,
    pub ltf: String,
    pub htf: String,
    pub entry_charts: Vec<String>,
    pub session: String,
    pub trade_type: String,
    pub setup: Option<String>,
    pub direction: String,
    pub entry_type: String,
    pub realized: Decimal,
    pub max_rr: Decimal,
    pub result: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

fn column<T: FromStr<Err = UnknownValue>>(raw: &str) -> Result<T, StoreError> {
    raw.parse::<T>().map_err(|e| StoreError::Corrupt {
        table: "entries",
        detail: e.to_string(),
    })
}

impl TryFrom<EntryRow> for Entry {
    type Error = StoreError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        Ok(Entry {
            id: row.id,
            journal_id: row.journal_id,
            day: row.day,
            asset: column(&row.asset)?,
            ltf: column(&row.ltf)?,
            htf: column(&row.htf)?,
            entry_charts: row.entry_charts,
            session: column(&row.session)?,
            trade_type: column(&row.trade_type)?,
            setup: row.setup,
            direction: column(&row.direction)?,
            entry_type: column(&row.entry_type)?,
            realized: row.realized,
            max_rr: row.max_rr,
            result: column(&row.result)?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

/// One-row aggregate used for journal statistics
#[derive(Debug, Clone, FromRow)]
pub struct StatisticsRow {
    pub total_trades: i64,
    pub wins: i64,
    pub losses: i64,
    pub break_even: i64,
    pub total_realized: Decimal,
    pub avg_risk_reward: Decimal,
}
