use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{check_length, ValidationError};
use crate::types::{
    CurrencyPair, EntryType, TimeFrame, TradeDirection, TradeResult, TradeType, TradingSession,
};

/// Monetary and ratio columns are NUMERIC(12,2)
const DECIMAL_SCALE: u32 = 2;
const DECIMAL_LIMIT: i64 = 10_000_000_000;

/// A single recorded trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub journal_id: Uuid,
    pub day: DateTime<Utc>,
    pub asset: CurrencyPair,
    pub ltf: TimeFrame,
    pub htf: TimeFrame,
    pub entry_charts: Vec<String>,
    pub session: TradingSession,
    pub trade_type: TradeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup: Option<String>,
    pub direction: TradeDirection,
    pub entry_type: EntryType,
    pub realized: Decimal,
    pub max_rr: Decimal,
    pub result: TradeResult,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn new(journal_id: Uuid, fields: EntryFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            journal_id,
            day: fields.day,
            asset: fields.asset,
            ltf: fields.ltf,
            htf: fields.htf,
            entry_charts: fields.entry_charts,
            session: fields.session,
            trade_type: fields.trade_type,
            setup: fields.setup,
            direction: fields.direction,
            entry_type: fields.entry_type,
            realized: fields.realized,
            max_rr: fields.max_rr,
            result: fields.result,
            notes: fields.notes,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Overwrite every trade field; identity, journal and created_at are kept.
    pub fn apply(&mut self, fields: EntryFields) {
        let id = self.id;
        let journal_id = self.journal_id;
        let created_at = self.created_at;
        *self = Entry::new(journal_id, fields);
        self.id = id;
        self.created_at = created_at;
    }
}

/// Entry create/update body as received. Fixed-value fields stay strings until
/// `validate` so a bad value produces the field-specific error.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryInput {
    pub day: DateTime<Utc>,
    pub asset: String,
    pub ltf: String,
    pub htf: String,
    #[serde(default)]
    pub entry_charts: Vec<String>,
    pub session: String,
    pub trade_type: String,
    #[serde(default)]
    pub setup: Option<String>,
    pub direction: String,
    pub entry_type: String,
    pub realized: Decimal,
    pub max_rr: Decimal,
    pub result: String,
    #[serde(default)]
    pub notes: String,
}

/// Validated, typed trade fields
#[derive(Debug, Clone, PartialEq)]
pub struct EntryFields {
    pub day: DateTime<Utc>,
    pub asset: CurrencyPair,
    pub ltf: TimeFrame,
    pub htf: TimeFrame,
    pub entry_charts: Vec<String>,
    pub session: TradingSession,
    pub trade_type: TradeType,
    pub setup: Option<String>,
    pub direction: TradeDirection,
    pub entry_type: EntryType,
    pub realized: Decimal,
    pub max_rr: Decimal,
    pub result: TradeResult,
    pub notes: String,
}

impl EntryInput {
    /// Request-shape checks first, then the entity checks in fixed order:
    /// journal id, asset, ltf, htf, session, trade type, direction, entry
    /// type, result. The first failure is returned.
    pub fn validate(&self, journal_id: Uuid) -> Result<EntryFields, ValidationError> {
        if let Some(setup) = &self.setup {
            check_length("setup", setup, 0, 500)?;
        }
        check_length("notes", &self.notes, 0, 5000)?;
        for chart in &self.entry_charts {
            check_chart_url(chart)?;
        }
        let realized = bounded_decimal("realized", self.realized)?;
        let max_rr = bounded_decimal("max_rr", self.max_rr)?;
        if max_rr <= Decimal::ZERO {
            return Err(ValidationError::field("max_rr", "max_rr must be greater than 0"));
        }

        if journal_id.is_nil() {
            return Err(ValidationError::InvalidJournalId);
        }
        let asset = self
            .asset
            .parse::<CurrencyPair>()
            .map_err(|_| ValidationError::InvalidAsset)?;
        let ltf = self.ltf.parse::<TimeFrame>().map_err(|_| ValidationError::InvalidLtf)?;
        let htf = self.htf.parse::<TimeFrame>().map_err(|_| ValidationError::InvalidHtf)?;
        let session = self
            .session
            .parse::<TradingSession>()
            .map_err(|_| ValidationError::InvalidSession)?;
        let trade_type = self
            .trade_type
            .parse::<TradeType>()
            .map_err(|_| ValidationError::InvalidTradeType)?;
        let direction = self
            .direction
            .parse::<TradeDirection>()
            .map_err(|_| ValidationError::InvalidDirection)?;
        let entry_type = self
            .entry_type
            .parse::<EntryType>()
            .map_err(|_| ValidationError::InvalidEntryType)?;
        let result = self
            .result
            .parse::<TradeResult>()
            .map_err(|_| ValidationError::InvalidResult)?;

        Ok(EntryFields {
            day: self.day,
            asset,
            ltf,
            htf,
            entry_charts: self.entry_charts.clone(),
            session,
            trade_type,
            setup: self.setup.clone(),
            direction,
            entry_type,
            realized,
            max_rr,
            result,
            notes: self.notes.clone(),
        })
    }
}

fn check_chart_url(chart: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::field("entry_charts", format!("invalid chart URL '{}'", chart));
    let url = url::Url::parse(chart).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(())
}

fn bounded_decimal(field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
    let value = value.round_dp(DECIMAL_SCALE);
    if value.abs() >= Decimal::from(DECIMAL_LIMIT) {
        return Err(ValidationError::field(field, format!("{} is out of range", field)));
    }
    Ok(value)
}

/// Query-string filters for the entry listing, as received
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryFilterQuery {
    pub asset: Option<String>,
    pub session: Option<String>,
    pub result: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Typed entry filter; every present criterion must match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    pub asset: Option<CurrencyPair>,
    pub session: Option<TradingSession>,
    pub result: Option<TradeResult>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl EntryFilter {
    pub fn is_empty(&self) -> bool {
        *self == EntryFilter::default()
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        self.asset.map_or(true, |a| entry.asset == a)
            && self.session.map_or(true, |s| entry.session == s)
            && self.result.map_or(true, |r| entry.result == r)
            && self.start.map_or(true, |start| entry.day >= start)
            && self.end.map_or(true, |end| entry.day <= end)
    }
}

impl TryFrom<EntryFilterQuery> for EntryFilter {
    type Error = ValidationError;

    fn try_from(query: EntryFilterQuery) -> Result<Self, Self::Error> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let asset = non_empty(query.asset)
            .map(|s| s.parse::<CurrencyPair>().map_err(|_| ValidationError::InvalidAsset))
            .transpose()?;
        let session = non_empty(query.session)
            .map(|s| s.parse::<TradingSession>().map_err(|_| ValidationError::InvalidSession))
            .transpose()?;
        let result = non_empty(query.result)
            .map(|s| s.parse::<TradeResult>().map_err(|_| ValidationError::InvalidResult))
            .transpose()?;
        let start = non_empty(query.start_date)
            .map(|s| parse_bound("start_date", &s, false))
            .transpose()?;
        let end = non_empty(query.end_date)
            .map(|s| parse_bound("end_date", &s, true))
            .transpose()?;

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ValidationError::field(
                    "start_date",
                    "start_date must not be after end_date",
                ));
            }
        }

        Ok(EntryFilter {
            asset,
            session,
            result,
            start,
            end,
        })
    }
}

/// RFC 3339 timestamp or plain `YYYY-MM-DD`; a plain end date covers the whole day.
fn parse_bound(
    field: &'static str,
    raw: &str,
    end_of_day: bool,
) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let invalid = || {
        ValidationError::field(
            field,
            format!("{} must be RFC 3339 or YYYY-MM-DD", field),
        )
    };
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?;
    let naive = if end_of_day {
        date.and_hms_nano_opt(23, 59, 59, 999_999_999)
    } else {
        date.and_hms_opt(0, 0, 0)
    }
    .ok_or_else(invalid)?;
    Ok(Utc.from_utc_datetime(&naive))
}
