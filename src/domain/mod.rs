// Domain entities: users own journals, journals own trade entries.
pub mod entry;
pub mod journal;
pub mod statistics;
pub mod user;

pub use entry::{Entry, EntryFields, EntryFilter, EntryFilterQuery, EntryInput};
pub use journal::{Journal, JournalInput, JournalWithEntries};
pub use statistics::Statistics;
pub use user::{SignInInput, SignUpInput, User};

/// Structural problems with caller input, detected before anything is persisted.
///
/// Entity validation stops at the first failing check, so a request only ever
/// reports one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid user ID")]
    InvalidUserId,

    #[error("invalid journal ID")]
    InvalidJournalId,

    #[error("invalid journal name")]
    InvalidJournalName,

    #[error("invalid currency pair asset")]
    InvalidAsset,

    #[error("invalid lower timeframe (LTF)")]
    InvalidLtf,

    #[error("invalid higher timeframe (HTF)")]
    InvalidHtf,

    #[error("invalid trading session")]
    InvalidSession,

    #[error("invalid trade type")]
    InvalidTradeType,

    #[error("invalid trade direction")]
    InvalidDirection,

    #[error("invalid entry type")]
    InvalidEntryType,

    #[error("invalid trade result")]
    InvalidResult,

    /// Request-shape constraint (length, range, format) on a named field
    #[error("{message}")]
    Field { field: &'static str, message: String },
}

impl ValidationError {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field,
            message: message.into(),
        }
    }

    /// Name of the offending input field, as it appears in request bodies
    pub fn field_name(&self) -> &'static str {
        match self {
            ValidationError::InvalidUserId => "user_id",
            ValidationError::InvalidJournalId => "journal_id",
            ValidationError::InvalidJournalName => "name",
            ValidationError::InvalidAsset => "asset",
            ValidationError::InvalidLtf => "ltf",
            ValidationError::InvalidHtf => "htf",
            ValidationError::InvalidSession => "session",
            ValidationError::InvalidTradeType => "trade_type",
            ValidationError::InvalidDirection => "direction",
            ValidationError::InvalidEntryType => "entry_type",
            ValidationError::InvalidResult => "result",
            ValidationError::Field { field, .. } => field,
        }
    }
}

/// Character-count bounds check shared by the request validators
pub(crate) fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::field(
            field,
            format!("{} must be at least {} characters", field, min),
        ));
    }
    if len > max {
        return Err(ValidationError::field(
            field,
            format!("{} must be at most {} characters", field, max),
        ));
    }
    Ok(())
}
