// Row shapes as stored in Postgres
pub mod entry;
pub mod journal;
pub mod user;

pub use entry::{EntryRow, StatisticsRow};
pub use journal::JournalRow;
pub use user::UserRow;
