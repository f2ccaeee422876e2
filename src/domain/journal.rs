use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{check_length, Entry, ValidationError};

/// A named collection of trade entries; ownership is fixed at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Journal {
    pub fn new(user_id: Uuid, input: JournalInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Entity invariants: owner set, name present
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.is_nil() {
            return Err(ValidationError::InvalidUserId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::InvalidJournalName);
        }
        Ok(())
    }

    /// Replace the mutable fields; `user_id` never changes.
    pub fn apply(&mut self, input: JournalInput) {
        self.name = input.name;
        self.description = input.description;
        self.updated_at = Utc::now();
    }
}

/// Create/update body for a journal
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JournalInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl JournalInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("name", &self.name, 1, 255)?;
        if let Some(description) = &self.description {
            check_length("description", description, 0, 1000)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JournalWithEntries {
    #[serde(flatten)]
    pub journal: Journal,
    pub entries: Vec<Entry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> JournalInput {
        JournalInput {
            name: name.to_string(),
            description: None,
        }
    }

    #[test]
    fn validate_checks_owner_before_name() {
        let mut journal = Journal::new(Uuid::nil(), input(""));
        assert_eq!(journal.validate(), Err(ValidationError::InvalidUserId));

        journal.user_id = Uuid::new_v4();
        assert_eq!(journal.validate(), Err(ValidationError::InvalidJournalName));

        journal.name = "Forex Main".into();
        assert!(journal.validate().is_ok());
    }

    #[test]
    fn whitespace_name_is_invalid() {
        let journal = Journal::new(Uuid::new_v4(), input("   "));
        assert_eq!(journal.validate(), Err(ValidationError::InvalidJournalName));
    }

    #[test]
    fn input_enforces_length_bounds() {
        assert!(input("x").validate().is_ok());
        assert_eq!(input("").validate().unwrap_err().field_name(), "name");
        assert!(input(&"n".repeat(255)).validate().is_ok());
        assert!(input(&"n".repeat(256)).validate().is_err());

        let long_description = JournalInput {
            name: "ok".into(),
            description: Some("d".repeat(1001)),
        };
        assert_eq!(long_description.validate().unwrap_err().field_name(), "description");
    }

    #[test]
    fn apply_keeps_identity_and_owner() {
        let owner = Uuid::new_v4();
        let mut journal = Journal::new(owner, input("Old"));
        let id = journal.id;
        journal.apply(JournalInput {
            name: "New".into(),
            description: Some("swing setups".into()),
        });
        assert_eq!(journal.id, id);
        assert_eq!(journal.user_id, owner);
        assert_eq!(journal.name, "New");
        assert!(journal.updated_at >= journal.created_at);
    }
}
