use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{check_length, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(email: &str, username: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            username: username.trim().to_string(),
            password_hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// POST /auth/sign-up body
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpInput {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl SignUpInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_valid_email(self.email.trim()) {
            return Err(ValidationError::field("email", "email must be a valid address"));
        }
        check_length("username", self.username.trim(), 3, 50)?;
        if self.password.chars().count() < 8 {
            return Err(ValidationError::field(
                "password",
                "password must be at least 8 characters",
            ));
        }
        Ok(())
    }
}

/// POST /auth/sign-in body
#[derive(Debug, Clone, Deserialize)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

impl SignInInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_valid_email(self.email.trim()) {
            return Err(ValidationError::field("email", "email must be a valid address"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::field("password", "password is required"));
        }
        Ok(())
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Structural address check: one `@`, a non-empty local part and a dotted domain
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}
