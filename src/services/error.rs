use thiserror::Error;

use crate::domain::ValidationError;

/// Authentication outcomes that are the caller's fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("user with this email or username already exists")]
    DuplicateIdentity,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidToken,
}

/// Error taxonomy shared by every service operation
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("access denied")]
    AccessDenied,

    #[error(transparent)]
    Auth(#[from] AuthFailure),

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Store, token or hashing failure; `context` names the failed step
    #[error("{context}: {source:#}")]
    Infrastructure {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ServiceError {
    pub fn infrastructure(context: &'static str, source: impl Into<anyhow::Error>) -> Self {
        ServiceError::Infrastructure {
            context,
            source: source.into(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Attach a step name to storage errors when propagating with `?`
pub trait InfraContext<T> {
    fn infra(self, context: &'static str) -> ServiceResult<T>;
}

impl<T, E> InfraContext<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn infra(self, context: &'static str) -> ServiceResult<T> {
        self.map_err(|e| ServiceError::infrastructure(context, e))
    }
}
