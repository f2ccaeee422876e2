use std::collections::HashMap;

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
    Extension,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::domain::{Journal, ValidationError};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::ServiceError;

/// The `:id` journal of the route, verified to belong to the caller
#[derive(Clone, Debug)]
pub struct OwnedJournal(pub Journal);

/// Guard for every `/journals/:id/...` route. A journal the caller does not
/// own is indistinguishable from one that does not exist.
pub async fn require_journal_owner(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw = params.get("id").map(String::as_str).unwrap_or_default();
    let journal_id = parse_id(raw, ValidationError::InvalidJournalId)?;

    let ctx = state.ctx();
    let journal = state
        .services
        .journals
        .get_owned(&ctx, user.user_id, journal_id)
        .await?;

    request.extensions_mut().insert(OwnedJournal(journal));
    Ok(next.run(request).await)
}

/// Path ids are parsed by hand so a malformed one is a field-level 400
pub fn parse_id(raw: &str, invalid: ValidationError) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::from(ServiceError::Validation(invalid)))
}
