// handlers/protected/journals.rs - /journals and /journals/:id

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::Page;
use crate::domain::{Journal, JournalInput, JournalWithEntries};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, OwnedJournal};
use crate::services::Paginated;

/// `limit`/`offset` as raw strings; unparsable values fall back to defaults
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PageQuery {
    pub fn page(&self, state: &AppState) -> Page {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
        Page::from_query(
            parse(&self.limit),
            parse(&self.offset),
            &state.config.pagination,
        )
    }
}

/// GET /journals
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Paginated<Journal>> {
    let Query(query) = query?;
    let page = query.page(&state);
    let journals = state.services.journals.list(&state.ctx(), user.user_id, page).await?;
    Ok(ApiResponse::success(journals))
}

/// POST /journals
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<JournalInput>, JsonRejection>,
) -> ApiResult<Journal> {
    let Json(input) = payload?;
    let journal = state
        .services
        .journals
        .create(&state.ctx(), user.user_id, input)
        .await?;
    Ok(ApiResponse::created(journal))
}

/// GET /journals/:id - already loaded by the ownership guard
pub async fn get(Extension(OwnedJournal(journal)): Extension<OwnedJournal>) -> ApiResult<Journal> {
    Ok(ApiResponse::success(journal))
}

/// GET /journals/:id/with-entries
pub async fn with_entries(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(OwnedJournal(journal)): Extension<OwnedJournal>,
) -> ApiResult<JournalWithEntries> {
    let body = state
        .services
        .journals
        .with_entries(&state.ctx(), user.user_id, journal.id)
        .await?;
    Ok(ApiResponse::success(body))
}

/// PUT /journals/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(OwnedJournal(journal)): Extension<OwnedJournal>,
    payload: Result<Json<JournalInput>, JsonRejection>,
) -> ApiResult<Journal> {
    let Json(input) = payload?;
    let updated = state
        .services
        .journals
        .update(&state.ctx(), user.user_id, journal.id, input)
        .await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /journals/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(OwnedJournal(journal)): Extension<OwnedJournal>,
) -> ApiResult<Value> {
    state
        .services
        .journals
        .delete(&state.ctx(), user.user_id, journal.id)
        .await?;
    Ok(ApiResponse::success(json!({ "id": journal.id, "deleted": true })))
}
