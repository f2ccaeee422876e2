// handlers/protected/entries.rs - /journals/:id/entries

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::journals::PageQuery;
use crate::app::AppState;
use crate::domain::{Entry, EntryFilter, EntryFilterQuery, EntryInput, Statistics, ValidationError};
use crate::error::ApiError;
use crate::middleware::{parse_id, ApiResponse, ApiResult, AuthUser, OwnedJournal};
use crate::services::{Paginated, ServiceError};

#[derive(Debug, Default, Deserialize)]
pub struct EntryListQuery {
    #[serde(flatten)]
    pub page: PageQuery,
    #[serde(flatten)]
    pub filter: EntryFilterQuery,
}

fn entry_id(raw: &str) -> Result<Uuid, ApiError> {
    parse_id(raw, ValidationError::field("entry_id", "invalid entry ID"))
}

/// GET /journals/:id/entries
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(OwnedJournal(journal)): Extension<OwnedJournal>,
    query: Result<Query<EntryListQuery>, QueryRejection>,
) -> ApiResult<Paginated<Entry>> {
    let Query(query) = query?;
    let page = query.page.page(&state);
    let filter = EntryFilter::try_from(query.filter).map_err(ServiceError::from)?;
    let entries = state
        .services
        .entries
        .list(&state.ctx(), user.user_id, journal.id, &filter, page)
        .await?;
    Ok(ApiResponse::success(entries))
}

/// POST /journals/:id/entries
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(OwnedJournal(journal)): Extension<OwnedJournal>,
    payload: Result<Json<EntryInput>, JsonRejection>,
) -> ApiResult<Entry> {
    let Json(input) = payload?;
    let entry = state
        .services
        .entries
        .create(&state.ctx(), user.user_id, journal.id, input)
        .await?;
    Ok(ApiResponse::created(entry))
}

/// GET /journals/:id/entries/statistics
pub async fn statistics(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(OwnedJournal(journal)): Extension<OwnedJournal>,
) -> ApiResult<Statistics> {
    let stats = state
        .services
        .entries
        .statistics(&state.ctx(), user.user_id, journal.id)
        .await?;
    Ok(ApiResponse::success(stats))
}

/// GET /journals/:id/entries/:entry_id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(OwnedJournal(journal)): Extension<OwnedJournal>,
    Path((_, raw_entry_id)): Path<(String, String)>,
) -> ApiResult<Entry> {
    let entry_id = entry_id(&raw_entry_id)?;
    let entry = state
        .services
        .entries
        .get(&state.ctx(), user.user_id, journal.id, entry_id)
        .await?;
    Ok(ApiResponse::success(entry))
}

/// PUT /journals/:id/entries/:entry_id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(OwnedJournal(journal)): Extension<OwnedJournal>,
    Path((_, raw_entry_id)): Path<(String, String)>,
    payload: Result<Json<EntryInput>, JsonRejection>,
) -> ApiResult<Entry> {
    let entry_id = entry_id(&raw_entry_id)?;
    let Json(input) = payload?;
    let entry = state
        .services
        .entries
        .update(&state.ctx(), user.user_id, journal.id, entry_id, input)
        .await?;
    Ok(ApiResponse::success(entry))
}

/// DELETE /journals/:id/entries/:entry_id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(OwnedJournal(journal)): Extension<OwnedJournal>,
    Path((_, raw_entry_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let entry_id = entry_id(&raw_entry_id)?;
    state
        .services
        .entries
        .delete(&state.ctx(), user.user_id, journal.id, entry_id)
        .await?;
    Ok(ApiResponse::success(json!({ "id": entry_id, "deleted": true })))
}
