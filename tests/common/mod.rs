#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use tradejournal_api::app::{self, AppState};
use tradejournal_api::cache::MemoryCache;
use tradejournal_api::config::{AppConfig, DatabaseBackend};
use tradejournal_api::database::{JournalStore, MemoryStore, Page, StoreError, Stores};
use tradejournal_api::domain::Journal;

pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Journal store wrapper counting primary-key reads
pub struct CountingJournals {
    inner: Arc<MemoryStore>,
    reads: Arc<AtomicUsize>,
}

#[async_trait]
impl JournalStore for CountingJournals {
    async fn create(&self, journal: &Journal) -> Result<(), StoreError> {
        JournalStore::create(self.inner.as_ref(), journal).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Journal>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        JournalStore::find_by_id(self.inner.as_ref(), id).await
    }

    async fn list_by_user(&self, user_id: Uuid, page: Page) -> Result<Vec<Journal>, StoreError> {
        self.inner.list_by_user(user_id, page).await
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64, StoreError> {
        self.inner.count_by_user(user_id).await
    }

    async fn update(&self, journal: &Journal) -> Result<bool, StoreError> {
        JournalStore::update(self.inner.as_ref(), journal).await
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError> {
        JournalStore::soft_delete(self.inner.as_ref(), id).await
    }

    async fn exists_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        self.inner.exists_for_user(id, user_id).await
    }
}

/// In-process application over the memory backend and memory cache
pub struct TestApp {
    pub router: Router,
    pub stores: Stores,
    pub journal_reads: Arc<AtomicUsize>,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.database.backend = DatabaseBackend::Memory;
    config.auth.jwt_secret = JWT_SECRET.to_string();
    config.rate_limit.enabled = false;
    config
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let memory = Arc::new(MemoryStore::new());
        let journal_reads = Arc::new(AtomicUsize::new(0));
        let stores = Stores {
            users: memory.clone(),
            journals: Arc::new(CountingJournals {
                inner: memory.clone(),
                reads: journal_reads.clone(),
            }),
            entries: memory.clone(),
            health: memory,
        };
        let state = AppState::new(config, stores.clone(), Arc::new(MemoryCache::new()))
            .expect("test config has a valid JWT secret");
        Self {
            router: app::router(state),
            stores,
            journal_reads,
        }
    }

    pub fn journal_reads(&self) -> usize {
        self.journal_reads.load(Ordering::SeqCst)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        self.send_with_headers(method, uri, token, body, &[]).await
    }

    pub async fn send_with_headers(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
        };
        Ok((status, json))
    }

    /// Register a user and return their access token
    pub async fn sign_up(&self, email: &str, username: &str) -> Result<String> {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/sign-up",
                None,
                Some(json!({
                    "email": email,
                    "username": username,
                    "password": "correct-horse-battery"
                })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "sign-up failed: {} {}", status, body);
        body["data"]["access_token"]
            .as_str()
            .map(str::to_string)
            .context("sign-up response has no access token")
    }

    pub async fn create_journal(&self, token: &str, name: &str) -> Result<String> {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/journals",
                Some(token),
                Some(json!({ "name": name, "description": "majors only" })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create journal failed: {} {}", status, body);
        body["data"]["id"]
            .as_str()
            .map(str::to_string)
            .context("journal response has no id")
    }

    pub async fn create_entry(&self, token: &str, journal_id: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(
            Method::POST,
            &format!("/api/v1/journals/{}/entries", journal_id),
            Some(token),
            Some(body),
        )
        .await
    }
}

/// A valid winning EURUSD trade
pub fn entry_body() -> Value {
    json!({
        "day": "2024-03-15T10:00:00Z",
        "asset": "EURUSD",
        "ltf": "15M",
        "htf": "4H",
        "entry_charts": ["https://www.tradingview.com/x/abc123/"],
        "session": "london",
        "trade_type": "intraday",
        "setup": "London open liquidity sweep",
        "direction": "buy",
        "entry_type": "limit",
        "realized": 120.50,
        "max_rr": 2.5,
        "result": "TP",
        "notes": "clean entry"
    })
}

/// `entry_body` with some fields replaced
pub fn entry_with(overrides: Value) -> Value {
    let mut body = entry_body();
    if let (Some(target), Some(source)) = (body.as_object_mut(), overrides.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    body
}
