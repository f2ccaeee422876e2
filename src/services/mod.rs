// Business operations over the stores. Every call takes the request's `Ctx`.
pub mod access;
pub mod entry_service;
pub mod error;
pub mod journal_service;
pub mod user_service;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

pub use access::AccessControl;
pub use entry_service::EntryService;
pub use error::{AuthFailure, InfraContext, ServiceError, ServiceResult};
pub use journal_service::JournalService;
pub use user_service::{AuthSession, UserService};

use crate::auth::TokenIssuer;
use crate::cache::Cache;
use crate::database::{Page, Stores};

/// One page of a listing plus the unpaged total
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: Page) -> Self {
        Self {
            items,
            total,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub journals: JournalService,
    pub entries: EntryService,
}

impl Services {
    pub fn new(
        stores: &Stores,
        cache: Arc<dyn Cache>,
        tokens: Arc<TokenIssuer>,
        journal_ttl: Duration,
    ) -> Self {
        let access = AccessControl::new(stores.journals.clone(), stores.entries.clone());
        Self {
            users: UserService::new(stores.users.clone(), tokens),
            journals: JournalService::new(
                stores.journals.clone(),
                stores.entries.clone(),
                access.clone(),
                cache,
                journal_ttl,
            ),
            entries: EntryService::new(stores.entries.clone(), access),
        }
    }
}
