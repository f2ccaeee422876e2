pub mod manager;
pub mod memory;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod store;

pub use manager::StoreError;
pub use memory::MemoryStore;
pub use repository::PgRepository;
pub use store::{EntryStore, HealthCheck, JournalStore, Page, Stores, UserStore};
