pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod types;
