// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Route Prefix: /api/v1/journals/*
// Middleware: jwt_auth_middleware, then require_journal_owner on /journals/:id/*
pub mod entries;
pub mod journals;
