// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Route Prefix: /api/v1/auth/*, plus the root banner and health probe
pub mod auth;
pub mod health;
