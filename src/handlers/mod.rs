// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (bearer token, journal ownership on /journals/:id)
pub mod protected;
pub mod public;
