// handlers/mod.rs - Request handlers
//
// Public (no auth): service descriptor and health, defined alongside the router.
// Protected (JWT auth): the /projects resource.
pub mod projects;

pub use projects::*;
