// handlers/mod.rs - two-tier handler layout
//
// Public (no auth) -> Protected (JWT auth, role checked per resource)
pub mod public;    // /, /health, /auth/login, /chat
pub mod protected; // /api/*, /upload
