// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// The JWT middleware injects the caller's `Session` as a request extension.
// Resource handlers additionally check the descriptor's required role.

pub mod auth;   // Current session
pub mod data;   // Registry-driven resource CRUD
pub mod upload; // Multipart file upload
