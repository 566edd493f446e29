// handlers/protected/auth/mod.rs - authenticated session endpoints

pub mod session;

pub use session::session;
