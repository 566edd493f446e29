// handlers/public/auth/mod.rs - token acquisition

pub mod login; // POST /auth/login - exchange an identity for a session token

pub use login::login;
