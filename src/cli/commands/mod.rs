pub mod access;
pub mod auth;
pub mod data;
pub mod resources;
