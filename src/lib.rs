pub mod admin;
pub mod auth;
pub mod chat;
pub mod cli;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod rbac;
pub mod renderer;
pub mod resources;
pub mod server;
pub mod types;
pub mod uploads;
