pub mod auth;
pub mod categories;
pub mod chat;
pub mod client;
pub mod commands;
pub mod error;
pub mod filter;
pub mod models;
pub mod recurrence;
pub mod repo;
pub mod session;
pub mod tui;
