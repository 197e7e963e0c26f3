//! Farmer registration backend and dashboard client core.
//!
//! The server half (`app`, `auth`, `users`) exposes the registration, login
//! and profile API. The `client` half holds what the dashboard needs to talk
//! to it: an HTTP client, the session holder and the registration wizard.

pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod state;
pub mod users;
