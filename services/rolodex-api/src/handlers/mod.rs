//! HTTP handlers

mod auth;
mod health;

pub use auth::{login, logout, me, refresh, register, reset_password, send_reset_email};
pub use health::{health, index, ready};
