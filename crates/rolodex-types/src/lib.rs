//! Rolodex Types - Shared domain types
//!
//! This crate contains domain types used across Rolodex crates:
//! - User identity and its public projection
//! - Session identifiers and issued token pairs
//! - The JSON response envelope used by the HTTP API

pub mod api;
pub mod session;
pub mod user;

pub use api::*;
pub use session::*;
pub use user::*;
