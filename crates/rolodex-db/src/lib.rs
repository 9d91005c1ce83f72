//! Rolodex DB - Database abstractions
//!
//! SQLx-based persistence for users and sessions. Every repository method is a
//! single statement; nothing here opens a multi-statement transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use rolodex_db::{create_pool_with_options, run_migrations, PoolOptions, Repositories};
//!
//! let pool = create_pool_with_options("postgres://localhost/rolodex", &PoolOptions::default()).await?;
//! run_migrations(&pool).await?;
//! let repos = Repositories::new(pool);
//!
//! let user = repos.users.find_by_email("user@example.com").await?;
//! ```

pub mod error;
#[cfg(feature = "memory")]
pub mod memory;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool_with_options, run_migrations, DbPool, PoolOptions};
pub use repo::*;
