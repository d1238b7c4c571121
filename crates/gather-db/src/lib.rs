//! # gather-db
//!
//! Database layer implementing repository ports with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for the repository ports
//! defined in `gather-core`. It handles:
//!
//! - Connection pool management
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations, including the atomic reminder claim and
//!   the conditional signup status transitions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gather_db::pool::{create_pool, DatabaseConfig};
//! use gather_db::PgEventRepository;
//! use gather_core::EventRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env();
//!     let pool = create_pool(&config).await?;
//!     let event_repo = PgEventRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, create_pool_from_env, DatabaseConfig, PgPool};
pub use repositories::{PgEventRepository, PgMirrorRepository, PgSignupRepository};
