//! Infrastructure Database Layer
//!
//! This crate provides the database infrastructure for the hospital core
//! system on PostgreSQL using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern, providing data access
//! abstractions that hide the database implementation details from the
//! domain layer. The relational store is the sole source of truth: no
//! mutable entity is cached in process across requests, and every operation
//! runs inside a single transaction. Read-modify-write sequences take row
//! locks (`SELECT ... FOR UPDATE`) so concurrent writes serialize instead of
//! racing; conflicting writes surface as retryable conflicts.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, BillingRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/hospital")).await?;
//! let repo = BillingRepository::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{DatabasePool, create_pool, DatabaseConfig};
pub use error::DatabaseError;
pub use repositories::{BedRepository, BillingRepository, DashboardRepository};
