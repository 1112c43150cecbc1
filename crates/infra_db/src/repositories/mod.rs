//! Repository implementations for domain entities
//!
//! This module provides concrete repository implementations that handle
//! database access for each domain aggregate. Repositories encapsulate
//! SQL queries and map between database rows and domain types.
//!
//! # Architecture
//!
//! Each repository follows these principles:
//! - Every multi-step operation runs in a single transaction
//! - Read-modify-write sequences lock their rows (`SELECT ... FOR UPDATE`)
//! - Domain invariants are checked on the domain types, not in SQL
//! - Runtime-checked queries; row structs derive `sqlx::FromRow`

pub mod billing;
pub mod beds;
pub mod dashboard;

pub use billing::BillingRepository;
pub use beds::BedRepository;
pub use dashboard::DashboardRepository;
