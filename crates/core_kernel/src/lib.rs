//! Core Kernel - Foundational types and utilities for the hospital system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed entity identifiers
//! - The shared error taxonomy

pub mod money;
pub mod identifiers;
pub mod error;

pub use money::{Money, Currency, Rate, MoneyError};
pub use identifiers::{
    PatientId, DoctorId, AppointmentId, MedicalRecordId,
    BillId, LineItemId, PaymentId, BedId, BedAssignmentId,
};
pub use error::CoreError;
