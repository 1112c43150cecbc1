//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the hospital
//! system. These fixtures are designed to be consistent and predictable for
//! unit tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{BedId, BillId, Currency, DoctorId, Money, PatientId};
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Standard consultation fee
    pub fn consultation_fee() -> Money {
        Money::inr(dec!(500.00))
    }

    /// Standard daily room charge
    pub fn room_charge() -> Money {
        Money::inr(dec!(1200.00))
    }

    /// A small amount for partial payments
    pub fn partial_payment() -> Money {
        Money::inr(dec!(100.00))
    }

    /// A zero INR amount
    pub fn inr_zero() -> Money {
        Money::zero(Currency::INR)
    }

    /// A USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }

    /// A negative amount for invalid input tests
    pub fn negative() -> Money {
        Money::inr(dec!(-50.00))
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Reference "now" all deterministic tests pivot around
    pub fn reference_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap()
    }

    /// A due date comfortably after the reference now
    pub fn future_due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
    }

    /// A due date before the reference now, for overdue scenarios
    pub fn past_due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Creates a deterministic patient ID for testing
    pub fn patient_id() -> PatientId {
        PatientId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440001))
    }

    /// Creates a deterministic doctor ID for testing
    pub fn doctor_id() -> DoctorId {
        DoctorId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440002))
    }

    /// Creates a deterministic bill ID for testing
    pub fn bill_id() -> BillId {
        BillId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440003))
    }

    /// Creates a deterministic bed ID for testing
    pub fn bed_id() -> BedId {
        BedId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440004))
    }
}
