//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. These builders allow tests to specify only the relevant fields
//! while using defaults for everything else.

use chrono::NaiveDate;
use core_kernel::{Currency, Money, PatientId, Rate};
use domain_billing::{Bill, BillType};
use domain_ward::Bed;
use rust_decimal::Decimal;

use crate::fixtures::{MoneyFixtures, TemporalFixtures};

/// Builder for constructing test bills
///
/// Defaults to an INR consultation bill for the standard consultation fee,
/// due a month after the reference now, with derived fields already
/// recomputed at the reference instant.
pub struct TestBillBuilder {
    patient_id: PatientId,
    bill_type: BillType,
    currency: Currency,
    doctor_fee: Money,
    room_charge: Money,
    medicine_total: Money,
    discount: Money,
    tax_rate: Option<Rate>,
    due_date: NaiveDate,
}

impl Default for TestBillBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBillBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            patient_id: PatientId::new(),
            bill_type: BillType::Consultation,
            currency: Currency::INR,
            doctor_fee: MoneyFixtures::consultation_fee(),
            room_charge: MoneyFixtures::inr_zero(),
            medicine_total: MoneyFixtures::inr_zero(),
            discount: MoneyFixtures::inr_zero(),
            tax_rate: None,
            due_date: TemporalFixtures::future_due_date(),
        }
    }

    /// Sets the patient
    pub fn with_patient(mut self, patient_id: PatientId) -> Self {
        self.patient_id = patient_id;
        self
    }

    /// Sets the bill type
    pub fn with_bill_type(mut self, bill_type: BillType) -> Self {
        self.bill_type = bill_type;
        self
    }

    /// Sets the doctor fee
    pub fn with_doctor_fee(mut self, amount: Decimal) -> Self {
        self.doctor_fee = Money::new(amount, self.currency);
        self
    }

    /// Sets the room charge
    pub fn with_room_charge(mut self, amount: Decimal) -> Self {
        self.room_charge = Money::new(amount, self.currency);
        self
    }

    /// Sets the medicine total
    pub fn with_medicine_total(mut self, amount: Decimal) -> Self {
        self.medicine_total = Money::new(amount, self.currency);
        self
    }

    /// Sets the discount
    pub fn with_discount(mut self, amount: Decimal) -> Self {
        self.discount = Money::new(amount, self.currency);
        self
    }

    /// Overrides the GST rate (percentage)
    pub fn with_tax_rate_percent(mut self, percent: Decimal) -> Self {
        self.tax_rate = Some(Rate::from_percentage(percent));
        self
    }

    /// Sets the due date
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = due_date;
        self
    }

    /// Marks the bill overdue relative to the reference now
    pub fn overdue(mut self) -> Self {
        self.due_date = TemporalFixtures::past_due_date();
        self
    }

    /// Builds the bill with derived fields recomputed at the reference now
    ///
    /// # Panics
    ///
    /// Panics if the configured amounts are invalid; test builders fail loud.
    pub fn build(self) -> Bill {
        let mut bill = Bill::new(self.patient_id, self.bill_type, self.due_date, self.currency)
            .with_doctor_fee(self.doctor_fee)
            .with_room_charge(self.room_charge)
            .with_discount(self.discount);
        if let Some(rate) = self.tax_rate {
            bill = bill.with_tax_rate(rate);
        }
        bill.set_medicine_total(self.medicine_total);
        bill.recompute_at(TemporalFixtures::reference_now())
            .expect("test bill amounts must be valid");
        bill
    }
}

/// Builder for constructing test beds
pub struct TestBedBuilder {
    bed_number: String,
    ward: String,
    occupant: Option<PatientId>,
}

impl Default for TestBedBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBedBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            bed_number: "B-101".to_string(),
            ward: "General".to_string(),
            occupant: None,
        }
    }

    /// Sets the bed number
    pub fn with_bed_number(mut self, number: impl Into<String>) -> Self {
        self.bed_number = number.into();
        self
    }

    /// Sets the ward
    pub fn with_ward(mut self, ward: impl Into<String>) -> Self {
        self.ward = ward.into();
        self
    }

    /// Pre-assigns an occupant at the reference now
    pub fn occupied_by(mut self, patient_id: PatientId) -> Self {
        self.occupant = Some(patient_id);
        self
    }

    /// Builds the bed
    ///
    /// # Panics
    ///
    /// Panics if the pre-assignment is rejected; test builders fail loud.
    pub fn build(self) -> Bed {
        let mut bed = Bed::new(self.bed_number, self.ward);
        if let Some(patient_id) = self.occupant {
            bed.assign(patient_id, None, TemporalFixtures::reference_now())
                .expect("pre-assignment on a fresh bed must succeed");
        }
        bed
    }
}
