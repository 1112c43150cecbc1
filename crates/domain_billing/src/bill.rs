//! The Bill aggregate
//!
//! A bill collects the fee components charged to a patient, the GST applied
//! on top of them, and the payments received so far. Every mutation passes
//! through [`Bill::recompute_at`], which derives the computed fields and the
//! payment status; clients never set those fields directly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AppointmentId, BillId, Currency, Money, PatientId, Rate};
use rust_decimal_macros::dec;

use crate::error::BillingError;

/// Default GST rate applied when a request does not specify one
pub const DEFAULT_TAX_RATE_PERCENT: rust_decimal::Decimal = dec!(18.00);

/// Kind of charge a bill covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillType {
    Consultation,
    Treatment,
    Medicine,
    Room,
    Surgery,
    Emergency,
    Other,
}

impl Default for BillType {
    fn default() -> Self {
        BillType::Consultation
    }
}

/// Payment status of a bill
///
/// Derived by [`Bill::recompute_at`]; `Cancelled` is only ever set through
/// [`Bill::cancel`] and is a soft state, bills are never physically deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Pending,
    PartiallyPaid,
    Paid,
    Overdue,
    Cancelled,
}

/// A billable record for a patient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    /// Unique identifier
    pub id: BillId,
    /// Human-readable invoice number, assigned once at creation
    pub invoice_number: Option<String>,
    /// Patient being billed
    pub patient_id: PatientId,
    /// Appointment this bill arose from, if any
    pub appointment_id: Option<AppointmentId>,
    /// Kind of charge
    pub bill_type: BillType,
    /// Billing currency
    pub currency: Currency,
    /// Consultation / treatment fee
    pub doctor_fee: Money,
    /// Room and ward charges
    pub room_charge: Money,
    /// Sum of the medicine line items
    pub medicine_total: Money,
    /// GST rate as a percentage (default 18)
    pub tax_rate: Rate,
    /// Derived: doctor_fee + room_charge + medicine_total
    pub subtotal: Money,
    /// Derived: subtotal * tax_rate, rounded to the minor unit
    pub tax_amount: Money,
    /// Derived: subtotal + tax_amount - discount_amount
    pub total_amount: Money,
    /// Sum of recorded payments
    pub paid_amount: Money,
    /// Derived: total_amount - paid_amount
    pub pending_amount: Money,
    /// Discount applied before tax-inclusive total
    pub discount_amount: Money,
    /// Portion expected from insurance
    pub insurance_amount: Money,
    /// Free-text description of the charge
    pub description: String,
    /// Derived payment status
    pub status: BillStatus,
    /// Payment due date
    pub due_date: NaiveDate,
    /// When the bill was fully paid; latched, never cleared by recompute
    pub paid_date: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    /// Creates a new bill with zeroed fees and `Pending` status
    ///
    /// The invoice number is not assigned here; allocation happens inside
    /// the creation transaction so two concurrent creations cannot observe
    /// the same sequence value.
    pub fn new(
        patient_id: PatientId,
        bill_type: BillType,
        due_date: NaiveDate,
        currency: Currency,
    ) -> Self {
        let now = Utc::now();
        let zero = Money::zero(currency);

        Self {
            id: BillId::new_v7(),
            invoice_number: None,
            patient_id,
            appointment_id: None,
            bill_type,
            currency,
            doctor_fee: zero,
            room_charge: zero,
            medicine_total: zero,
            tax_rate: Rate::from_percentage(DEFAULT_TAX_RATE_PERCENT),
            subtotal: zero,
            tax_amount: zero,
            total_amount: zero,
            paid_amount: zero,
            pending_amount: zero,
            discount_amount: zero,
            insurance_amount: zero,
            description: String::new(),
            status: BillStatus::Pending,
            due_date,
            paid_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Links the bill to an appointment
    pub fn with_appointment(mut self, appointment_id: AppointmentId) -> Self {
        self.appointment_id = Some(appointment_id);
        self
    }

    /// Sets the doctor fee
    pub fn with_doctor_fee(mut self, fee: Money) -> Self {
        self.doctor_fee = fee;
        self
    }

    /// Sets the room charge
    pub fn with_room_charge(mut self, charge: Money) -> Self {
        self.room_charge = charge;
        self
    }

    /// Sets the GST rate
    pub fn with_tax_rate(mut self, rate: Rate) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Sets the discount amount
    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount_amount = discount;
        self
    }

    /// Sets the insurance amount
    pub fn with_insurance(mut self, insurance: Money) -> Self {
        self.insurance_amount = insurance;
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Assigns the invoice number, exactly once
    ///
    /// # Errors
    ///
    /// Returns `InvoiceNumberAlreadyAssigned` if the bill already carries one.
    pub fn assign_invoice_number(&mut self, number: String) -> Result<(), BillingError> {
        if let Some(existing) = &self.invoice_number {
            return Err(BillingError::InvoiceNumberAlreadyAssigned(
                self.id,
                existing.clone(),
            ));
        }
        self.invoice_number = Some(number);
        Ok(())
    }

    /// Replaces the medicine total after line items have been screened
    ///
    /// Callers must re-run [`Bill::recompute_at`] afterwards so the derived
    /// totals reflect the line items.
    pub fn set_medicine_total(&mut self, total: Money) {
        self.medicine_total = total;
    }

    /// Re-derives all computed fields and the payment status
    ///
    /// Pure with respect to its inputs (the fee fields, discount,
    /// paid_amount, tax_rate, due_date, and `now`); invoking it twice with
    /// unchanged inputs yields identical output. Status derivation follows a
    /// strict precedence, first match wins:
    ///
    /// 1. `pending_amount <= 0` → `Paid` (paid_date latched if unset)
    /// 2. `paid_amount > 0` → `PartiallyPaid`
    /// 3. `due_date < today` → `Overdue`
    /// 4. otherwise the status is left as previously set
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` if the discounted total would be negative,
    /// or a fee input is negative.
    pub fn recompute_at(&mut self, now: DateTime<Utc>) -> Result<(), BillingError> {
        for (field, value) in [
            ("doctor_fee", self.doctor_fee),
            ("room_charge", self.room_charge),
            ("medicine_total", self.medicine_total),
            ("discount_amount", self.discount_amount),
            ("paid_amount", self.paid_amount),
        ] {
            if value.is_negative() {
                return Err(BillingError::InvalidAmount(format!(
                    "{} must be non-negative, got {}",
                    field, value
                )));
            }
        }

        self.subtotal = self
            .doctor_fee
            .checked_add(&self.room_charge)?
            .checked_add(&self.medicine_total)?;
        self.tax_amount = self.tax_rate.apply(&self.subtotal).round_to_currency();

        let total = self
            .subtotal
            .checked_add(&self.tax_amount)?
            .checked_sub(&self.discount_amount)?;
        if total.is_negative() {
            return Err(BillingError::InvalidAmount(format!(
                "total would be negative after discount: {}",
                total
            )));
        }
        self.total_amount = total;
        self.pending_amount = self.total_amount.checked_sub(&self.paid_amount)?;

        if !self.pending_amount.is_positive() {
            self.status = BillStatus::Paid;
            if self.paid_date.is_none() {
                self.paid_date = Some(now);
            }
        } else if self.paid_amount.is_positive() {
            self.status = BillStatus::PartiallyPaid;
        } else if self.due_date < now.date_naive() {
            self.status = BillStatus::Overdue;
        }

        self.updated_at = now;
        Ok(())
    }

    /// Re-derives computed fields against the current wall clock
    pub fn recompute(&mut self) -> Result<(), BillingError> {
        self.recompute_at(Utc::now())
    }

    /// Records a payment against the bill and re-derives its state
    ///
    /// # Errors
    ///
    /// Returns `NonPositivePayment` for zero or negative amounts and
    /// `BillCancelled` if the bill has been cancelled.
    pub fn apply_payment(&mut self, amount: Money, now: DateTime<Utc>) -> Result<(), BillingError> {
        if self.status == BillStatus::Cancelled {
            return Err(BillingError::BillCancelled(self.id));
        }
        if !amount.is_positive() {
            return Err(BillingError::NonPositivePayment(amount.to_string()));
        }
        self.paid_amount = self.paid_amount.checked_add(&amount)?;
        self.recompute_at(now)
    }

    /// Marks the bill paid without reconciling amounts
    ///
    /// This is the explicit shortcut path: status flips to `Paid` and
    /// `paid_date` is stamped, but `paid_amount` and `pending_amount` are
    /// left untouched. Callers are expected to have reconciled payments
    /// beforehand via [`Bill::apply_payment`].
    pub fn mark_paid(&mut self, now: DateTime<Utc>) {
        self.status = BillStatus::Paid;
        self.paid_date = Some(now);
        self.updated_at = now;
    }

    /// Cancels the bill (soft state; bills are never deleted)
    pub fn cancel(&mut self, now: DateTime<Utc>) {
        self.status = BillStatus::Cancelled;
        self.updated_at = now;
    }

    /// Returns true if the bill is past due and not settled or cancelled
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today
            && !matches!(self.status, BillStatus::Paid | BillStatus::Cancelled)
    }

    /// Returns the invoice number
    ///
    /// # Errors
    ///
    /// Returns `InvoiceNumberMissing` for a bill that has not been persisted
    /// through the creation transaction yet.
    pub fn invoice_number(&self) -> Result<&str, BillingError> {
        self.invoice_number
            .as_deref()
            .ok_or(BillingError::InvoiceNumberMissing(self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_bill() -> Bill {
        Bill::new(
            PatientId::new(),
            BillType::Consultation,
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            Currency::INR,
        )
    }

    #[test]
    fn test_invoice_number_assigned_once() {
        let mut bill = test_bill();
        bill.assign_invoice_number("INV-000001".to_string()).unwrap();

        let second = bill.assign_invoice_number("INV-000002".to_string());
        assert!(matches!(
            second,
            Err(BillingError::InvoiceNumberAlreadyAssigned(_, _))
        ));
        assert_eq!(bill.invoice_number().unwrap(), "INV-000001");
    }

    #[test]
    fn test_negative_fee_rejected() {
        let mut bill = test_bill().with_doctor_fee(Money::inr(dec!(-5)));
        assert!(matches!(
            bill.recompute(),
            Err(BillingError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_discount_exceeding_total_rejected() {
        let mut bill = test_bill()
            .with_doctor_fee(Money::inr(dec!(100)))
            .with_discount(Money::inr(dec!(500)));
        assert!(matches!(
            bill.recompute(),
            Err(BillingError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_payment_on_cancelled_bill_rejected() {
        let now = Utc::now();
        let mut bill = test_bill().with_doctor_fee(Money::inr(dec!(100)));
        bill.recompute_at(now).unwrap();
        bill.cancel(now);

        let result = bill.apply_payment(Money::inr(dec!(50)), now);
        assert!(matches!(result, Err(BillingError::BillCancelled(_))));
    }
}
