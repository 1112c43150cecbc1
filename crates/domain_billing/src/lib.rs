//! Billing Domain - Bill computation and lifecycle
//!
//! This crate implements the billing core of the hospital system: the Bill
//! aggregate with its derived totals and payment-status lifecycle, medicine
//! line items with documented intake leniency, payment records, and invoice
//! number formatting.
//!
//! # Derivation invariants
//!
//! Every mutation re-derives the computed fields:
//! - `subtotal = doctor_fee + room_charge + medicine_total`
//! - `tax_amount = round(subtotal * tax_rate)` to the minor unit
//! - `total_amount = subtotal + tax_amount - discount_amount` (never negative)
//! - `pending_amount = total_amount - paid_amount`
//! - `pending_amount <= 0 ⇔ status == Paid`
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{Bill, BillType};
//!
//! let mut bill = Bill::new(patient_id, BillType::Consultation, due_date, currency)
//!     .with_doctor_fee(Money::inr(dec!(500)));
//! bill.recompute()?;
//! assert_eq!(bill.total_amount.amount(), dec!(590));
//! ```

pub mod bill;
pub mod line_item;
pub mod payment;
pub mod invoice;
pub mod events;
pub mod error;

pub use bill::{Bill, BillStatus, BillType, DEFAULT_TAX_RATE_PERCENT};
pub use line_item::{LineItemDraft, MedicineLine, ScreenedLines, screen_line_items};
pub use payment::{Payment, PaymentMethod};
pub use invoice::{format_invoice_number, parse_invoice_number, INVOICE_PREFIX};
pub use events::BillingEvent;
pub use error::BillingError;
