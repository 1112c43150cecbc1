//! Payment records
//!
//! A payment belongs to exactly one bill. Applying one updates the owning
//! bill's paid amount and re-derives its status; both happen in the same
//! transaction at the persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BillId, Money, PaymentId};

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
    Insurance,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

/// A payment recorded against a bill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Owning bill
    pub bill_id: BillId,
    /// Payment amount, strictly positive
    pub amount: Money,
    /// Payment method
    pub method: PaymentMethod,
    /// External transaction reference (gateway ID, bank ref)
    pub transaction_id: Option<String>,
    /// When the payment was made
    pub paid_at: DateTime<Utc>,
    /// Free-text notes
    pub notes: Option<String>,
}

impl Payment {
    /// Creates a new payment record
    pub fn new(bill_id: BillId, amount: Money, method: PaymentMethod) -> Self {
        Self {
            id: PaymentId::new_v7(),
            bill_id,
            amount,
            method,
            transaction_id: None,
            paid_at: Utc::now(),
            notes: None,
        }
    }

    /// Sets the external transaction reference
    pub fn with_transaction_id(mut self, reference: impl Into<String>) -> Self {
        self.transaction_id = Some(reference.into());
        self
    }

    /// Sets free-text notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
