//! Billing domain errors

use thiserror::Error;

use core_kernel::{BillId, MoneyError};

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Money arithmetic error
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// A computed amount is out of range (e.g., discount exceeds total)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A line item failed hard validation
    #[error("Invalid line item: {0}")]
    InvalidLineItem(String),

    /// Payment amount must be strictly positive
    #[error("Payment amount must be positive, got {0}")]
    NonPositivePayment(String),

    /// The bill already carries an invoice number
    #[error("Bill {0} already has invoice number {1}")]
    InvoiceNumberAlreadyAssigned(BillId, String),

    /// The bill has no invoice number yet where one is required
    #[error("Bill {0} has no invoice number assigned")]
    InvoiceNumberMissing(BillId),

    /// The bill has been cancelled and rejects further mutation
    #[error("Bill {0} is cancelled")]
    BillCancelled(BillId),

    /// Bill not found
    #[error("Bill not found: {0}")]
    BillNotFound(String),
}
