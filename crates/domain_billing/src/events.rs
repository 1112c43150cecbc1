//! Domain events for the billing aggregate
//!
//! Events capture the significant state changes of a bill's lifecycle for
//! audit trails and downstream processes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BillId, PaymentId};

use crate::payment::PaymentMethod;

/// Domain events emitted by the Bill aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BillingEvent {
    /// A bill was created together with its line items
    BillCreated {
        bill_id: BillId,
        invoice_number: String,
        total_amount: Decimal,
        line_items: usize,
        skipped_items: usize,
        timestamp: DateTime<Utc>,
    },

    /// A payment was recorded and the bill re-derived
    PaymentRecorded {
        bill_id: BillId,
        payment_id: PaymentId,
        amount: Decimal,
        method: PaymentMethod,
        timestamp: DateTime<Utc>,
    },

    /// The bill was marked paid through the shortcut path
    BillMarkedPaid {
        bill_id: BillId,
        timestamp: DateTime<Utc>,
    },

    /// The bill was cancelled
    BillCancelled {
        bill_id: BillId,
        timestamp: DateTime<Utc>,
    },
}
