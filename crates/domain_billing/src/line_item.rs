//! Medicine line items
//!
//! Line items arrive as loosely-shaped drafts inside the bill creation
//! payload. Screening is deliberately lenient: a draft missing a name, a
//! positive quantity, or a valid unit price is skipped rather than rejected,
//! and the skip count is surfaced so the leniency stays observable.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BillId, Currency, LineItemId, Money};

use crate::error::BillingError;

/// An ad hoc medicine charge attached to a bill at creation time
///
/// Immutable after creation; edits go through a bill-level recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineLine {
    /// Unique identifier
    pub id: LineItemId,
    /// Owning bill
    pub bill_id: BillId,
    /// Medicine name
    pub name: String,
    /// Quantity dispensed, strictly positive
    pub quantity: u32,
    /// Price per unit
    pub unit_price: Money,
    /// Derived: quantity * unit_price
    pub total_price: Money,
}

impl MedicineLine {
    /// Creates a validated medicine line
    ///
    /// # Errors
    ///
    /// Returns `InvalidLineItem` on an empty name, a zero quantity, or a
    /// negative unit price.
    pub fn new(
        bill_id: BillId,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, BillingError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BillingError::InvalidLineItem("name is empty".to_string()));
        }
        if quantity == 0 {
            return Err(BillingError::InvalidLineItem(format!(
                "quantity must be positive for '{}'",
                name
            )));
        }
        if unit_price.is_negative() {
            return Err(BillingError::InvalidLineItem(format!(
                "unit price must be non-negative for '{}'",
                name
            )));
        }

        let total_price = unit_price.multiply(Decimal::from(quantity));
        Ok(Self {
            id: LineItemId::new_v7(),
            bill_id,
            name,
            quantity,
            unit_price,
            total_price,
        })
    }
}

/// An unvalidated line item draft from a bill creation payload
///
/// `quantity` is deliberately signed: a negative quantity in the payload
/// must reach screening and be skipped there, not bounce the whole request
/// at deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItemDraft {
    /// Medicine name
    pub name: Option<String>,
    /// Quantity dispensed
    pub quantity: Option<i64>,
    /// Price per unit
    pub unit_price: Option<Decimal>,
}

impl LineItemDraft {
    /// Creates a complete draft
    pub fn new(name: impl Into<String>, quantity: i64, unit_price: Decimal) -> Self {
        Self {
            name: Some(name.into()),
            quantity: Some(quantity),
            unit_price: Some(unit_price),
        }
    }
}

/// The outcome of screening a batch of line item drafts
#[derive(Debug, Clone)]
pub struct ScreenedLines {
    /// Drafts that passed screening, in input order
    pub accepted: Vec<MedicineLine>,
    /// Number of drafts dropped by the documented leniency
    pub skipped: usize,
}

impl ScreenedLines {
    /// Sums the accepted line totals
    pub fn medicine_total(&self, currency: Currency) -> Money {
        self.accepted
            .iter()
            .fold(Money::zero(currency), |acc, line| acc + line.total_price)
    }
}

/// Screens line item drafts for a bill
///
/// Incomplete or invalid drafts are skipped, not errors: this mirrors the
/// documented intake behavior where partially filled medicine rows on the
/// billing form simply do not make it onto the invoice. The skip count is
/// reported back to the caller.
pub fn screen_line_items(
    bill_id: BillId,
    currency: Currency,
    drafts: &[LineItemDraft],
) -> ScreenedLines {
    let mut accepted = Vec::with_capacity(drafts.len());
    let mut skipped = 0;

    for draft in drafts {
        let complete = match (&draft.name, draft.quantity, draft.unit_price) {
            (Some(name), Some(quantity), Some(unit_price)) => match u32::try_from(quantity) {
                Ok(quantity) => MedicineLine::new(
                    bill_id,
                    name.clone(),
                    quantity,
                    Money::new(unit_price, currency),
                ),
                Err(_) => Err(BillingError::InvalidLineItem(format!(
                    "quantity must be positive for '{}'",
                    name
                ))),
            },
            _ => Err(BillingError::InvalidLineItem("incomplete draft".to_string())),
        };

        match complete {
            Ok(line) => accepted.push(line),
            Err(reason) => {
                tracing::debug!(%bill_id, %reason, "skipping medicine line draft");
                skipped += 1;
            }
        }
    }

    ScreenedLines { accepted, skipped }
}
