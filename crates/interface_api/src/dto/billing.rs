//! Billing DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::Currency;
use domain_billing::{Bill, BillStatus, BillType, LineItemDraft, MedicineLine, Payment, PaymentMethod};

/// Request body for creating a bill
///
/// Medicine entries are screened leniently: incomplete or invalid rows are
/// skipped, and the response reports how many were dropped.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBillRequest {
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    #[serde(default)]
    pub bill_type: BillType,
    #[serde(default)]
    pub currency: Currency,
    pub doctor_fee: Option<Decimal>,
    pub room_charge: Option<Decimal>,
    /// GST rate as a percentage; defaults to 18
    pub tax_rate: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub insurance_amount: Option<Decimal>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub medicines: Vec<LineItemDraft>,
}

/// Request body for recording a payment
#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub method: PaymentMethod,
    #[validate(length(max = 128))]
    pub transaction_id: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Query parameters for listing bills
#[derive(Debug, Deserialize)]
pub struct ListBillsQuery {
    pub patient_id: Option<Uuid>,
    pub status: Option<BillStatus>,
}

/// A bill, as returned by the API
#[derive(Debug, Serialize)]
pub struct BillResponse {
    pub id: Uuid,
    pub invoice_number: Option<String>,
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub bill_type: BillType,
    pub currency: Currency,
    pub doctor_fee: Decimal,
    pub room_charge: Decimal,
    pub medicine_total: Decimal,
    pub tax_rate: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub discount_amount: Decimal,
    pub insurance_amount: Decimal,
    pub description: String,
    pub status: BillStatus,
    pub due_date: NaiveDate,
    pub paid_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub medicines: Vec<MedicineLineResponse>,
}

impl BillResponse {
    /// Builds the response from a bill and its (possibly empty) lines
    pub fn from_bill(bill: Bill, lines: Vec<MedicineLine>) -> Self {
        Self {
            id: bill.id.into(),
            invoice_number: bill.invoice_number,
            patient_id: bill.patient_id.into(),
            appointment_id: bill.appointment_id.map(Into::into),
            bill_type: bill.bill_type,
            currency: bill.currency,
            doctor_fee: bill.doctor_fee.amount(),
            room_charge: bill.room_charge.amount(),
            medicine_total: bill.medicine_total.amount(),
            tax_rate: bill.tax_rate.as_percentage(),
            subtotal: bill.subtotal.amount(),
            tax_amount: bill.tax_amount.amount(),
            total_amount: bill.total_amount.amount(),
            paid_amount: bill.paid_amount.amount(),
            pending_amount: bill.pending_amount.amount(),
            discount_amount: bill.discount_amount.amount(),
            insurance_amount: bill.insurance_amount.amount(),
            description: bill.description,
            status: bill.status,
            due_date: bill.due_date,
            paid_date: bill.paid_date,
            created_at: bill.created_at,
            updated_at: bill.updated_at,
            medicines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// A medicine line, as returned by the API
#[derive(Debug, Serialize)]
pub struct MedicineLineResponse {
    pub id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

impl From<MedicineLine> for MedicineLineResponse {
    fn from(line: MedicineLine) -> Self {
        Self {
            id: line.id.into(),
            name: line.name,
            quantity: line.quantity,
            unit_price: line.unit_price.amount(),
            total_price: line.total_price.amount(),
        }
    }
}

/// Response for bill creation; carries the leniency skip count
#[derive(Debug, Serialize)]
pub struct CreateBillResponse {
    #[serde(flatten)]
    pub bill: BillResponse,
    /// Number of medicine rows dropped by screening
    pub skipped_items: usize,
}

/// A payment, as returned by the API
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id.into(),
            bill_id: payment.bill_id.into(),
            amount: payment.amount.amount(),
            method: payment.method,
            transaction_id: payment.transaction_id,
            paid_at: payment.paid_at,
            notes: payment.notes,
        }
    }
}

/// Response for recording a payment: the payment and the updated bill
#[derive(Debug, Serialize)]
pub struct RecordPaymentResponse {
    pub payment: PaymentResponse,
    pub bill: BillResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{BillId, Money, PatientId};
    use domain_billing::screen_line_items;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_response_flattens_bill_and_reports_skips() {
        let mut bill = Bill::new(
            PatientId::new(),
            BillType::Consultation,
            NaiveDate::from_ymd_opt(2099, 12, 31).unwrap(),
            Currency::INR,
        )
        .with_doctor_fee(Money::inr(dec!(500)));
        bill.recompute().unwrap();

        let response = CreateBillResponse {
            bill: BillResponse::from_bill(bill, Vec::new()),
            skipped_items: 2,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["skipped_items"], 2);
        assert_eq!(json["total_amount"], "590.00");
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn test_negative_quantity_line_deserializes_and_is_screened_out() {
        let body = serde_json::json!({
            "patient_id": "550e8400-e29b-41d4-a716-446655440001",
            "due_date": "2099-12-31",
            "medicines": [
                {"name": "Paracetamol", "quantity": -1, "unit_price": "2.50"},
                {"name": "Paracetamol", "quantity": 10, "unit_price": "2.50"}
            ]
        });

        // The bad row must survive deserialization and fall to screening,
        // not bounce the whole request.
        let request: CreateBillRequest = serde_json::from_value(body).unwrap();
        let screened = screen_line_items(BillId::new(), request.currency, &request.medicines);

        assert_eq!(screened.accepted.len(), 1);
        assert_eq!(screened.skipped, 1);
        assert_eq!(screened.medicine_total(request.currency).amount(), dec!(25.00));
    }
}
