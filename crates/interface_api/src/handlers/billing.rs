//! Billing handlers
//!
//! The create path screens medicine rows, derives the bill totals on the
//! aggregate, then hands the bill to the repository, which allocates the
//! invoice number and persists everything in one transaction.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{BillId, Money, PatientId, Rate};
use domain_billing::{screen_line_items, Bill, BillingEvent};
use infra_db::BillingRepository;

use crate::dto::billing::*;
use crate::error::ApiError;
use crate::AppState;

/// Creates a bill with its medicine line items
///
/// Returns 201 with the persisted bill and the number of medicine rows
/// skipped by screening.
pub async fn create_bill(
    State(state): State<AppState>,
    Json(request): Json<CreateBillRequest>,
) -> Result<(StatusCode, Json<CreateBillResponse>), ApiError> {
    request.validate()?;
    let currency = request.currency;

    let mut bill = Bill::new(
        PatientId::from(request.patient_id),
        request.bill_type,
        request.due_date,
        currency,
    );
    if let Some(appointment_id) = request.appointment_id {
        bill = bill.with_appointment(appointment_id.into());
    }
    if let Some(fee) = request.doctor_fee {
        bill = bill.with_doctor_fee(Money::new(fee, currency));
    }
    if let Some(charge) = request.room_charge {
        bill = bill.with_room_charge(Money::new(charge, currency));
    }
    if let Some(rate) = request.tax_rate {
        bill = bill.with_tax_rate(Rate::from_percentage(rate));
    }
    if let Some(discount) = request.discount_amount {
        bill = bill.with_discount(Money::new(discount, currency));
    }
    if let Some(insurance) = request.insurance_amount {
        bill = bill.with_insurance(Money::new(insurance, currency));
    }
    if let Some(description) = request.description {
        bill = bill.with_description(description);
    }

    let screened = screen_line_items(bill.id, currency, &request.medicines);
    bill.set_medicine_total(screened.medicine_total(currency));
    bill.recompute()?;

    let bill = BillingRepository::new(state.pool.clone())
        .create_bill(bill, &screened.accepted)
        .await?;

    let event = BillingEvent::BillCreated {
        bill_id: bill.id,
        invoice_number: bill.invoice_number.clone().unwrap_or_default(),
        total_amount: bill.total_amount.amount(),
        line_items: screened.accepted.len(),
        skipped_items: screened.skipped,
        timestamp: bill.created_at,
    };
    tracing::info!(event = ?event, "bill created");

    Ok((
        StatusCode::CREATED,
        Json(CreateBillResponse {
            bill: BillResponse::from_bill(bill, screened.accepted),
            skipped_items: screened.skipped,
        }),
    ))
}

/// Lists bills, optionally filtered by patient and status
pub async fn list_bills(
    State(state): State<AppState>,
    Query(query): Query<ListBillsQuery>,
) -> Result<Json<Vec<BillResponse>>, ApiError> {
    let bills = BillingRepository::new(state.pool.clone())
        .list_bills(query.patient_id.map(PatientId::from), query.status)
        .await?;

    Ok(Json(
        bills
            .into_iter()
            .map(|bill| BillResponse::from_bill(bill, Vec::new()))
            .collect(),
    ))
}

/// Gets a bill with its medicine lines
pub async fn get_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BillResponse>, ApiError> {
    let (bill, lines) = BillingRepository::new(state.pool.clone())
        .get_bill(BillId::from(id))
        .await?;
    Ok(Json(BillResponse::from_bill(bill, lines)))
}

/// Marks a bill paid without reconciling amounts
pub async fn mark_paid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BillResponse>, ApiError> {
    let bill = BillingRepository::new(state.pool.clone())
        .mark_paid(BillId::from(id), Utc::now())
        .await?;

    let event = BillingEvent::BillMarkedPaid {
        bill_id: bill.id,
        timestamp: bill.updated_at,
    };
    tracing::info!(event = ?event, "bill marked paid");
    Ok(Json(BillResponse::from_bill(bill, Vec::new())))
}

/// Cancels a bill
///
/// The bill row survives with its amounts intact; only the status changes,
/// and further payments against it are rejected.
pub async fn cancel_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BillResponse>, ApiError> {
    let bill = BillingRepository::new(state.pool.clone())
        .cancel_bill(BillId::from(id), Utc::now())
        .await?;

    let event = BillingEvent::BillCancelled {
        bill_id: bill.id,
        timestamp: bill.updated_at,
    };
    tracing::info!(event = ?event, "bill cancelled");
    Ok(Json(BillResponse::from_bill(bill, Vec::new())))
}

/// Records a payment against a bill
pub async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<RecordPaymentResponse>), ApiError> {
    request.validate()?;

    let (bill, payment) = BillingRepository::new(state.pool.clone())
        .record_payment(
            BillId::from(id),
            request.amount,
            request.method,
            request.transaction_id,
            request.notes,
            Utc::now(),
        )
        .await?;

    let event = BillingEvent::PaymentRecorded {
        bill_id: bill.id,
        payment_id: payment.id,
        amount: payment.amount.amount(),
        method: payment.method,
        timestamp: payment.paid_at,
    };
    tracing::info!(event = ?event, status = ?bill.status, "payment recorded");

    Ok((
        StatusCode::CREATED,
        Json(RecordPaymentResponse {
            payment: payment.into(),
            bill: BillResponse::from_bill(bill, Vec::new()),
        }),
    ))
}

/// Lists the payments recorded against a bill
pub async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = BillingRepository::new(state.pool.clone())
        .list_payments(BillId::from(id))
        .await?;
    Ok(Json(payments.into_iter().map(Into::into).collect()))
}
