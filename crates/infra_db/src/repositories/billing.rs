//! Billing repository implementation
//!
//! This module provides database access for bills, their medicine line
//! items, and payments. The creation path draws the invoice number from the
//! `invoice_number_seq` sequence inside the same transaction that inserts
//! the bill, and `bills.invoice_number` carries a unique constraint as a
//! backstop, so a collision surfaces as a retryable conflict.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{BillId, Currency, Money, PatientId, Rate};
use domain_billing::{
    format_invoice_number, Bill, BillStatus, BillType, MedicineLine, Payment, PaymentMethod,
};

use crate::error::DatabaseError;

const BILL_COLUMNS: &str = "id, invoice_number, patient_id, appointment_id, bill_type, currency, \
     doctor_fee, room_charge, medicine_total, tax_rate, subtotal, tax_amount, total_amount, \
     paid_amount, pending_amount, discount_amount, insurance_amount, description, status, \
     due_date, paid_date, created_at, updated_at";

/// Repository for bills, line items, and payments
///
/// All mutating operations run in a single transaction and lock the bill
/// row before modifying it, so concurrent payments against the same bill
/// serialize instead of racing.
#[derive(Debug, Clone)]
pub struct BillingRepository {
    pool: PgPool,
}

impl BillingRepository {
    /// Creates a new BillingRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists a new bill together with its screened medicine lines
    ///
    /// The invoice number is allocated from `invoice_number_seq` inside the
    /// transaction; the bill header and every line item commit together or
    /// not at all. Returns the bill with its invoice number assigned.
    ///
    /// # Errors
    ///
    /// `DuplicateEntry` (retryable) if another writer committed the same
    /// invoice number first.
    pub async fn create_bill(
        &self,
        mut bill: Bill,
        lines: &[MedicineLine],
    ) -> Result<Bill, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sequence: i64 = sqlx::query_scalar("SELECT nextval('invoice_number_seq')")
            .fetch_one(&mut *tx)
            .await?;
        bill.assign_invoice_number(format_invoice_number(sequence))
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO bills (
                id, invoice_number, patient_id, appointment_id, bill_type, currency,
                doctor_fee, room_charge, medicine_total, tax_rate, subtotal, tax_amount,
                total_amount, paid_amount, pending_amount, discount_amount,
                insurance_amount, description, status, due_date, paid_date,
                created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23
            )
            "#,
        )
        .bind(Uuid::from(bill.id))
        .bind(&bill.invoice_number)
        .bind(Uuid::from(bill.patient_id))
        .bind(bill.appointment_id.map(Uuid::from))
        .bind(bill_type_to_str(bill.bill_type))
        .bind(bill.currency.code())
        .bind(bill.doctor_fee.amount())
        .bind(bill.room_charge.amount())
        .bind(bill.medicine_total.amount())
        .bind(bill.tax_rate.as_percentage())
        .bind(bill.subtotal.amount())
        .bind(bill.tax_amount.amount())
        .bind(bill.total_amount.amount())
        .bind(bill.paid_amount.amount())
        .bind(bill.pending_amount.amount())
        .bind(bill.discount_amount.amount())
        .bind(bill.insurance_amount.amount())
        .bind(&bill.description)
        .bind(status_to_str(bill.status))
        .bind(bill.due_date)
        .bind(bill.paid_date)
        .bind(bill.created_at)
        .bind(bill.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO bill_medicines (id, bill_id, name, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::from(line.id))
            .bind(Uuid::from(line.bill_id))
            .bind(&line.name)
            .bind(line.quantity as i32)
            .bind(line.unit_price.amount())
            .bind(line.total_price.amount())
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::from(&e))?;
        }

        tx.commit().await?;
        Ok(bill)
    }

    /// Records a payment against a bill and re-derives the bill's state
    ///
    /// Locks the bill row, applies the payment on the domain aggregate,
    /// then writes the payment record and the recomputed bill in the same
    /// transaction.
    ///
    /// # Errors
    ///
    /// `NotFound` if the bill does not exist; `ConstraintViolation` for a
    /// non-positive amount or a cancelled bill.
    pub async fn record_payment(
        &self,
        bill_id: BillId,
        amount: Decimal,
        method: PaymentMethod,
        transaction_id: Option<String>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(Bill, Payment), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, BillRow>(&format!(
            "SELECT {} FROM bills WHERE id = $1 FOR UPDATE",
            BILL_COLUMNS
        ))
        .bind(Uuid::from(bill_id))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Bill", bill_id))?;

        let mut bill = row.into_bill()?;
        bill.apply_payment(Money::new(amount, bill.currency), now)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;

        let mut payment = Payment::new(bill_id, Money::new(amount, bill.currency), method);
        payment.paid_at = now;
        payment.transaction_id = transaction_id;
        payment.notes = notes;

        sqlx::query(
            r#"
            INSERT INTO payments (id, bill_id, amount, currency, method, transaction_id, paid_at, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::from(payment.id))
        .bind(Uuid::from(payment.bill_id))
        .bind(payment.amount.amount())
        .bind(payment.amount.currency().code())
        .bind(method_to_str(payment.method))
        .bind(&payment.transaction_id)
        .bind(payment.paid_at)
        .bind(&payment.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        self.update_bill_state(&mut tx, &bill).await?;

        tx.commit().await?;
        Ok((bill, payment))
    }

    /// Marks a bill paid without reconciling amounts
    ///
    /// Only the status and the paid date change; `paid_amount` and
    /// `pending_amount` keep whatever the recorded payments sum to.
    pub async fn mark_paid(
        &self,
        bill_id: BillId,
        now: DateTime<Utc>,
    ) -> Result<Bill, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, BillRow>(&format!(
            "SELECT {} FROM bills WHERE id = $1 FOR UPDATE",
            BILL_COLUMNS
        ))
        .bind(Uuid::from(bill_id))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Bill", bill_id))?;

        let mut bill = row.into_bill()?;
        bill.mark_paid(now);

        sqlx::query(
            "UPDATE bills SET status = $2, paid_date = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(Uuid::from(bill.id))
        .bind(status_to_str(bill.status))
        .bind(bill.paid_date)
        .bind(bill.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(bill)
    }

    /// Cancels a bill
    ///
    /// Bills are never deleted; the status flips to cancelled and the
    /// amounts stay as they were so the record remains auditable.
    pub async fn cancel_bill(
        &self,
        bill_id: BillId,
        now: DateTime<Utc>,
    ) -> Result<Bill, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, BillRow>(&format!(
            "SELECT {} FROM bills WHERE id = $1 FOR UPDATE",
            BILL_COLUMNS
        ))
        .bind(Uuid::from(bill_id))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Bill", bill_id))?;

        let mut bill = row.into_bill()?;
        bill.cancel(now);

        sqlx::query("UPDATE bills SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(Uuid::from(bill.id))
            .bind(status_to_str(bill.status))
            .bind(bill.updated_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(bill)
    }

    /// Retrieves a bill with its medicine lines
    pub async fn get_bill(
        &self,
        bill_id: BillId,
    ) -> Result<(Bill, Vec<MedicineLine>), DatabaseError> {
        let row = sqlx::query_as::<_, BillRow>(&format!(
            "SELECT {} FROM bills WHERE id = $1",
            BILL_COLUMNS
        ))
        .bind(Uuid::from(bill_id))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Bill", bill_id))?;

        let bill = row.into_bill()?;
        let lines = self.get_lines(bill_id, bill.currency).await?;
        Ok((bill, lines))
    }

    /// Lists bills, optionally filtered by patient and status
    ///
    /// Newest first.
    pub async fn list_bills(
        &self,
        patient_id: Option<PatientId>,
        status: Option<BillStatus>,
    ) -> Result<Vec<Bill>, DatabaseError> {
        let mut query = sqlx::QueryBuilder::new(format!(
            "SELECT {} FROM bills WHERE 1=1",
            BILL_COLUMNS
        ));
        if let Some(patient_id) = patient_id {
            query.push(" AND patient_id = ");
            query.push_bind(Uuid::from(patient_id));
        }
        if let Some(status) = status {
            query.push(" AND status = ");
            query.push_bind(status_to_str(status));
        }
        query.push(" ORDER BY created_at DESC");

        let rows: Vec<BillRow> = query.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(BillRow::into_bill).collect()
    }

    /// Lists the payments recorded against a bill, oldest first
    pub async fn list_payments(&self, bill_id: BillId) -> Result<Vec<Payment>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, bill_id, amount, currency, method, transaction_id, paid_at, notes
            FROM payments
            WHERE bill_id = $1
            ORDER BY paid_at
            "#,
        )
        .bind(Uuid::from(bill_id))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PaymentRow::into_payment).collect()
    }

    async fn get_lines(
        &self,
        bill_id: BillId,
        currency: Currency,
    ) -> Result<Vec<MedicineLine>, DatabaseError> {
        let rows = sqlx::query_as::<_, MedicineLineRow>(
            r#"
            SELECT id, bill_id, name, quantity, unit_price, total_price
            FROM bill_medicines
            WHERE bill_id = $1
            ORDER BY name
            "#,
        )
        .bind(Uuid::from(bill_id))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_line(currency))
            .collect()
    }

    async fn update_bill_state(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        bill: &Bill,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            UPDATE bills
            SET paid_amount = $2, pending_amount = $3, status = $4,
                paid_date = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(Uuid::from(bill.id))
        .bind(bill.paid_amount.amount())
        .bind(bill.pending_amount.amount())
        .bind(status_to_str(bill.status))
        .bind(bill.paid_date)
        .bind(bill.updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

/// Database row for a bill
#[derive(Debug, Clone, sqlx::FromRow)]
struct BillRow {
    id: Uuid,
    invoice_number: Option<String>,
    patient_id: Uuid,
    appointment_id: Option<Uuid>,
    bill_type: String,
    currency: String,
    doctor_fee: Decimal,
    room_charge: Decimal,
    medicine_total: Decimal,
    tax_rate: Decimal,
    subtotal: Decimal,
    tax_amount: Decimal,
    total_amount: Decimal,
    paid_amount: Decimal,
    pending_amount: Decimal,
    discount_amount: Decimal,
    insurance_amount: Decimal,
    description: String,
    status: String,
    due_date: NaiveDate,
    paid_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BillRow {
    fn into_bill(self) -> Result<Bill, DatabaseError> {
        let currency = currency_from_str(&self.currency)?;
        let money = |amount| Money::new(amount, currency);

        Ok(Bill {
            id: BillId::from(self.id),
            invoice_number: self.invoice_number,
            patient_id: PatientId::from(self.patient_id),
            appointment_id: self.appointment_id.map(Into::into),
            bill_type: bill_type_from_str(&self.bill_type)?,
            currency,
            doctor_fee: money(self.doctor_fee),
            room_charge: money(self.room_charge),
            medicine_total: money(self.medicine_total),
            tax_rate: Rate::from_percentage(self.tax_rate),
            subtotal: money(self.subtotal),
            tax_amount: money(self.tax_amount),
            total_amount: money(self.total_amount),
            paid_amount: money(self.paid_amount),
            pending_amount: money(self.pending_amount),
            discount_amount: money(self.discount_amount),
            insurance_amount: money(self.insurance_amount),
            description: self.description,
            status: status_from_str(&self.status)?,
            due_date: self.due_date,
            paid_date: self.paid_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database row for a medicine line
#[derive(Debug, Clone, sqlx::FromRow)]
struct MedicineLineRow {
    id: Uuid,
    bill_id: Uuid,
    name: String,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
}

impl MedicineLineRow {
    fn into_line(self, currency: Currency) -> Result<MedicineLine, DatabaseError> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            DatabaseError::QueryFailed(format!(
                "negative quantity {} on line '{}'",
                self.quantity, self.name
            ))
        })?;

        Ok(MedicineLine {
            id: self.id.into(),
            bill_id: self.bill_id.into(),
            name: self.name,
            quantity,
            unit_price: Money::new(self.unit_price, currency),
            total_price: Money::new(self.total_price, currency),
        })
    }
}

/// Database row for a payment
#[derive(Debug, Clone, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    bill_id: Uuid,
    amount: Decimal,
    currency: String,
    method: String,
    transaction_id: Option<String>,
    paid_at: DateTime<Utc>,
    notes: Option<String>,
}

impl PaymentRow {
    fn into_payment(self) -> Result<Payment, DatabaseError> {
        let currency = currency_from_str(&self.currency)?;
        Ok(Payment {
            id: self.id.into(),
            bill_id: self.bill_id.into(),
            amount: Money::new(self.amount, currency),
            method: method_from_str(&self.method)?,
            transaction_id: self.transaction_id,
            paid_at: self.paid_at,
            notes: self.notes,
        })
    }
}

fn currency_from_str(code: &str) -> Result<Currency, DatabaseError> {
    match code {
        "INR" => Ok(Currency::INR),
        "USD" => Ok(Currency::USD),
        "EUR" => Ok(Currency::EUR),
        "GBP" => Ok(Currency::GBP),
        other => Err(DatabaseError::QueryFailed(format!(
            "unknown currency code '{}'",
            other
        ))),
    }
}

fn status_to_str(status: BillStatus) -> &'static str {
    match status {
        BillStatus::Pending => "pending",
        BillStatus::PartiallyPaid => "partially_paid",
        BillStatus::Paid => "paid",
        BillStatus::Overdue => "overdue",
        BillStatus::Cancelled => "cancelled",
    }
}

fn status_from_str(value: &str) -> Result<BillStatus, DatabaseError> {
    match value {
        "pending" => Ok(BillStatus::Pending),
        "partially_paid" => Ok(BillStatus::PartiallyPaid),
        "paid" => Ok(BillStatus::Paid),
        "overdue" => Ok(BillStatus::Overdue),
        "cancelled" => Ok(BillStatus::Cancelled),
        other => Err(DatabaseError::QueryFailed(format!(
            "unknown bill status '{}'",
            other
        ))),
    }
}

fn bill_type_to_str(bill_type: BillType) -> &'static str {
    match bill_type {
        BillType::Consultation => "consultation",
        BillType::Treatment => "treatment",
        BillType::Medicine => "medicine",
        BillType::Room => "room",
        BillType::Surgery => "surgery",
        BillType::Emergency => "emergency",
        BillType::Other => "other",
    }
}

fn bill_type_from_str(value: &str) -> Result<BillType, DatabaseError> {
    match value {
        "consultation" => Ok(BillType::Consultation),
        "treatment" => Ok(BillType::Treatment),
        "medicine" => Ok(BillType::Medicine),
        "room" => Ok(BillType::Room),
        "surgery" => Ok(BillType::Surgery),
        "emergency" => Ok(BillType::Emergency),
        "other" => Ok(BillType::Other),
        other => Err(DatabaseError::QueryFailed(format!(
            "unknown bill type '{}'",
            other
        ))),
    }
}

fn method_to_str(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "cash",
        PaymentMethod::Card => "card",
        PaymentMethod::Upi => "upi",
        PaymentMethod::BankTransfer => "bank_transfer",
        PaymentMethod::Insurance => "insurance",
    }
}

fn method_from_str(value: &str) -> Result<PaymentMethod, DatabaseError> {
    match value {
        "cash" => Ok(PaymentMethod::Cash),
        "card" => Ok(PaymentMethod::Card),
        "upi" => Ok(PaymentMethod::Upi),
        "bank_transfer" => Ok(PaymentMethod::BankTransfer),
        "insurance" => Ok(PaymentMethod::Insurance),
        other => Err(DatabaseError::QueryFailed(format!(
            "unknown payment method '{}'",
            other
        ))),
    }
}
