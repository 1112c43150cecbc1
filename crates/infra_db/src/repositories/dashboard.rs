//! Dashboard repository implementation
//!
//! Read-only aggregate counts scoped to a role. Each summary is a handful of
//! independent `COUNT`/`SUM` queries; nothing here mutates state, so no
//! transaction or locking is involved.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{DoctorId, PatientId};

use crate::error::DatabaseError;

/// Repository for role-scoped dashboard summaries
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

/// Hospital-wide counts for the admin dashboard
#[derive(Debug, Clone, Serialize)]
pub struct AdminSummary {
    pub total_patients: i64,
    pub total_doctors: i64,
    pub total_appointments: i64,
    pub available_beds: i64,
    pub occupied_beds: i64,
    pub pending_bills: i64,
    pub revenue_collected: Decimal,
}

/// A doctor's own appointment workload
#[derive(Debug, Clone, Serialize)]
pub struct DoctorSummary {
    pub my_appointments: i64,
    pub today_appointments: i64,
    pub pending_appointments: i64,
    pub my_patients: i64,
    pub completed_appointments: i64,
}

/// A patient's own appointments, bills, and current bed
#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary {
    pub my_appointments: i64,
    pub upcoming_appointments: i64,
    pub my_bills: i64,
    pub pending_bills: i64,
    pub current_bed: Option<CurrentBed>,
}

/// Operational counts for the staff dashboard
#[derive(Debug, Clone, Serialize)]
pub struct StaffSummary {
    pub total_appointments: i64,
    pub available_beds: i64,
    pub pending_bills: i64,
}

/// The bed a patient currently occupies, if any
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CurrentBed {
    pub bed_number: String,
    pub ward: String,
}

impl DashboardRepository {
    /// Creates a new DashboardRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hospital-wide counts
    pub async fn admin_summary(&self) -> Result<AdminSummary, DatabaseError> {
        let total_patients = self.count("SELECT COUNT(*) FROM patients").await?;
        let total_doctors = self.count("SELECT COUNT(*) FROM doctors").await?;
        let total_appointments = self.count("SELECT COUNT(*) FROM appointments").await?;
        let available_beds = self
            .count("SELECT COUNT(*) FROM beds WHERE status = 'available'")
            .await?;
        let occupied_beds = self
            .count("SELECT COUNT(*) FROM beds WHERE status = 'occupied'")
            .await?;
        let pending_bills = self
            .count("SELECT COUNT(*) FROM bills WHERE status = 'pending'")
            .await?;
        let revenue_collected: Decimal =
            sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM payments")
                .fetch_one(&self.pool)
                .await?;

        Ok(AdminSummary {
            total_patients,
            total_doctors,
            total_appointments,
            available_beds,
            occupied_beds,
            pending_bills,
            revenue_collected,
        })
    }

    /// Appointment workload for one doctor
    ///
    /// # Errors
    ///
    /// `NotFound` if the doctor does not exist.
    pub async fn doctor_summary(
        &self,
        doctor_id: DoctorId,
        now: DateTime<Utc>,
    ) -> Result<DoctorSummary, DatabaseError> {
        self.ensure_exists("doctors", "Doctor", Uuid::from(doctor_id))
            .await?;
        let doctor_uuid = Uuid::from(doctor_id);

        let my_appointments: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM appointments WHERE doctor_id = $1")
                .bind(doctor_uuid)
                .fetch_one(&self.pool)
                .await?;
        let today_appointments: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments WHERE doctor_id = $1 AND scheduled_at::date = $2",
        )
        .bind(doctor_uuid)
        .bind(now.date_naive())
        .fetch_one(&self.pool)
        .await?;
        let pending_appointments: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments WHERE doctor_id = $1 AND status = 'scheduled'",
        )
        .bind(doctor_uuid)
        .fetch_one(&self.pool)
        .await?;
        let my_patients: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT patient_id) FROM appointments WHERE doctor_id = $1",
        )
        .bind(doctor_uuid)
        .fetch_one(&self.pool)
        .await?;
        let completed_appointments: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments WHERE doctor_id = $1 AND status = 'completed'",
        )
        .bind(doctor_uuid)
        .fetch_one(&self.pool)
        .await?;

        Ok(DoctorSummary {
            my_appointments,
            today_appointments,
            pending_appointments,
            my_patients,
            completed_appointments,
        })
    }

    /// Personal counts for one patient
    ///
    /// # Errors
    ///
    /// `NotFound` if the patient does not exist.
    pub async fn patient_summary(
        &self,
        patient_id: PatientId,
        now: DateTime<Utc>,
    ) -> Result<PatientSummary, DatabaseError> {
        self.ensure_exists("patients", "Patient", Uuid::from(patient_id))
            .await?;
        let patient_uuid = Uuid::from(patient_id);

        let my_appointments: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM appointments WHERE patient_id = $1")
                .bind(patient_uuid)
                .fetch_one(&self.pool)
                .await?;
        let upcoming_appointments: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments \
             WHERE patient_id = $1 AND scheduled_at >= $2 AND status IN ('scheduled', 'confirmed')",
        )
        .bind(patient_uuid)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        let my_bills: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bills WHERE patient_id = $1")
            .bind(patient_uuid)
            .fetch_one(&self.pool)
            .await?;
        let pending_bills: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bills WHERE patient_id = $1 AND status = 'pending'",
        )
        .bind(patient_uuid)
        .fetch_one(&self.pool)
        .await?;
        let current_bed = sqlx::query_as::<_, CurrentBed>(
            "SELECT bed_number, ward FROM beds WHERE patient_id = $1 AND status = 'occupied'",
        )
        .bind(patient_uuid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(PatientSummary {
            my_appointments,
            upcoming_appointments,
            my_bills,
            pending_bills,
            current_bed,
        })
    }

    /// Operational counts for staff
    pub async fn staff_summary(&self) -> Result<StaffSummary, DatabaseError> {
        let total_appointments = self.count("SELECT COUNT(*) FROM appointments").await?;
        let available_beds = self
            .count("SELECT COUNT(*) FROM beds WHERE status = 'available'")
            .await?;
        let pending_bills = self
            .count("SELECT COUNT(*) FROM bills WHERE status = 'pending'")
            .await?;

        Ok(StaffSummary {
            total_appointments,
            available_beds,
            pending_bills,
        })
    }

    async fn count(&self, sql: &str) -> Result<i64, DatabaseError> {
        Ok(sqlx::query_scalar(sql).fetch_one(&self.pool).await?)
    }

    async fn ensure_exists(
        &self,
        table: &str,
        entity: &str,
        id: Uuid,
    ) -> Result<(), DatabaseError> {
        let exists: Option<i32> =
            sqlx::query_scalar(&format!("SELECT 1 FROM {} WHERE id = $1", table))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        if exists.is_none() {
            return Err(DatabaseError::not_found(entity, id));
        }
        Ok(())
    }
}
