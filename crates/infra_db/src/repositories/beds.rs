//! Bed repository implementation
//!
//! This module provides database access for beds, the occupancy history in
//! `bed_assignments`, and the `bed_events` audit trail. Assignment and
//! release run in a single transaction with the bed row locked, so the
//! single-active-bed-per-patient check and the state change commit together.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{BedAssignmentId, BedId, PatientId};
use domain_ward::{Bed, BedEvent, BedStatus, Occupancy, WardError};

use crate::error::DatabaseError;

const BED_COLUMNS: &str = "id, bed_number, ward, status, patient_id, admitted_at";

/// Repository for beds and their occupancy history
#[derive(Debug, Clone)]
pub struct BedRepository {
    pool: PgPool,
}

impl BedRepository {
    /// Creates a new BedRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists a new bed
    ///
    /// # Errors
    ///
    /// `DuplicateEntry` if the bed number is already taken.
    pub async fn create_bed(&self, bed: &Bed) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO beds (id, bed_number, ward, status, patient_id, admitted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::from(bed.id))
        .bind(&bed.bed_number)
        .bind(&bed.ward)
        .bind(bed_status_to_str(bed.status))
        .bind(bed.patient_id.map(Uuid::from))
        .bind(bed.admitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;
        Ok(())
    }

    /// Retrieves a bed by id
    pub async fn get_bed(&self, bed_id: BedId) -> Result<Bed, DatabaseError> {
        let row = sqlx::query_as::<_, BedRow>(&format!(
            "SELECT {} FROM beds WHERE id = $1",
            BED_COLUMNS
        ))
        .bind(Uuid::from(bed_id))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Bed", bed_id))?;

        row.into_bed()
    }

    /// Lists beds, optionally filtered by ward and status
    ///
    /// Ordered by bed number.
    pub async fn list_beds(
        &self,
        ward: Option<&str>,
        status: Option<BedStatus>,
    ) -> Result<Vec<Bed>, DatabaseError> {
        let mut query = sqlx::QueryBuilder::new(format!(
            "SELECT {} FROM beds WHERE 1=1",
            BED_COLUMNS
        ));
        if let Some(ward) = ward {
            query.push(" AND ward = ");
            query.push_bind(ward.to_string());
        }
        if let Some(status) = status {
            query.push(" AND status = ");
            query.push_bind(bed_status_to_str(status));
        }
        query.push(" ORDER BY bed_number");

        let rows: Vec<BedRow> = query.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(BedRow::into_bed).collect()
    }

    /// Assigns a patient to a bed
    ///
    /// Locks the bed row and the patient's current bed (if any), runs the
    /// single-bed guard on the aggregate, then writes the bed, an open
    /// `bed_assignments` record, the audit event, and the appointment-note
    /// annotation in one transaction. Re-assigning the current occupant is a
    /// no-op and returns no event.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown bed or patient; `Conflict` when the patient
    /// already occupies another bed, naming that bed and its ward;
    /// `ConstraintViolation` when the target bed itself is unavailable.
    pub async fn assign_patient(
        &self,
        bed_id: BedId,
        patient_id: PatientId,
        now: DateTime<Utc>,
    ) -> Result<(Bed, Option<BedEvent>), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, BedRow>(&format!(
            "SELECT {} FROM beds WHERE id = $1 FOR UPDATE",
            BED_COLUMNS
        ))
        .bind(Uuid::from(bed_id))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Bed", bed_id))?;
        let mut bed = row.into_bed()?;

        let patient_exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM patients WHERE id = $1")
            .bind(Uuid::from(patient_id))
            .fetch_optional(&mut *tx)
            .await?;
        if patient_exists.is_none() {
            return Err(DatabaseError::not_found("Patient", patient_id));
        }

        // Lock the patient's current bed too, so a concurrent release cannot
        // slip between the check and the commit.
        let occupancy = sqlx::query_as::<_, OccupancyRow>(
            r#"
            SELECT id, bed_number, ward
            FROM beds
            WHERE patient_id = $1 AND status = 'occupied' AND id <> $2
            FOR UPDATE
            "#,
        )
        .bind(Uuid::from(patient_id))
        .bind(Uuid::from(bed_id))
        .fetch_optional(&mut *tx)
        .await?
        .map(|row| Occupancy {
            bed_id: BedId::from(row.id),
            bed_number: row.bed_number,
            ward: row.ward,
        });

        let event = bed
            .assign(patient_id, occupancy.as_ref(), now)
            .map_err(guard_error)?;

        if let Some(event) = &event {
            self.update_bed_state(&mut tx, &bed).await?;

            let appointment_id: Option<Uuid> = sqlx::query_scalar(
                r#"
                SELECT id FROM appointments
                WHERE patient_id = $1 AND status IN ('scheduled', 'in_progress')
                ORDER BY scheduled_at DESC
                LIMIT 1
                FOR UPDATE
                "#,
            )
            .bind(Uuid::from(patient_id))
            .fetch_optional(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO bed_assignments (id, bed_id, patient_id, appointment_id, assigned_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::from(BedAssignmentId::new_v7()))
            .bind(Uuid::from(bed.id))
            .bind(Uuid::from(patient_id))
            .bind(appointment_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if let Some(appointment_id) = appointment_id {
                sqlx::query(
                    r#"
                    UPDATE appointments
                    SET notes = CASE WHEN notes = '' THEN $2 ELSE notes || ' ' || $2 END
                    WHERE id = $1
                    "#,
                )
                .bind(appointment_id)
                .bind(event.note_annotation())
                .execute(&mut *tx)
                .await?;
            }

            self.insert_event(&mut tx, event).await?;
        }

        tx.commit().await?;
        Ok((bed, event))
    }

    /// Releases a bed
    ///
    /// Closes the open `bed_assignments` record and swaps the assignment
    /// annotation on the recorded appointment for the release annotation,
    /// all in one transaction. Releasing an unoccupied bed is a no-op and
    /// returns no event.
    pub async fn release_bed(
        &self,
        bed_id: BedId,
        now: DateTime<Utc>,
    ) -> Result<(Bed, Option<BedEvent>), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, BedRow>(&format!(
            "SELECT {} FROM beds WHERE id = $1 FOR UPDATE",
            BED_COLUMNS
        ))
        .bind(Uuid::from(bed_id))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Bed", bed_id))?;
        let mut bed = row.into_bed()?;

        let assigned_annotation = bed.patient_id.map(|patient_id| {
            BedEvent::Assigned {
                bed_id: bed.id,
                bed_number: bed.bed_number.clone(),
                ward: bed.ward.clone(),
                patient_id,
                timestamp: now,
            }
            .note_annotation()
        });

        let event = bed.release(now);

        if let Some(event) = &event {
            self.update_bed_state(&mut tx, &bed).await?;

            let appointment_id: Option<Uuid> = sqlx::query_scalar(
                r#"
                UPDATE bed_assignments
                SET released_at = $3
                WHERE bed_id = $1 AND patient_id = $2 AND released_at IS NULL
                RETURNING appointment_id
                "#,
            )
            .bind(Uuid::from(bed.id))
            .bind(Uuid::from(event.patient_id()))
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?
            .flatten();

            // The annotation swap is scoped to the appointment the assignment
            // recorded, not a global notes sweep.
            if let (Some(appointment_id), Some(assigned)) = (appointment_id, assigned_annotation) {
                sqlx::query("UPDATE appointments SET notes = REPLACE(notes, $2, $3) WHERE id = $1")
                    .bind(appointment_id)
                    .bind(assigned)
                    .bind(event.note_annotation())
                    .execute(&mut *tx)
                    .await?;
            }

            self.insert_event(&mut tx, event).await?;
        }

        tx.commit().await?;
        Ok((bed, event))
    }

    async fn update_bed_state(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        bed: &Bed,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE beds SET status = $2, patient_id = $3, admitted_at = $4 WHERE id = $1",
        )
        .bind(Uuid::from(bed.id))
        .bind(bed_status_to_str(bed.status))
        .bind(bed.patient_id.map(Uuid::from))
        .bind(bed.admitted_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn insert_event(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event: &BedEvent,
    ) -> Result<(), DatabaseError> {
        let (event_type, bed_number, ward, timestamp) = match event {
            BedEvent::Assigned {
                bed_number,
                ward,
                timestamp,
                ..
            } => ("assigned", bed_number, ward, timestamp),
            BedEvent::Released {
                bed_number,
                ward,
                timestamp,
                ..
            } => ("released", bed_number, ward, timestamp),
        };

        sqlx::query(
            r#"
            INSERT INTO bed_events (id, bed_id, patient_id, event_type, bed_number, ward, occurred_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Uuid::from(event.bed_id()))
        .bind(Uuid::from(event.patient_id()))
        .bind(event_type)
        .bind(bed_number)
        .bind(ward)
        .bind(timestamp)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

/// Database row for a bed
#[derive(Debug, Clone, sqlx::FromRow)]
struct BedRow {
    id: Uuid,
    bed_number: String,
    ward: String,
    status: String,
    patient_id: Option<Uuid>,
    admitted_at: Option<DateTime<Utc>>,
}

impl BedRow {
    fn into_bed(self) -> Result<Bed, DatabaseError> {
        Ok(Bed {
            id: BedId::from(self.id),
            bed_number: self.bed_number,
            ward: self.ward,
            status: bed_status_from_str(&self.status)?,
            patient_id: self.patient_id.map(Into::into),
            admitted_at: self.admitted_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct OccupancyRow {
    id: Uuid,
    bed_number: String,
    ward: String,
}

fn bed_status_to_str(status: BedStatus) -> &'static str {
    match status {
        BedStatus::Available => "available",
        BedStatus::Occupied => "occupied",
        BedStatus::Maintenance => "maintenance",
    }
}

fn bed_status_from_str(value: &str) -> Result<BedStatus, DatabaseError> {
    match value {
        "available" => Ok(BedStatus::Available),
        "occupied" => Ok(BedStatus::Occupied),
        "maintenance" => Ok(BedStatus::Maintenance),
        other => Err(DatabaseError::QueryFailed(format!(
            "unknown bed status '{}'",
            other
        ))),
    }
}

/// An occupancy elsewhere is a write conflict (409 at the boundary); an
/// unavailable target bed stays a constraint violation.
fn guard_error(error: WardError) -> DatabaseError {
    match &error {
        WardError::PatientAlreadyAssigned { .. } => DatabaseError::Conflict(error.to_string()),
        _ => DatabaseError::ConstraintViolation(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupancy_elsewhere_maps_to_conflict() {
        let error = guard_error(WardError::PatientAlreadyAssigned {
            patient_id: PatientId::new(),
            bed_number: "A-001".to_string(),
            ward: "ICU".to_string(),
        });

        assert!(matches!(error, DatabaseError::Conflict(_)));
        assert!(error.to_string().contains("A-001"), "conflict names the bed");
    }

    #[test]
    fn test_unavailable_bed_maps_to_constraint_violation() {
        let error = guard_error(WardError::BedUnavailable {
            bed_number: "B-101".to_string(),
            status: BedStatus::Occupied,
        });

        assert!(matches!(error, DatabaseError::ConstraintViolation(_)));
    }
}
