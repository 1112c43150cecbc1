//! The Bed aggregate and assignment guard
//!
//! Beds move between `Available` and `Occupied`; `Maintenance` is an
//! orthogonal administrative state. The guard enforces the system-wide
//! invariant that a patient occupies at most one bed at a time. The caller
//! supplies the patient's current occupancy (looked up under the same
//! transaction) so the check and the state change commit atomically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BedId, PatientId};

use crate::error::WardError;
use crate::events::BedEvent;

/// Bed state machine: `Available ⇄ Occupied`, plus administrative
/// `Maintenance`. Initial state is `Available`; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BedStatus {
    Available,
    Occupied,
    Maintenance,
}

/// Summary of a bed a patient currently occupies
///
/// Produced by the persistence layer when checking the single-bed invariant;
/// carries just enough to name the conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occupancy {
    pub bed_id: BedId,
    pub bed_number: String,
    pub ward: String,
}

/// A bed in a ward
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bed {
    /// Unique identifier
    pub id: BedId,
    /// Human-readable bed number, unique across the hospital
    pub bed_number: String,
    /// Ward the bed belongs to
    pub ward: String,
    /// Current state
    pub status: BedStatus,
    /// Occupying patient, if any (weak reference: the bed reverts to
    /// available if the patient record is removed)
    pub patient_id: Option<PatientId>,
    /// When the current occupant was admitted
    pub admitted_at: Option<DateTime<Utc>>,
}

impl Bed {
    /// Creates a new available bed
    pub fn new(bed_number: impl Into<String>, ward: impl Into<String>) -> Self {
        Self {
            id: BedId::new_v7(),
            bed_number: bed_number.into(),
            ward: ward.into(),
            status: BedStatus::Available,
            patient_id: None,
            admitted_at: None,
        }
    }

    /// Assigns a patient to this bed
    ///
    /// `current_occupancy` is the bed the patient already occupies elsewhere,
    /// if any, looked up by the caller inside the same transaction.
    ///
    /// Re-assigning the occupant of this very bed is a no-op (`Ok(None)`),
    /// making retries safe.
    ///
    /// # Errors
    ///
    /// - `BedUnavailable` if this bed is under maintenance or occupied by a
    ///   different patient
    /// - `PatientAlreadyAssigned` if the patient occupies another bed,
    ///   naming that bed and its ward
    pub fn assign(
        &mut self,
        patient_id: PatientId,
        current_occupancy: Option<&Occupancy>,
        now: DateTime<Utc>,
    ) -> Result<Option<BedEvent>, WardError> {
        match self.status {
            BedStatus::Maintenance => {
                return Err(WardError::BedUnavailable {
                    bed_number: self.bed_number.clone(),
                    status: self.status,
                });
            }
            BedStatus::Occupied => {
                if self.patient_id == Some(patient_id) {
                    // Idempotent retry; keep the original admission time
                    return Ok(None);
                }
                return Err(WardError::BedUnavailable {
                    bed_number: self.bed_number.clone(),
                    status: self.status,
                });
            }
            BedStatus::Available => {}
        }

        if let Some(existing) = current_occupancy {
            if existing.bed_id != self.id {
                return Err(WardError::PatientAlreadyAssigned {
                    patient_id,
                    bed_number: existing.bed_number.clone(),
                    ward: existing.ward.clone(),
                });
            }
        }

        self.patient_id = Some(patient_id);
        self.status = BedStatus::Occupied;
        self.admitted_at = Some(now);

        Ok(Some(BedEvent::Assigned {
            bed_id: self.id,
            bed_number: self.bed_number.clone(),
            ward: self.ward.clone(),
            patient_id,
            timestamp: now,
        }))
    }

    /// Releases the bed
    ///
    /// Clears the patient reference and the admission timestamp and returns
    /// the bed to `Available`. Releasing an unoccupied bed is a no-op
    /// (`None`), making retries safe. The returned event drives the
    /// appointment-note annotation and the occupancy history record.
    pub fn release(&mut self, now: DateTime<Utc>) -> Option<BedEvent> {
        let patient_id = self.patient_id.take()?;
        let event = BedEvent::Released {
            bed_id: self.id,
            bed_number: self.bed_number.clone(),
            ward: self.ward.clone(),
            patient_id,
            timestamp: now,
        };

        self.status = BedStatus::Available;
        self.admitted_at = None;
        Some(event)
    }

    /// Takes the bed out of service (administrative action)
    ///
    /// Only an unoccupied bed can enter maintenance.
    pub fn begin_maintenance(&mut self) -> Result<(), WardError> {
        if self.status == BedStatus::Occupied {
            return Err(WardError::BedUnavailable {
                bed_number: self.bed_number.clone(),
                status: self.status,
            });
        }
        self.status = BedStatus::Maintenance;
        Ok(())
    }

    /// Returns the bed to service (administrative action)
    pub fn end_maintenance(&mut self) {
        if self.status == BedStatus::Maintenance {
            self.status = BedStatus::Available;
        }
    }

    /// Returns true if the bed is occupied
    pub fn is_occupied(&self) -> bool {
        self.status == BedStatus::Occupied
    }
}
