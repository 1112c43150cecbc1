//! Ward domain errors

use thiserror::Error;

use core_kernel::PatientId;

use crate::bed::BedStatus;

/// Errors that can occur in the ward domain
#[derive(Debug, Error)]
pub enum WardError {
    /// The patient already occupies another bed
    ///
    /// Names the conflicting bed and ward so the caller can release it first.
    #[error("Patient is already assigned to bed {bed_number} in {ward}. Please release that bed first.")]
    PatientAlreadyAssigned {
        patient_id: PatientId,
        bed_number: String,
        ward: String,
    },

    /// The target bed cannot accept an assignment in its current state
    #[error("Bed {bed_number} is not available (status: {status:?})")]
    BedUnavailable {
        bed_number: String,
        status: BedStatus,
    },

    /// Bed not found
    #[error("Bed not found: {0}")]
    BedNotFound(String),

    /// Patient not found
    #[error("Patient not found: {0}")]
    PatientNotFound(String),
}
