//! Bed DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_ward::{Bed, BedStatus};

/// Request body for assigning a patient to a bed
#[derive(Debug, Deserialize)]
pub struct AssignPatientRequest {
    pub patient_id: Uuid,
}

/// Query parameters for listing beds
#[derive(Debug, Deserialize)]
pub struct ListBedsQuery {
    pub ward: Option<String>,
    pub status: Option<BedStatus>,
}

/// A bed, as returned by the API
#[derive(Debug, Serialize)]
pub struct BedResponse {
    pub id: Uuid,
    pub bed_number: String,
    pub ward: String,
    pub status: BedStatus,
    pub patient_id: Option<Uuid>,
    pub admitted_at: Option<DateTime<Utc>>,
}

impl From<Bed> for BedResponse {
    fn from(bed: Bed) -> Self {
        Self {
            id: bed.id.into(),
            bed_number: bed.bed_number,
            ward: bed.ward,
            status: bed.status,
            patient_id: bed.patient_id.map(Into::into),
            admitted_at: bed.admitted_at,
        }
    }
}

/// Response for assign/release actions
///
/// `changed` is false when the action was an idempotent no-op (re-assigning
/// the current occupant, releasing a free bed).
#[derive(Debug, Serialize)]
pub struct BedActionResponse {
    pub message: String,
    pub changed: bool,
    pub bed: BedResponse,
}
