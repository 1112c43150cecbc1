//! Bed handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use core_kernel::{BedId, PatientId};
use infra_db::BedRepository;

use crate::dto::beds::*;
use crate::error::ApiError;
use crate::AppState;

/// Lists beds, optionally filtered by ward and status
pub async fn list_beds(
    State(state): State<AppState>,
    Query(query): Query<ListBedsQuery>,
) -> Result<Json<Vec<BedResponse>>, ApiError> {
    let beds = BedRepository::new(state.pool.clone())
        .list_beds(query.ward.as_deref(), query.status)
        .await?;
    Ok(Json(beds.into_iter().map(Into::into).collect()))
}

/// Gets a bed by id
pub async fn get_bed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BedResponse>, ApiError> {
    let bed = BedRepository::new(state.pool.clone())
        .get_bed(BedId::from(id))
        .await?;
    Ok(Json(bed.into()))
}

/// Assigns a patient to a bed
///
/// Rejects the request if the patient already occupies another bed, naming
/// that bed. Re-assigning the current occupant succeeds without changes.
pub async fn assign_patient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignPatientRequest>,
) -> Result<Json<BedActionResponse>, ApiError> {
    let (bed, event) = BedRepository::new(state.pool.clone())
        .assign_patient(BedId::from(id), PatientId::from(request.patient_id), Utc::now())
        .await?;

    let changed = event.is_some();
    if changed {
        tracing::info!(bed_id = %bed.id, patient_id = %request.patient_id, "bed assigned");
    }

    Ok(Json(BedActionResponse {
        message: if changed {
            "Patient assigned to bed successfully".to_string()
        } else {
            "Patient is already assigned to this bed".to_string()
        },
        changed,
        bed: bed.into(),
    }))
}

/// Releases a bed
///
/// Releasing a bed that is not occupied succeeds without changes.
pub async fn release_bed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BedActionResponse>, ApiError> {
    let (bed, event) = BedRepository::new(state.pool.clone())
        .release_bed(BedId::from(id), Utc::now())
        .await?;

    let changed = event.is_some();
    if changed {
        tracing::info!(bed_id = %bed.id, "bed released");
    }

    Ok(Json(BedActionResponse {
        message: if changed {
            "Bed released successfully".to_string()
        } else {
            "Bed is not currently occupied".to_string()
        },
        changed,
        bed: bed.into(),
    }))
}
