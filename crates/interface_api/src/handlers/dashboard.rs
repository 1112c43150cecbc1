//! Dashboard handler

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use core_kernel::{DoctorId, PatientId};
use infra_db::DashboardRepository;

use crate::dto::dashboard::{DashboardQuery, DashboardSummary};
use crate::error::ApiError;
use crate::AppState;

/// Returns the role-scoped dashboard summary
///
/// `role` selects the variant; `subject_id` names the doctor or patient for
/// the personal variants.
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let repo = DashboardRepository::new(state.pool.clone());
    let now = Utc::now();

    let summary = match query.role.as_str() {
        "admin" => DashboardSummary::Admin(repo.admin_summary().await?),
        "doctor" => {
            let doctor_id = query.subject_id.ok_or_else(|| {
                ApiError::Validation("subject_id is required for role 'doctor'".to_string())
            })?;
            DashboardSummary::Doctor(repo.doctor_summary(DoctorId::from(doctor_id), now).await?)
        }
        "patient" => {
            let patient_id = query.subject_id.ok_or_else(|| {
                ApiError::Validation("subject_id is required for role 'patient'".to_string())
            })?;
            DashboardSummary::Patient(repo.patient_summary(PatientId::from(patient_id), now).await?)
        }
        "staff" => DashboardSummary::Staff(repo.staff_summary().await?),
        other => {
            return Err(ApiError::Validation(format!("unknown role '{}'", other)));
        }
    };

    Ok(Json(summary))
}
