//! Dashboard DTOs
//!
//! The summary is a tagged union keyed by `role`; each variant carries a
//! fixed field set, so clients can rely on the shape once they know the role.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use infra_db::repositories::dashboard::{
    AdminSummary, DoctorSummary, PatientSummary, StaffSummary,
};

/// Query parameters for the dashboard endpoint
///
/// `subject_id` is required for the doctor and patient roles and ignored for
/// the others.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub role: String,
    pub subject_id: Option<Uuid>,
}

/// Role-scoped dashboard summary
#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DashboardSummary {
    Admin(AdminSummary),
    Doctor(DoctorSummary),
    Patient(PatientSummary),
    Staff(StaffSummary),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_is_tagged_by_role() {
        let summary = DashboardSummary::Staff(StaffSummary {
            total_appointments: 12,
            available_beds: 3,
            pending_bills: 5,
        });

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["role"], "staff");
        assert_eq!(json["available_beds"], 3);
    }
}
