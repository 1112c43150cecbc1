//! Bed Assignment Guard Tests
//!
//! Covers the single-active-bed-per-patient invariant and the bed state
//! machine:
//! - Assign/release round-trip
//! - Conflict naming the bed the patient already occupies
//! - Occupied and maintenance beds rejecting assignment
//! - Idempotent retries for both assign and release
//!
//! # Test Organization
//!
//! - `assign_tests` - guard behavior on assignment
//! - `release_tests` - release round-trip and event emission
//! - `maintenance_tests` - administrative state transitions

use chrono::{TimeZone, Utc};

use core_kernel::PatientId;
use domain_ward::{Bed, BedEvent, BedStatus, Occupancy, WardError};
use test_utils::TestBedBuilder;

fn reference_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap()
}

// ============================================================================
// ASSIGNMENT TESTS
// ============================================================================

mod assign_tests {
    use super::*;

    /// Verifies a fresh assignment occupies the bed and emits the event
    #[test]
    fn test_assign_to_available_bed() {
        let now = reference_now();
        let mut bed = Bed::new("B-101", "General");
        let patient = PatientId::new();

        let event = bed.assign(patient, None, now).unwrap();

        assert_eq!(bed.status, BedStatus::Occupied);
        assert_eq!(bed.patient_id, Some(patient));
        assert_eq!(bed.admitted_at, Some(now));
        assert!(
            matches!(event, Some(BedEvent::Assigned { .. })),
            "assignment must emit an Assigned event"
        );
    }

    /// Verifies the guard rejects a patient who already occupies bed A,
    /// naming bed A and its ward, and leaves the target bed unchanged
    #[test]
    fn test_patient_with_existing_bed_conflicts() {
        let now = reference_now();
        let patient = PatientId::new();

        let mut bed_a = Bed::new("A-001", "ICU");
        bed_a.assign(patient, None, now).unwrap();

        let mut bed_b = Bed::new("B-002", "General");
        let occupancy = Occupancy {
            bed_id: bed_a.id,
            bed_number: bed_a.bed_number.clone(),
            ward: bed_a.ward.clone(),
        };

        let result = bed_b.assign(patient, Some(&occupancy), now);
        match result {
            Err(WardError::PatientAlreadyAssigned {
                bed_number, ward, ..
            }) => {
                assert_eq!(bed_number, "A-001", "conflict must name bed A");
                assert_eq!(ward, "ICU", "conflict must name bed A's ward");
            }
            other => panic!("expected PatientAlreadyAssigned, got {:?}", other.map(|_| ())),
        }

        assert_eq!(bed_b.status, BedStatus::Available, "bed B unchanged");
        assert!(bed_b.patient_id.is_none());
        assert_eq!(bed_a.patient_id, Some(patient), "bed A unchanged");
    }

    /// Verifies a bed occupied by a different patient is unavailable
    #[test]
    fn test_occupied_bed_rejects_other_patient() {
        let now = reference_now();
        let mut bed = Bed::new("B-101", "General");
        bed.assign(PatientId::new(), None, now).unwrap();

        let result = bed.assign(PatientId::new(), None, now);
        assert!(matches!(result, Err(WardError::BedUnavailable { .. })));
    }

    /// Verifies re-assigning the current occupant is an idempotent no-op
    #[test]
    fn test_reassigning_occupant_is_idempotent() {
        let now = reference_now();
        let later = now + chrono::Duration::hours(1);
        let mut bed = Bed::new("B-101", "General");
        let patient = PatientId::new();

        bed.assign(patient, None, now).unwrap();
        let retry = bed.assign(patient, None, later).unwrap();

        assert!(retry.is_none(), "retry emits no event");
        assert_eq!(
            bed.admitted_at,
            Some(now),
            "retry keeps the original admission time"
        );
    }
}

// ============================================================================
// RELEASE TESTS
// ============================================================================

mod release_tests {
    use super::*;

    /// Verifies release(assign(bed, patient)) restores the initial state
    #[test]
    fn test_assign_release_round_trip() {
        let now = reference_now();
        let patient = PatientId::new();
        let mut bed = TestBedBuilder::new().occupied_by(patient).build();

        let event = bed.release(now);

        assert_eq!(bed.status, BedStatus::Available);
        assert!(bed.patient_id.is_none());
        assert!(bed.admitted_at.is_none());

        match event {
            Some(BedEvent::Released {
                patient_id,
                bed_number,
                ..
            }) => {
                assert_eq!(patient_id, patient);
                assert_eq!(bed_number, "B-101");
            }
            other => panic!("expected Released event, got {:?}", other),
        }
    }

    /// Verifies releasing an unoccupied bed is a no-op
    #[test]
    fn test_release_of_free_bed_is_noop() {
        let now = reference_now();
        let mut bed = TestBedBuilder::new().build();

        assert!(bed.release(now).is_none());
        assert_eq!(bed.status, BedStatus::Available);
    }

    /// Verifies the release annotation matches the assignment annotation
    /// shape so a structured update can swap one for the other
    #[test]
    fn test_release_event_annotation() {
        let now = reference_now();
        let mut bed = TestBedBuilder::new()
            .with_ward("ICU")
            .occupied_by(PatientId::new())
            .build();

        let event = bed.release(now).unwrap();
        assert_eq!(event.note_annotation(), "(Bed released: B-101 - ICU)");
    }
}

// ============================================================================
// MAINTENANCE TESTS
// ============================================================================

mod maintenance_tests {
    use super::*;

    /// Verifies a bed under maintenance rejects assignment
    #[test]
    fn test_maintenance_bed_rejects_assignment() {
        let now = reference_now();
        let mut bed = Bed::new("B-101", "General");
        bed.begin_maintenance().unwrap();

        let result = bed.assign(PatientId::new(), None, now);
        assert!(matches!(
            result,
            Err(WardError::BedUnavailable {
                status: BedStatus::Maintenance,
                ..
            })
        ));
    }

    /// Verifies an occupied bed cannot enter maintenance
    #[test]
    fn test_occupied_bed_cannot_enter_maintenance() {
        let now = reference_now();
        let mut bed = Bed::new("B-101", "General");
        bed.assign(PatientId::new(), None, now).unwrap();

        assert!(bed.begin_maintenance().is_err());
    }

    /// Verifies maintenance is exitable back to available
    #[test]
    fn test_maintenance_round_trip() {
        let mut bed = Bed::new("B-101", "General");
        bed.begin_maintenance().unwrap();
        assert_eq!(bed.status, BedStatus::Maintenance);

        bed.end_maintenance();
        assert_eq!(bed.status, BedStatus::Available);
    }
}
