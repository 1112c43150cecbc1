//! Domain events for bed occupancy
//!
//! Assignment and release are cross-entity operations: a release also has to
//! be reflected in the appointment notes that recorded the assignment. That
//! side effect is driven by these events rather than by free-text rewriting,
//! keeping it explicit and auditable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BedId, PatientId};

/// Domain events emitted by the Bed aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BedEvent {
    /// A patient was assigned to a bed
    Assigned {
        bed_id: BedId,
        bed_number: String,
        ward: String,
        patient_id: PatientId,
        timestamp: DateTime<Utc>,
    },

    /// A bed was released
    Released {
        bed_id: BedId,
        bed_number: String,
        ward: String,
        patient_id: PatientId,
        timestamp: DateTime<Utc>,
    },
}

impl BedEvent {
    /// Returns the bed this event concerns
    pub fn bed_id(&self) -> BedId {
        match self {
            BedEvent::Assigned { bed_id, .. } | BedEvent::Released { bed_id, .. } => *bed_id,
        }
    }

    /// Returns the patient this event concerns
    pub fn patient_id(&self) -> PatientId {
        match self {
            BedEvent::Assigned { patient_id, .. } | BedEvent::Released { patient_id, .. } => {
                *patient_id
            }
        }
    }

    /// Renders the annotation appointment views attach to their notes
    ///
    /// Both variants produce the same `(Bed <verb>: <number> - <ward>)`
    /// shape, so a release annotation replaces the assignment annotation
    /// one-for-one in a structured update.
    pub fn note_annotation(&self) -> String {
        match self {
            BedEvent::Assigned {
                bed_number, ward, ..
            } => format!("(Bed assigned: {} - {})", bed_number, ward),
            BedEvent::Released {
                bed_number, ward, ..
            } => format!("(Bed released: {} - {})", bed_number, ward),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotations_align_for_replacement() {
        let bed_id = BedId::new();
        let patient_id = PatientId::new();
        let now = Utc::now();

        let assigned = BedEvent::Assigned {
            bed_id,
            bed_number: "B-101".to_string(),
            ward: "ICU".to_string(),
            patient_id,
            timestamp: now,
        };
        let released = BedEvent::Released {
            bed_id,
            bed_number: "B-101".to_string(),
            ward: "ICU".to_string(),
            patient_id,
            timestamp: now,
        };

        assert_eq!(assigned.note_annotation(), "(Bed assigned: B-101 - ICU)");
        assert_eq!(released.note_annotation(), "(Bed released: B-101 - ICU)");
    }
}
