//! Ward Domain - Bed registry and assignment guard
//!
//! This crate enforces the single-active-bed-per-patient invariant and the
//! `available ⇄ occupied` bed state machine, and emits the occupancy events
//! that downstream consumers (appointment notes, occupancy history) react to.

pub mod bed;
pub mod events;
pub mod error;

pub use bed::{Bed, BedStatus, Occupancy};
pub use events::BedEvent;
pub use error::WardError;
