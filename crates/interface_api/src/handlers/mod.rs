//! Request handlers

pub mod billing;
pub mod beds;
pub mod dashboard;
pub mod health;
