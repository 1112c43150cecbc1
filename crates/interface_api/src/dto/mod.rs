//! Request and response data transfer objects

pub mod billing;
pub mod beds;
pub mod dashboard;
