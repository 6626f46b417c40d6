//! Domain aggregates exchanged with the booking API.

pub mod appointment;
pub mod institution;
pub mod notification;
pub mod session;
pub mod types;
