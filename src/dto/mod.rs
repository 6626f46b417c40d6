//! DTO modules that bridge services with the views that display them.

pub mod appointments;
pub mod dashboard;
pub mod notifications;
