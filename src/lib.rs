//! Client core for booking appointments at public institutions.
//!
//! The crate keeps the logic behind the booking views: form state and
//! validation, the locally stored draft and session, the remote booking API
//! and the workflows that tie them together.

pub mod api;
#[cfg(feature = "client")]
pub mod cli;
pub mod db;
pub mod domain;
pub mod dto;
pub mod error_conversions;
pub mod forms;
pub mod models;
pub mod schema;
pub mod services;
pub mod storage;
