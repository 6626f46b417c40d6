//! Diesel models and configuration structures.

pub mod config;
pub mod local_storage;
