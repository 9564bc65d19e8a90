//! Ephemeris - scheduled job history dashboard
//!
//! This library provides the core functionality for the Ephemeris dashboard.
//! It exposes all modules for testing purposes.

pub mod cache;
pub mod entities;
pub mod errors;
pub mod report;
pub mod settings;
pub mod storage;
pub mod web;
