//! Core types and API client for the CEMADEN rain gauge network.
//!
//! CEMADEN operates automatic pluviometers across Brazil and exposes the
//! observations through a JSON web service plus periodic CSV extracts.
//! This crate models stations, hourly series and historical readings,
//! and aggregates readings over a trailing 24 hour window.

mod de;

pub mod aggregate;
pub mod error;
pub mod hourly;
pub mod reading;
pub mod station;
