//! Listings, bookings and reviews for a short-stay travel catalogue.
//!
//! The [`listings`] module holds the booking validity and pricing rules, the
//! review guard, the repository seams they run against, and the HTTP router
//! exposing them. Configuration, telemetry and the application error type sit
//! alongside so the API service can wire everything from one crate.

pub mod config;
pub mod error;
pub mod listings;
pub mod telemetry;
