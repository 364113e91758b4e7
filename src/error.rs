//! Domain errors for the intake form.
//!
//! Plumbing (terminal, HTTP, config I/O) reports through `color_eyre`; the
//! variants here are the ones a user can trigger and fix from the form, so
//! their `Display` text doubles as the banner shown in the UI.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntakeError {
    #[error("invalid coordinate: lat={0}, lon={1}")]
    InvalidCoordinate(f64, f64),

    #[error("no coordinate has been established yet; enter both latitude and longitude first")]
    CoordinateNotEstablished,

    #[error("birth location is not resolved: search again, enter coordinates manually, or pick a point on the map (F2)")]
    MissingCoordinate,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid birth date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid birth time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("AI temperature must be between 0.0 and 1.0, got {0}")]
    InvalidTemperature(f64),
}
