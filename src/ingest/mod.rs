//! Validation and record construction for incoming captures and waypoints.
//!
//! Every numeric field is checked here, before anything reaches storage, so the analytics
//! only ever see real numbers.

mod capture;
mod waypoint;

use thiserror::Error;

pub use capture::{capture, secure_filename, CaptureForm, CaptureOutcome, ImageUpload};
pub use waypoint::{add_auto_waypoint, add_waypoint, AutoWaypointForm, WaypointForm};

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No image file provided")]
    MissingImage,
    #[error("No image selected")]
    NoImageSelected,
    #[error("Invalid numeric parameter: {0}")]
    InvalidNumber(&'static str),
    #[error("Invalid latitude or longitude")]
    InvalidCoordinates,
    #[error("Waypoint name is required")]
    MissingName,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Parses an optional form value, falling back to `default` when the field was not sent.
/// A field that was sent must hold a finite number.
pub(crate) fn parse_number(
    field: &'static str,
    raw: Option<&str>,
    default: f64,
) -> Result<f64, IngestError> {
    match raw {
        None => Ok(default),
        Some(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or(IngestError::InvalidNumber(field)),
    }
}

fn text_or(raw: Option<String>, default: &str) -> String {
    raw.unwrap_or_else(|| default.to_string())
}
