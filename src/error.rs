//! Error types.
//!
//! Nothing here is fatal: every variant means "this input was dropped" or
//! "this call did nothing", and the tracker keeps its state intact.

use thiserror::Error;

/// Coarse classification of a [`TrackerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum ErrorKind {
    /// Malformed sample (non-finite coordinates, out-of-order timestamp).
    InvalidInput,
    /// Well-formed sample filtered out as GPS noise.
    Noise,
    /// `start` while tracking or `stop`/`accept_sample` while idle.
    InvalidStateTransition,
}

/// Errors reported by [`SessionTracker`](crate::SessionTracker).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("Invalid sample: {reason}")]
    InvalidSample { reason: String },

    #[error("Low accuracy reading ignored: {accuracy} m (limit {limit} m)")]
    LowAccuracy { accuracy: f64, limit: f64 },

    #[error("Movement too small, ignored: {distance:.2} m (minimum {minimum} m)")]
    BelowMinimumDistance { distance: f64, minimum: f64 },

    #[error("Tracking already active")]
    AlreadyTracking,

    #[error("Tracking not active")]
    NotTracking,
}

impl TrackerError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        TrackerError::InvalidSample { reason: reason.into() }
    }

    /// Which of the three rejection classes this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::InvalidSample { .. } => ErrorKind::InvalidInput,
            TrackerError::LowAccuracy { .. } | TrackerError::BelowMinimumDistance { .. } => {
                ErrorKind::Noise
            }
            TrackerError::AlreadyTracking | TrackerError::NotTracking => {
                ErrorKind::InvalidStateTransition
            }
        }
    }
}

/// Errors from the export formatters.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("No tracking data to export")]
    EmptySession,

    #[error("Timestamp out of range: {0} ms")]
    InvalidTimestamp(i64),

    #[cfg(feature = "serde")]
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(TrackerError::invalid("nan").kind(), ErrorKind::InvalidInput);
        assert_eq!(
            TrackerError::LowAccuracy { accuracy: 150.0, limit: 100.0 }.kind(),
            ErrorKind::Noise
        );
        assert_eq!(
            TrackerError::BelowMinimumDistance { distance: 1.0, minimum: 5.0 }.kind(),
            ErrorKind::Noise
        );
        assert_eq!(TrackerError::AlreadyTracking.kind(), ErrorKind::InvalidStateTransition);
        assert_eq!(TrackerError::NotTracking.kind(), ErrorKind::InvalidStateTransition);
    }

    #[test]
    fn test_messages() {
        let err = TrackerError::LowAccuracy { accuracy: 150.0, limit: 100.0 };
        assert_eq!(err.to_string(), "Low accuracy reading ignored: 150 m (limit 100 m)");
        assert_eq!(
            ExportError::UnsupportedFormat("kml".into()).to_string(),
            "Unsupported export format: kml"
        );
    }
}
