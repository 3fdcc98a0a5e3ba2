use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// tubescript's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The fixed set of caller-facing failure kinds.
///
/// Every failed resolution or listing ends up as exactly one of these. Provider-specific error
/// types never cross this boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    VideoUnavailable,
    TranscriptsDisabled,
    TranscriptNotFound,
    ProviderError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 4] = [
        ErrorKind::VideoUnavailable,
        ErrorKind::TranscriptsDisabled,
        ErrorKind::TranscriptNotFound,
        ErrorKind::ProviderError,
    ];

    /// Stable snake_case label, used in response bodies and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::VideoUnavailable => "video_unavailable",
            ErrorKind::TranscriptsDisabled => "transcripts_disabled",
            ErrorKind::TranscriptNotFound => "transcript_not_found",
            ErrorKind::ProviderError => "provider_error",
        }
    }

    /// Whether the failure means "nothing to serve for this request" rather than a server fault.
    pub fn is_not_found(self) -> bool {
        !matches!(self, ErrorKind::ProviderError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a provider considers a video inaccessible.
///
/// All of these surface as [`ErrorKind::VideoUnavailable`]; the reason is kept so callers can
/// still tell a missing video from a restricted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    NotFound,
    InvalidId,
    AgeRestricted,
    RegionRestricted,
    Unplayable { reason: Option<String> },
}

impl UnavailableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnavailableReason::NotFound => "not_found",
            UnavailableReason::InvalidId => "invalid_id",
            UnavailableReason::AgeRestricted => "age_restricted",
            UnavailableReason::RegionRestricted => "region_restricted",
            UnavailableReason::Unplayable { .. } => "unplayable",
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::NotFound => {
                f.write_str("the video does not exist or is no longer available")
            }
            UnavailableReason::InvalidId => {
                f.write_str("the value is not a valid video id (pass the id, not the URL)")
            }
            UnavailableReason::AgeRestricted => f.write_str("the video is age restricted"),
            UnavailableReason::RegionRestricted => {
                f.write_str("the video is not available in this region")
            }
            UnavailableReason::Unplayable { reason: Some(reason) } => {
                write!(f, "the video is unplayable: {reason}")
            }
            UnavailableReason::Unplayable { reason: None } => {
                f.write_str("the video is unplayable")
            }
        }
    }
}

/// tubescript's crate-wide error type.
///
/// Each variant corresponds to one [`ErrorKind`]. Messages always name the video id so a caller
/// can act on a failure without a follow-up request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Video '{video_id}' is unavailable: {reason}.")]
    VideoUnavailable {
        video_id: String,
        reason: UnavailableReason,
    },

    #[error("Transcripts are disabled for video '{video_id}'.")]
    TranscriptsDisabled { video_id: String },

    #[error(
        "Could not find a transcript for video '{}' in the requested languages: {}. Available languages are: {}",
        .video_id,
        .requested.join(", "),
        .available.join(", ")
    )]
    TranscriptNotFound {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("An unexpected error occurred for video '{video_id}': {message}")]
    Provider { video_id: String, message: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::VideoUnavailable { .. } => ErrorKind::VideoUnavailable,
            Error::TranscriptsDisabled { .. } => ErrorKind::TranscriptsDisabled,
            Error::TranscriptNotFound { .. } => ErrorKind::TranscriptNotFound,
            Error::Provider { .. } => ErrorKind::ProviderError,
        }
    }

    pub fn video_id(&self) -> &str {
        match self {
            Error::VideoUnavailable { video_id, .. }
            | Error::TranscriptsDisabled { video_id }
            | Error::TranscriptNotFound { video_id, .. }
            | Error::Provider { video_id, .. } => video_id,
        }
    }
}
