//! Request-scoped transcript data.
//!
//! Nothing here is cached or persisted: values are built from a provider response, serialized
//! into one HTTP response, and dropped.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, UnavailableReason};

/// An opaque video identifier in the provider's namespace.
///
/// The only check we make is that it is non-empty; anything else is up to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::VideoUnavailable {
                video_id: raw,
                reason: UnavailableReason::InvalidId,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Metadata for one available transcript track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    /// Display name, e.g. `"English (auto-generated)"`.
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
    pub is_translatable: bool,
}

/// One timed cue of transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    /// Seconds from the start of the video.
    pub start: f64,
    /// Seconds; zero for instantaneous cues.
    pub duration: f64,
}

/// The outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptResult {
    pub video_id: VideoId,
    /// Language code of the track that was selected.
    pub language_code: String,
    pub transcript: Vec<TranscriptSegment>,
}
