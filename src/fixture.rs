//! An in-memory [`Provider`] backed by a JSON document.
//!
//! Useful for running the server offline and for tests. Every provider call is counted so
//! callers can check how much work an operation did.
//!
//! Fixture format:
//! ```json
//! {
//!   "videos": {
//!     "x4fEnyINwdw": {
//!       "tracks": [
//!         {
//!           "language": "English",
//!           "language_code": "en",
//!           "is_generated": false,
//!           "is_translatable": true,
//!           "segments": [{ "text": "hello", "start": 0.0, "duration": 1.5 }]
//!         }
//!       ]
//!     },
//!     "abc123": "transcripts_disabled",
//!     "gone": { "unavailable": "not_found" },
//!     "flaky": { "error": "upstream timed out" }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::error::UnavailableReason;
use crate::provider::{Provider, ProviderFailure, ProviderSegment, Track};
use crate::transcript::{TrackDescriptor, VideoId};

#[derive(Debug, Default)]
pub struct FixtureProvider {
    videos: HashMap<String, FixtureVideo>,
    operations: AtomicUsize,
}

/// What the fixture knows about one video.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureVideo {
    Tracks(Vec<FixtureTrack>),
    TranscriptsDisabled,
    /// A reason code such as `"not_found"` or `"age_restricted"`.
    Unavailable(String),
    /// Any other failure, reported as-is.
    Error(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureTrack {
    #[serde(flatten)]
    pub descriptor: TrackDescriptor,
    #[serde(default)]
    pub segments: Vec<ProviderSegment>,
}

impl FixtureTrack {
    pub fn new(
        language: impl Into<String>,
        language_code: impl Into<String>,
        is_generated: bool,
        is_translatable: bool,
        segments: Vec<ProviderSegment>,
    ) -> Self {
        Self {
            descriptor: TrackDescriptor {
                language: language.into(),
                language_code: language_code.into(),
                is_generated,
                is_translatable,
            },
            segments,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    videos: HashMap<String, FixtureVideo>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: FixtureFile = serde_json::from_str(json).context("invalid fixture document")?;
        Ok(Self {
            videos: file.videos,
            operations: AtomicUsize::new(0),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture file '{}'", path.display()))?;
        Self::from_json(&json)
    }

    pub fn with_video(mut self, video_id: impl Into<String>, video: FixtureVideo) -> Self {
        self.videos.insert(video_id.into(), video);
        self
    }

    /// Total number of provider calls served so far.
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    fn lookup(&self, video_id: &VideoId) -> Result<&[FixtureTrack], ProviderFailure> {
        self.operations.fetch_add(1, Ordering::SeqCst);

        match self.videos.get(video_id.as_str()) {
            None => Err(ProviderFailure::VideoUnavailable(UnavailableReason::NotFound)),
            Some(FixtureVideo::Tracks(tracks)) => Ok(tracks.as_slice()),
            Some(FixtureVideo::TranscriptsDisabled) => Err(ProviderFailure::TranscriptsDisabled),
            Some(FixtureVideo::Unavailable(code)) => {
                Err(ProviderFailure::VideoUnavailable(reason_from_code(code)))
            }
            Some(FixtureVideo::Error(message)) => {
                Err(ProviderFailure::Other(message.clone().into()))
            }
        }
    }
}

#[async_trait]
impl Provider for FixtureProvider {
    async fn tracks(&self, video_id: &VideoId) -> Result<Vec<Track>, ProviderFailure> {
        let tracks = self.lookup(video_id)?;
        Ok(tracks
            .iter()
            .enumerate()
            .map(|(idx, track)| Track::new(track.descriptor.clone(), idx.to_string()))
            .collect())
    }

    async fn fetch(
        &self,
        video_id: &VideoId,
        track: &Track,
    ) -> Result<Vec<ProviderSegment>, ProviderFailure> {
        let tracks = self.lookup(video_id)?;
        track
            .locator()
            .parse::<usize>()
            .ok()
            .and_then(|idx| tracks.get(idx))
            .map(|found| found.segments.clone())
            .ok_or_else(|| {
                ProviderFailure::unparsable(format!("unknown fixture track '{}'", track.locator()))
            })
    }
}

fn reason_from_code(code: &str) -> UnavailableReason {
    match code {
        "not_found" => UnavailableReason::NotFound,
        "invalid_id" => UnavailableReason::InvalidId,
        "age_restricted" => UnavailableReason::AgeRestricted,
        "region_restricted" => UnavailableReason::RegionRestricted,
        "unplayable" => UnavailableReason::Unplayable { reason: None },
        other => UnavailableReason::Unplayable {
            reason: Some(other.to_owned()),
        },
    }
}
