use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::error::UnavailableReason;
use crate::transcript::{TrackDescriptor, TranscriptSegment, VideoId};

/// The external transcript source used by [`crate::Transcripts`].
///
/// A provider enumerates the tracks of a video and fetches the segments of one track. It is free
/// to fail in any way it likes; [`crate::classify`] turns those failures into the crate's own
/// [`crate::Error`].
///
/// Implementations must be safe to call from many requests at once.
#[async_trait]
pub trait Provider: Send + Sync {
    /// List every transcript track of `video_id`, in the provider's own order.
    async fn tracks(&self, video_id: &VideoId) -> Result<Vec<Track>, ProviderFailure>;

    /// Fetch the segments of `track`, in chronological order.
    async fn fetch(
        &self,
        video_id: &VideoId,
        track: &Track,
    ) -> Result<Vec<ProviderSegment>, ProviderFailure>;
}

#[async_trait]
impl<P: Provider + ?Sized> Provider for Arc<P> {
    async fn tracks(&self, video_id: &VideoId) -> Result<Vec<Track>, ProviderFailure> {
        (**self).tracks(video_id).await
    }

    async fn fetch(
        &self,
        video_id: &VideoId,
        track: &Track,
    ) -> Result<Vec<ProviderSegment>, ProviderFailure> {
        (**self).fetch(video_id, track).await
    }
}

/// A handle to one track: its metadata plus whatever the provider needs to fetch it later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    descriptor: TrackDescriptor,
    locator: String,
}

impl Track {
    pub fn new(descriptor: TrackDescriptor, locator: impl Into<String>) -> Self {
        Self {
            descriptor,
            locator: locator.into(),
        }
    }

    pub fn descriptor(&self) -> &TrackDescriptor {
        &self.descriptor
    }

    pub fn language_code(&self) -> &str {
        &self.descriptor.language_code
    }

    /// Provider-defined fetch location (a URL for YouTube, a key for fixtures).
    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn into_descriptor(self) -> TrackDescriptor {
        self.descriptor
    }
}

/// A segment exactly as the provider produced it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl From<ProviderSegment> for TranscriptSegment {
    fn from(seg: ProviderSegment) -> Self {
        Self {
            text: seg.text,
            start: seg.start,
            duration: seg.duration,
        }
    }
}

/// Failures a provider may report.
///
/// This set is open: new providers can report anything through [`ProviderFailure::Other`] or
/// [`ProviderFailure::Transport`], and the classifier treats whatever it does not recognize as a
/// provider error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderFailure {
    #[error("video is unavailable: {0}")]
    VideoUnavailable(UnavailableReason),

    #[error("transcripts are disabled for this video")]
    TranscriptsDisabled,

    #[error("the request was blocked by the provider (bot check)")]
    RequestBlocked,

    #[error("the provider is blocking requests from this IP address")]
    IpBlocked,

    #[error("the provider is rate limiting requests")]
    TooManyRequests,

    #[error("the track requires a proof-of-origin token and cannot be fetched")]
    PoTokenRequired,

    #[error("failed to accept the provider's cookie consent form")]
    ConsentFailed,

    #[error("provider response could not be parsed: {0}")]
    Unparsable(String),

    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    #[error(transparent)]
    Other(Box<dyn StdError + Send + Sync>),
}

impl ProviderFailure {
    pub fn unparsable(message: impl Into<String>) -> Self {
        Self::Unparsable(message.into())
    }
}
