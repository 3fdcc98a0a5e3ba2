//! Transcript resolution and availability listing.
//!
//! [`Transcripts`] is the single entry point the HTTP layer talks to. It holds no per-request
//! state, so one instance can be shared across every in-flight request.

use crate::classify::{classify, no_matching_track};
use crate::error::Result;
use crate::languages::LanguagePreference;
use crate::provider::{Provider, Track};
use crate::transcript::{TrackDescriptor, TranscriptResult, TranscriptSegment, VideoId};

/// Resolves transcripts against a [`Provider`].
pub struct Transcripts<P: Provider> {
    provider: P,
}

impl<P: Provider> Transcripts<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Select the first track matching `preferences` and fetch its segments.
    ///
    /// Preferences are walked in order and the first code with an available track wins, even if
    /// a later code would match a "better" track. Nothing is retried.
    pub async fn resolve(
        &self,
        video_id: &VideoId,
        preferences: &LanguagePreference,
    ) -> Result<TranscriptResult> {
        let tracks = self
            .provider
            .tracks(video_id)
            .await
            .map_err(|failure| classify(video_id, failure))?;

        let track = select_track(&tracks, preferences)
            .ok_or_else(|| no_matching_track(video_id, preferences, &tracks))?;

        let segments = self
            .provider
            .fetch(video_id, track)
            .await
            .map_err(|failure| classify(video_id, failure))?;

        Ok(TranscriptResult {
            video_id: video_id.clone(),
            language_code: track.language_code().to_owned(),
            transcript: segments.into_iter().map(TranscriptSegment::from).collect(),
        })
    }

    /// Describe every track of `video_id` without fetching any segments.
    pub async fn list_available(&self, video_id: &VideoId) -> Result<Vec<TrackDescriptor>> {
        let tracks = self
            .provider
            .tracks(video_id)
            .await
            .map_err(|failure| classify(video_id, failure))?;

        Ok(tracks.into_iter().map(Track::into_descriptor).collect())
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

/// First-match-wins track selection.
///
/// For each preferred code in order, return the first track whose language code equals it.
pub fn select_track<'a>(
    tracks: &'a [Track],
    preferences: &LanguagePreference,
) -> Option<&'a Track> {
    preferences
        .iter()
        .find_map(|code| tracks.iter().find(|track| track.language_code() == code))
}
