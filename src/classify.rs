//! Mapping from provider failures to the crate's fixed error taxonomy.
//!
//! Only failures with a well-known meaning get their own kind; every other failure becomes
//! [`Error::Provider`]. Adding a variant to [`ProviderFailure`] therefore never changes how
//! existing failures are classified.

use crate::error::Error;
use crate::languages::LanguagePreference;
use crate::provider::{ProviderFailure, Track};
use crate::transcript::VideoId;

/// Turn a provider failure for `video_id` into a caller-facing [`Error`].
pub fn classify(video_id: &VideoId, failure: ProviderFailure) -> Error {
    let video_id = video_id.as_str().to_owned();
    match failure {
        ProviderFailure::VideoUnavailable(reason) => Error::VideoUnavailable { video_id, reason },
        ProviderFailure::TranscriptsDisabled => Error::TranscriptsDisabled { video_id },
        other => Error::Provider {
            video_id,
            message: error_chain(&other),
        },
    }
}

/// The error for "tracks exist, but none in the requested languages".
pub fn no_matching_track(
    video_id: &VideoId,
    preferences: &LanguagePreference,
    tracks: &[Track],
) -> Error {
    Error::TranscriptNotFound {
        video_id: video_id.as_str().to_owned(),
        requested: preferences.codes().to_vec(),
        available: tracks
            .iter()
            .map(|track| track.language_code().to_owned())
            .collect(),
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if !message.contains(&cause_msg) {
            message.push_str(": ");
            message.push_str(&cause_msg);
        }
        source = cause.source();
    }
    message
}
