//! The subset of the innertube player response we rely on.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::UnavailableReason;
use crate::provider::{ProviderFailure, Track};
use crate::transcript::{TrackDescriptor, VideoId};

const CLIENT_NAME: &str = "ANDROID";
const CLIENT_VERSION: &str = "20.10.38";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayerResponse {
    #[serde(default)]
    playability_status: Option<PlayabilityStatus>,
    #[serde(default)]
    captions: Option<Captions>,
}

#[derive(Debug, Default, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    tracklist: Option<Tracklist>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Tracklist {
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    #[serde(default)]
    name: Option<TrackName>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    is_translatable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<Run>,
}

#[derive(Debug, Deserialize)]
struct Run {
    text: String,
}

pub(crate) fn request_body(video_id: &VideoId) -> Value {
    json!({
        "context": {
            "client": {
                "clientName": CLIENT_NAME,
                "clientVersion": CLIENT_VERSION,
            }
        },
        "videoId": video_id.as_str(),
    })
}

impl PlayerResponse {
    /// Check playability, then list caption tracks with human-authored tracks first.
    pub(crate) fn into_tracks(self, video_id: &VideoId) -> Result<Vec<Track>, ProviderFailure> {
        if let Some(status) = &self.playability_status {
            check_playability(video_id, status)?;
        }

        let caption_tracks = self
            .captions
            .and_then(|c| c.tracklist)
            .and_then(|t| t.caption_tracks)
            .ok_or(ProviderFailure::TranscriptsDisabled)?;

        let (manual, generated): (Vec<_>, Vec<_>) = caption_tracks
            .into_iter()
            .map(into_track)
            .partition(|track| !track.descriptor().is_generated);

        Ok(manual.into_iter().chain(generated).collect())
    }
}

fn check_playability(
    video_id: &VideoId,
    status: &PlayabilityStatus,
) -> Result<(), ProviderFailure> {
    let code = match status.status.as_deref() {
        None | Some("OK") => return Ok(()),
        Some(code) => code,
    };
    let reason = status.reason.as_deref().unwrap_or_default();

    if code == "LOGIN_REQUIRED" {
        if reason.contains("not a bot") {
            return Err(ProviderFailure::RequestBlocked);
        }
        if reason.contains("inappropriate") || reason.contains("confirm your age") {
            return Err(ProviderFailure::VideoUnavailable(
                UnavailableReason::AgeRestricted,
            ));
        }
    }

    if code == "ERROR" && reason.contains("This video is unavailable") {
        let reason = if video_id.as_str().starts_with("http") {
            UnavailableReason::InvalidId
        } else {
            UnavailableReason::NotFound
        };
        return Err(ProviderFailure::VideoUnavailable(reason));
    }

    if reason.contains("country") {
        return Err(ProviderFailure::VideoUnavailable(
            UnavailableReason::RegionRestricted,
        ));
    }

    Err(ProviderFailure::VideoUnavailable(UnavailableReason::Unplayable {
        reason: (!reason.is_empty()).then(|| reason.to_owned()),
    }))
}

fn into_track(caption: CaptionTrack) -> Track {
    let language = caption
        .name
        .and_then(|name| {
            name.runs
                .into_iter()
                .next()
                .map(|run| run.text)
                .or(name.simple_text)
        })
        .unwrap_or_else(|| caption.language_code.clone());

    let descriptor = TrackDescriptor {
        language,
        language_code: caption.language_code,
        is_generated: caption.kind.as_deref() == Some("asr"),
        is_translatable: caption.is_translatable,
    };

    Track::new(descriptor, caption.base_url.replace("&fmt=srv3", ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> VideoId {
        VideoId::new(raw).expect("valid id")
    }

    fn parse(value: Value) -> PlayerResponse {
        serde_json::from_value(value).expect("player response should deserialize")
    }

    #[test]
    fn request_body_names_client_and_video() {
        let body = request_body(&id("x4fEnyINwdw"));
        assert_eq!(body["videoId"], "x4fEnyINwdw");
        assert_eq!(body["context"]["client"]["clientName"], "ANDROID");
    }

    #[test]
    fn lists_manual_tracks_before_generated_ones() -> anyhow::Result<()> {
        let response = parse(json!({
            "playabilityStatus": { "status": "OK" },
            "captions": {
                "playerCaptionsTracklistRenderer": {
                    "captionTracks": [
                        {
                            "baseUrl": "https://host/api/timedtext?v=a&lang=en&kind=asr&fmt=srv3",
                            "name": { "runs": [{ "text": "English (auto-generated)" }] },
                            "languageCode": "en",
                            "kind": "asr",
                            "isTranslatable": true
                        },
                        {
                            "baseUrl": "https://host/api/timedtext?v=a&lang=ar",
                            "name": { "simpleText": "Arabic" },
                            "languageCode": "ar"
                        }
                    ]
                }
            }
        }));

        let tracks = response.into_tracks(&id("a"))?;
        let descriptors: Vec<&TrackDescriptor> = tracks.iter().map(Track::descriptor).collect();

        assert_eq!(descriptors[0].language, "Arabic");
        assert!(!descriptors[0].is_generated);
        assert!(!descriptors[0].is_translatable);
        assert_eq!(descriptors[1].language, "English (auto-generated)");
        assert!(descriptors[1].is_generated);
        assert!(descriptors[1].is_translatable);
        assert_eq!(
            tracks[1].locator(),
            "https://host/api/timedtext?v=a&lang=en&kind=asr"
        );
        Ok(())
    }

    #[test]
    fn missing_captions_means_disabled() {
        let response = parse(json!({ "playabilityStatus": { "status": "OK" } }));
        assert!(matches!(
            response.into_tracks(&id("abc123")),
            Err(ProviderFailure::TranscriptsDisabled)
        ));

        let response = parse(json!({
            "captions": { "playerCaptionsTracklistRenderer": {} }
        }));
        assert!(matches!(
            response.into_tracks(&id("abc123")),
            Err(ProviderFailure::TranscriptsDisabled)
        ));
    }

    #[test]
    fn classifies_playability_failures() {
        let cases = [
            (
                "LOGIN_REQUIRED",
                "Sign in to confirm you're not a bot",
                "x4fEnyINwdw",
            ),
            (
                "LOGIN_REQUIRED",
                "This video may be inappropriate for some users.",
                "x4fEnyINwdw",
            ),
            ("ERROR", "This video is unavailable", "x4fEnyINwdw"),
            (
                "ERROR",
                "This video is unavailable",
                "https://www.youtube.com/watch?v=x4fEnyINwdw",
            ),
            (
                "UNPLAYABLE",
                "The uploader has not made this video available in your country",
                "x4fEnyINwdw",
            ),
            ("UNPLAYABLE", "Join this channel to get access", "x4fEnyINwdw"),
        ];

        let results: Vec<ProviderFailure> = cases
            .into_iter()
            .map(|(status, reason, video)| {
                parse(json!({ "playabilityStatus": { "status": status, "reason": reason } }))
                    .into_tracks(&id(video))
                    .expect_err("playability failure expected")
            })
            .collect();

        assert!(matches!(results[0], ProviderFailure::RequestBlocked));
        assert!(matches!(
            results[1],
            ProviderFailure::VideoUnavailable(UnavailableReason::AgeRestricted)
        ));
        assert!(matches!(
            results[2],
            ProviderFailure::VideoUnavailable(UnavailableReason::NotFound)
        ));
        assert!(matches!(
            results[3],
            ProviderFailure::VideoUnavailable(UnavailableReason::InvalidId)
        ));
        assert!(matches!(
            results[4],
            ProviderFailure::VideoUnavailable(UnavailableReason::RegionRestricted)
        ));
        match &results[5] {
            ProviderFailure::VideoUnavailable(UnavailableReason::Unplayable { reason }) => {
                assert_eq!(reason.as_deref(), Some("Join this channel to get access"));
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }
}
