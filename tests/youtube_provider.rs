#![cfg(feature = "youtube")]

use std::time::Duration;

use serde_json::json;
use tubescript::youtube::{YouTubeConfig, YouTubeProvider};
use tubescript::{Error, ErrorKind, LanguagePreference, Transcripts, UnavailableReason, VideoId};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VIDEO: &str = "x4fEnyINwdw";

const WATCH_HTML: &str = r#"<html><script>ytcfg.set({"INNERTUBE_API_KEY":"test-key"});</script></html>"#;

const TIMEDTEXT_EN: &str = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.0" dur="4.4">Hey &amp;#39;there&amp;#39;</text><text start="4.4" dur="4.7">second</text><text start="9.1" dur="0">[Music]</text></transcript>"#;

fn transcripts(server: &MockServer) -> anyhow::Result<Transcripts<YouTubeProvider>> {
    let provider = YouTubeProvider::new(YouTubeConfig {
        base_url: server.uri(),
        request_timeout: Duration::from_secs(5),
    })?;
    Ok(Transcripts::new(provider))
}

fn player_with_tracks(server: &MockServer) -> serde_json::Value {
    let timedtext = format!("{}/api/timedtext?v={VIDEO}", server.uri());
    json!({
        "playabilityStatus": { "status": "OK" },
        "captions": {
            "playerCaptionsTracklistRenderer": {
                "captionTracks": [
                    {
                        "baseUrl": format!("{timedtext}&lang=en&kind=asr&fmt=srv3"),
                        "name": { "runs": [{ "text": "English (auto-generated)" }] },
                        "languageCode": "en",
                        "kind": "asr",
                        "isTranslatable": true
                    },
                    {
                        "baseUrl": format!("{timedtext}&lang=ar"),
                        "name": { "runs": [{ "text": "Arabic" }] },
                        "languageCode": "ar",
                        "isTranslatable": true
                    }
                ]
            }
        }
    })
}

async fn mount_watch_page(server: &MockServer, html: &str) {
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", VIDEO))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

async fn mount_player(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/youtubei/v1/player"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({ "videoId": VIDEO })))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn resolves_and_parses_a_track() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_watch_page(&server, WATCH_HTML).await;
    mount_player(
        &server,
        ResponseTemplate::new(200).set_body_json(player_with_tracks(&server)),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TIMEDTEXT_EN))
        .expect(1)
        .mount(&server)
        .await;

    let result = transcripts(&server)?
        .resolve(&VideoId::new(VIDEO)?, &LanguagePreference::new(["de", "en"]))
        .await?;

    assert_eq!(result.language_code, "en");
    let starts: Vec<f64> = result.transcript.iter().map(|s| s.start).collect();
    assert_eq!(starts, [0.0, 4.4, 9.1]);
    assert_eq!(result.transcript[0].text, "Hey 'there'");
    assert_eq!(result.transcript[2].duration, 0.0);
    Ok(())
}

#[tokio::test]
async fn lists_manual_tracks_first_without_fetching() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_watch_page(&server, WATCH_HTML).await;
    mount_player(
        &server,
        ResponseTemplate::new(200).set_body_json(player_with_tracks(&server)),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TIMEDTEXT_EN))
        .expect(0)
        .mount(&server)
        .await;

    let listed = transcripts(&server)?
        .list_available(&VideoId::new(VIDEO)?)
        .await?;

    let codes: Vec<&str> = listed.iter().map(|t| t.language_code.as_str()).collect();
    assert_eq!(codes, ["ar", "en"]);
    assert_eq!(listed[1].language, "English (auto-generated)");
    assert!(listed[1].is_generated);
    Ok(())
}

#[tokio::test]
async fn missing_captions_are_transcripts_disabled() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_watch_page(&server, WATCH_HTML).await;
    mount_player(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "playabilityStatus": { "status": "OK" } })),
    )
    .await;

    let err = transcripts(&server)?
        .list_available(&VideoId::new(VIDEO)?)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TranscriptsDisabled);
    Ok(())
}

#[tokio::test]
async fn unplayable_video_is_unavailable() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_watch_page(&server, WATCH_HTML).await;
    mount_player(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "playabilityStatus": { "status": "ERROR", "reason": "This video is unavailable" }
        })),
    )
    .await;

    let err = transcripts(&server)?
        .resolve(&VideoId::new(VIDEO)?, &LanguagePreference::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        Error::VideoUnavailable {
            video_id: VIDEO.to_owned(),
            reason: UnavailableReason::NotFound,
        }
    );
    Ok(())
}

#[tokio::test]
async fn rate_limiting_is_a_provider_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_watch_page(&server, WATCH_HTML).await;
    mount_player(&server, ResponseTemplate::new(429)).await;

    let err = transcripts(&server)?
        .list_available(&VideoId::new(VIDEO)?)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderError);
    assert!(err.to_string().contains("rate limiting"));
    Ok(())
}

#[tokio::test]
async fn recaptcha_page_is_a_provider_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_watch_page(&server, r#"<div class="g-recaptcha"></div>"#).await;

    let err = transcripts(&server)?
        .list_available(&VideoId::new(VIDEO)?)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderError);
    assert!(err.to_string().contains("IP address"));
    Ok(())
}

#[tokio::test]
async fn accepts_cookie_consent_before_reading_the_page() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(header("cookie", "CONSENT=YES+cb.123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(WATCH_HTML))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_watch_page(
        &server,
        r#"<form action="https://consent.youtube.com/s"><input name="v" value="cb.123"></form>"#,
    )
    .await;
    mount_player(
        &server,
        ResponseTemplate::new(200).set_body_json(player_with_tracks(&server)),
    )
    .await;

    let listed = transcripts(&server)?
        .list_available(&VideoId::new(VIDEO)?)
        .await?;
    assert_eq!(listed.len(), 2);
    Ok(())
}

#[tokio::test]
async fn po_token_tracks_cannot_be_fetched() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_watch_page(&server, WATCH_HTML).await;
    let base_url = format!("{}/api/timedtext?v={VIDEO}&lang=en&exp=xpe", server.uri());
    mount_player(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "captions": {
                "playerCaptionsTracklistRenderer": {
                    "captionTracks": [{
                        "baseUrl": base_url,
                        "languageCode": "en"
                    }]
                }
            }
        })),
    )
    .await;

    let err = transcripts(&server)?
        .resolve(&VideoId::new(VIDEO)?, &LanguagePreference::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderError);
    assert!(err.to_string().contains("proof-of-origin"));
    Ok(())
}
