//! A [`Provider`] backed by YouTube's public watch page, player API and timedtext endpoint.
//!
//! Resolving the tracks of a video takes two requests: the watch page (for the player API key)
//! and the player API itself. Fetching a track is one more request against the track's URL.

mod player;
mod timedtext;
mod watch_page;

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE};
use reqwest::{Client, Response, StatusCode, Url};
use tracing::debug;

use crate::provider::{Provider, ProviderFailure, ProviderSegment, Track};
use crate::transcript::VideoId;

use self::player::PlayerResponse;

pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

const PO_TOKEN_MARKER: &str = "&exp=xpe";

/// Connection settings for [`YouTubeProvider`].
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    /// Scheme and host of the YouTube frontend, without a trailing slash.
    pub base_url: String,

    /// Overall timeout applied to every upstream request.
    pub request_timeout: Duration,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

pub struct YouTubeProvider {
    client: Client,
    base_url: String,
}

impl YouTubeProvider {
    pub fn new(config: YouTubeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn watch_html(&self, video_id: &VideoId) -> Result<String, ProviderFailure> {
        let html = self.get_watch_html(video_id, None).await?;
        if !watch_page::needs_consent(&html) {
            return Ok(html);
        }

        debug!(video_id = %video_id, "accepting cookie consent");
        let value = watch_page::consent_value(&html).ok_or(ProviderFailure::ConsentFailed)?;
        let cookie = format!("CONSENT=YES+{value}");
        let html = self.get_watch_html(video_id, Some(&cookie)).await?;
        if watch_page::needs_consent(&html) {
            return Err(ProviderFailure::ConsentFailed);
        }
        Ok(html)
    }

    async fn get_watch_html(
        &self,
        video_id: &VideoId,
        cookie: Option<&str>,
    ) -> Result<String, ProviderFailure> {
        let url = Url::parse_with_params(
            &format!("{}/watch", self.base_url),
            &[("v", video_id.as_str())],
        )
        .map_err(|err| ProviderFailure::Other(Box::new(err)))?;

        let mut request = self.client.get(url).header(ACCEPT_LANGUAGE, "en-US");
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = check_status(request.send().await.map_err(transport)?)?;
        response.text().await.map_err(transport)
    }

    async fn player(
        &self,
        video_id: &VideoId,
        api_key: &str,
    ) -> Result<PlayerResponse, ProviderFailure> {
        let url = Url::parse_with_params(
            &format!("{}/youtubei/v1/player", self.base_url),
            &[("key", api_key)],
        )
        .map_err(|err| ProviderFailure::Other(Box::new(err)))?;

        let response = self
            .client
            .post(url)
            .header(ACCEPT_LANGUAGE, "en-US")
            .json(&player::request_body(video_id))
            .send()
            .await
            .map_err(transport)?;

        let body = check_status(response)?.text().await.map_err(transport)?;
        serde_json::from_str(&body).map_err(|err| {
            ProviderFailure::unparsable(format!("invalid player response: {err}"))
        })
    }
}

#[async_trait]
impl Provider for YouTubeProvider {
    async fn tracks(&self, video_id: &VideoId) -> Result<Vec<Track>, ProviderFailure> {
        let html = self.watch_html(video_id).await?;

        let api_key = match watch_page::innertube_api_key(&html) {
            Some(key) => key,
            None if watch_page::is_recaptcha(&html) => return Err(ProviderFailure::IpBlocked),
            None => {
                return Err(ProviderFailure::unparsable(
                    "watch page does not contain an INNERTUBE_API_KEY",
                ));
            }
        };

        let tracks = self.player(video_id, api_key).await?.into_tracks(video_id)?;
        debug!(video_id = %video_id, tracks = tracks.len(), "listed caption tracks");
        Ok(tracks)
    }

    async fn fetch(
        &self,
        video_id: &VideoId,
        track: &Track,
    ) -> Result<Vec<ProviderSegment>, ProviderFailure> {
        if track.locator().contains(PO_TOKEN_MARKER) {
            return Err(ProviderFailure::PoTokenRequired);
        }

        let response = self
            .client
            .get(track.locator())
            .header(ACCEPT_LANGUAGE, "en-US")
            .send()
            .await
            .map_err(transport)?;

        let xml = check_status(response)?.text().await.map_err(transport)?;
        let segments = timedtext::parse(&xml)?;
        debug!(
            video_id = %video_id,
            language_code = track.language_code(),
            segments = segments.len(),
            "fetched caption track"
        );
        Ok(segments)
    }
}

fn check_status(response: Response) -> Result<Response, ProviderFailure> {
    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderFailure::TooManyRequests);
    }
    response.error_for_status().map_err(transport)
}

fn transport(err: reqwest::Error) -> ProviderFailure {
    ProviderFailure::Transport(Box::new(err))
}
