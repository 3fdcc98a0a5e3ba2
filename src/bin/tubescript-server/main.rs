use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info, warn};

mod metrics;

use tubescript::fixture::FixtureProvider;
use tubescript::logging::{self, LogConfig};
use tubescript::youtube::{DEFAULT_BASE_URL, YouTubeConfig, YouTubeProvider};
use tubescript::{
    Error, ErrorKind, LanguagePreference, Provider, TrackDescriptor, TranscriptResult, Transcripts,
    VideoId,
};

#[derive(Parser, Debug)]
#[command(name = "tubescript-server")]
#[command(about = "HTTP server for video transcripts")]
struct Params {
    /// Host interface to bind to.
    #[arg(long = "host", default_value = "127.0.0.1")]
    host: String,

    /// TCP port to listen on.
    #[arg(long = "port", default_value_t = 8000)]
    port: u16,

    /// Directory for the rotating log file.
    #[arg(long = "log-dir", default_value = ".")]
    log_dir: PathBuf,

    /// Log file name prefix.
    #[arg(long = "log-file", default_value = "api.log")]
    log_file: String,

    /// Number of rotated log files to keep.
    #[arg(long = "log-max-files", default_value_t = 5)]
    log_max_files: usize,

    /// Timeout for each upstream request (seconds).
    #[arg(long = "request-timeout-secs", default_value_t = 30)]
    request_timeout_secs: u64,

    /// YouTube frontend to talk to.
    #[arg(long = "youtube-base-url", default_value = DEFAULT_BASE_URL)]
    youtube_base_url: String,

    /// Serve transcripts from a JSON fixture file instead of YouTube.
    #[arg(long = "fixture")]
    fixture: Option<PathBuf>,
}

#[derive(Clone)]
struct AppState {
    transcripts: Arc<Transcripts<Arc<dyn Provider>>>,
}

impl AppState {
    fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            transcripts: Arc::new(Transcripts::new(provider)),
        }
    }
}

#[derive(Debug, Serialize)]
struct RootResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct AvailableTranscripts {
    video_id: VideoId,
    available_transcripts: Vec<TrackDescriptor>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: ErrorKind,
    error: String,
    /// Same text as `error`, under the name FastAPI-style clients read.
    detail: String,
    video_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    requested_languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_languages: Option<Vec<String>>,
}

#[derive(Debug)]
struct AppError {
    status: StatusCode,
    body: ErrorBody,
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let kind = err.kind();
        let status = if kind.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let message = err.to_string();
        let mut body = ErrorBody {
            kind,
            detail: message.clone(),
            error: message,
            video_id: err.video_id().to_owned(),
            reason: None,
            requested_languages: None,
            available_languages: None,
        };

        match err {
            Error::VideoUnavailable { reason, .. } => body.reason = Some(reason.as_str()),
            Error::TranscriptNotFound {
                requested,
                available,
                ..
            } => {
                body.requested_languages = Some(requested);
                body.available_languages = Some(available);
            }
            Error::TranscriptsDisabled { .. } | Error::Provider { .. } => {}
        }

        Self { status, body }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[tokio::main]
async fn main() {
    let params = Params::parse();

    let log_config = LogConfig {
        dir: params.log_dir.clone(),
        file_name: params.log_file.clone(),
        max_files: params.log_max_files,
    };
    let _log_guard = match logging::init(&log_config) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("tubescript-server: {err:#}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(params).await {
        error!(error = ?err, "tubescript-server failed");
        std::process::exit(1);
    }
}

async fn run(params: Params) -> Result<()> {
    metrics::init();

    let addr: SocketAddr = format!("{}:{}", params.host, params.port)
        .parse()
        .context("invalid host/port bind address")?;

    let provider: Arc<dyn Provider> = match &params.fixture {
        Some(path) => {
            info!(path = %path.display(), "serving transcripts from fixture");
            Arc::new(FixtureProvider::from_path(path)?)
        }
        None => Arc::new(
            YouTubeProvider::new(YouTubeConfig {
                base_url: params.youtube_base_url.clone(),
                request_timeout: Duration::from_secs(params.request_timeout_secs),
            })
            .context("failed to initialize YouTube provider")?,
        ),
    };

    let app = router(AppState::new(provider)).layer(
        TraceLayer::new_for_http()
            .make_span_with(
                DefaultMakeSpan::new()
                    .level(Level::INFO)
                    .include_headers(false),
            )
            .on_response(DefaultOnResponse::new().level(Level::INFO))
            .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
    );

    let listener = TcpListener::bind(addr).await.context("bind failed")?;
    info!(
        %addr,
        log_dir = %params.log_dir.display(),
        log_file = %params.log_file,
        "application startup complete"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("application shutdown");
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/transcript/{video_id}", get(transcript))
        .route("/transcripts/list/{video_id}", get(list_transcripts))
        .route_layer(from_fn(metrics::track_http_metrics))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn root() -> Json<RootResponse> {
    info!("root endpoint was accessed");
    Json(RootResponse {
        message: "Welcome to the tubescript transcript API. Use GET /transcript/{video_id}?languages=en or GET /transcripts/list/{video_id}.",
    })
}

async fn healthz() -> &'static str {
    "ok"
}

async fn transcript(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> std::result::Result<Json<TranscriptResult>, AppError> {
    let preferences = preferences_from_query(&query);
    info!(
        video_id = %video_id,
        languages = ?preferences.codes(),
        "received transcript request"
    );

    let video = VideoId::new(video_id).map_err(fail)?;
    let result = state
        .transcripts
        .resolve(&video, &preferences)
        .await
        .map_err(fail)?;

    info!(
        video_id = %result.video_id,
        language_code = %result.language_code,
        segments = result.transcript.len(),
        "fetched transcript"
    );
    Ok(Json(result))
}

async fn list_transcripts(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> std::result::Result<Json<AvailableTranscripts>, AppError> {
    info!(video_id = %video_id, "received transcript list request");

    let video = VideoId::new(video_id).map_err(fail)?;
    let available_transcripts = state
        .transcripts
        .list_available(&video)
        .await
        .map_err(fail)?;

    info!(
        video_id = %video,
        count = available_transcripts.len(),
        "listed available transcripts"
    );
    Ok(Json(AvailableTranscripts {
        video_id: video,
        available_transcripts,
    }))
}

/// Collect every `languages` query parameter, in request order.
fn preferences_from_query(query: &[(String, String)]) -> LanguagePreference {
    query
        .iter()
        .filter(|(key, _)| key == "languages")
        .map(|(_, value)| value.clone())
        .collect()
}

/// Log a failed request, count it, and turn it into a response.
fn fail(err: Error) -> AppError {
    let kind = err.kind();
    match kind {
        ErrorKind::TranscriptNotFound => {
            warn!(video_id = %err.video_id(), kind = %kind, "{err}")
        }
        ErrorKind::VideoUnavailable | ErrorKind::TranscriptsDisabled => {
            error!(video_id = %err.video_id(), kind = %kind, "{err}")
        }
        ErrorKind::ProviderError => {
            error!(
                video_id = %err.video_id(),
                kind = %kind,
                error = %err,
                "unexpected provider failure"
            )
        }
    }
    metrics::record_error(kind);
    AppError::from(err)
}
