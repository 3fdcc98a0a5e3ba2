//! `tubescript`: resolve and serve video transcripts by language preference.
//!
//! This crate provides:
//! - Transcript resolution with strict first-match-wins language selection
//! - Track listing without segment fetches
//! - A fixed, four-kind error taxonomy for every upstream failure
//! - Pluggable transcript sources (YouTube, JSON fixtures)
//!
//! The library stays free of HTTP-server concerns; the `tubescript-server` binary wires it into
//! axum.

mod error;

// High-level API (most consumers should start here).
pub mod resolver;

// Request-scoped data and language preferences.
pub mod languages;
pub mod transcript;

// Upstream source interface and failure classification.
pub mod classify;
pub mod provider;

// Providers.
pub mod fixture;
#[cfg(feature = "youtube")]
pub mod youtube;

// Logging configuration.
#[cfg(feature = "logging")]
pub mod logging;

pub use error::{Error, ErrorKind, Result, UnavailableReason};
pub use languages::{DEFAULT_LANGUAGE, LanguagePreference};
pub use provider::{Provider, ProviderFailure, ProviderSegment, Track};
pub use resolver::Transcripts;
pub use transcript::{TrackDescriptor, TranscriptResult, TranscriptSegment, VideoId};
