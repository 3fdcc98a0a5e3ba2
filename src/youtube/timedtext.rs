//! Parsing of the timedtext XML format.
//!
//! ```xml
//! <transcript>
//!   <text start="0.0" dur="1.54">Hey there</text>
//!   <text start="1.54" dur="4.16">how are you</text>
//! </transcript>
//! ```

use std::sync::LazyLock;

use html_escape::decode_html_entities;
use regex::Regex;

use crate::provider::{ProviderFailure, ProviderSegment};

static TEXT_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<text\b([^>]*?)(?:/>|>(.*?)</text>)")
        .expect("text element pattern must compile")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*"([^"]*)""#)
        .expect("attribute pattern must compile")
});

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup pattern must compile"));

/// Parse every `<text>` cue in document order.
///
/// Cues without any text are skipped. A cue without `dur` has zero duration; a cue without a
/// parseable `start` makes the whole document unparsable.
pub(crate) fn parse(xml: &str) -> Result<Vec<ProviderSegment>, ProviderFailure> {
    let mut segments = Vec::new();

    for caps in TEXT_ELEMENT.captures_iter(xml) {
        let raw_text = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        if raw_text.is_empty() {
            continue;
        }

        let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let start = attribute(attrs, "start")
            .ok_or_else(|| ProviderFailure::unparsable("timedtext cue has no start attribute"))
            .and_then(|v| parse_seconds("start", &v))?;
        let duration = match attribute(attrs, "dur") {
            Some(v) => parse_seconds("dur", &v)?,
            None => 0.0,
        };

        // Cue text is entity-encoded once for XML and once more for HTML.
        let text = decode_html_entities(raw_text);
        let text = decode_html_entities(&text);
        let text = MARKUP_TAG.replace_all(&text, "").into_owned();

        segments.push(ProviderSegment {
            text,
            start,
            duration,
        });
    }

    Ok(segments)
}

fn attribute(attrs: &str, name: &str) -> Option<String> {
    ATTRIBUTE
        .captures_iter(attrs)
        .find(|caps| &caps[1] == name)
        .map(|caps| caps[2].to_owned())
}

fn parse_seconds(attr: &str, value: &str) -> Result<f64, ProviderFailure> {
    value.trim().parse::<f64>().map_err(|_| {
        ProviderFailure::unparsable(format!(
            "timedtext attribute {attr}=\"{value}\" is not a number"
        ))
    })
}
