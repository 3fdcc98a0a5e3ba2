use std::sync::LazyLock;

use regex::Regex;

static API_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#)
        .expect("api key pattern must compile")
});

static CONSENT_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name="v" value="(.*?)""#).expect("consent pattern must compile")
});

const CONSENT_FORM_MARKER: &str = r#"action="https://consent.youtube.com/s""#;
const RECAPTCHA_MARKER: &str = r#"class="g-recaptcha""#;

/// The player API key embedded in a watch page.
pub(crate) fn innertube_api_key(html: &str) -> Option<&str> {
    API_KEY
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Whether the page is the EU cookie consent interstitial instead of the watch page.
pub(crate) fn needs_consent(html: &str) -> bool {
    html.contains(CONSENT_FORM_MARKER)
}

/// The value to echo back in the `CONSENT` cookie.
pub(crate) fn consent_value(html: &str) -> Option<&str> {
    CONSENT_VALUE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|v| !v.is_empty())
}

pub(crate) fn is_recaptcha(html: &str) -> bool {
    html.contains(RECAPTCHA_MARKER)
}
