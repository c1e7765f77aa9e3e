use candela_core::CandelaError;
use serde_json::Value;

/// Message used when the backend or proxy answers with an HTML page.
pub const HTML_ERROR_MESSAGE: &str = "Server returned HTML error page";

/// Turn a non-success response body into a `CandelaError::Http`.
///
/// - JSON bodies contribute their `error` (or `message`) field, followed by
///   `details` when present.
/// - HTML pages collapse to [`HTML_ERROR_MESSAGE`].
/// - Anything else is passed through as trimmed text; an empty body becomes
///   `HTTP {status}`.
#[must_use]
pub fn error_from_body(status: u16, body: &str) -> CandelaError {
    let text = body.trim();
    let message = if text.starts_with('{') {
        serde_json::from_str::<Value>(text)
            .map_or_else(|_| text.to_string(), |v| json_message(status, &v))
    } else if looks_like_html(text) {
        HTML_ERROR_MESSAGE.to_string()
    } else if text.is_empty() {
        format!("HTTP {status}")
    } else {
        text.to_string()
    };
    CandelaError::http(status, message)
}

fn json_message(status: u16, body: &Value) -> String {
    let field = |name: &str| {
        body.get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };
    let headline = field("error")
        .or_else(|| field("message"))
        .map_or_else(|| format!("HTTP {status}"), str::to_string);
    match field("details") {
        Some(details) if details != headline => format!("{headline}: {details}"),
        _ => headline,
    }
}

fn looks_like_html(text: &str) -> bool {
    let head: String = text.chars().take(16).collect::<String>().to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

pub(crate) fn transport(e: &reqwest::Error) -> CandelaError {
    if e.is_timeout() {
        CandelaError::Transport(format!("request timed out: {e}"))
    } else {
        CandelaError::Transport(e.to_string())
    }
}
