/// Logging setup and PII redaction
///
/// Guest email addresses appear in subscriptions, contact messages and
/// notifications; they are redacted before being written to logs.
use regex::Regex;
use std::sync::LazyLock;
use tracing_subscriber::EnvFilter;

// Email redaction regex
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").unwrap());

/// Initializes the JSON tracing subscriber used by every Lambda binary
///
/// Honors `RUST_LOG`; defaults to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .init();
}

/// Redacts email addresses from text, preserving domain for debugging
///
/// # Examples
/// ```
/// use vows_core::utils::logging::redact_email;
///
/// assert_eq!(redact_email("guest@example.com"), "***@example.com");
/// assert_eq!(redact_email("Unsubscribed test@acme.com from p1"), "Unsubscribed ***@acme.com from p1");
/// ```
pub fn redact_email(text: &str) -> String {
    EMAIL_PATTERN
        .replace_all(text, |caps: &regex::Captures| {
            let email = &caps[0];
            if let Some(at_pos) = email.find('@') {
                format!("***{}", &email[at_pos..])
            } else {
                "***@***".to_string()
            }
        })
        .to_string()
}

/// Extracts domain from email address for safe logging
pub fn email_domain(email: &str) -> &str {
    email.split('@').nth(1).unwrap_or("unknown")
}
