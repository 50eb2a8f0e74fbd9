//! Redaction helpers for credential material in logs and `Debug` output.

/// Number of leading characters kept visible.
const VISIBLE_PREFIX: usize = 4;

/// Redact a secret for display, keeping at most a short prefix.
///
/// Short secrets are fully hidden so the prefix never reveals most of the
/// key.
pub fn redact_secret(secret: &str) -> String {
    let len = secret.chars().count();
    if len == 0 {
        return String::new();
    }
    if len <= VISIBLE_PREFIX * 3 {
        return "(redacted)".to_string();
    }
    let prefix: String = secret.chars().take(VISIBLE_PREFIX).collect();
    format!("{}…(redacted)", prefix)
}

/// Replace every occurrence of `secret` in `text` with its redacted form.
pub fn scrub(text: &str, secret: Option<&str>) -> String {
    match secret {
        Some(secret) if !secret.is_empty() => text.replace(secret, &redact_secret(secret)),
        _ => text.to_string(),
    }
}
