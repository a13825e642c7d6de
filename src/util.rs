use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Seconds since the Unix epoch.
pub(crate) fn now_seconds() -> u64 {
    now_ms() / 1000
}

/// Whole hours elapsed since `created_utc_seconds`, never negative.
pub(crate) fn hours_ago(created_utc_seconds: u64, now_seconds: u64) -> u64 {
    now_seconds.saturating_sub(created_utc_seconds) / 3600
}

/// The longest prefix of `s` holding at most `max_chars` characters.
/// Cuts on a character boundary, never mid-codepoint.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Like [`truncate_chars`], but appends `...` when anything was cut.
pub(crate) fn ellipsize(s: &str, max_chars: usize) -> String {
    let cut = truncate_chars(s, max_chars);
    if cut.len() == s.len() {
        s.to_string()
    } else {
        format!("{cut}...")
    }
}
