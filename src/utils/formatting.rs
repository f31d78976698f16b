use regex::Regex;
use std::sync::OnceLock;

const MAX_ERROR_LENGTH: usize = 2_000;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?m)^[ \t]*```[A-Za-z0-9_+-]*[ \t]*\r?$\n?").expect("fence pattern is valid"))
}

/// Remove markdown code fence lines (```` ```html ````, ```` ``` ````) and trim.
pub fn strip_code_fences(text: &str) -> String {
    fence_regex().replace_all(text, "").trim().to_string()
}

/// Cap an upstream error body so it stays readable in logs and responses.
pub fn truncate_error(error: &str) -> String {
    if error.len() <= MAX_ERROR_LENGTH {
        return error.to_string();
    }
    let mut end = MAX_ERROR_LENGTH;
    while !error.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &error[..end])
}

pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else if ms < 3_600_000 {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    } else {
        let hours = ms / 3_600_000;
        let mins = (ms % 3_600_000) / 60_000;
        format!("{}h {}m", hours, mins)
    }
}
