use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_FILENAME_LENGTH: usize = 255;

static DISALLOWED_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9._-]").expect("Static filename pattern should compile"));

static REPEATED_DOTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\.+").expect("Static dot pattern should compile"));

/// client supplied filenames end up inside a Content-Disposition header, so
/// anything outside the safe set becomes an underscore, dot runs collapse to
/// a single dot and the result is capped at 255
pub fn sanitize_filename(name: &str) -> String {
    let replaced = DISALLOWED_FILENAME_CHARS.replace_all(name, "_");
    let collapsed = REPEATED_DOTS.replace_all(&replaced, ".");
    collapsed.chars().take(MAX_FILENAME_LENGTH).collect()
}

pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// upstream cdns mislabel constantly, so the extension wins when it's
/// something we recognize and the upstream label is only a fallback
pub fn infer_content_type(filename: &str, upstream_content_type: &str) -> String {
    if filename.ends_with(".mp3") || upstream_content_type.contains("audio") {
        "audio/mpeg".to_string()
    } else if filename.ends_with(".mp4") || upstream_content_type.contains("video") {
        "video/mp4".to_string()
    } else if !upstream_content_type.is_empty() {
        upstream_content_type.to_string()
    } else {
        "application/octet-stream".to_string()
    }
}
