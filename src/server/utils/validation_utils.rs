use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::platform::{self, Platform};

pub const MAX_URL_LENGTH: usize = 2048;

/// literal patterns for loopback and rfc1918 hostnames, checked as strings
/// and never resolved. a public name pointing at a private address slips
/// through, that gap is documented and accepted
static PRIVATE_HOST_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^127\.",
        r"^10\.",
        r"^172\.(1[6-9]|2[0-9]|3[0-1])\.",
        r"^192\.168\.",
        r"(?i)^localhost$",
        r"^0\.0\.0\.0$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Static host pattern should compile"))
    .collect()
});

static SCRIPTED_AGENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"(?i)curl", r"(?i)wget", r"(?i)python-requests"]
        .iter()
        .map(|p| Regex::new(p).expect("Static agent pattern should compile"))
        .collect()
});

/// classification outcome, rejections never raise so the pipeline can map
/// them to one user facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlValidation {
    Valid,
    TooLong,
    BadScheme,
    PrivateHost,
    NoMatch,
}

impl UrlValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, UrlValidation::Valid)
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            UrlValidation::Valid => None,
            UrlValidation::TooLong => Some("URL too long. Maximum 2048 characters"),
            UrlValidation::BadScheme => Some("Only http and https URLs are supported"),
            UrlValidation::PrivateHost => Some("URL points to a private or local address"),
            UrlValidation::NoMatch => Some("URL does not match a supported link format"),
        }
    }
}

/// trim and strip all whitespace, urls never legitimately contain any and
/// pasted ones pick it up constantly
pub fn sanitize_url(raw: &str) -> String {
    raw.split_whitespace().collect()
}

pub fn is_private_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    PRIVATE_HOST_PATTERNS.iter().any(|p| p.is_match(&host))
}

/// match a candidate url against one platform's accepted patterns, with the
/// length, scheme and private-host checks in front
pub fn classify(raw_url: &str, platform: Platform) -> UrlValidation {
    if raw_url.len() > MAX_URL_LENGTH {
        return UrlValidation::TooLong;
    }

    let parsed = match Url::parse(raw_url) {
        Ok(parsed) => parsed,
        Err(_) => return UrlValidation::NoMatch,
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return UrlValidation::BadScheme;
    }

    match parsed.host_str() {
        Some(host) if is_private_host(host) => return UrlValidation::PrivateHost,
        Some(_) => {}
        None => return UrlValidation::NoMatch,
    }

    let rule = platform::rule_for(platform);
    if rule.url_patterns.iter().any(|p| p.is_match(raw_url)) {
        UrlValidation::Valid
    } else {
        UrlValidation::NoMatch
    }
}

/// empty agents and the obvious script clients get turned away, the check is
/// only enforced in production so local curl testing still works
pub fn is_browser_user_agent(user_agent: Option<&str>) -> bool {
    let ua = match user_agent {
        Some(value) if !value.trim().is_empty() => value,
        _ => return false,
    };

    !SCRIPTED_AGENT_PATTERNS.iter().any(|p| p.is_match(ua))
}
