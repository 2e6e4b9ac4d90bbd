use once_cell::sync::Lazy;
use regex::Regex;

/// the browser we pretend to be for every outbound call, some of the cdns
/// check nothing else and some check everything else
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// referer used when a media host doesn't match any known fetch profile
pub const DEFAULT_REFERER: &str = "https://www.google.com/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    TikTok,
    Instagram,
    Facebook,
    YouTube,
    Terabox,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::TikTok,
        Platform::Instagram,
        Platform::Facebook,
        Platform::YouTube,
        Platform::Terabox,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::TikTok => "tiktok",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::YouTube => "youtube",
            Platform::Terabox => "terabox",
        }
    }
}

/// everything the request pipeline needs to know about one platform, kept as
/// data so adding a platform is a table entry and not new control flow
pub struct PlatformRule {
    pub platform: Platform,
    /// accepted page url shapes, tried in order
    pub url_patterns: Vec<Regex>,
    /// cdn host suffixes the download proxy may fetch from
    pub media_hosts: &'static [&'static str],
    /// host suffixes the thumbnail proxy may fetch from
    pub thumbnail_hosts: &'static [&'static str],
}

static RULES: Lazy<Vec<PlatformRule>> = Lazy::new(|| {
    let compile = |patterns: &[&str]| -> Vec<Regex> {
        patterns
            .iter()
            .map(|p| Regex::new(p).expect("Static url pattern should compile"))
            .collect()
    };

    vec![
        PlatformRule {
            platform: Platform::TikTok,
            // full urls need /video/ in the path, the vm/vt short links take anything
            url_patterns: compile(&[
                r"(?i)^https?://(www\.|m\.)?tiktok\.com/(.*/)?video/.+",
                r"(?i)^https?://(vm|vt)\.tiktok\.com/.+",
            ]),
            media_hosts: &[
                "tikwm.com",
                "tiktokcdn.com",
                "tiktokcdn-us.com",
                "tiktokcdn-eu.com",
                "tikcdn.io",
            ],
            thumbnail_hosts: &["tiktokcdn.com", "tiktokcdn-us.com", "tiktokcdn-eu.com", "tikwm.com"],
        },
        PlatformRule {
            platform: Platform::Instagram,
            url_patterns: compile(&[
                r"(?i)^https?://(www\.)?instagram\.com/(p|reel|reels|tv)/[\w-]+",
                r"(?i)^https?://(www\.)?instagram\.com/[\w.]+/(p|reel)/[\w-]+",
            ]),
            media_hosts: &["cdninstagram.com", "fbcdn.net", "instagram.com"],
            thumbnail_hosts: &["cdninstagram.com", "fbcdn.net", "instagram.com"],
        },
        PlatformRule {
            platform: Platform::Facebook,
            url_patterns: compile(&[
                r"(?i)^https?://(www\.|m\.|web\.)?facebook\.com/.+",
                r"(?i)^https?://(www\.)?fb\.watch/.+",
                r"(?i)^https?://(www\.)?fb\.com/.+",
            ]),
            media_hosts: &["fbcdn.net", "facebook.com"],
            thumbnail_hosts: &["fbcdn.net", "facebook.com"],
        },
        PlatformRule {
            platform: Platform::YouTube,
            url_patterns: compile(&[
                r"(?i)^https?://(www\.)?youtube\.com/watch\?v=[\w-]+",
                r"(?i)^https?://(www\.)?youtube\.com/shorts/[\w-]+",
                r"(?i)^https?://youtu\.be/[\w-]+",
                r"(?i)^https?://(www\.)?youtube\.com/embed/[\w-]+",
            ]),
            media_hosts: &[
                "ytimg.com",
                "img.youtube.com",
                "gimita.id",
                "savenow.to",
                "yt5s.io",
                "y2mate.com",
                "ssyoutube.com",
                "savefrom.net",
                "youconvert.org",
            ],
            thumbnail_hosts: &["ytimg.com", "img.youtube.com"],
        },
        PlatformRule {
            platform: Platform::Terabox,
            url_patterns: compile(&[
                r"(?i)^https?://(www\.)?terabox\.(app|com)/.+",
                r"(?i)^https?://(www\.)?1024tera\.com/.+",
                r"(?i)^https?://(www\.)?1024terabox\.com/.+",
                r"(?i)^https?://(www\.)?teraboxapp\.com/.+",
            ]),
            media_hosts: &[
                "terabox.com",
                "terabox.app",
                "1024tera.com",
                "1024terabox.com",
                "teraboxapp.com",
                "terasharelink.com",
            ],
            thumbnail_hosts: &[
                "terabox.com",
                "terabox.app",
                "1024tera.com",
                "1024terabox.com",
                "teraboxapp.com",
                "terasharelink.com",
            ],
        },
    ]
});

pub fn rule_for(platform: Platform) -> &'static PlatformRule {
    RULES
        .iter()
        .find(|r| r.platform == platform)
        .expect("Every platform should have a rule entry")
}

/// exact host or a subdomain of one of the suffixes
pub fn host_matches(host: &str, suffixes: &[&str]) -> bool {
    let host = host.to_ascii_lowercase();
    suffixes
        .iter()
        .any(|suffix| host == *suffix || host.ends_with(&format!(".{}", suffix)))
}

/// union of every platform's media hosts, used by the generic download proxy
pub fn media_host_allowed(host: &str) -> bool {
    RULES.iter().any(|r| host_matches(host, r.media_hosts))
}

pub fn thumbnail_host_allowed(platform: Platform, host: &str) -> bool {
    host_matches(host, rule_for(platform).thumbnail_hosts)
}

/// outbound header set for a media host, matched on hostname fragments since
/// the cdns tend to live on region-sharded subdomains
pub struct FetchProfile {
    pub host_fragments: &'static [&'static str],
    pub referer: &'static str,
    pub origin: Option<&'static str>,
}

pub static FETCH_PROFILES: &[FetchProfile] = &[
    FetchProfile {
        host_fragments: &["youconvert", "ytmp3", "y2mate"],
        referer: "https://youconvert.org/",
        origin: Some("https://youconvert.org"),
    },
    FetchProfile {
        host_fragments: &["tiktok", "tikwm", "tikcdn"],
        referer: "https://www.tiktok.com/",
        origin: None,
    },
    FetchProfile {
        host_fragments: &["instagram", "igram", "cdninstagram"],
        referer: "https://www.instagram.com/",
        origin: Some("https://www.instagram.com"),
    },
    FetchProfile {
        host_fragments: &["facebook", "fbcdn"],
        referer: "https://www.facebook.com/",
        origin: None,
    },
    FetchProfile {
        host_fragments: &["terabox", "1024tera", "terasharelink"],
        referer: "https://www.terabox.com/",
        origin: Some("https://www.terabox.com"),
    },
    FetchProfile {
        host_fragments: &["ytimg", "youtube"],
        referer: "https://www.youtube.com/",
        origin: None,
    },
];

pub fn profile_for_host(host: &str) -> Option<&'static FetchProfile> {
    let host = host.to_ascii_lowercase();
    FETCH_PROFILES
        .iter()
        .find(|p| p.host_fragments.iter().any(|frag| host.contains(frag)))
}
