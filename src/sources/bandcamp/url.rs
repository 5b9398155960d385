use std::sync::LazyLock;

use regex::Regex;

use super::BandcampError;

const HOST_SUFFIX: &str = r"bandcamp\.com";
const SLUG: &str = r"[a-zA-Z0-9_-]+";

fn anchored(path: &str) -> Regex {
    let pattern = format!(
        r"^((?i:https?)://(?:[^./?#]+\.)?{HOST_SUFFIX})/{path}/?(?:\?.*)?$"
    );
    Regex::new(&pattern).expect("static url pattern")
}

static TRACK_URL: LazyLock<Regex> = LazyLock::new(|| anchored(&format!("track/({SLUG})")));
static ALBUM_URL: LazyLock<Regex> = LazyLock::new(|| anchored(&format!("album/({SLUG})")));
static BASE_URL: LazyLock<Regex> =
    LazyLock::new(|| anchored(&format!("(track|album)/({SLUG})")));

/// What an identifier points at on the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BandcampUrl {
    Track { root_url: String, slug: String },
    Album { root_url: String, slug: String },
    Unrecognized,
}

impl BandcampUrl {
    /// Canonical page URL rebuilt from the root URL and slug.
    pub fn page_url(&self) -> Option<String> {
        match self {
            Self::Track { root_url, slug } => Some(format!("{}/track/{}", root_url, slug)),
            Self::Album { root_url, slug } => Some(format!("{}/album/{}", root_url, slug)),
            Self::Unrecognized => None,
        }
    }

    pub fn root_url(&self) -> Option<&str> {
        match self {
            Self::Track { root_url, .. } | Self::Album { root_url, .. } => Some(root_url),
            Self::Unrecognized => None,
        }
    }
}

/// Classifies an identifier. Anything that is not a track or album URL is
/// `Unrecognized`; an error only means the root URL could not be read from
/// a URL that did match, which the patterns rule out.
pub fn classify(identifier: &str) -> Result<BandcampUrl, BandcampError> {
    let (is_track, slug) = if let Some(caps) = TRACK_URL.captures(identifier) {
        (true, caps[2].to_string())
    } else if let Some(caps) = ALBUM_URL.captures(identifier) {
        (false, caps[2].to_string())
    } else {
        return Ok(BandcampUrl::Unrecognized);
    };

    let root_url = read_root_url(identifier)?;

    Ok(if is_track {
        BandcampUrl::Track { root_url, slug }
    } else {
        BandcampUrl::Album { root_url, slug }
    })
}

/// `scheme://[subdomain.]bandcamp.com` of a track or album URL.
pub fn read_root_url(url: &str) -> Result<String, BandcampError> {
    BASE_URL
        .captures(url)
        .map(|caps| caps[1].to_string())
        .ok_or(BandcampError::BandInfoNotFound)
}
