//! Target validation: video URLs and bare video IDs

use crate::error::SiftError;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// A validated video handed to the extraction engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoTarget {
    /// 11-character video ID
    pub id: String,
}

impl VideoTarget {
    /// Parse a watch/short/shorts/embed/live URL or a bare video ID
    pub fn parse(input: &str) -> Result<Self, SiftError> {
        let input = input.trim();
        if is_video_id(input) {
            return Ok(Self {
                id: input.to_string(),
            });
        }
        let id = extract_video_id(input)?;
        if !is_video_id(&id) {
            return Err(SiftError::InvalidTarget(format!("Malformed video ID: {}", id)));
        }
        Ok(Self { id })
    }

    /// Canonical watch URL
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

fn video_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid video ID pattern"))
}

/// Check for a bare 11-character video ID
pub fn is_video_id(s: &str) -> bool {
    video_id_pattern().is_match(s)
}

/// Extract video ID from the supported URL forms
pub fn extract_video_id(url: &str) -> Result<String, SiftError> {
    let parsed = Url::parse(url)?;

    match parsed.host_str() {
        Some("youtu.be") => {
            let path = parsed.path().trim_start_matches('/');
            if path.is_empty() {
                return Err(SiftError::InvalidTarget("Missing video ID".to_string()));
            }
            Ok(path.to_string())
        }
        Some("youtube.com") | Some("www.youtube.com") | Some("m.youtube.com") | Some("music.youtube.com") => {
            let path = parsed.path();
            if path.starts_with("/watch") {
                parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.to_string())
                    .ok_or_else(|| SiftError::InvalidTarget("Missing v parameter".to_string()))
            } else if let Some(rest) = ["/shorts/", "/embed/", "/live/"]
                .iter()
                .find_map(|prefix| path.strip_prefix(prefix))
            {
                let video_id = rest.trim_end_matches('/');
                if video_id.is_empty() {
                    return Err(SiftError::InvalidTarget(format!("Missing video ID in {}", path)));
                }
                Ok(video_id.to_string())
            } else {
                Err(SiftError::InvalidTarget("Unsupported video URL format".to_string()))
            }
        }
        _ => Err(SiftError::InvalidTarget(
            "Not a supported video platform URL".to_string(),
        )),
    }
}
