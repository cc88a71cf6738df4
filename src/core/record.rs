//! Format, thumbnail and metadata records

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One format entry exactly as the extraction engine reports it
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormatRecord {
    /// Format ID (e.g. "140", "251-drc", "sb0")
    pub format_id: String,
    /// Free-text note ("medium", "1080p60 HDR", "storyboard")
    pub format_note: Option<String>,
    /// "1920x1080" or "audio only"
    pub resolution: Option<String>,
    pub aspect_ratio: Option<f64>,
    /// Video codec, "none" when absent
    pub vcodec: Option<String>,
    /// Audio codec, "none" when absent
    pub acodec: Option<String>,
    pub protocol: Option<String>,
    pub ext: Option<String>,
    pub video_ext: Option<String>,
    pub audio_ext: Option<String>,
    pub container: Option<String>,
    /// Total bitrate in kbps
    pub tbr: Option<f64>,
    /// Video bitrate in kbps
    pub vbr: Option<f64>,
    /// Audio bitrate in kbps
    pub abr: Option<f64>,
    pub asr: Option<u32>,
    pub audio_channels: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
    /// "SDR", "HDR10", "HLG", ...
    pub dynamic_range: Option<String>,
    pub quality: Option<f64>,
    pub language: Option<String>,
    pub language_preference: Option<i64>,
    pub filesize: Option<u64>,
    pub filesize_approx: Option<u64>,
    pub url: Option<String>,
    pub manifest_url: Option<String>,
    pub http_headers: Option<BTreeMap<String, String>>,
    #[serde(deserialize_with = "lenient_flag")]
    pub has_drm: Option<bool>,
    pub preference: Option<i64>,
    pub source_preference: Option<i64>,
    pub format: Option<String>,
    pub format_index: Option<Value>,
    #[serde(rename = "__needs_testing")]
    pub needs_testing: Option<bool>,
    #[serde(rename = "__working")]
    pub working: Option<bool>,
    pub rows: Option<u32>,
    pub columns: Option<u32>,
    pub fragments: Option<Vec<Value>>,
    pub downloader_options: Option<Value>,
    /// Keys this struct does not model
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

impl FormatRecord {
    /// Storyboards are sprite sheets, never media streams
    pub fn is_storyboard(&self) -> bool {
        contains_ignore_case(self.format_note.as_deref(), "storyboard")
    }

    pub fn is_audio_only(&self) -> bool {
        contains_ignore_case(self.resolution.as_deref(), "audio")
    }

    pub fn is_video_only(&self) -> bool {
        !self.is_audio_only()
    }

    /// Keep only the fields an audio-only format carries
    pub fn to_audio(&self) -> AudioFormat {
        AudioFormat {
            format_id: self.format_id.clone(),
            format_note: self.format_note.clone(),
            acodec: self.acodec.clone(),
            protocol: self.protocol.clone(),
            audio_ext: self.audio_ext.clone(),
            container: self.container.clone(),
            tbr: self.tbr,
            abr: self.abr,
            asr: self.asr,
            audio_channels: self.audio_channels,
            width: self.width,
            height: self.height,
            fps: self.fps,
            dynamic_range: self.dynamic_range.clone(),
            language: self.language.clone(),
            language_preference: self.language_preference,
            filesize: self.filesize,
            filesize_approx: self.filesize_approx,
            url: self.url.clone(),
            manifest_url: self.manifest_url.clone(),
            has_drm: self.has_drm,
        }
    }

    /// Keep only the fields a video-only format carries
    pub fn to_video(&self) -> VideoFormat {
        VideoFormat {
            format_id: self.format_id.clone(),
            format_note: self.format_note.clone(),
            resolution: self.resolution.clone(),
            aspect_ratio: self.aspect_ratio,
            vcodec: self.vcodec.clone(),
            protocol: self.protocol.clone(),
            ext: self.ext.clone(),
            video_ext: self.video_ext.clone(),
            container: self.container.clone(),
            tbr: self.tbr,
            vbr: self.vbr,
            asr: self.asr,
            audio_channels: self.audio_channels,
            width: self.width,
            height: self.height,
            fps: self.fps,
            dynamic_range: self.dynamic_range.clone(),
            quality: self.quality,
            language: self.language.clone(),
            language_preference: self.language_preference,
            filesize: self.filesize,
            filesize_approx: self.filesize_approx,
            url: self.url.clone(),
            manifest_url: self.manifest_url.clone(),
            has_drm: self.has_drm,
        }
    }
}

/// Cleaned audio-only format
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioFormat {
    pub format_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acodec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_ext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tbr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asr: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_preference: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesize: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesize_approx: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_drm: Option<bool>,
}

impl AudioFormat {
    /// Dynamic Range Compressed tracks are flagged in the note
    pub fn is_drc(&self) -> bool {
        contains_ignore_case(self.format_note.as_deref(), "drc")
    }

    /// Only tracks labelled "high" or "low" take part in extrema
    pub fn has_quality_label(&self) -> bool {
        let note = self.format_note.as_deref();
        contains_ignore_case(note, "high") || contains_ignore_case(note, "low")
    }

    pub fn matches_language(&self, language: &str) -> bool {
        self.language
            .as_deref()
            .map(|l| l.eq_ignore_ascii_case(language))
            .unwrap_or(false)
    }
}

/// Cleaned video-only format
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoFormat {
    pub format_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcodec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_ext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tbr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vbr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asr: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_preference: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesize: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesize_approx: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_drm: Option<bool>,
}

impl VideoFormat {
    /// Exact, case-sensitive match on "SDR"
    pub fn is_sdr(&self) -> bool {
        self.dynamic_range.as_deref() == Some("SDR")
    }

    pub fn is_hdr(&self) -> bool {
        contains_ignore_case(self.dynamic_range.as_deref(), "hdr")
    }
}

/// Thumbnail entry as reported by the extraction engine
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawThumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resolution: Option<String>,
    pub preference: Option<i64>,
    pub id: Option<String>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

impl RawThumbnail {
    /// Drops `preference` and `id`
    pub fn to_thumbnail(&self) -> Thumbnail {
        Thumbnail {
            url: self.url.clone(),
            width: self.width,
            height: self.height,
            resolution: self.resolution.clone(),
        }
    }
}

/// Cleaned thumbnail
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

impl Thumbnail {
    /// Pixel area, missing dimensions count as zero
    pub fn area(&self) -> u64 {
        u64::from(self.width.unwrap_or(0)) * u64::from(self.height.unwrap_or(0))
    }
}

/// Top-level video metadata keys of the extraction document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawMetadata {
    pub id: Option<String>,
    pub title: Option<String>,
    pub fulltitle: Option<String>,
    pub description: Option<String>,
    pub channel: Option<String>,
    pub channel_id: Option<String>,
    pub channel_url: Option<String>,
    pub channel_follower_count: Option<u64>,
    pub channel_is_verified: Option<bool>,
    pub uploader: Option<String>,
    pub uploader_id: Option<String>,
    pub uploader_url: Option<String>,
    /// YYYYMMDD
    pub upload_date: Option<String>,
    pub timestamp: Option<i64>,
    pub duration: Option<f64>,
    pub duration_string: Option<String>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub age_limit: Option<u32>,
    pub live_status: Option<String>,
    pub is_live: Option<bool>,
    pub was_live: Option<bool>,
    pub availability: Option<String>,
    pub playable_in_embed: Option<bool>,
    pub webpage_url: Option<String>,
    pub original_url: Option<String>,
    pub thumbnail: Option<String>,
    pub language: Option<String>,
    pub tags: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
}

impl RawMetadata {
    /// Copy the allow-listed scalar fields
    pub fn to_metadata(&self) -> MetaData {
        MetaData {
            id: self.id.clone(),
            title: self.title.clone(),
            fulltitle: self.fulltitle.clone(),
            description: self.description.clone(),
            channel: self.channel.clone(),
            channel_id: self.channel_id.clone(),
            channel_url: self.channel_url.clone(),
            channel_follower_count: self.channel_follower_count,
            channel_is_verified: self.channel_is_verified,
            uploader: self.uploader.clone(),
            uploader_id: self.uploader_id.clone(),
            uploader_url: self.uploader_url.clone(),
            upload_date: self.upload_date.clone(),
            timestamp: self.timestamp,
            duration: self.duration,
            duration_string: self.duration_string.clone(),
            view_count: self.view_count,
            like_count: self.like_count,
            comment_count: self.comment_count,
            age_limit: self.age_limit,
            live_status: self.live_status.clone(),
            is_live: self.is_live,
            was_live: self.was_live,
            availability: self.availability.clone(),
            playable_in_embed: self.playable_in_embed,
            webpage_url: self.webpage_url.clone(),
            original_url: self.original_url.clone(),
            thumbnail: self.thumbnail.clone(),
            language: self.language.clone(),
        }
    }
}

/// Flat video/channel metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaData {
    pub id: Option<String>,
    pub title: Option<String>,
    pub fulltitle: Option<String>,
    pub description: Option<String>,
    pub channel: Option<String>,
    pub channel_id: Option<String>,
    pub channel_url: Option<String>,
    pub channel_follower_count: Option<u64>,
    pub channel_is_verified: Option<bool>,
    pub uploader: Option<String>,
    pub uploader_id: Option<String>,
    pub uploader_url: Option<String>,
    pub upload_date: Option<String>,
    pub timestamp: Option<i64>,
    pub duration: Option<f64>,
    pub duration_string: Option<String>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub age_limit: Option<u32>,
    pub live_status: Option<String>,
    pub is_live: Option<bool>,
    pub was_live: Option<bool>,
    pub availability: Option<String>,
    pub playable_in_embed: Option<bool>,
    pub webpage_url: Option<String>,
    pub original_url: Option<String>,
    pub thumbnail: Option<String>,
    pub language: Option<String>,
}

impl MetaData {
    /// No identifying field at all
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.title.is_none()
    }
}

/// Case-insensitive substring test; `None` never matches
pub(crate) fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(needle))
        .unwrap_or(false)
}

/// Accepts `true`/`false` and the engine's `"maybe"` (mapped to `None`)
fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Some(true),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    })
}
