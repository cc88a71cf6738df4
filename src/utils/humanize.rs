//! Human-readable presentation of video metadata

use crate::core::record::MetaData;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Source of "now" for relative dates
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Abbreviated count: 999, 1.2K, 3M, 1.5B
pub fn format_count(count: u64) -> String {
    const UNITS: &[(f64, &str)] = &[(1e3, "K"), (1e6, "M"), (1e9, "B")];

    if count < 1_000 {
        return count.to_string();
    }

    // Climb while rounding reaches 1000 so 999_999 reads 1M rather than 1000K
    let mut formatted = String::new();
    for (scale, suffix) in UNITS {
        let rounded = (count as f64 / scale * 10.0).round() / 10.0;
        let value = format!("{:.1}", rounded);
        formatted = format!("{}{}", value.strip_suffix(".0").unwrap_or(&value), suffix);
        if rounded < 1000.0 {
            break;
        }
    }
    formatted
}

/// Clock-style duration: 0:42, 3:05, 1:02:03
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Parse the engine's YYYYMMDD upload date
pub fn parse_upload_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y%m%d").ok()
}

/// "today", "1 day ago", "3 weeks ago", "2 years ago"
pub fn format_age(date: NaiveDate, now: DateTime<Utc>) -> String {
    let days = (now.date_naive() - date).num_days();
    if days < 0 {
        return "in the future".to_string();
    }
    if days == 0 {
        return "today".to_string();
    }

    let (value, unit) = if days < 7 {
        (days, "day")
    } else if days < 30 {
        (days / 7, "week")
    } else if days < 365 {
        ((days / 30).min(11), "month")
    } else {
        (days / 365, "year")
    };

    if value == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", value, unit)
    }
}

/// Display-ready view of [`MetaData`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaSummary {
    pub title: String,
    pub channel: String,
    pub duration: Option<String>,
    pub views: Option<String>,
    pub likes: Option<String>,
    pub comments: Option<String>,
    pub subscribers: Option<String>,
    pub uploaded: Option<String>,
    pub upload_age: Option<String>,
}

impl MetaSummary {
    pub fn new(metadata: &MetaData, clock: &dyn Clock) -> Self {
        let upload = metadata.upload_date.as_deref().and_then(parse_upload_date);

        Self {
            title: metadata
                .title
                .clone()
                .unwrap_or_else(|| "Untitled".to_string()),
            channel: metadata
                .channel
                .clone()
                .or_else(|| metadata.uploader.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            duration: metadata.duration.map(format_clock),
            views: metadata.view_count.map(format_count),
            likes: metadata.like_count.map(format_count),
            comments: metadata.comment_count.map(format_count),
            subscribers: metadata.channel_follower_count.map(format_count),
            uploaded: upload.map(|d| d.format("%d %b %Y").to_string()),
            upload_age: upload.map(|d| format_age(d, clock.now())),
        }
    }
}
