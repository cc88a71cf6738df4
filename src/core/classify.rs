//! Format classification: partition, clean and rank extraction output

use crate::core::category::{AudioOnly, Category, EngineOutput, VideoOnly};
use crate::core::record::{AudioFormat, FormatRecord, RawMetadata, RawThumbnail, Thumbnail, VideoFormat};
use tracing::debug;

/// Which audio tracks take part in the Highest/Lowest computation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AudioExtremaPolicy {
    /// Only tracks whose note says "high" or "low"
    #[default]
    LabelFiltered,
    /// Every track in the category
    AllRecords,
}

/// Classifier configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyOptions {
    pub audio_policy: AudioExtremaPolicy,
}

impl ClassifyOptions {
    pub fn with_audio_policy(mut self, policy: AudioExtremaPolicy) -> Self {
        self.audio_policy = policy;
        self
    }
}

/// Partition raw formats into categories and compute per-category extrema.
///
/// Never fails: empty input yields empty categories with `None` extrema.
pub fn classify(
    formats: &[FormatRecord],
    thumbnails: &[RawThumbnail],
    metadata: &RawMetadata,
    options: &ClassifyOptions,
) -> EngineOutput {
    let mut standard = Vec::new();
    let mut drc = Vec::new();
    let mut sdr = Vec::new();
    let mut hdr = Vec::new();
    let mut storyboards = 0usize;
    let mut unranged = 0usize;

    for record in formats {
        if record.is_storyboard() {
            storyboards += 1;
            continue;
        }

        if record.is_audio_only() {
            let audio = record.to_audio();
            if audio.is_drc() {
                drc.push(audio);
            } else {
                standard.push(audio);
            }
        } else {
            let video = record.to_video();
            if video.is_sdr() {
                sdr.push(video);
            } else if video.is_hdr() {
                hdr.push(video);
            } else {
                unranged += 1;
            }
        }
    }

    debug!(
        "Classified {} formats: {} standard audio, {} DRC audio, {} SDR video, {} HDR video, {} storyboards skipped, {} video without a known dynamic range",
        formats.len(),
        standard.len(),
        drc.len(),
        sdr.len(),
        hdr.len(),
        storyboards,
        unranged
    );

    EngineOutput {
        metadata: metadata.to_metadata(),
        audio_only: AudioOnly {
            standard: audio_category(standard, options.audio_policy),
            drc: audio_category(drc, options.audio_policy),
        },
        video_only: VideoOnly {
            sdr: video_category(sdr),
            hdr: video_category(hdr),
        },
        thumbnails: thumbnail_category(thumbnails),
    }
}

fn audio_category(formats: Vec<AudioFormat>, policy: AudioExtremaPolicy) -> Category<AudioFormat> {
    let (highest, lowest) = audio_extrema(formats.iter(), policy);
    Category::from_parts(formats, highest, lowest)
}

fn video_category(formats: Vec<VideoFormat>) -> Category<VideoFormat> {
    let (highest, lowest) = video_extrema(formats.iter());
    Category::from_parts(formats, highest, lowest)
}

fn thumbnail_category(thumbnails: &[RawThumbnail]) -> Category<Thumbnail> {
    let cleaned: Vec<Thumbnail> = thumbnails
        .iter()
        .filter(|t| t.resolution.is_some())
        .map(RawThumbnail::to_thumbnail)
        .collect();

    let highest = pick(cleaned.iter().map(Thumbnail::area).enumerate(), |c, i| c > i);
    let lowest = pick(cleaned.iter().map(Thumbnail::area).enumerate(), |c, i| c < i);
    Category::from_parts(cleaned, highest, lowest)
}

/// Positions of the highest and lowest audio track by numeric format ID.
///
/// IDs are read like `parseInt`: "251-drc" ranks as 251. A track whose ID has
/// no leading number never displaces one that does.
pub fn audio_extrema<'a, I>(formats: I, policy: AudioExtremaPolicy) -> (Option<usize>, Option<usize>)
where
    I: IntoIterator<Item = &'a AudioFormat>,
{
    let keyed: Vec<(usize, Option<i64>)> = formats
        .into_iter()
        .enumerate()
        .filter(|(_, f)| policy == AudioExtremaPolicy::AllRecords || f.has_quality_label())
        .map(|(idx, f)| (idx, parse_leading_int(&f.format_id)))
        .collect();

    let highest = pick(keyed.iter().copied(), |c, i| prefer(*c, *i, |c, i| c > i).unwrap_or(false));
    let lowest = pick(keyed.iter().copied(), |c, i| prefer(*c, *i, |c, i| c < i).unwrap_or(false));
    (highest, lowest)
}

/// Positions of the highest and lowest video format.
///
/// `vbr` decides when both sides have one; a known `vbr` beats a missing one;
/// with no `vbr` on either side `height` decides under the same rule.
pub fn video_extrema<'a, I>(formats: I) -> (Option<usize>, Option<usize>)
where
    I: IntoIterator<Item = &'a VideoFormat>,
{
    let formats: Vec<&VideoFormat> = formats.into_iter().collect();
    let highest = pick(formats.iter().copied().enumerate(), |c, i| {
        video_replaces(c, i, |c, i| c > i)
    });
    let lowest = pick(formats.iter().copied().enumerate(), |c, i| {
        video_replaces(c, i, |c, i| c < i)
    });
    (highest, lowest)
}

fn video_replaces(candidate: &VideoFormat, incumbent: &VideoFormat, wins: fn(f64, f64) -> bool) -> bool {
    prefer(candidate.vbr, incumbent.vbr, wins)
        .or_else(|| {
            prefer(
                candidate.height.map(f64::from),
                incumbent.height.map(f64::from),
                wins,
            )
        })
        .unwrap_or(false)
}

/// `Some(true)` if the candidate replaces the incumbent, `None` if neither has a value
fn prefer<T: Copy>(candidate: Option<T>, incumbent: Option<T>, wins: fn(T, T) -> bool) -> Option<bool> {
    match (candidate, incumbent) {
        (Some(c), Some(i)) => Some(wins(c, i)),
        (Some(_), None) => Some(true),
        (None, Some(_)) => Some(false),
        (None, None) => None,
    }
}

/// Linear scan seeded with the first item; ties keep the earlier item
fn pick<T>(items: impl IntoIterator<Item = (usize, T)>, replaces: impl Fn(&T, &T) -> bool) -> Option<usize> {
    let mut best: Option<(usize, T)> = None;
    for (idx, item) in items {
        let take = match &best {
            None => true,
            Some((_, current)) => replaces(&item, current),
        };
        if take {
            best = Some((idx, item));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Leading base-10 integer of `s`, or `None` where `parseInt` would give NaN
pub(crate) fn parse_leading_int(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}
