//! Format resolution: pick exactly one format from a category

use crate::core::category::CategoryView;
use crate::core::record::{AudioFormat, VideoFormat};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Resolution failures, each scoped to one request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("No format in {category} matches {selector}")]
    NoMatch { category: String, selector: String },

    #[error("Format {format_id} in {category} matched {selector} but has no URL")]
    NoUsableUrl {
        category: String,
        selector: String,
        format_id: String,
    },

    #[error("No usable format in {category}")]
    EmptyCategory { category: String },
}

/// Fields the resolver reads from any format
pub trait Selectable {
    fn format_id(&self) -> &str;
    fn tbr(&self) -> Option<f64>;
    fn url(&self) -> Option<&str>;

    fn has_url(&self) -> bool {
        self.url().map(|u| !u.is_empty()).unwrap_or(false)
    }
}

impl Selectable for AudioFormat {
    fn format_id(&self) -> &str {
        &self.format_id
    }

    fn tbr(&self) -> Option<f64> {
        self.tbr
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

impl Selectable for VideoFormat {
    fn format_id(&self) -> &str {
        &self.format_id
    }

    fn tbr(&self) -> Option<f64> {
        self.tbr
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// How to pick an audio format
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AudioSelector {
    /// Precomputed Highest, else the first format with a URL
    #[default]
    Default,
    /// Exact format ID
    FormatId(String),
    /// Nearest total bitrate in kbps
    Bitrate(f64),
}

/// How to pick a video format
#[derive(Debug, Clone, Default, PartialEq)]
pub enum VideoSelector {
    /// Precomputed Highest, else the first format with a URL
    #[default]
    Default,
    /// Exact format ID
    FormatId(String),
    /// Nearest total bitrate in kbps
    Bitrate(f64),
    /// Exact resolution string, e.g. "1920x1080"
    Resolution(String),
    /// Exact frame rate
    Fps(f64),
}

impl fmt::Display for AudioSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioSelector::Default => write!(f, "default"),
            AudioSelector::FormatId(id) => write!(f, "format_id={}", id),
            AudioSelector::Bitrate(kbps) => write!(f, "bitrate={}", kbps),
        }
    }
}

impl fmt::Display for VideoSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoSelector::Default => write!(f, "default"),
            VideoSelector::FormatId(id) => write!(f, "format_id={}", id),
            VideoSelector::Bitrate(kbps) => write!(f, "bitrate={}", kbps),
            VideoSelector::Resolution(res) => write!(f, "resolution={}", res),
            VideoSelector::Fps(fps) => write!(f, "fps={}", fps),
        }
    }
}

/// Resolve one audio format from `view`
pub fn resolve_audio<'a>(
    view: &CategoryView<'a, AudioFormat>,
    selector: &AudioSelector,
) -> Result<&'a AudioFormat, ResolveError> {
    let found = match selector {
        AudioSelector::Default => return resolve_default(view),
        AudioSelector::FormatId(id) => by_format_id(view, id),
        AudioSelector::Bitrate(target) => nearest_bitrate(view, *target),
    };
    finish(view, found, selector)
}

/// Resolve one video format from `view`
pub fn resolve_video<'a>(
    view: &CategoryView<'a, VideoFormat>,
    selector: &VideoSelector,
) -> Result<&'a VideoFormat, ResolveError> {
    let found = match selector {
        VideoSelector::Default => return resolve_default(view),
        VideoSelector::FormatId(id) => by_format_id(view, id),
        VideoSelector::Bitrate(target) => nearest_bitrate(view, *target),
        VideoSelector::Resolution(resolution) => view
            .combined()
            .iter()
            .copied()
            .find(|f| f.resolution.as_deref() == Some(resolution.as_str())),
        VideoSelector::Fps(fps) => view.combined().iter().copied().find(|f| f.fps == Some(*fps)),
    };
    finish(view, found, selector)
}

fn by_format_id<'a, T: Selectable>(view: &CategoryView<'a, T>, id: &str) -> Option<&'a T> {
    view.combined().iter().copied().find(|f| f.format_id() == id)
}

/// Smallest `|tbr - target|`; formats without a finite `tbr` are skipped, ties keep the first
fn nearest_bitrate<'a, T: Selectable>(view: &CategoryView<'a, T>, target: f64) -> Option<&'a T> {
    if !target.is_finite() {
        return None;
    }
    let mut best: Option<(&'a T, f64)> = None;
    for format in view.combined().iter().copied() {
        let Some(tbr) = format.tbr().filter(|t| t.is_finite()) else {
            continue;
        };
        let distance = (tbr - target).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((format, distance)),
        }
    }
    best.map(|(format, _)| format)
}

fn resolve_default<'a, T: Selectable>(view: &CategoryView<'a, T>) -> Result<&'a T, ResolveError> {
    let found = view
        .highest()
        .or_else(|| view.combined().iter().copied().find(|f| f.has_url()));
    match found {
        Some(format) => finish(view, Some(format), &"default"),
        None => Err(ResolveError::EmptyCategory {
            category: view.name().to_string(),
        }),
    }
}

fn finish<'a, T: Selectable>(
    view: &CategoryView<'a, T>,
    found: Option<&'a T>,
    selector: &dyn fmt::Display,
) -> Result<&'a T, ResolveError> {
    let format = found.ok_or_else(|| ResolveError::NoMatch {
        category: view.name().to_string(),
        selector: selector.to_string(),
    })?;

    if !format.has_url() {
        return Err(ResolveError::NoUsableUrl {
            category: view.name().to_string(),
            selector: selector.to_string(),
            format_id: format.format_id().to_string(),
        });
    }

    debug!("Resolved {} in {} to format {}", selector, view.name(), format.format_id());
    Ok(format)
}
