//! Command line argument parsing

use crate::core::{
    AudioExtremaPolicy, AudioRequest, AudioSelector, ClassifyOptions, Filter, MuxTarget, SiftOptions,
    VideoRange, VideoRequest, VideoSelector,
};
use crate::engine::FieldPolicy;
use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// YouTube format sifter - classify formats and pick the streams to mux
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("audio_select").args(["audio_format_id", "audio_bitrate"])))]
#[command(group(ArgGroup::new("video_select").args(["video_format_id", "video_bitrate", "resolution", "fps"])))]
pub struct Args {
    /// YouTube video URL or 11-character video ID
    pub target: Option<String>,

    /// Read a previously dumped extraction document instead of running the engine
    #[arg(short, long, value_name = "FILE", conflicts_with = "json_dir")]
    pub input: Option<PathBuf>,

    /// Directory of dumped documents named <video id>.json
    #[arg(long, value_name = "DIR")]
    pub json_dir: Option<PathBuf>,

    /// Extraction engine executable
    #[arg(long, value_name = "PROGRAM", default_value = "yt-dlp")]
    pub engine: String,

    /// Extra argument passed to the engine (repeatable)
    #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// Engine timeout (e.g., 30s, 2m)
    #[arg(long, value_name = "DURATION", default_value = "2m")]
    pub timeout: humantime::Duration,

    /// What to print
    #[arg(short, long, value_enum, default_value = "metadata")]
    pub mode: OutputMode,

    /// Audio format ID
    #[arg(long, value_name = "ID")]
    pub audio_format_id: Option<String>,

    /// Audio bitrate in kbps (nearest match)
    #[arg(long, value_name = "KBPS", value_parser = parse_kbps)]
    pub audio_bitrate: Option<f64>,

    /// Audio language (e.g., en, de)
    #[arg(long, value_name = "LANG")]
    pub audio_language: Option<String>,

    /// Pick from Dynamic Range Compression tracks
    #[arg(long)]
    pub drc: bool,

    /// Video format ID
    #[arg(long, value_name = "ID")]
    pub video_format_id: Option<String>,

    /// Video bitrate in kbps (nearest match)
    #[arg(long, value_name = "KBPS", value_parser = parse_kbps)]
    pub video_bitrate: Option<f64>,

    /// Exact video resolution (e.g., 1920x1080)
    #[arg(long, value_name = "WxH")]
    pub resolution: Option<String>,

    /// Exact frame rate
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f64>,

    /// Dynamic range to pick video from
    #[arg(long, value_enum, default_value = "sdr")]
    pub range: RangeArg,

    /// Select audio only
    #[arg(long, conflicts_with = "video_only")]
    pub audio_only: bool,

    /// Select video only
    #[arg(long)]
    pub video_only: bool,

    /// Named audio or video filter (e.g., nightcore, grayscale)
    #[arg(long, value_name = "NAME")]
    pub filter: Option<Filter>,

    /// Mux output path ('-' for stdout)
    #[arg(short, long, value_name = "PATH", default_value = "-")]
    pub output: PathBuf,

    /// Muxing tool used in the printed command line
    #[arg(long, value_name = "PROGRAM", default_value = "ffmpeg")]
    pub ffmpeg: String,

    /// Audio tracks considered for Highest/Lowest
    #[arg(long, value_enum, default_value = "labelled")]
    pub audio_policy: AudioPolicyArg,

    /// Fail on format/thumbnail fields the records do not model
    #[arg(long)]
    pub strict_fields: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long)]
    pub quiet: bool,
}

/// What the binary prints
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputMode {
    /// Classified output as JSON
    Metadata,
    /// Human-readable video summary
    Summary,
    /// Resolved stream URLs, one per line
    Urls,
    /// Muxing command line
    Command,
}

/// Video dynamic range
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RangeArg {
    Sdr,
    Hdr,
    /// SDR first, then HDR
    Any,
}

/// Audio extrema policy
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum AudioPolicyArg {
    /// Only tracks labelled high/low
    Labelled,
    /// Every track
    All,
}

impl Args {
    /// Get engine timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        self.timeout.into()
    }

    /// Audio selector; clap guarantees at most one selector flag
    pub fn audio_selector(&self) -> AudioSelector {
        if let Some(id) = &self.audio_format_id {
            AudioSelector::FormatId(id.clone())
        } else if let Some(kbps) = self.audio_bitrate {
            AudioSelector::Bitrate(kbps)
        } else {
            AudioSelector::Default
        }
    }

    /// Video selector; clap guarantees at most one selector flag
    pub fn video_selector(&self) -> VideoSelector {
        if let Some(id) = &self.video_format_id {
            VideoSelector::FormatId(id.clone())
        } else if let Some(kbps) = self.video_bitrate {
            VideoSelector::Bitrate(kbps)
        } else if let Some(resolution) = &self.resolution {
            VideoSelector::Resolution(resolution.clone())
        } else if let Some(fps) = self.fps {
            VideoSelector::Fps(fps)
        } else {
            VideoSelector::Default
        }
    }

    /// Audio part of the request, `None` under `--video-only`
    pub fn audio_request(&self) -> Option<AudioRequest> {
        if self.video_only {
            return None;
        }
        let mut request = AudioRequest::new(self.audio_selector()).with_drc(self.drc);
        if let Some(language) = &self.audio_language {
            request = request.with_language(language.as_str());
        }
        Some(request)
    }

    /// Video part of the request, `None` under `--audio-only`
    pub fn video_request(&self) -> Option<VideoRequest> {
        if self.audio_only {
            return None;
        }
        let range = match self.range {
            RangeArg::Sdr => VideoRange::Sdr,
            RangeArg::Hdr => VideoRange::Hdr,
            RangeArg::Any => VideoRange::Any,
        };
        Some(VideoRequest::new(self.video_selector()).with_range(range))
    }

    pub fn mux_target(&self) -> MuxTarget {
        if self.output.as_os_str() == "-" {
            MuxTarget::Stdout
        } else {
            MuxTarget::File(self.output.clone())
        }
    }

    pub fn sift_options(&self) -> SiftOptions {
        let audio_policy = match self.audio_policy {
            AudioPolicyArg::Labelled => AudioExtremaPolicy::LabelFiltered,
            AudioPolicyArg::All => AudioExtremaPolicy::AllRecords,
        };
        SiftOptions {
            classify: ClassifyOptions::default().with_audio_policy(audio_policy),
            field_policy: if self.strict_fields {
                FieldPolicy::Reject
            } else {
                FieldPolicy::Ignore
            },
        }
    }

    /// Get output verbosity level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Quiet (only errors)
    Quiet,
    /// Normal
    Normal,
    /// Verbose (debug info)
    Verbose,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            target: None,
            input: None,
            json_dir: None,
            engine: "yt-dlp".to_string(),
            engine_args: Vec::new(),
            timeout: humantime::Duration::from(Duration::from_secs(120)),
            mode: OutputMode::Metadata,
            audio_format_id: None,
            audio_bitrate: None,
            audio_language: None,
            drc: false,
            video_format_id: None,
            video_bitrate: None,
            resolution: None,
            fps: None,
            range: RangeArg::Sdr,
            audio_only: false,
            video_only: false,
            filter: None,
            output: PathBuf::from("-"),
            ffmpeg: "ffmpeg".to_string(),
            audio_policy: AudioPolicyArg::Labelled,
            strict_fields: false,
            verbose: false,
            quiet: false,
        }
    }
}

/// Bitrate targets must be finite so "nearest" is well defined
fn parse_kbps(s: &str) -> Result<f64, String> {
    let kbps: f64 = s.parse().map_err(|e| format!("invalid bitrate '{}': {}", s, e))?;
    if kbps.is_finite() {
        Ok(kbps)
    } else {
        Err(format!("bitrate must be a finite number, got '{}'", s))
    }
}
