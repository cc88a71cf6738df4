//! Hand-off to the external muxing tool

use crate::core::record::{AudioFormat, VideoFormat};
use crate::error::SiftError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Named audio filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFilter {
    BassBoost,
    Echo,
    Flanger,
    Nightcore,
    Panning,
    Phaser,
    Reverse,
    Slow,
    Speed,
    SubBoost,
    SuperSlow,
    SuperSpeed,
    Surround,
    Vaporwave,
    Vibrato,
}

impl AudioFilter {
    pub const ALL: [AudioFilter; 15] = [
        AudioFilter::BassBoost,
        AudioFilter::Echo,
        AudioFilter::Flanger,
        AudioFilter::Nightcore,
        AudioFilter::Panning,
        AudioFilter::Phaser,
        AudioFilter::Reverse,
        AudioFilter::Slow,
        AudioFilter::Speed,
        AudioFilter::SubBoost,
        AudioFilter::SuperSlow,
        AudioFilter::SuperSpeed,
        AudioFilter::Surround,
        AudioFilter::Vaporwave,
        AudioFilter::Vibrato,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AudioFilter::BassBoost => "bassboost",
            AudioFilter::Echo => "echo",
            AudioFilter::Flanger => "flanger",
            AudioFilter::Nightcore => "nightcore",
            AudioFilter::Panning => "panning",
            AudioFilter::Phaser => "phaser",
            AudioFilter::Reverse => "reverse",
            AudioFilter::Slow => "slow",
            AudioFilter::Speed => "speed",
            AudioFilter::SubBoost => "subboost",
            AudioFilter::SuperSlow => "superslow",
            AudioFilter::SuperSpeed => "superspeed",
            AudioFilter::Surround => "surround",
            AudioFilter::Vaporwave => "vaporwave",
            AudioFilter::Vibrato => "vibrato",
        }
    }

    /// ffmpeg `-af` graph
    pub fn graph(&self) -> &'static str {
        match self {
            AudioFilter::BassBoost => "bass=g=10,dynaudnorm=f=150",
            AudioFilter::Echo => "aecho=0.8:0.9:1000:0.3",
            AudioFilter::Flanger => "flanger",
            AudioFilter::Nightcore => "aresample=48000,asetrate=48000*1.25",
            AudioFilter::Panning => "apulsator=hz=0.08",
            AudioFilter::Phaser => "aphaser=in_gain=0.4",
            AudioFilter::Reverse => "areverse",
            AudioFilter::Slow => "atempo=0.8",
            AudioFilter::Speed => "atempo=2",
            AudioFilter::SubBoost => "asubboost",
            AudioFilter::SuperSlow => "atempo=0.5",
            AudioFilter::SuperSpeed => "atempo=3",
            AudioFilter::Surround => "surround",
            AudioFilter::Vaporwave => "aresample=48000,asetrate=48000*0.8",
            AudioFilter::Vibrato => "vibrato=f=6.5",
        }
    }
}

/// Named video filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFilter {
    Grayscale,
    Invert,
    Rotate90,
    Rotate180,
    Rotate270,
    FlipHorizontal,
    FlipVertical,
}

impl VideoFilter {
    pub const ALL: [VideoFilter; 7] = [
        VideoFilter::Grayscale,
        VideoFilter::Invert,
        VideoFilter::Rotate90,
        VideoFilter::Rotate180,
        VideoFilter::Rotate270,
        VideoFilter::FlipHorizontal,
        VideoFilter::FlipVertical,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VideoFilter::Grayscale => "grayscale",
            VideoFilter::Invert => "invert",
            VideoFilter::Rotate90 => "rotate90",
            VideoFilter::Rotate180 => "rotate180",
            VideoFilter::Rotate270 => "rotate270",
            VideoFilter::FlipHorizontal => "fliphorizontal",
            VideoFilter::FlipVertical => "flipvertical",
        }
    }

    /// ffmpeg `-vf` graph
    pub fn graph(&self) -> &'static str {
        match self {
            VideoFilter::Grayscale => "colorchannelmixer=.3:.4:.3:0:.3:.4:.3:0:.3:.4:.3",
            VideoFilter::Invert => "negate",
            VideoFilter::Rotate90 => "transpose=1",
            VideoFilter::Rotate180 => "transpose=1,transpose=1",
            VideoFilter::Rotate270 => "transpose=2",
            VideoFilter::FlipHorizontal => "hflip",
            VideoFilter::FlipVertical => "vflip",
        }
    }
}

/// A named audio or video filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Audio(AudioFilter),
    Video(VideoFilter),
}

impl Filter {
    pub fn name(&self) -> &'static str {
        match self {
            Filter::Audio(f) => f.name(),
            Filter::Video(f) => f.name(),
        }
    }
}

impl FromStr for Filter {
    type Err = SiftError;

    /// Case-insensitive; `-` and `_` are ignored ("flip_horizontal" works)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        if let Some(f) = AudioFilter::ALL.iter().find(|f| f.name() == key) {
            return Ok(Filter::Audio(*f));
        }
        if let Some(f) = VideoFilter::ALL.iter().find(|f| f.name() == key) {
            return Ok(Filter::Video(*f));
        }
        Err(SiftError::UnknownFilter(s.to_string()))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the muxing tool writes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MuxTarget {
    /// Matroska on stdout
    #[default]
    Stdout,
    File(PathBuf),
}

/// One resolved input stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxInput {
    pub format_id: String,
    pub url: String,
}

/// Argument vector for the external muxing tool. Never executed here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MuxPlan {
    video: Option<MuxInput>,
    audio: Option<MuxInput>,
    filter: Option<Filter>,
    target: MuxTarget,
}

impl MuxPlan {
    pub fn new(target: MuxTarget) -> Self {
        Self {
            target,
            ..Default::default()
        }
    }

    pub fn with_video(mut self, format: &VideoFormat) -> Self {
        self.video = format.url.clone().map(|url| MuxInput {
            format_id: format.format_id.clone(),
            url,
        });
        self
    }

    pub fn with_audio(mut self, format: &AudioFormat) -> Self {
        self.audio = format.url.clone().map(|url| MuxInput {
            format_id: format.format_id.clone(),
            url,
        });
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn video(&self) -> Option<&MuxInput> {
        self.video.as_ref()
    }

    pub fn audio(&self) -> Option<&MuxInput> {
        self.audio.as_ref()
    }

    /// Check that the filter has a stream to act on and that something is muxed
    pub fn validate(&self) -> Result<(), SiftError> {
        if self.video.is_none() && self.audio.is_none() {
            return Err(SiftError::EmptyMuxPlan);
        }
        match self.filter {
            Some(Filter::Audio(f)) if self.audio.is_none() => Err(SiftError::FilterMismatch {
                filter: f.name().to_string(),
                stream: "audio",
            }),
            Some(Filter::Video(f)) if self.video.is_none() => Err(SiftError::FilterMismatch {
                filter: f.name().to_string(),
                stream: "video",
            }),
            _ => Ok(()),
        }
    }

    /// ffmpeg arguments, without the program name
    pub fn to_args(&self) -> Result<Vec<String>, SiftError> {
        self.validate()?;

        let mut args: Vec<String> = ["-hide_banner", "-loglevel", "error"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut maps = Vec::new();
        for (index, (input, kind)) in [(&self.video, "v"), (&self.audio, "a")]
            .into_iter()
            .filter_map(|(input, kind)| input.as_ref().map(|i| (i, kind)))
            .enumerate()
        {
            args.push("-i".to_string());
            args.push(input.url.clone());
            maps.push(format!("{}:{}:0", index, kind));
        }
        for map in maps {
            args.push("-map".to_string());
            args.push(map);
        }

        match self.filter {
            Some(Filter::Audio(f)) => {
                args.extend(["-af".to_string(), f.graph().to_string()]);
            }
            Some(Filter::Video(f)) => {
                args.extend(["-vf".to_string(), f.graph().to_string()]);
            }
            None => {}
        }

        // Filtered streams are re-encoded, everything else is copied
        if self.video.is_some() && !matches!(self.filter, Some(Filter::Video(_))) {
            args.extend(["-c:v".to_string(), "copy".to_string()]);
        }
        if self.audio.is_some() && !matches!(self.filter, Some(Filter::Audio(_))) {
            args.extend(["-c:a".to_string(), "copy".to_string()]);
        }

        match &self.target {
            MuxTarget::Stdout => {
                args.extend(["-f".to_string(), "matroska".to_string(), "-".to_string()]);
            }
            MuxTarget::File(path) => {
                args.push("-y".to_string());
                args.push(path.display().to_string());
            }
        }

        Ok(args)
    }

    /// Shell-quoted command line for display
    pub fn command_line(&self, program: &str) -> Result<String, SiftError> {
        let args = self.to_args()?;
        Ok(std::iter::once(program.to_string())
            .chain(args.iter().map(|a| shell_quote(a)))
            .collect::<Vec<_>>()
            .join(" "))
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,*".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video() -> VideoFormat {
        VideoFormat {
            format_id: "137".to_string(),
            url: Some("https://media.example/137".to_string()),
            ..Default::default()
        }
    }

    fn audio() -> AudioFormat {
        AudioFormat {
            format_id: "140".to_string(),
            url: Some("https://media.example/140?a=1&b=2".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("bassboost".parse::<Filter>().unwrap(), Filter::Audio(AudioFilter::BassBoost));
        assert_eq!("Nightcore".parse::<Filter>().unwrap(), Filter::Audio(AudioFilter::Nightcore));
        assert_eq!(
            "flip_horizontal".parse::<Filter>().unwrap(),
            Filter::Video(VideoFilter::FlipHorizontal)
        );
        assert!(matches!(
            "wobble".parse::<Filter>().unwrap_err(),
            SiftError::UnknownFilter(name) if name == "wobble"
        ));
    }

    #[test]
    fn test_filter_names_are_unique() {
        let mut names: Vec<&str> = AudioFilter::ALL.iter().map(|f| f.name()).collect();
        names.extend(VideoFilter::ALL.iter().map(|f| f.name()));
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn test_audio_and_video_to_stdout() {
        let args = MuxPlan::new(MuxTarget::Stdout)
            .with_video(&video())
            .with_audio(&audio())
            .to_args()
            .unwrap();

        assert_eq!(
            args,
            vec![
                "-hide_banner",
                "-loglevel",
                "error",
                "-i",
                "https://media.example/137",
                "-i",
                "https://media.example/140?a=1&b=2",
                "-map",
                "0:v:0",
                "-map",
                "1:a:0",
                "-c:v",
                "copy",
                "-c:a",
                "copy",
                "-f",
                "matroska",
                "-",
            ]
        );
    }

    #[test]
    fn test_audio_filter_reencodes_audio() {
        let args = MuxPlan::new(MuxTarget::File(PathBuf::from("out.mka")))
            .with_audio(&audio())
            .with_filter(Filter::Audio(AudioFilter::Echo))
            .to_args()
            .unwrap();

        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "0:a:0"));
        assert!(args.windows(2).any(|w| w[0] == "-af" && w[1] == "aecho=0.8:0.9:1000:0.3"));
        assert!(!args.iter().any(|a| a == "-c:a"));
        assert_eq!(args.last().unwrap(), "out.mka");
    }

    #[test]
    fn test_filter_mismatch() {
        let err = MuxPlan::new(MuxTarget::Stdout)
            .with_audio(&audio())
            .with_filter(Filter::Video(VideoFilter::Invert))
            .to_args()
            .unwrap_err();
        assert!(matches!(err, SiftError::FilterMismatch { stream: "video", .. }));
    }

    #[test]
    fn test_empty_plan() {
        let err = MuxPlan::new(MuxTarget::Stdout).to_args().unwrap_err();
        assert!(matches!(err, SiftError::EmptyMuxPlan));
    }

    #[test]
    fn test_command_line_quotes_urls() {
        let line = MuxPlan::new(MuxTarget::Stdout)
            .with_audio(&audio())
            .command_line("ffmpeg")
            .unwrap();
        assert!(line.starts_with("ffmpeg -hide_banner"));
        assert!(line.contains("'https://media.example/140?a=1&b=2'"));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("copy"), "copy");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }
}
