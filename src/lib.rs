//! # ytsift - YouTube format sifter
//!
//! Turns one extraction document from a yt-dlp compatible engine into
//! categorized audio, video and thumbnail formats, and resolves requests
//! against them.
//!
//! ## Features
//!
//! - Audio split into standard and Dynamic Range Compression tracks
//! - Video split into SDR and HDR formats
//! - Highest/Lowest precomputed for every category
//! - Selection by format ID, nearest bitrate, resolution, frame rate or language
//! - ffmpeg hand-off with named audio/video filters
//!
//! ## Example
//!
//! ```rust,no_run
//! use ytsift::{AudioRequest, Sifter, VideoRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sifter = Sifter::new();
//!     let output = sifter.extract("https://youtu.be/dQw4w9WgXcQ").await?;
//!
//!     let selection = sifter.select(
//!         &output,
//!         Some(&AudioRequest::default()),
//!         Some(&VideoRequest::default()),
//!     )?;
//!     if let Some(video) = selection.video {
//!         println!("Best SDR video: {}", video.format_id);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod engine;
pub mod error;
pub mod utils;

// Re-export main types
pub use crate::core::{
    AudioRequest, AudioSelector, EngineOutput, MuxPlan, Selection, SiftOptions, Sifter, VideoRange,
    VideoRequest, VideoSelector,
};
pub use crate::engine::{ExtractionEngine, FieldPolicy, FileEngine, ProcessEngine};
pub use crate::error::SiftError;

/// Result type alias for ytsift operations
pub type Result<T> = std::result::Result<T, SiftError>;
