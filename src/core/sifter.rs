//! Request orchestration: extract once, classify, resolve, plan the mux

use crate::core::category::{EngineOutput, VideoRange};
use crate::core::classify::{AudioExtremaPolicy, ClassifyOptions};
use crate::core::mux::{Filter, MuxPlan, MuxTarget};
use crate::core::record::{AudioFormat, VideoFormat};
use crate::core::resolve::{resolve_audio, resolve_video, AudioSelector, VideoSelector};
use crate::engine::{ExtractionDocument, ExtractionEngine, FieldPolicy, ProcessEngine};
use crate::error::SiftError;
use crate::utils::url::VideoTarget;
use crate::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Request-independent configuration
#[derive(Debug, Clone, Default)]
pub struct SiftOptions {
    /// Classifier configuration
    pub classify: ClassifyOptions,
    /// Handling of unmodelled format/thumbnail keys
    pub field_policy: FieldPolicy,
}

/// Audio part of a request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioRequest {
    pub selector: AudioSelector,
    /// Draw from the Dynamic Range Compression category
    pub drc: bool,
    /// Narrow to one audio language
    pub language: Option<String>,
}

impl AudioRequest {
    pub fn new(selector: AudioSelector) -> Self {
        Self {
            selector,
            ..Default::default()
        }
    }

    pub fn with_drc(mut self, drc: bool) -> Self {
        self.drc = drc;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Video part of a request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoRequest {
    pub selector: VideoSelector,
    pub range: VideoRange,
}

impl VideoRequest {
    pub fn new(selector: VideoSelector) -> Self {
        Self {
            selector,
            ..Default::default()
        }
    }

    pub fn with_range(mut self, range: VideoRange) -> Self {
        self.range = range;
        self
    }
}

/// The formats chosen for one request, borrowed from its [`EngineOutput`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Selection<'a> {
    pub audio: Option<&'a AudioFormat>,
    pub video: Option<&'a VideoFormat>,
}

impl<'a> Selection<'a> {
    /// Build the hand-off for the muxing tool
    pub fn mux_plan(&self, target: MuxTarget, filter: Option<Filter>) -> Result<MuxPlan> {
        let mut plan = MuxPlan::new(target);
        if let Some(video) = self.video {
            plan = plan.with_video(video);
        }
        if let Some(audio) = self.audio {
            plan = plan.with_audio(audio);
        }
        if let Some(filter) = filter {
            plan = plan.with_filter(filter);
        }
        plan.validate()?;
        Ok(plan)
    }
}

/// Entry point: one extraction per request, then pure classification and resolution
pub struct Sifter {
    options: SiftOptions,
    engine: Arc<dyn ExtractionEngine>,
}

impl Sifter {
    /// Create a sifter backed by `yt-dlp` on the PATH
    pub fn new() -> Self {
        Self::with_engine(ProcessEngine::default())
    }

    pub fn with_engine(engine: impl ExtractionEngine + 'static) -> Self {
        Self {
            options: SiftOptions::default(),
            engine: Arc::new(engine),
        }
    }

    pub fn with_options(mut self, options: SiftOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_audio_policy(mut self, policy: AudioExtremaPolicy) -> Self {
        self.options.classify.audio_policy = policy;
        self
    }

    pub fn with_field_policy(mut self, policy: FieldPolicy) -> Self {
        self.options.field_policy = policy;
        self
    }

    /// Validate `target`, run the engine once and classify its output
    pub async fn extract(&self, target: &str) -> Result<EngineOutput> {
        let target = VideoTarget::parse(target)?;
        info!("Extracting {} with {}", target.id, self.engine.name());

        let json = self.engine.fetch(&target).await?;
        let output = self.classify_json(&json)?;

        if output.metadata.id.as_deref().map_or(false, |id| id != target.id) {
            warn!(
                "Engine returned metadata for {:?} while {} was requested",
                output.metadata.id, target.id
            );
        }
        Ok(output)
    }

    /// Parse and classify an already fetched document
    pub fn classify_json(&self, json: &str) -> Result<EngineOutput> {
        let document = ExtractionDocument::parse(json, self.options.field_policy)?;
        if !document.has_metadata() {
            return Err(SiftError::MissingMetadata);
        }
        Ok(document.classify(&self.options.classify))
    }

    /// Resolve the requested audio and/or video format
    pub fn select<'a>(
        &self,
        output: &'a EngineOutput,
        audio: Option<&AudioRequest>,
        video: Option<&VideoRequest>,
    ) -> Result<Selection<'a>> {
        let audio = audio
            .map(|request| {
                let mut view = output.audio_view(request.drc);
                if let Some(language) = &request.language {
                    view = view.with_language(language, self.options.classify.audio_policy);
                }
                resolve_audio(&view, &request.selector)
            })
            .transpose()?;

        let video = video
            .map(|request| resolve_video(&output.video_view(request.range), &request.selector))
            .transpose()?;

        Ok(Selection { audio, video })
    }
}

impl Default for Sifter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolve::ResolveError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticEngine {
        json: String,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl ExtractionEngine for StaticEngine {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch(&self, _target: &VideoTarget) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.json.clone())
        }
    }

    fn document() -> String {
        json!({
            "id": "dQw4w9WgXcQ",
            "title": "Never Gonna Give You Up",
            "formats": [
                {"format_id": "139", "format_note": "low", "resolution": "audio only", "language": "en", "tbr": 48.0, "url": "https://media.example/139"},
                {"format_id": "140", "format_note": "medium, high", "resolution": "audio only", "language": "en", "tbr": 129.0, "url": "https://media.example/140"},
                {"format_id": "251", "format_note": "German, high", "resolution": "audio only", "language": "de", "tbr": 135.0, "url": "https://media.example/251"},
                {"format_id": "251-drc", "format_note": "medium, DRC, high", "resolution": "audio only", "tbr": 135.0, "url": "https://media.example/251-drc"},
                {"format_id": "136", "resolution": "1280x720", "fps": 30, "dynamic_range": "SDR", "vbr": 1500.0, "tbr": 1500.0, "url": "https://media.example/136"},
                {"format_id": "137", "resolution": "1920x1080", "fps": 30, "dynamic_range": "SDR", "vbr": 4000.0, "tbr": 4000.0, "url": "https://media.example/137"},
                {"format_id": "337", "resolution": "3840x2160", "fps": 60, "dynamic_range": "HDR10", "vbr": 9000.0, "tbr": 9000.0, "url": "https://media.example/337"}
            ]
        })
        .to_string()
    }

    fn sifter() -> (Sifter, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = StaticEngine {
            json: document(),
            calls: calls.clone(),
        };
        (Sifter::with_engine(engine), calls)
    }

    #[tokio::test]
    async fn test_extract_runs_engine_once() {
        let (sifter, calls) = sifter();
        let output = sifter.extract("https://youtu.be/dQw4w9WgXcQ").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(output.audio_only.standard.len(), 3);
        assert_eq!(output.audio_only.drc.len(), 1);
        assert_eq!(output.video_only.sdr.len(), 2);
        assert_eq!(output.video_only.hdr.len(), 1);
    }

    #[tokio::test]
    async fn test_extract_rejects_bad_target() {
        let (sifter, calls) = sifter();
        let err = sifter.extract("https://vimeo.com/1").await.unwrap_err();

        assert!(matches!(err, SiftError::InvalidTarget(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_metadata() {
        let (sifter, _) = sifter();
        let err = sifter.classify_json(r#"{"formats": []}"#).unwrap_err();
        assert!(matches!(err, SiftError::MissingMetadata));
    }

    #[test]
    fn test_select_defaults() {
        let (sifter, _) = sifter();
        let output = sifter.classify_json(&document()).unwrap();

        let selection = sifter
            .select(
                &output,
                Some(&AudioRequest::default()),
                Some(&VideoRequest::default()),
            )
            .unwrap();
        assert_eq!(selection.audio.unwrap().format_id, "251");
        assert_eq!(selection.video.unwrap().format_id, "137");
    }

    #[test]
    fn test_select_language() {
        let (sifter, _) = sifter();
        let output = sifter.classify_json(&document()).unwrap();

        let request = AudioRequest::default().with_language("en");
        let selection = sifter.select(&output, Some(&request), None).unwrap();
        assert_eq!(selection.audio.unwrap().format_id, "140");
        assert!(selection.video.is_none());

        let request = AudioRequest::default().with_language("ja");
        let err = sifter.select(&output, Some(&request), None).unwrap_err();
        assert!(matches!(
            err,
            SiftError::Resolve(ResolveError::EmptyCategory { ref category }) if category == "AudioOnly.Standard[ja]"
        ));
    }

    #[test]
    fn test_select_drc_and_hdr() {
        let (sifter, _) = sifter();
        let output = sifter.classify_json(&document()).unwrap();

        let audio = AudioRequest::new(AudioSelector::Bitrate(128.0)).with_drc(true);
        let video = VideoRequest::new(VideoSelector::FormatId("337".to_string())).with_range(VideoRange::Any);
        let selection = sifter.select(&output, Some(&audio), Some(&video)).unwrap();

        assert_eq!(selection.audio.unwrap().format_id, "251-drc");
        assert_eq!(selection.video.unwrap().format_id, "337");
    }

    #[test]
    fn test_select_failure_propagates() {
        let (sifter, _) = sifter();
        let output = sifter.classify_json(&document()).unwrap();

        let video = VideoRequest::new(VideoSelector::Fps(60.0));
        let err = sifter.select(&output, None, Some(&video)).unwrap_err();
        assert!(err.is_resolution_error());
    }

    #[test]
    fn test_selection_mux_plan() {
        let (sifter, _) = sifter();
        let output = sifter.classify_json(&document()).unwrap();
        let selection = sifter
            .select(&output, Some(&AudioRequest::default()), Some(&VideoRequest::default()))
            .unwrap();

        let plan = selection.mux_plan(MuxTarget::Stdout, None).unwrap();
        assert_eq!(plan.video().unwrap().url, "https://media.example/137");
        assert_eq!(plan.audio().unwrap().url, "https://media.example/251");
    }
}
