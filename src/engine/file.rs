//! Engine backed by previously dumped documents on disk

use crate::engine::ExtractionEngine;
use crate::utils::url::VideoTarget;
use crate::Result;
use std::path::PathBuf;
use tracing::debug;

/// Reads `<dir>/<video id>.json`
#[derive(Debug, Clone)]
pub struct FileEngine {
    dir: PathBuf,
}

impl FileEngine {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, target: &VideoTarget) -> PathBuf {
        self.dir.join(format!("{}.json", target.id))
    }
}

#[async_trait::async_trait]
impl ExtractionEngine for FileEngine {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, target: &VideoTarget) -> Result<String> {
        let path = self.path_for(target);
        debug!("Reading extraction document from {}", path.display());
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SiftError;

    #[tokio::test]
    async fn test_reads_document_by_id() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dQw4w9WgXcQ.json"), r#"{"id": "dQw4w9WgXcQ"}"#).unwrap();

        let engine = FileEngine::new(dir.path());
        let target = VideoTarget::parse("dQw4w9WgXcQ").unwrap();
        let json = engine.fetch(&target).await.unwrap();
        assert!(json.contains("dQw4w9WgXcQ"));
    }

    #[tokio::test]
    async fn test_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FileEngine::new(dir.path());
        let target = VideoTarget::parse("aaaaaaaaaaa").unwrap();

        let err = engine.fetch(&target).await.unwrap_err();
        assert!(matches!(err, SiftError::IoError(_)));
    }
}
