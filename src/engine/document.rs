//! Typed boundary for the extraction engine's JSON document

use crate::core::category::EngineOutput;
use crate::core::classify::{classify, ClassifyOptions};
use crate::core::record::{FormatRecord, RawMetadata, RawThumbnail};
use crate::error::SiftError;
use crate::Result;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use tracing::debug;

/// What to do with format/thumbnail keys the records do not model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Drop them (logged at debug level)
    #[default]
    Ignore,
    /// Fail with [`SiftError::UnknownFields`]
    Reject,
}

/// One extraction: formats, thumbnails and top-level video metadata
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtractionDocument {
    #[serde(deserialize_with = "null_as_empty")]
    pub formats: Vec<FormatRecord>,
    #[serde(deserialize_with = "null_as_empty")]
    pub thumbnails: Vec<RawThumbnail>,
    #[serde(flatten)]
    pub metadata: RawMetadata,
}

impl ExtractionDocument {
    /// Parse the engine's stdout and apply `policy` to unmodelled keys
    pub fn parse(json: &str, policy: FieldPolicy) -> Result<Self> {
        let document: Self = serde_json::from_str(json)?;
        document.check_fields(policy)?;
        Ok(document)
    }

    fn check_fields(&self, policy: FieldPolicy) -> Result<()> {
        let format_offenders = self
            .formats
            .iter()
            .filter(|f| !f.unknown.is_empty())
            .map(|f| (format!("format {}", f.format_id), f.unknown.keys()));
        let thumbnail_offenders = self
            .thumbnails
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.unknown.is_empty())
            .map(|(idx, t)| (format!("thumbnail {}", idx), t.unknown.keys()));

        let mut dropped = BTreeSet::new();
        for (context, keys) in format_offenders.chain(thumbnail_offenders) {
            let keys: Vec<String> = keys.cloned().collect();
            if policy == FieldPolicy::Reject {
                return Err(SiftError::UnknownFields {
                    context,
                    fields: keys,
                });
            }
            dropped.extend(keys);
        }

        if !dropped.is_empty() {
            debug!(
                "Dropping unmodelled format/thumbnail fields: {}",
                dropped.into_iter().collect::<Vec<_>>().join(", ")
            );
        }
        Ok(())
    }

    /// Metadata is present when the document names the video
    pub fn has_metadata(&self) -> bool {
        self.metadata.id.is_some() || self.metadata.title.is_some()
    }

    pub fn classify(&self, options: &ClassifyOptions) -> EngineOutput {
        classify(&self.formats, &self.thumbnails, &self.metadata, options)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
