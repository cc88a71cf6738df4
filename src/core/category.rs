//! Categorized classifier output

use crate::core::classify::{audio_extrema, AudioExtremaPolicy};
use crate::core::record::{AudioFormat, MetaData, Thumbnail, VideoFormat};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// A `{ Highest, Lowest, Combined }` triple.
///
/// The extrema are stored as positions in `combined`, so they are always
/// members of the combined list.
#[derive(Debug, Clone, PartialEq)]
pub struct Category<T> {
    combined: Vec<T>,
    highest: Option<usize>,
    lowest: Option<usize>,
}

impl<T> Category<T> {
    pub(crate) fn from_parts(combined: Vec<T>, highest: Option<usize>, lowest: Option<usize>) -> Self {
        debug_assert!(highest.map_or(true, |i| i < combined.len()));
        debug_assert!(lowest.map_or(true, |i| i < combined.len()));
        Self {
            combined,
            highest,
            lowest,
        }
    }

    pub fn highest(&self) -> Option<&T> {
        self.highest.map(|i| &self.combined[i])
    }

    pub fn lowest(&self) -> Option<&T> {
        self.lowest.map(|i| &self.combined[i])
    }

    pub fn combined(&self) -> &[T] {
        &self.combined
    }

    pub fn len(&self) -> usize {
        self.combined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combined.is_empty()
    }
}

impl<T> Default for Category<T> {
    fn default() -> Self {
        Self {
            combined: Vec::new(),
            highest: None,
            lowest: None,
        }
    }
}

impl<T: Serialize> Serialize for Category<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Category", 3)?;
        state.serialize_field("Highest", &self.highest())?;
        state.serialize_field("Lowest", &self.lowest())?;
        state.serialize_field("Combined", &self.combined)?;
        state.end()
    }
}

/// Audio-only categories
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioOnly {
    #[serde(rename = "Standard")]
    pub standard: Category<AudioFormat>,
    #[serde(rename = "Dynamic_Range_Compression")]
    pub drc: Category<AudioFormat>,
}

/// Video-only categories
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoOnly {
    #[serde(rename = "Standard_Dynamic_Range")]
    pub sdr: Category<VideoFormat>,
    #[serde(rename = "High_Dynamic_Range")]
    pub hdr: Category<VideoFormat>,
}

/// Everything the classifier produces for one extraction
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineOutput {
    #[serde(rename = "MetaData")]
    pub metadata: MetaData,
    #[serde(rename = "AudioOnly")]
    pub audio_only: AudioOnly,
    #[serde(rename = "VideoOnly")]
    pub video_only: VideoOnly,
    #[serde(rename = "Thumbnails")]
    pub thumbnails: Category<Thumbnail>,
}

impl EngineOutput {
    pub fn audio_view(&self, drc: bool) -> CategoryView<'_, AudioFormat> {
        if drc {
            CategoryView::new("AudioOnly.Dynamic_Range_Compression", &self.audio_only.drc)
        } else {
            CategoryView::new("AudioOnly.Standard", &self.audio_only.standard)
        }
    }

    pub fn video_view(&self, range: VideoRange) -> CategoryView<'_, VideoFormat> {
        match range {
            VideoRange::Sdr => CategoryView::new("VideoOnly.Standard_Dynamic_Range", &self.video_only.sdr),
            VideoRange::Hdr => CategoryView::new("VideoOnly.High_Dynamic_Range", &self.video_only.hdr),
            VideoRange::Any => CategoryView::union(
                "VideoOnly",
                &[&self.video_only.sdr, &self.video_only.hdr],
            ),
        }
    }
}

/// Which video categories a request draws from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VideoRange {
    #[default]
    Sdr,
    Hdr,
    /// SDR followed by HDR
    Any,
}

/// Borrowed, possibly merged or narrowed, view over categories
#[derive(Debug, Clone)]
pub struct CategoryView<'a, T> {
    name: String,
    highest: Option<&'a T>,
    combined: Vec<&'a T>,
}

impl<'a, T> CategoryView<'a, T> {
    pub fn new(name: impl Into<String>, category: &'a Category<T>) -> Self {
        Self {
            name: name.into(),
            highest: category.highest(),
            combined: category.combined().iter().collect(),
        }
    }

    /// Concatenate the parts in order; `Highest` is the first part's non-null one
    pub fn union(name: impl Into<String>, parts: &[&'a Category<T>]) -> Self {
        Self {
            name: name.into(),
            highest: parts.iter().copied().find_map(|c| c.highest()),
            combined: parts
                .iter()
                .copied()
                .flat_map(|c| c.combined().iter())
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn highest(&self) -> Option<&'a T> {
        self.highest
    }

    pub fn combined(&self) -> &[&'a T] {
        &self.combined
    }

    pub fn is_empty(&self) -> bool {
        self.combined.is_empty()
    }
}

impl<'a> CategoryView<'a, AudioFormat> {
    /// Narrow to one language and recompute `Highest` under the audio rule
    pub fn with_language(self, language: &str, policy: AudioExtremaPolicy) -> Self {
        let combined: Vec<&'a AudioFormat> = self
            .combined
            .into_iter()
            .filter(|f| f.matches_language(language))
            .collect();
        let (highest, _) = audio_extrema(combined.iter().copied(), policy);
        Self {
            name: format!("{}[{}]", self.name, language),
            highest: highest.map(|i| combined[i]),
            combined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn audio(id: &str, note: &str, language: Option<&str>) -> AudioFormat {
        AudioFormat {
            format_id: id.to_string(),
            format_note: Some(note.to_string()),
            language: language.map(str::to_string),
            url: Some(format!("https://media.example/{}", id)),
            ..Default::default()
        }
    }

    #[test]
    fn test_serialize_shape() {
        let category = Category::from_parts(
            vec![Thumbnail {
                url: "https://i.example/1.jpg".to_string(),
                ..Default::default()
            }],
            Some(0),
            None,
        );
        let value = serde_json::to_value(&category).unwrap();
        assert_eq!(value["Highest"]["url"], "https://i.example/1.jpg");
        assert_eq!(value["Lowest"], json!(null));
        assert_eq!(value["Combined"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_engine_output_keys() {
        let value = serde_json::to_value(EngineOutput::default()).unwrap();
        assert!(value["AudioOnly"]["Standard"]["Combined"].is_array());
        assert!(value["AudioOnly"]["Dynamic_Range_Compression"]["Combined"].is_array());
        assert!(value["VideoOnly"]["Standard_Dynamic_Range"]["Combined"].is_array());
        assert!(value["VideoOnly"]["High_Dynamic_Range"]["Combined"].is_array());
        assert!(value["Thumbnails"]["Highest"].is_null());
        assert!(value["MetaData"].is_object());
    }

    #[test]
    fn test_union_keeps_order_and_first_highest() {
        let first: Category<AudioFormat> = Category::from_parts(vec![audio("1", "low", None)], None, None);
        let second = Category::from_parts(vec![audio("2", "high", None)], Some(0), Some(0));

        let view = CategoryView::union("both", &[&first, &second]);
        assert_eq!(view.combined().len(), 2);
        assert_eq!(view.combined()[0].format_id, "1");
        assert!(std::ptr::eq(view.highest().unwrap(), &second.combined()[0]));
    }

    #[test]
    fn test_with_language_recomputes_highest() {
        let category = Category::from_parts(
            vec![
                audio("140", "English original, high", Some("en")),
                audio("251", "German, high", Some("de")),
                audio("139", "English original, low", Some("EN")),
            ],
            Some(1),
            Some(2),
        );

        let view = CategoryView::new("AudioOnly.Standard", &category)
            .with_language("en", AudioExtremaPolicy::LabelFiltered);
        assert_eq!(view.name(), "AudioOnly.Standard[en]");
        assert_eq!(view.combined().len(), 2);
        assert!(std::ptr::eq(view.highest().unwrap(), &category.combined()[0]));
    }

    #[test]
    fn test_with_language_no_match_is_empty() {
        let category = Category::from_parts(vec![audio("140", "high", Some("en"))], Some(0), Some(0));
        let view = CategoryView::new("AudioOnly.Standard", &category)
            .with_language("fr", AudioExtremaPolicy::LabelFiltered);
        assert!(view.is_empty());
        assert!(view.highest().is_none());
    }
}
