//! Fitting the chosen clip to the narration length

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::background::selector::ClipCandidate;

/// Reference to the part of a clip that ends up in the render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimmedClip {
    #[serde(rename = "identifier")]
    pub path: PathBuf,
    pub range_start: f64,
    /// `None` keeps the clip untrimmed
    pub range_end: Option<f64>,
}

impl TrimmedClip {
    pub fn is_trimmed(&self) -> bool {
        self.range_end.is_some()
    }
}

/// Cut a clip longer than `target` down to `[0, target]`
///
/// Shorter clips pass through unchanged; they are never looped or
/// stretched, so the render is then shorter than the narration.
pub fn trim_to_narration(clip: &ClipCandidate, target: f64) -> TrimmedClip {
    let range_end = (clip.duration > target).then_some(target);
    TrimmedClip {
        path: clip.path.clone(),
        range_start: 0.0,
        range_end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longer_clip_is_cut() {
        let clip = ClipCandidate::new("videos/long.mp4", 30.0);
        let trimmed = trim_to_narration(&clip, 12.0);
        assert_eq!(trimmed.range_start, 0.0);
        assert_eq!(trimmed.range_end, Some(12.0));
        assert_eq!(trimmed.path, PathBuf::from("videos/long.mp4"));
    }

    #[test]
    fn test_shorter_clip_passes_through() {
        let clip = ClipCandidate::new("videos/short.mp4", 8.0);
        let trimmed = trim_to_narration(&clip, 12.0);
        assert_eq!(trimmed.range_end, None);
        assert!(!trimmed.is_trimmed());
    }

    #[test]
    fn test_serialized_shape() {
        let clip = ClipCandidate::new("videos/long.mp4", 30.0);
        let value = serde_json::to_value(trim_to_narration(&clip, 12.0)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"identifier": "videos/long.mp4", "rangeStart": 0.0, "rangeEnd": 12.0})
        );
    }

    #[test]
    fn test_exact_length_is_not_trimmed() {
        let clip = ClipCandidate::new("videos/exact.mp4", 12.0);
        assert_eq!(trim_to_narration(&clip, 12.0).range_end, None);
    }
}
