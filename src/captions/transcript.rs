//! Word-level transcript model
//!
//! A transcript is a list of segments, each holding a list of timed words.
//! Segment boundaries carry no timing meaning for captions; only word order
//! does, so the scheduler works on the flattened word sequence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReelError, Result};

/// One spoken word with its timestamps in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// A run of words as grouped by the speech-to-text engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    /// A segment without a `words` key is treated as holding no words
    #[serde(default)]
    pub words: Vec<Word>,
}

/// Transcript as stored in `transcript.json`
///
/// The `segments` key is mandatory and every word must carry `text`,
/// `start` and `end`; anything else is rejected as
/// [`ReelError::MalformedTranscript`] instead of being silently defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<Segment>,
}

impl Transcript {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| ReelError::MalformedTranscript(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Flatten segments into one ordered word sequence
    pub fn words(&self) -> Vec<Word> {
        flatten_words(&self.segments)
    }

    /// All word texts joined by single spaces
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .flat_map(|segment| segment.words.iter())
            .map(|word| word.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

/// Concatenate the words of all segments, preserving global order
pub fn flatten_words(segments: &[Segment]) -> Vec<Word> {
    segments
        .iter()
        .flat_map(|segment| segment.words.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_preserves_order_across_segments() {
        let transcript = Transcript::from_json(
            r#"{
                "text": " Hello there general Kenobi",
                "segments": [
                    {"id": 0, "text": "Hello there", "words": [
                        {"text": "Hello", "start": 0.0, "end": 0.4, "confidence": 0.98},
                        {"text": "there", "start": 0.4, "end": 0.7}
                    ]},
                    {"words": []},
                    {"words": [
                        {"text": "general", "start": 1.0, "end": 1.5},
                        {"text": "Kenobi", "start": 1.5, "end": 2.1}
                    ]}
                ]
            }"#,
        )
        .unwrap();

        let words = transcript.words();
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "there", "general", "Kenobi"]);
        assert_eq!(words[2], Word::new("general", 1.0, 1.5));
    }

    #[test]
    fn test_empty_segments_give_no_words() {
        let transcript = Transcript::from_json(r#"{"segments": []}"#).unwrap();
        assert!(transcript.words().is_empty());

        let transcript = Transcript::from_json(r#"{"segments": [{"text": "silence"}]}"#).unwrap();
        assert!(transcript.words().is_empty());
    }

    #[test]
    fn test_missing_segments_is_malformed() {
        let err = Transcript::from_json(r#"{"text": "no segments here"}"#).unwrap_err();
        assert!(matches!(err, ReelError::MalformedTranscript(_)));
    }

    #[test]
    fn test_word_without_end_is_malformed() {
        let err = Transcript::from_json(r#"{"segments": [{"words": [{"text": "x", "start": 1.0}]}]}"#)
            .unwrap_err();
        assert!(matches!(err, ReelError::MalformedTranscript(_)));
    }

    #[test]
    fn test_full_text_joins_words() {
        let transcript = Transcript {
            segments: vec![
                Segment {
                    words: vec![Word::new(" Hello", 0.0, 0.5), Word::new(" world.", 0.5, 1.0)],
                    ..Default::default()
                },
                Segment {
                    words: vec![Word::new("Bye", 1.2, 1.4)],
                    ..Default::default()
                },
            ],
        };
        assert_eq!(transcript.full_text(), "Hello world. Bye");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.json");
        let transcript = Transcript {
            segments: vec![Segment {
                text: Some("hi".to_string()),
                start: Some(0.0),
                end: Some(0.3),
                words: vec![Word::new("hi", 0.0, 0.3)],
            }],
        };
        transcript.save(&path).unwrap();
        assert_eq!(Transcript::load(&path).unwrap(), transcript);
    }
}
