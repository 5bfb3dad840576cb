//! Speech-to-text with word-level timestamps

use std::path::Path;

use async_trait::async_trait;
use log::{info, warn};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::captions::transcript::{Segment, Transcript, Word};
use crate::error::{ReelError, Result};
use crate::services::OPENAI_API_BASE;

/// Something that can transcribe a narration into timed words
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}

/// OpenAI `/audio/transcriptions` client
pub struct OpenAiTranscriber {
    client: Client,
    api_key: String,
    model: String,
    language: String,
}

impl OpenAiTranscriber {
    pub fn new(api_key: String, model: &str, language: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ReelError::Configuration("OpenAI API key is required for transcription".to_string()));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            model: model.to_string(),
            language: language.to_string(),
        })
    }
}

/// `verbose_json` response body
#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    segments: Vec<ApiSegment>,
    #[serde(default)]
    words: Vec<ApiWord>,
}

#[derive(Debug, Deserialize)]
struct ApiSegment {
    text: String,
    start: f64,
    end: f64,
}

#[derive(Debug, Deserialize)]
struct ApiWord {
    word: String,
    start: f64,
    end: f64,
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        info!("Transcribing {} with {}", audio_path.display(), self.model);

        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.mp3".to_string());

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name).mime_str(audio_mime_type(audio_path))?)
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word")
            .text("timestamp_granularities[]", "segment");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", OPENAI_API_BASE))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ReelError::Api(format!("Transcription failed (HTTP {}): {}", status, body)));
        }

        let transcript = parse_verbose_json(&body)?;
        info!(
            "Transcribed {} words in {} segments",
            transcript.words().len(),
            transcript.segments.len()
        );
        Ok(transcript)
    }
}

/// Content type for an audio upload, from the file extension
fn audio_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp3" | "mpga" | "mpeg") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a" | "mp4") => "audio/mp4",
        Some("ogg" | "oga") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}

/// Map a `verbose_json` body onto the segment/word transcript shape
pub fn parse_verbose_json(body: &str) -> Result<Transcript> {
    let response: VerboseTranscription =
        serde_json::from_str(body).map_err(|e| ReelError::MalformedTranscript(e.to_string()))?;
    if response.words.is_empty() {
        warn!("Transcription returned no word timestamps");
    }
    Ok(group_words(response.segments, response.words))
}

/// Put each word into the segment whose range contains its start
///
/// Words before the first segment go to the first one, words past the last
/// segment to the last one. Without segments, one segment holds every word.
fn group_words(api_segments: Vec<ApiSegment>, api_words: Vec<ApiWord>) -> Transcript {
    let words = api_words.into_iter().map(|w| Word::new(w.word.trim(), w.start, w.end));

    if api_segments.is_empty() {
        return Transcript {
            segments: vec![Segment {
                words: words.collect(),
                ..Segment::default()
            }],
        };
    }

    let mut segments: Vec<Segment> = api_segments
        .iter()
        .map(|s| Segment {
            text: Some(s.text.trim().to_string()),
            start: Some(s.start),
            end: Some(s.end),
            words: Vec::new(),
        })
        .collect();

    let last = segments.len() - 1;
    for word in words {
        let index = api_segments
            .iter()
            .position(|s| word.start < s.end)
            .unwrap_or(last);
        segments[index].words.push(word);
    }

    Transcript { segments }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_are_grouped_by_segment_range() {
        let body = r#"{
            "task": "transcribe",
            "language": "english",
            "duration": 3.2,
            "text": "Hi there. Bye now.",
            "segments": [
                {"id": 0, "text": " Hi there.", "start": 0.0, "end": 1.2},
                {"id": 1, "text": " Bye now.", "start": 1.2, "end": 2.5}
            ],
            "words": [
                {"word": "Hi", "start": 0.0, "end": 0.3},
                {"word": "there", "start": 0.3, "end": 1.0},
                {"word": "Bye", "start": 1.2, "end": 1.6},
                {"word": " now", "start": 1.6, "end": 2.4},
                {"word": "late", "start": 2.6, "end": 3.0}
            ]
        }"#;

        let transcript = parse_verbose_json(body).unwrap();

        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[0].text.as_deref(), Some("Hi there."));
        assert_eq!(transcript.segments[0].words.len(), 2);
        let second: Vec<&str> = transcript.segments[1].words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(second, vec!["Bye", "now", "late"]);
        assert_eq!(transcript.full_text(), "Hi there Bye now late");
    }

    #[test]
    fn test_no_segments_yields_single_segment() {
        let body = r#"{"words": [{"word": "solo", "start": 0.0, "end": 0.5}]}"#;
        let transcript = parse_verbose_json(body).unwrap();
        assert_eq!(transcript.segments.len(), 1);
        assert_eq!(transcript.segments[0].words, vec![Word::new("solo", 0.0, 0.5)]);
        assert_eq!(transcript.segments[0].start, None);
    }

    #[test]
    fn test_output_reloads_as_transcript() {
        let body = r#"{"segments": [{"text": "a", "start": 0.0, "end": 1.0}], "words": [{"word": "a", "start": 0.1, "end": 0.2}]}"#;
        let transcript = parse_verbose_json(body).unwrap();
        let json = serde_json::to_string(&transcript).unwrap();
        assert_eq!(Transcript::from_json(&json).unwrap(), transcript);
    }

    #[test]
    fn test_upload_type_follows_extension() {
        assert_eq!(audio_mime_type(Path::new("content/a/audio.mp3")), "audio/mpeg");
        assert_eq!(audio_mime_type(Path::new("take_2.WAV")), "audio/wav");
        assert_eq!(audio_mime_type(Path::new("memo.m4a")), "audio/mp4");
        assert_eq!(audio_mime_type(Path::new("no_extension")), "application/octet-stream");
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            parse_verbose_json("not json"),
            Err(ReelError::MalformedTranscript(_))
        ));
    }
}
