//! # Services
//!
//! Clients for the hosted APIs: script writing, speech synthesis and
//! word-level transcription.

pub mod script;
pub mod transcription;
pub mod tts;

pub use script::{OpenAiScriptWriter, ScriptWriter, clean_script};
pub use transcription::{OpenAiTranscriber, Transcriber};
pub use tts::{SpeechSynthesizer, speech_provider};

/// Base URL of the OpenAI REST API
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
