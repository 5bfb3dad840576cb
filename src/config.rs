//! Application configuration
//!
//! Loaded from a JSON file. Every section and field falls back to its
//! default, so an empty `{}` file (or no file at all) is a valid config.

use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::captions::scheduler::SchedulerConfig;
use crate::error::{ReelError, Result};

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory that holds one sub-directory per project
    pub base_content_path: String,
    /// Directory scanned for background clips
    pub videos_dir: String,
    pub fallbacks: Fallbacks,
    pub openai_settings: OpenAiSettings,
    pub audio_settings: AudioSettings,
    pub video_settings: VideoSettings,
    pub text_clip_settings: TextClipSettings,
    pub fonts: Fonts,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_content_path: "content".to_string(),
            videos_dir: "videos".to_string(),
            fallbacks: Fallbacks::default(),
            openai_settings: OpenAiSettings::default(),
            audio_settings: AudioSettings::default(),
            video_settings: VideoSettings::default(),
            text_clip_settings: TextClipSettings::default(),
            fonts: Fonts::default(),
        }
    }
}

impl AppConfig {
    /// Load the config file; a missing file yields the defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| ReelError::Configuration(format!("Invalid config file: {}", e)))
    }

    /// Caption scheduling parameters, validated
    pub fn scheduler(&self) -> Result<SchedulerConfig> {
        let config = SchedulerConfig {
            min_text_clip_duration: self.fallbacks.min_text_clip_duration,
            max_text_clip_duration: self.fallbacks.max_text_clip_duration,
            buffer_duration: self.fallbacks.buffer_duration,
            small_gap_threshold: self.fallbacks.small_gap_threshold,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Values used when nothing more specific is given
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Fallbacks {
    /// System prompt used when none is passed on the command line
    pub system_prompt: Option<String>,
    pub min_text_clip_duration: f64,
    /// Only applies to the last caption
    pub max_text_clip_duration: f64,
    /// Shift applied to the successor of a degenerate gap
    pub buffer_duration: f64,
    pub small_gap_threshold: f64,
    pub max_title_width_chars: usize,
    /// Minimum script/transcript similarity before a warning is logged
    pub similarity_threshold: f64,
}

impl Default for Fallbacks {
    fn default() -> Self {
        Self {
            system_prompt: None,
            min_text_clip_duration: 0.1,
            max_text_clip_duration: 5.0,
            buffer_duration: 0.1,
            small_gap_threshold: 0.01,
            max_title_width_chars: 17,
            similarity_threshold: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub script_model: String,
    pub transcription_model: String,
    pub language: String,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            script_model: "gpt-4o".to_string(),
            transcription_model: "whisper-1".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Speech synthesis provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// `openai` or `elevenlabs`
    pub provider: String,
    pub openai: OpenAiVoice,
    pub elevenlabs: ElevenLabsVoice,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            provider: "elevenlabs".to_string(),
            openai: OpenAiVoice::default(),
            elevenlabs: ElevenLabsVoice::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiVoice {
    pub model: String,
    pub voice: String,
}

impl Default for OpenAiVoice {
    fn default() -> Self {
        Self {
            model: "tts-1-hd".to_string(),
            voice: "onyx".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevenLabsVoice {
    /// Voice id, used in the request path
    pub model_id: String,
    pub model: String,
    pub voice_settings: VoiceSettings,
}

impl Default for ElevenLabsVoice {
    fn default() -> Self {
        Self {
            model_id: "pNInz6obpgDQGcFmaJgB".to_string(),
            model: "eleven_monolingual_v1".to_string(),
            voice_settings: VoiceSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.5,
        }
    }
}

/// Output video and title card layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    /// Vertical baseline of the captions, in pixels from the top
    pub height: u32,
    /// Seconds the title card stays on screen (capped by the narration)
    pub title_duration: f64,
    pub title_fontsize: u32,
    /// `[x, y]` where x is `"center"`, `"left"`, `"right"` or a pixel offset
    pub title_position: (String, f64),
    pub fps: u32,
    pub threads: u32,
    pub preset: String,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            height: 900,
            title_duration: 10.0,
            title_fontsize: 120,
            title_position: ("center".to_string(), 250.0),
            fps: 30,
            threads: 8,
            preset: "ultrafast".to_string(),
        }
    }
}

/// Caption appearance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextClipSettings {
    pub fontsize: u32,
    pub color: String,
    pub font: String,
    pub stroke_color: String,
    pub stroke_width: u32,
    pub crossfade_duration: f64,
    /// Pixels of vertical bobbing
    pub oscillation_amplitude: f64,
}

impl Default for TextClipSettings {
    fn default() -> Self {
        Self {
            fontsize: 120,
            color: "white".to_string(),
            font: "fonts/PassionOne-Bold.ttf".to_string(),
            stroke_color: "black".to_string(),
            stroke_width: 8,
            crossfade_duration: 0.035,
            oscillation_amplitude: 15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Fonts {
    pub title: String,
}

impl Default for Fonts {
    fn default() -> Self {
        Self {
            title: "fonts/PassionOne-Bold.ttf".to_string(),
        }
    }
}
