//! # Pipeline
//!
//! Runs a project from prompt to rendered video:
//! script → review checkpoint → narration → transcript → captions →
//! background → render. Every step writes its artifact into the project
//! directory, so a run can be resumed from the transcript with
//! [`Pipeline::render_project`].

use std::path::{Path, PathBuf};

use log::info;

use crate::background::selector::{ClipPicker, RandomPicker, select_clip};
use crate::background::trimmer::trim_to_narration;
use crate::captions::scheduler::schedule_captions;
use crate::captions::transcript::Transcript;
use crate::config::AppConfig;
use crate::error::{ReelError, Result};
use crate::media::audio::AudioProber;
use crate::media::probe::{DurationProber, probe_clip_pool, scan_clip_dir};
use crate::media::render::{RenderJob, Renderer};
use crate::services::script::{ScriptWriter, clean_script};
use crate::services::transcription::Transcriber;
use crate::services::tts::SpeechSynthesizer;

pub mod checkpoint;
pub mod project;
pub mod verify;

pub use checkpoint::{Checkpoint, StdinCheckpoint};
pub use project::{Details, Project};
pub use verify::{VerificationReport, similarity_ratio, verify_transcript};

const REVIEW_PROMPT: &str =
    "Please review and edit the script if needed. Once updated, save the file and then press ENTER to continue.";

/// Input of [`Pipeline::generate`]
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub video_title: String,
    /// Falls back to `fallbacks.system_prompt` from the config
    pub system_input: Option<String>,
    pub user_input: String,
}

/// Input of [`Pipeline::from_audio`]
#[derive(Debug, Clone)]
pub struct AudioRequest {
    pub video_title: String,
    pub audio_path: PathBuf,
}

pub struct Pipeline {
    config: AppConfig,
    renderer: Renderer,
    clip_prober: Box<dyn DurationProber>,
    narration_prober: Box<dyn DurationProber>,
    picker: Box<dyn ClipPicker + Send>,
    checkpoint: Box<dyn Checkpoint>,
    transcriber: Option<Box<dyn Transcriber>>,
    script_writer: Option<Box<dyn ScriptWriter>>,
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
}

impl Pipeline {
    /// Pipeline able to render existing projects
    ///
    /// [`Pipeline::from_audio`] also needs a transcriber, and
    /// [`Pipeline::generate`] a script writer and a synthesizer on top.
    pub fn new(config: AppConfig, renderer: Renderer, clip_prober: Box<dyn DurationProber>) -> Self {
        Self {
            config,
            renderer,
            clip_prober,
            narration_prober: Box::new(AudioProber),
            picker: Box::new(RandomPicker::from_entropy()),
            checkpoint: Box::new(StdinCheckpoint),
            transcriber: None,
            script_writer: None,
            synthesizer: None,
        }
    }

    pub fn with_transcriber(mut self, transcriber: Box<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_script_writer(mut self, writer: Box<dyn ScriptWriter>) -> Self {
        self.script_writer = Some(writer);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Box<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn with_checkpoint(mut self, checkpoint: Box<dyn Checkpoint>) -> Self {
        self.checkpoint = checkpoint;
        self
    }

    pub fn with_picker(mut self, picker: Box<dyn ClipPicker + Send>) -> Self {
        self.picker = picker;
        self
    }

    pub fn with_narration_prober(mut self, prober: Box<dyn DurationProber>) -> Self {
        self.narration_prober = prober;
        self
    }

    /// Full run: write a script, wait for review, narrate, transcribe,
    /// verify and render
    pub async fn generate(&mut self, request: &GenerateRequest) -> Result<PathBuf> {
        let system_input = request
            .system_input
            .clone()
            .or_else(|| self.config.fallbacks.system_prompt.clone())
            .ok_or_else(|| {
                ReelError::Configuration("No system prompt provided and no fallback found in config".to_string())
            })?;
        let writer = self
            .script_writer
            .as_ref()
            .ok_or_else(|| ReelError::Configuration("No script writer configured".to_string()))?;
        let synthesizer = self
            .synthesizer
            .as_ref()
            .ok_or_else(|| ReelError::Configuration("No audio provider configured".to_string()))?;

        let project = Project::create(&self.config.base_content_path, &request.video_title)?;
        let mut details = Details::titled(&request.video_title);
        details.system_input = Some(system_input.clone());
        details.user_input = Some(request.user_input.clone());
        details.script_model = Some(self.config.openai_settings.script_model.clone());
        details.audio_provider = Some(synthesizer.name().to_string());
        project.save_details(&details)?;

        let script = clean_script(&writer.write_script(&system_input, &request.user_input).await?);
        tokio::fs::write(project.script_path(), &script).await?;
        info!("Script generated at: {}", project.script_path().display());

        self.checkpoint.confirm(REVIEW_PROMPT).await?;
        let script = tokio::fs::read_to_string(project.script_path()).await?;

        synthesizer.synthesize(&script, &project.audio_path()).await?;
        info!("Audio generated at: {}", project.audio_path().display());

        let transcript = self.transcribe(&project).await?;
        verify_transcript(&script, &transcript, self.config.fallbacks.similarity_threshold);

        self.render_project(&project).await
    }

    /// Build a video around narration recorded elsewhere
    pub async fn from_audio(&mut self, request: &AudioRequest) -> Result<PathBuf> {
        if !request.audio_path.is_file() {
            return Err(ReelError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Provided audio file {} does not exist", request.audio_path.display()),
            )));
        }

        let project = Project::create(&self.config.base_content_path, &request.video_title)?;
        project.save_details(&Details::titled(&request.video_title))?;

        let target = project.audio_path();
        if !same_file(&request.audio_path, &target) {
            tokio::fs::copy(&request.audio_path, &target).await?;
        }

        self.transcribe(&project).await?;
        self.render_project(&project).await
    }

    /// Render from the artifacts already in the project directory
    pub async fn render_project(&mut self, project: &Project) -> Result<PathBuf> {
        let job = self.plan_render(project)?;
        self.renderer.render(&job).await
    }

    async fn transcribe(&self, project: &Project) -> Result<Transcript> {
        let transcriber = self
            .transcriber
            .as_ref()
            .ok_or_else(|| ReelError::Configuration("No transcriber configured".to_string()))?;
        let transcript = transcriber.transcribe(&project.audio_path()).await?;
        transcript.save(project.transcript_path())?;
        info!("Transcript generated at: {}", project.transcript_path().display());
        Ok(transcript)
    }

    /// Everything up to the ffmpeg call: captions, background and layout
    pub fn plan_render(&mut self, project: &Project) -> Result<RenderJob> {
        let transcript = Transcript::load(project.transcript_path())?;
        let details = project.load_details()?;
        let narration = project.audio_path();
        let narration_duration = self.narration_prober.probe(&narration)?;
        info!("Narration is {:.2}s long", narration_duration);

        let captions = schedule_captions(&transcript.words(), &self.config.scheduler()?);

        let clips = scan_clip_dir(Path::new(&self.config.videos_dir))?;
        let outcomes = probe_clip_pool(&clips, self.clip_prober.as_ref());
        let clip = select_clip(narration_duration, &outcomes, self.picker.as_mut())?;
        let background = trim_to_narration(&clip, narration_duration);

        Ok(RenderJob {
            background,
            narration,
            narration_duration,
            captions,
            title: details.video_title,
            output: project.output_path(),
        })
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    mod test_pipeline;
}
