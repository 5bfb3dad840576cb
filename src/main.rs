use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};

use reelsmith::config::AppConfig;
use reelsmith::media::probe::FfprobeProber;
use reelsmith::media::render::Renderer;
use reelsmith::pipeline::{AudioRequest, GenerateRequest, Pipeline, Project};
use reelsmith::services::script::OpenAiScriptWriter;
use reelsmith::services::transcription::OpenAiTranscriber;
use reelsmith::services::tts::speech_provider;
use reelsmith::utils::common::api_key_from_env;
use reelsmith::utils::logger::init_logger;

#[derive(Parser, Debug)]
#[command(name = "reelsmith", version, about = "Narrated short videos with word-level captions")]
struct Args {
    /// Path to the JSON config file
    #[arg(long, global = true, default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a script, narrate it and render the video
    Generate {
        #[arg(long)]
        video_title: String,
        /// System prompt for script generation; falls back to the config
        #[arg(long)]
        system_input: Option<String>,
        /// User input (e.g. a reddit post) for script generation
        #[arg(long)]
        user_input: String,
    },
    /// Render a video around an existing narration file
    Transcript {
        #[arg(long)]
        video_title: String,
        #[arg(long)]
        audio_path: PathBuf,
    },
    /// Re-render an existing project from its transcript
    Render {
        #[arg(long)]
        video_title: String,
    },
}

fn render_pipeline(config: &AppConfig) -> Result<Pipeline> {
    let renderer = Renderer::new(config).context("ffmpeg is required for rendering")?;
    let prober = FfprobeProber::new().context("ffprobe is required to measure background clips")?;
    Ok(Pipeline::new(config.clone(), renderer, Box::new(prober)))
}

fn transcribing_pipeline(config: &AppConfig) -> Result<Pipeline> {
    let transcriber = OpenAiTranscriber::new(
        api_key_from_env("OPENAI_API_KEY")?,
        &config.openai_settings.transcription_model,
        &config.openai_settings.language,
    )?;
    Ok(render_pipeline(config)?.with_transcriber(Box::new(transcriber)))
}

async fn run(args: Args) -> Result<PathBuf> {
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    config.scheduler()?;

    match args.command {
        Command::Generate {
            video_title,
            system_input,
            user_input,
        } => {
            let writer = OpenAiScriptWriter::new(
                api_key_from_env("OPENAI_API_KEY")?,
                &config.openai_settings.script_model,
            )?;
            let synthesizer = speech_provider(&config.audio_settings.provider, &config)?;
            let mut pipeline = transcribing_pipeline(&config)?
                .with_script_writer(Box::new(writer))
                .with_synthesizer(synthesizer);

            let request = GenerateRequest {
                video_title,
                system_input,
                user_input,
            };
            Ok(pipeline.generate(&request).await?)
        }
        Command::Transcript {
            video_title,
            audio_path,
        } => {
            let mut pipeline = transcribing_pipeline(&config)?;
            let request = AudioRequest {
                video_title,
                audio_path,
            };
            Ok(pipeline.from_audio(&request).await?)
        }
        Command::Render { video_title } => {
            let project = Project::open(&config.base_content_path, &video_title)?;
            let mut pipeline = render_pipeline(&config)?;
            Ok(pipeline.render_project(&project).await?)
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_logger();

    let args = Args::parse();
    match run(args).await {
        Ok(output) => info!("Done: {}", output.display()),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
