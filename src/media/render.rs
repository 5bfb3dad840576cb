//! Final video compositing with ffmpeg
//!
//! Captions and the title card are burned in with `drawtext`. The filter
//! graph goes into a script file, and every caption text into its own
//! text file, so user text never has to survive filter-graph escaping.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use log::{debug, info};
use tokio::process::Command as TokioCommand;

use crate::background::trimmer::TrimmedClip;
use crate::captions::scheduler::CaptionInterval;
use crate::config::{AppConfig, TextClipSettings, VideoSettings};
use crate::error::{ReelError, Result};
use crate::media::probe::find_tool;

/// Line height of the title card relative to its font size
const TITLE_LINE_SPACING: f64 = 1.2;

/// Everything needed to render one project
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub background: TrimmedClip,
    pub narration: PathBuf,
    pub narration_duration: f64,
    pub captions: Vec<CaptionInterval>,
    pub title: String,
    pub output: PathBuf,
}

/// Drives ffmpeg with the layout from the config
pub struct Renderer {
    ffmpeg: PathBuf,
    video: VideoSettings,
    text: TextClipSettings,
    title_font: String,
    max_title_width_chars: usize,
}

impl Renderer {
    /// Locate `ffmpeg` and capture the layout settings
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self::with_ffmpeg(find_tool("ffmpeg")?, config))
    }

    pub fn with_ffmpeg(ffmpeg: PathBuf, config: &AppConfig) -> Self {
        Self {
            ffmpeg,
            video: config.video_settings.clone(),
            text: config.text_clip_settings.clone(),
            title_font: config.fonts.title.clone(),
            max_title_width_chars: config.fallbacks.max_title_width_chars,
        }
    }

    pub async fn render(&self, job: &RenderJob) -> Result<PathBuf> {
        let scratch = tempfile::tempdir()?;
        let script = self.write_filter_script(job, scratch.path())?;
        let args = self.ffmpeg_args(job, &script);

        info!(
            "Rendering {} captions over {} into {}",
            job.captions.len(),
            job.background.path.display(),
            job.output.display()
        );
        debug!("ffmpeg {:?}", args);

        let output = TokioCommand::new(&self.ffmpeg)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(10).collect();
            return Err(ReelError::VideoProcessing(format!(
                "ffmpeg failed with status {}: {}",
                output.status,
                tail.into_iter().rev().collect::<Vec<_>>().join("\n")
            )));
        }

        info!("Final video with captions saved at: {}", job.output.display());
        Ok(job.output.clone())
    }

    /// Write caption/title text files and the filter graph; returns the script path
    fn write_filter_script(&self, job: &RenderJob, scratch: &Path) -> Result<PathBuf> {
        let mut filters = Vec::with_capacity(job.captions.len() + 2);

        for (i, caption) in job.captions.iter().enumerate() {
            let text_file = scratch.join(format!("caption_{:05}.txt", i));
            std::fs::write(&text_file, caption.text.trim().to_uppercase())?;
            filters.push(caption_filter(&text_file, caption, &self.text, self.video.height));
        }

        let title_duration = self.video.title_duration.min(job.narration_duration);
        let title = wrap_text(&job.title.to_uppercase(), self.max_title_width_chars);
        for (i, line) in title.lines().enumerate() {
            let text_file = scratch.join(format!("title_{:02}.txt", i));
            std::fs::write(&text_file, line)?;
            filters.push(self.title_line_filter(&text_file, i, title_duration));
        }

        let graph = if filters.is_empty() {
            "[0:v]null[v]".to_string()
        } else {
            format!("[0:v]{}[v]", filters.join(",\n"))
        };

        let script = scratch.join("filters.txt");
        std::fs::write(&script, graph)?;
        Ok(script)
    }

    fn title_line_filter(&self, text_file: &Path, line: usize, duration: f64) -> String {
        let (x, y) = &self.video.title_position;
        let y = y + line as f64 * self.video.title_fontsize as f64 * TITLE_LINE_SPACING;
        format!(
            "drawtext=fontfile={}:textfile={}:expansion=none:fontsize={}:fontcolor=black:\
             box=1:boxcolor=white:borderw=5:bordercolor=white:x='{}':y='{:.1}':enable='lt(t,{:.6})'",
            quote_filter_value(&self.title_font),
            quote_filter_value(&text_file.to_string_lossy()),
            self.video.title_fontsize,
            horizontal_position(x),
            y,
            duration
        )
    }

    fn ffmpeg_args(&self, job: &RenderJob, script: &Path) -> Vec<String> {
        let mut args = vec!["-y".to_string()];
        if let Some(end) = job.background.range_end {
            args.extend(["-t".to_string(), format!("{:.6}", end)]);
        }
        args.extend([
            "-i".to_string(),
            job.background.path.to_string_lossy().to_string(),
            "-i".to_string(),
            job.narration.to_string_lossy().to_string(),
            "-filter_complex_script".to_string(),
            script.to_string_lossy().to_string(),
            "-map".to_string(),
            "[v]".to_string(),
            "-map".to_string(),
            "1:a".to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            self.video.preset.clone(),
            "-threads".to_string(),
            self.video.threads.to_string(),
            "-r".to_string(),
            self.video.fps.to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-shortest".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            job.output.to_string_lossy().to_string(),
        ]);
        args
    }
}

/// `drawtext` for one caption: centered, bobbing around `baseline`, faded in
pub fn caption_filter(
    text_file: &Path,
    caption: &CaptionInterval,
    settings: &TextClipSettings,
    baseline: u32,
) -> String {
    let start = caption.start_time;
    let mut filter = format!(
        "drawtext=fontfile={}:textfile={}:expansion=none:fontsize={}:fontcolor={}:borderw={}:bordercolor={}:\
         x='(w-text_w)/2':y='{}-{}*sin(2*PI*(t-{:.6}))'",
        quote_filter_value(&settings.font),
        quote_filter_value(&text_file.to_string_lossy()),
        settings.fontsize,
        quote_filter_value(&settings.color),
        settings.stroke_width,
        quote_filter_value(&settings.stroke_color),
        baseline,
        settings.oscillation_amplitude,
        start
    );

    if settings.crossfade_duration > 0.0 {
        let fade = settings.crossfade_duration;
        filter.push_str(&format!(
            ":alpha='if(lt(t-{start:.6},{fade:.6}),(t-{start:.6})/{fade:.6},1)'"
        ));
    }

    filter.push_str(&format!(
        ":enable='gte(t,{:.6})*lt(t,{:.6})'",
        start,
        caption.end_time()
    ));
    filter
}

/// Map a configured x position onto a drawtext expression
fn horizontal_position(x: &str) -> String {
    match x {
        "center" => "(w-text_w)/2".to_string(),
        "left" => "0".to_string(),
        "right" => "w-text_w".to_string(),
        other => other.parse::<f64>().map(|v| format!("{:.1}", v)).unwrap_or_else(|_| "(w-text_w)/2".to_string()),
    }
}

/// Quote a value for both the filter-option and filter-graph parsers
pub fn quote_filter_value(value: &str) -> String {
    let option_level = value
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'");
    format!("'{}'", option_level.replace('\'', "'\\''"))
}

/// Greedy word wrap to `width` characters; longer words are split
pub fn wrap_text(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..width).collect());
        }
        if word.is_empty() {
            continue;
        }

        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() { 0 } else { current.chars().count() + 1 };
        if needed + word.chars().count() > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_like_fill() {
        assert_eq!(wrap_text("AM I THE JERK FOR LEAVING EARLY", 17), "AM I THE JERK FOR\nLEAVING EARLY");
        assert_eq!(wrap_text("short", 17), "short");
        assert_eq!(wrap_text("abcdefghij", 4), "abcd\nefgh\nij");
        assert_eq!(wrap_text("", 17), "");
    }

    #[test]
    fn test_quote_filter_value() {
        assert_eq!(quote_filter_value("fonts/Bold.ttf"), "'fonts/Bold.ttf'");
        assert_eq!(quote_filter_value("C:\\fonts"), "'C\\:\\\\fonts'");
        assert_eq!(quote_filter_value("it's"), "'it\\'\\''s'");
    }

    #[test]
    fn test_caption_filter_timing() {
        let caption = CaptionInterval {
            text: "hello".to_string(),
            start_time: 1.5,
            duration: 0.25,
        };
        let filter = caption_filter(
            Path::new("/tmp/c.txt"),
            &caption,
            &TextClipSettings::default(),
            900,
        );

        assert!(filter.starts_with("drawtext=fontfile='fonts/PassionOne-Bold.ttf':textfile='/tmp/c.txt'"));
        assert!(filter.contains("y='900-15*sin(2*PI*(t-1.500000))'"));
        assert!(filter.contains("enable='gte(t,1.500000)*lt(t,1.750000)'"));
        assert!(filter.contains("alpha='if(lt(t-1.500000,0.035000),(t-1.500000)/0.035000,1)'"));
    }

    #[test]
    fn test_caption_filter_without_fade() {
        let caption = CaptionInterval {
            text: "x".to_string(),
            start_time: 0.0,
            duration: 1.0,
        };
        let settings = TextClipSettings {
            crossfade_duration: 0.0,
            ..TextClipSettings::default()
        };
        assert!(!caption_filter(Path::new("c.txt"), &caption, &settings, 900).contains("alpha="));
    }

    #[test]
    fn test_filter_script_and_args() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default();
        let renderer = Renderer::with_ffmpeg(PathBuf::from("ffmpeg"), &config);
        let job = RenderJob {
            background: TrimmedClip {
                path: PathBuf::from("videos/bg.mp4"),
                range_start: 0.0,
                range_end: Some(12.0),
            },
            narration: PathBuf::from("content/t/audio.mp3"),
            narration_duration: 12.0,
            captions: vec![
                CaptionInterval {
                    text: " hello".to_string(),
                    start_time: 0.0,
                    duration: 0.4,
                },
                CaptionInterval {
                    text: "world".to_string(),
                    start_time: 0.4,
                    duration: 0.5,
                },
            ],
            title: "am i the jerk for leaving early".to_string(),
            output: PathBuf::from("content/t/final_video.mp4"),
        };

        let script = renderer.write_filter_script(&job, dir.path()).unwrap();
        let graph = std::fs::read_to_string(&script).unwrap();
        assert!(graph.starts_with("[0:v]drawtext="));
        assert!(graph.ends_with("[v]"));
        assert_eq!(graph.matches("drawtext=").count(), 4);
        assert!(graph.contains("enable='lt(t,10.000000)'"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("caption_00000.txt")).unwrap(),
            "HELLO"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("title_01.txt")).unwrap(),
            "LEAVING EARLY"
        );

        let args = renderer.ffmpeg_args(&job, &script);
        assert_eq!(&args[..3], &["-y", "-t", "12.000000"]);
        assert!(args.contains(&"-shortest".to_string()));
        assert_eq!(args.last().unwrap(), "content/t/final_video.mp4");
    }

    #[test]
    fn test_untrimmed_background_has_no_limit() {
        let config = AppConfig::default();
        let renderer = Renderer::with_ffmpeg(PathBuf::from("ffmpeg"), &config);
        let job = RenderJob {
            background: TrimmedClip {
                path: PathBuf::from("bg.mp4"),
                range_start: 0.0,
                range_end: None,
            },
            narration: PathBuf::from("audio.mp3"),
            narration_duration: 20.0,
            captions: Vec::new(),
            title: String::new(),
            output: PathBuf::from("out.mp4"),
        };
        let args = renderer.ffmpeg_args(&job, Path::new("filters.txt"));
        assert!(!args.contains(&"-t".to_string()));
    }
}
