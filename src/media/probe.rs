//! Background clip discovery and duration probing
//!
//! Probes run in parallel; each one is independent, and a failure only
//! affects its own clip.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info, warn};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::background::selector::{ClipCandidate, ProbeOutcome};
use crate::error::{ReelError, Result};

/// Something that can measure the duration of a media file in seconds
pub trait DurationProber: Send + Sync {
    fn probe(&self, path: &Path) -> Result<f64>;
}

/// Measures durations with `ffprobe`
pub struct FfprobeProber {
    ffprobe: PathBuf,
}

impl FfprobeProber {
    /// Locate `ffprobe` on PATH
    pub fn new() -> Result<Self> {
        Ok(Self {
            ffprobe: find_tool("ffprobe")?,
        })
    }
}

impl DurationProber for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<f64> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()?;

        if !output.status.success() {
            return Err(ReelError::VideoProcessing(format!(
                "ffprobe failed with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Find an external executable on PATH
pub fn find_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| ReelError::ToolNotFound(name.to_string()))
}

/// Parse the bare seconds value printed by ffprobe
pub fn parse_duration(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let duration = trimmed
        .parse::<f64>()
        .map_err(|_| ReelError::VideoProcessing(format!("Failed to parse duration: {:?}", trimmed)))?;

    if !duration.is_finite() || duration < 0.0 {
        return Err(ReelError::VideoProcessing(format!("Invalid duration: {}", duration)));
    }
    Ok(duration)
}

/// List the `.mp4` files directly inside `dir`, sorted by name
pub fn scan_clip_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ReelError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Background video directory not found: {}", dir.display()),
        )));
    }

    let mut clips = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        // dangling links are skipped, not fatal
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let is_mp4 = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"));

        if entry.file_type().is_file() && is_mp4 {
            clips.push(entry.into_path());
        }
    }

    info!("Found {} background clips in {}", clips.len(), dir.display());
    Ok(clips)
}

/// Probe every clip, keeping failures as tagged outcomes in input order
pub fn probe_clip_pool(paths: &[PathBuf], prober: &dyn DurationProber) -> Vec<ProbeOutcome> {
    paths
        .par_iter()
        .map(|path| match prober.probe(path) {
            Ok(duration) => {
                debug!("{}: {:.2}s", path.display(), duration);
                ProbeOutcome::Measured(ClipCandidate::new(path.clone(), duration))
            }
            Err(e) => ProbeOutcome::Failed {
                path: path.clone(),
                reason: e.to_string(),
            },
        })
        .collect()
}
