//! On-disk project layout
//!
//! One directory per video under the content directory, holding every
//! intermediate artifact so a run can be inspected or re-rendered.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{ReelError, Result};
use crate::utils::common::project_dir_name;

/// Metadata stored in `details.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Details {
    pub video_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_provider: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Details {
    /// Details carrying only the title
    pub fn titled(video_title: &str) -> Self {
        Self {
            video_title: video_title.to_string(),
            system_input: None,
            user_input: None,
            script_model: None,
            audio_provider: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Create (or reuse) the directory for `title` under `base`
    pub fn create<P: AsRef<Path>>(base: P, title: &str) -> Result<Self> {
        let root = base.as_ref().join(project_dir_name(title));
        std::fs::create_dir_all(&root)?;
        info!("Project directory: {}", root.display());
        Ok(Self { root })
    }

    /// Open the existing directory for `title` under `base`
    pub fn open<P: AsRef<Path>>(base: P, title: &str) -> Result<Self> {
        let root = base.as_ref().join(project_dir_name(title));
        if !root.is_dir() {
            return Err(ReelError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Project directory not found: {}", root.display()),
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn details_path(&self) -> PathBuf {
        self.root.join("details.json")
    }

    pub fn script_path(&self) -> PathBuf {
        self.root.join("script.txt")
    }

    pub fn audio_path(&self) -> PathBuf {
        self.root.join("audio.mp3")
    }

    pub fn transcript_path(&self) -> PathBuf {
        self.root.join("transcript.json")
    }

    pub fn output_path(&self) -> PathBuf {
        self.root.join("final_video.mp4")
    }

    pub fn save_details(&self, details: &Details) -> Result<()> {
        std::fs::write(self.details_path(), serde_json::to_string_pretty(details)?)?;
        Ok(())
    }

    pub fn load_details(&self) -> Result<Details> {
        let content = std::fs::read_to_string(self.details_path())?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let base = tempfile::tempdir().unwrap();
        let project = Project::create(base.path().join("content"), "My first reel").unwrap();

        assert_eq!(project.root(), base.path().join("content").join("My_first_reel"));
        assert!(project.root().is_dir());
        assert_eq!(project.audio_path().file_name().unwrap(), "audio.mp3");
        assert_eq!(project.output_path().file_name().unwrap(), "final_video.mp4");
    }

    #[test]
    fn test_details_roundtrip_skips_missing_fields() {
        let base = tempfile::tempdir().unwrap();
        let project = Project::create(base.path(), "t").unwrap();
        let details = Details::titled("t");

        project.save_details(&details).unwrap();
        let raw = std::fs::read_to_string(project.details_path()).unwrap();
        assert!(!raw.contains("system_input"));
        assert_eq!(project.load_details().unwrap(), details);
    }

    #[test]
    fn test_details_without_timestamp_still_load() {
        let details: Details = serde_json::from_str(r#"{"video_title": "old"}"#).unwrap();
        assert_eq!(details.video_title, "old");
    }

    #[test]
    fn test_open_missing_project() {
        let base = tempfile::tempdir().unwrap();
        assert!(matches!(Project::open(base.path(), "nope"), Err(ReelError::Io(_))));
    }
}
