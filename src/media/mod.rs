//! # Media
//!
//! Everything that touches audio or video files: duration probing, the
//! background clip pool and the final ffmpeg render.

pub mod audio;
pub mod probe;
pub mod render;

pub use audio::{AudioProber, narration_duration};
pub use probe::{DurationProber, FfprobeProber, find_tool, probe_clip_pool, scan_clip_dir};
pub use render::{RenderJob, Renderer};
