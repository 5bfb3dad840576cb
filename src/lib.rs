//! # reelsmith
//!
//! Builds short narrated videos: a generated (or supplied) narration,
//! word-by-word captions timed from its transcript, and a background clip
//! from a local pool.

pub mod background;
pub mod captions;
pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use error::{ReelError, Result};
pub use pipeline::Pipeline;
