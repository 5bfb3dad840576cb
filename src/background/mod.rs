//! # Background footage
//!
//! Choosing a background clip for the narration and fitting it to length.

pub mod selector;
pub mod trimmer;

pub use selector::{ClipCandidate, ClipPicker, ProbeOutcome, RandomPicker, select_clip};
pub use trimmer::{TrimmedClip, trim_to_narration};
