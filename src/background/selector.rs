//! Background clip selection
//!
//! Picks a background video long enough to cover the narration. Among the
//! clips that are long enough one is chosen at random so repeated renders of
//! the same narration do not always reuse the same footage. If none is long
//! enough the longest clip is used instead.

use std::path::PathBuf;

use log::{debug, info, warn};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::{ReelError, Result};

/// A background clip with its measured duration in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipCandidate {
    pub path: PathBuf,
    pub duration: f64,
}

impl ClipCandidate {
    pub fn new(path: impl Into<PathBuf>, duration: f64) -> Self {
        Self {
            path: path.into(),
            duration,
        }
    }
}

/// Result of probing one clip file
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Measured(ClipCandidate),
    Failed { path: PathBuf, reason: String },
}

/// Source of the random choice among clips that are long enough
pub trait ClipPicker {
    /// Return an index in `0..count`; `count` is never zero
    fn pick(&mut self, count: usize) -> usize;
}

/// Uniform picker backed by any `rand` generator
pub struct RandomPicker<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomPicker<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomPicker<StdRng> {
    /// Picker seeded from the OS; `Send`, unlike the thread-local generator
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> ClipPicker for RandomPicker<R> {
    fn pick(&mut self, count: usize) -> usize {
        self.rng.gen_range(0..count)
    }
}

/// Choose the background clip for a narration of `target` seconds
///
/// Failed probes are logged and skipped. Errors with
/// [`ReelError::NoCandidatesFound`] when `outcomes` is empty and
/// [`ReelError::NoValidClip`] when every probe failed.
pub fn select_clip(target: f64, outcomes: &[ProbeOutcome], picker: &mut dyn ClipPicker) -> Result<ClipCandidate> {
    if outcomes.is_empty() {
        return Err(ReelError::NoCandidatesFound);
    }

    let measured: Vec<&ClipCandidate> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            ProbeOutcome::Measured(candidate) => Some(candidate),
            ProbeOutcome::Failed { path, reason } => {
                warn!("Skipping background clip {}: {}", path.display(), reason);
                None
            }
        })
        .collect();

    let valid: Vec<&ClipCandidate> = measured.iter().copied().filter(|c| c.duration >= target).collect();
    debug!(
        "{} of {} measured clips cover {:.2}s of narration",
        valid.len(),
        measured.len(),
        target
    );

    if !valid.is_empty() {
        let index = picker.pick(valid.len()).min(valid.len() - 1);
        let chosen = valid[index].clone();
        info!(
            "Selected background clip {} ({:.2}s)",
            chosen.path.display(),
            chosen.duration
        );
        return Ok(chosen);
    }

    // first one wins on equal durations
    let longest = measured
        .iter()
        .copied()
        .fold(None::<&ClipCandidate>, |best, candidate| match best {
            Some(best) if best.duration >= candidate.duration => Some(best),
            _ => Some(candidate),
        });

    match longest {
        Some(candidate) => {
            warn!(
                "No background clip covers {:.2}s, falling back to longest clip {} ({:.2}s)",
                target,
                candidate.path.display(),
                candidate.duration
            );
            Ok(candidate.clone())
        }
        None => Err(ReelError::NoValidClip(outcomes.len())),
    }
}
