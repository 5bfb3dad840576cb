//! Caption interval scheduling
//!
//! Turns the flat word sequence into one on-screen interval per word. Each
//! caption stays visible at least `min_text_clip_duration`, never runs past
//! the start of the next caption, and the last caption is capped at
//! `max_text_clip_duration`.
//!
//! When two words start (almost) at the same time there is no room for a
//! minimum-length caption. Such a degenerate gap is repaired by pushing the
//! successor's start later by `buffer_duration`. Because the successor's own
//! gap is then measured from its pushed start, a run of degenerate gaps keeps
//! pushing each following word in turn.

use serde::{Deserialize, Serialize};

use crate::captions::transcript::Word;
use crate::error::{ReelError, Result};

/// Timing policy for caption intervals, all values in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    pub min_text_clip_duration: f64,
    pub max_text_clip_duration: f64,
    pub buffer_duration: f64,
    /// Gaps at or below this are degenerate
    pub small_gap_threshold: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_text_clip_duration: 0.1,
            max_text_clip_duration: 5.0,
            buffer_duration: 0.1,
            small_gap_threshold: 0.01,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("min_text_clip_duration", self.min_text_clip_duration),
            ("max_text_clip_duration", self.max_text_clip_duration),
            ("buffer_duration", self.buffer_duration),
            ("small_gap_threshold", self.small_gap_threshold),
        ];
        if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ReelError::Configuration(format!("{} must be finite, got {}", name, value)));
        }
        if self.min_text_clip_duration <= 0.0 {
            return Err(ReelError::Configuration(
                "min_text_clip_duration must be greater than zero".to_string(),
            ));
        }
        if self.max_text_clip_duration < self.min_text_clip_duration {
            return Err(ReelError::Configuration(format!(
                "max_text_clip_duration ({}) is below min_text_clip_duration ({})",
                self.max_text_clip_duration, self.min_text_clip_duration
            )));
        }
        if self.buffer_duration < 0.0 || self.small_gap_threshold < 0.0 {
            return Err(ReelError::Configuration(
                "buffer_duration and small_gap_threshold must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// One caption placement handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionInterval {
    pub text: String,
    pub start_time: f64,
    pub duration: f64,
}

impl CaptionInterval {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Adjustment owed to the next word by the word before it
#[derive(Debug, Clone, Copy)]
struct Carry {
    shift: f64,
    not_before: f64,
}

impl Default for Carry {
    fn default() -> Self {
        Self {
            shift: 0.0,
            not_before: f64::NEG_INFINITY,
        }
    }
}

impl Carry {
    fn apply(&self, start: f64) -> f64 {
        (start + self.shift).max(self.not_before)
    }
}

/// Schedule one caption interval per word, in order
///
/// Works on the borrowed words without touching them; the start shifts from
/// gap repairs are threaded through the pass as a [`Carry`].
pub fn schedule_captions(words: &[Word], config: &SchedulerConfig) -> Vec<CaptionInterval> {
    words
        .iter()
        .enumerate()
        .scan(Carry::default(), |carry, (i, word)| {
            let start = carry.apply(word.start);
            let duration = match words.get(i + 1) {
                Some(next) => {
                    let (duration, next_carry) = fit_before_next(word, start, next.start, config);
                    *carry = next_carry;
                    duration
                }
                None => last_word_duration(word, start, config),
            };

            Some(CaptionInterval {
                text: word.text.clone(),
                start_time: start,
                duration,
            })
        })
        .collect()
}

fn fit_before_next(word: &Word, start: f64, next_start: f64, config: &SchedulerConfig) -> (f64, Carry) {
    let gap = next_start - start;
    if gap <= config.small_gap_threshold {
        let duration = config.min_text_clip_duration;
        let carry = Carry {
            shift: config.buffer_duration,
            not_before: start + duration,
        };
        return (duration, carry);
    }

    let spoken = (word.end - start).max(config.min_text_clip_duration);
    (spoken.min(gap), Carry::default())
}

fn last_word_duration(word: &Word, start: f64, config: &SchedulerConfig) -> f64 {
    (word.end - start)
        .max(config.min_text_clip_duration)
        .min(config.max_text_clip_duration)
}
