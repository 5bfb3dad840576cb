//! # Captions
//!
//! Word-level caption timing: the transcript model and the scheduler that
//! turns timed words into non-overlapping display intervals.

pub mod scheduler;
pub mod transcript;

pub use scheduler::{CaptionInterval, SchedulerConfig, schedule_captions};
pub use transcript::{Segment, Transcript, Word, flatten_words};

#[cfg(test)]
mod tests {
    mod test_scheduler;
}
