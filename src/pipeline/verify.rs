//! Script vs. transcript comparison
//!
//! A low score usually means the narration skipped or garbled part of the
//! script. It is reported, never treated as a failure.

use std::collections::HashMap;

use log::{info, warn};

use crate::captions::transcript::Transcript;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerificationReport {
    pub similarity: f64,
    pub passed: bool,
}

/// Ratcliff/Obershelp similarity of two strings, in `0.0..=1.0`
///
/// `2 * M / T` where `M` is the number of characters in matching blocks
/// and `T` the total length of both strings. Two empty strings are equal.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`; earliest wins ties
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // run length of the match ending at b[j], for the previous row of a
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_runs = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let run = j
                    .checked_sub(1)
                    .and_then(|prev| run_ending_at.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_runs.insert(j, run);
                if run > best_size {
                    best_i = i + 1 - run;
                    best_j = j + 1 - run;
                    best_size = run;
                }
            }
        }
        run_ending_at = next_runs;
    }

    (best_i, best_j, best_size)
}

/// Compare the narrated script with what the transcriber heard
pub fn verify_transcript(script: &str, transcript: &Transcript, threshold: f64) -> VerificationReport {
    let heard = transcript.full_text();
    let similarity = similarity_ratio(script.trim(), &heard);
    info!("Transcript similarity to original script: {:.2}", similarity);

    let passed = similarity >= threshold;
    if passed {
        info!("Transcript verification passed");
    } else {
        warn!("Transcript similarity is below the threshold of {}", threshold);
    }

    VerificationReport { similarity, passed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::transcript::{Segment, Word};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_similarity_ratio() {
        assert!(close(similarity_ratio("", ""), 1.0));
        assert!(close(similarity_ratio("abc", ""), 0.0));
        assert!(close(similarity_ratio("same text", "same text"), 1.0));
        assert!(close(similarity_ratio("abcd", "bcde"), 0.75));
        // blocks "ab" and "cd"
        assert!(close(similarity_ratio("qabxcd", "abycdf"), 8.0 / 12.0));
    }

    #[test]
    fn test_ratio_is_character_based() {
        assert!(close(similarity_ratio("héllo", "hello"), 0.8));
    }

    #[test]
    fn test_verify_transcript() {
        let transcript = Transcript {
            segments: vec![Segment {
                words: vec![
                    Word::new(" I", 0.0, 0.2),
                    Word::new("left", 0.2, 0.5),
                    Word::new("early.", 0.5, 1.0),
                ],
                ..Segment::default()
            }],
        };

        let report = verify_transcript("I left early.\n", &transcript, 0.7);
        assert!(close(report.similarity, 1.0));
        assert!(report.passed);

        let report = verify_transcript("Something else entirely was said here", &transcript, 0.7);
        assert!(!report.passed);
    }
}
