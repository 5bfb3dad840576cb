//! Narration audio inspection

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use log::debug;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::TimeBase;

use crate::error::{ReelError, Result};
use crate::media::probe::DurationProber;

/// Duration of the narration track in seconds
///
/// Uses the frame count from the track header when the container has one
/// (WAV), otherwise adds up packet durations (MP3, AAC).
pub fn narration_duration<P: AsRef<Path>>(path: P) -> Result<f64> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| ReelError::AudioProcessing(format!("Unsupported audio file {}: {}", path.display(), e)))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ReelError::AudioProcessing(format!("No audio track in {}", path.display())))?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    if let (Some(frames), Some(rate)) = (params.n_frames, params.sample_rate) {
        if rate > 0 {
            let duration = frames as f64 / rate as f64;
            debug!("{}: {:.3}s from header", path.display(), duration);
            return Ok(duration);
        }
    }

    let time_base = params
        .time_base
        .or_else(|| params.sample_rate.map(|rate| TimeBase::new(1, rate)))
        .ok_or_else(|| ReelError::AudioProcessing(format!("No time base for {}", path.display())))?;

    let mut total: u64 = 0;
    loop {
        match format.next_packet() {
            Ok(packet) if packet.track_id() == track_id => total += packet.dur,
            Ok(_) => {}
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => {
                return Err(ReelError::AudioProcessing(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        }
    }

    let time = time_base.calc_time(total);
    let duration = time.seconds as f64 + time.frac;
    debug!("{}: {:.3}s from packets", path.display(), duration);
    Ok(duration)
}

/// [`DurationProber`] for narration files, backed by [`narration_duration`]
pub struct AudioProber;

impl DurationProber for AudioProber {
    fn probe(&self, path: &Path) -> Result<f64> {
        narration_duration(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal 16-bit mono PCM WAV file
    fn write_wav(path: &Path, sample_rate: u32, samples: u32) {
        let data_len = samples * 2;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(bytes.len() + data_len as usize, 0);
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_wav_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narration.wav");
        write_wav(&path, 8000, 12000);

        let duration = narration_duration(&path).unwrap();
        assert!((duration - 1.5).abs() < 1e-6, "got {}", duration);
    }

    #[test]
    fn test_garbage_is_audio_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audio.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();

        assert!(matches!(
            narration_duration(&path),
            Err(ReelError::AudioProcessing(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            narration_duration("/nonexistent/audio.mp3"),
            Err(ReelError::Io(_))
        ));
    }
}
