//! PCM WAV encoding and atomic file output.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{Result, SynthError, check_finite};

/// Size of the canonical RIFF/WAVE header preceding the sample data.
pub const HEADER_LEN: usize = 44;

/// Sample layout of the encoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WavFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// Mono 16-bit PCM, the only layout the story tracks use.
    pub fn mono16(sample_rate: u32) -> Self {
        WavFormat {
            sample_rate,
            channels: 1,
            bits_per_sample: 16,
        }
    }

    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(SynthError::invalid("sample_rate", 0.0, "must be > 0"));
        }
        if self.channels == 0 {
            return Err(SynthError::invalid("channels", 0.0, "must be > 0"));
        }
        if self.bits_per_sample != 16 {
            return Err(SynthError::invalid(
                "bits_per_sample",
                self.bits_per_sample as f64,
                "only 16-bit PCM is supported",
            ));
        }
        Ok(())
    }
}

/// Quantize one sample to 16-bit PCM: `round(sample * 32767)`, clamped.
pub fn quantize(sample: f64) -> i16 {
    (sample * 32767.0).round().clamp(-32768.0, 32767.0) as i16
}

/// Encode (interleaved) float samples into a complete WAV byte buffer.
pub fn encode_wav(samples: &[f64], format: WavFormat) -> Result<Vec<u8>> {
    format.validate()?;
    if samples.len() % format.channels as usize != 0 {
        return Err(SynthError::invalid(
            "samples",
            samples.len() as f64,
            "length must be a multiple of the channel count",
        ));
    }
    check_finite(samples)?;

    let data_len = samples.len() * (format.bits_per_sample as usize / 8);
    let data_size = u32::try_from(data_len)
        .ok()
        .filter(|size| size.checked_add(36).is_some())
        .ok_or_else(|| {
            SynthError::invalid("samples", samples.len() as f64, "too long for a RIFF container")
        })?;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(HEADER_LEN + data_len);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&format.channels.to_le_bytes());
    buf.extend_from_slice(&format.sample_rate.to_le_bytes());
    buf.extend_from_slice(&format.byte_rate().to_le_bytes());
    buf.extend_from_slice(&format.block_align().to_le_bytes());
    buf.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&quantize(sample).to_le_bytes());
    }

    Ok(buf)
}

/// Write `bytes` to `path` so readers only ever see a complete file.
///
/// The bytes go to a temporary file next to `path`, which is flushed, synced
/// and then renamed over the destination. If anything fails the temporary file
/// is removed when dropped and `path` is left as it was.
pub fn write_wav(path: &Path, bytes: &[u8]) -> Result<u64> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut staged = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        writer.write_all(bytes)?;
        writer.flush()?;
    }
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| SynthError::Io(e.error))?;

    tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(bytes.len() as u64)
}
