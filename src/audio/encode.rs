use anyhow::{Context, Result};
use std::io::Cursor;

/// Convert one float sample in [-1.0, 1.0] to a signed 16-bit PCM sample.
///
/// Out-of-range samples are clamped first so scaling can never wrap around.
/// Positive samples scale by `i16::MAX` and negative samples by 32768 so that
/// both ends of the range map onto the full 16-bit range without bias.
pub fn sample_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode float samples as a little-endian 16-bit PCM frame suitable for
/// low-latency transmission over the realtime socket.
pub fn pcm16_frame(samples: &[f32]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        frame.extend_from_slice(&sample_to_i16(sample).to_le_bytes());
    }
    frame
}

/// Encode float samples as a complete single-channel 16-bit PCM WAV file.
///
/// The container (44-byte header, RIFF/data chunk sizes) is produced by
/// `hound`, so downstream tools accept the blob without remuxing.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .context("Failed to create WAV writer")?;
        for &sample in samples {
            writer
                .write_sample(sample_to_i16(sample))
                .context("Failed to write sample to WAV")?;
        }
        writer.finalize().context("Failed to finalize WAV data")?;
    }

    Ok(cursor.into_inner())
}
