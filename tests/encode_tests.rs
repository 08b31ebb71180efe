// Integration tests for the audio frame encoder
//
// These tests verify the PCM conversion and the WAV container against the
// properties downstream tools rely on.

use anyhow::Result;
use meetscribe::audio::{encode_wav, pcm16_frame, sample_to_i16};
use std::io::Cursor;

#[test]
fn test_sample_clamping_bounds() {
    assert_eq!(sample_to_i16(1.0), i16::MAX);
    assert_eq!(sample_to_i16(-1.0), i16::MIN);
    assert_eq!(sample_to_i16(2.5), i16::MAX, "overdriven sample clamps");
    assert_eq!(sample_to_i16(-7.0), i16::MIN, "overdriven sample clamps");
    assert_eq!(sample_to_i16(0.0), 0);
}

#[test]
fn test_scaling_is_symmetric() {
    // Both polarities scale by their own full-range factor
    assert_eq!(sample_to_i16(0.5), (0.5f32 * 32767.0) as i16);
    assert_eq!(sample_to_i16(-0.5), (-0.5f32 * 32768.0) as i16);
}

#[test]
fn test_pcm16_frame_little_endian() {
    let frame = pcm16_frame(&[0.0, 1.0]);

    assert_eq!(frame.len(), 4);
    assert_eq!(&frame[0..2], &[0x00, 0x00]);
    assert_eq!(&frame[2..4], &i16::MAX.to_le_bytes());
}

#[test]
fn test_encoding_is_deterministic() -> Result<()> {
    let samples: Vec<f32> = (0..500).map(|i| (i as f32 * 0.03).sin()).collect();

    assert_eq!(pcm16_frame(&samples), pcm16_frame(&samples));
    assert_eq!(encode_wav(&samples, 16000)?, encode_wav(&samples, 16000)?);

    Ok(())
}

#[test]
fn test_wav_header_fields() -> Result<()> {
    let samples = vec![0.25f32; 100];
    let wav = encode_wav(&samples, 16000)?;

    // 44-byte header followed by 2 bytes per sample
    assert_eq!(wav.len(), 44 + 200);

    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(u32::from_le_bytes(wav[4..8].try_into()?), 36 + 200);
    assert_eq!(&wav[8..12], b"WAVE");
    assert_eq!(&wav[12..16], b"fmt ");
    assert_eq!(u32::from_le_bytes(wav[16..20].try_into()?), 16);
    assert_eq!(u16::from_le_bytes(wav[20..22].try_into()?), 1, "PCM format");
    assert_eq!(u16::from_le_bytes(wav[22..24].try_into()?), 1, "mono");
    assert_eq!(u32::from_le_bytes(wav[24..28].try_into()?), 16000);
    assert_eq!(
        u32::from_le_bytes(wav[28..32].try_into()?),
        32000,
        "byte rate = rate * block align"
    );
    assert_eq!(u16::from_le_bytes(wav[32..34].try_into()?), 2, "block align");
    assert_eq!(u16::from_le_bytes(wav[34..36].try_into()?), 16, "bit depth");
    assert_eq!(&wav[36..40], b"data");
    assert_eq!(u32::from_le_bytes(wav[40..44].try_into()?), 200);

    Ok(())
}

#[test]
fn test_wav_round_trip_within_quantization_step() -> Result<()> {
    let samples: Vec<f32> = (0..1000)
        .map(|i| (i as f32 * 0.017).sin() * 0.9)
        .collect();

    let wav = encode_wav(&samples, 16000)?;

    let reader = hound::WavReader::new(Cursor::new(wav))?;
    assert_eq!(reader.spec().sample_rate, 16000);
    assert_eq!(reader.spec().channels, 1);

    let decoded: Vec<i16> = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(decoded.len(), samples.len());

    let step = 1.0 / 32767.0;
    for (&original, &raw) in samples.iter().zip(&decoded) {
        let rescaled = if raw < 0 {
            raw as f32 / 32768.0
        } else {
            raw as f32 / 32767.0
        };
        assert!(
            (original - rescaled).abs() <= step,
            "sample {} decoded as {}",
            original,
            rescaled
        );
    }

    Ok(())
}

#[test]
fn test_clamped_samples_never_wrap() -> Result<()> {
    let samples = vec![3.5, -4.0, 1.0001, -1.0001];
    let wav = encode_wav(&samples, 8000)?;

    let reader = hound::WavReader::new(Cursor::new(wav))?;
    let decoded: Vec<i16> = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()?;

    // Everything out of range pins to the nearest rail instead of wrapping
    // to the opposite sign.
    assert_eq!(decoded, vec![i16::MAX, i16::MIN, i16::MAX, i16::MIN]);

    Ok(())
}
