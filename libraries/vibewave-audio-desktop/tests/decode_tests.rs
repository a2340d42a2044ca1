//! Decoding tests against generated WAV data

use vibewave_audio_desktop::{decode_bytes, resample, AudioError, DecodedAudio};

/// 16-bit PCM WAV file with the given interleaved samples
fn wav_bytes(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let block_align = channels * 2;
    let byte_rate = sample_rate * u32::from(block_align);

    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

#[test]
fn decodes_mono_wav_to_stereo() {
    let samples: Vec<i16> = (0..800).map(|i| if i % 2 == 0 { 8192 } else { -8192 }).collect();
    let audio = decode_bytes(wav_bytes(8000, 1, &samples), Some("wav")).unwrap();

    assert_eq!(audio.sample_rate, 8000);
    assert_eq!(audio.frames(), 800);
    assert!((audio.duration_secs() - 0.1).abs() < 1e-6);
    // Both sides carry the same sample
    for frame in audio.samples.chunks_exact(2) {
        assert_eq!(frame[0], frame[1]);
    }
    assert!((audio.samples[0] - 0.25).abs() < 1e-3);
}

#[test]
fn decodes_stereo_wav_without_hint() {
    let samples: Vec<i16> = (0..400).flat_map(|_| [16384i16, 0]).collect();
    let audio = decode_bytes(wav_bytes(44_100, 2, &samples), None).unwrap();

    assert_eq!(audio.sample_rate, 44_100);
    assert_eq!(audio.frames(), 400);
    assert!((audio.samples[0] - 0.5).abs() < 1e-3);
    assert_eq!(audio.samples[1], 0.0);
}

#[test]
fn empty_wav_is_an_error() {
    let result = decode_bytes(wav_bytes(8000, 1, &[]), Some("wav"));
    assert!(matches!(result, Err(AudioError::Decode(_))));
}

#[test]
fn resampling_scales_length() {
    let audio = DecodedAudio {
        samples: vec![0.0; 22_050 * 2],
        sample_rate: 22_050,
    };
    let out = resample(audio, 44_100).unwrap();

    assert_eq!(out.sample_rate, 44_100);
    let frames = out.frames() as f64;
    assert!((frames - 44_100.0).abs() / 44_100.0 < 0.1, "got {frames} frames");
}
