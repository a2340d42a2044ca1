//! Media decoding and sample rate conversion
//!
//! Everything here works on in-memory buffers: the loader downloads the
//! whole file first, decodes it to interleaved stereo f32 and converts it
//! to the output device rate before handing it to the audio thread.

use crate::error::{AudioError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::io::{Cursor, ErrorKind};
use symphonia::core::{
    audio::SampleBuffer,
    codecs::DecoderOptions,
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};

/// Decoded audio, always interleaved stereo
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved L/R samples
    pub samples: Vec<f32>,
    /// Frames per second
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Number of stereo frames
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    /// Length in seconds (0 when the rate is unknown)
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// File extension of a media reference, used as a probe hint.
///
/// Query strings and fragments are ignored.
pub fn extension_hint(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    let file = path.rsplit('/').next()?;
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

/// Decode a complete media file held in memory
pub fn decode_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<DecodedAudio> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Decode(format!("unrecognised format: {e}")))?;

    let mut format = probed.format;

    let (track_id, codec_params) = {
        let track = format
            .default_track()
            .ok_or_else(|| AudioError::Decode("no audio track".to_string()))?;
        (track.id, track.codec_params.clone())
    };

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(format!("unsupported codec: {e}")))?;

    let mut sample_rate = codec_params.sample_rate;
    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::debug!("Skipping corrupt packet: {}", e);
                continue;
            }
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        append_stereo(&mut samples, buffer.samples(), spec.channels.count());
    }

    let sample_rate = sample_rate.ok_or_else(|| AudioError::Decode("unknown sample rate".into()))?;
    if samples.is_empty() {
        return Err(AudioError::Decode("no audio frames".to_string()));
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

/// Append interleaved samples with any channel count as stereo.
///
/// Mono is duplicated to both sides; channels past the second are dropped.
fn append_stereo(out: &mut Vec<f32>, interleaved: &[f32], channels: usize) {
    match channels {
        0 => {}
        1 => {
            out.reserve(interleaved.len() * 2);
            for &sample in interleaved {
                out.push(sample);
                out.push(sample);
            }
        }
        2 => out.extend_from_slice(interleaved),
        n => {
            for frame in interleaved.chunks_exact(n) {
                out.push(frame[0]);
                out.push(frame[1]);
            }
        }
    }
}

/// Convert interleaved stereo audio to `target_rate`
pub fn resample(audio: DecodedAudio, target_rate: u32) -> Result<DecodedAudio> {
    if audio.sample_rate == target_rate || audio.samples.is_empty() {
        return Ok(audio);
    }
    if audio.sample_rate == 0 || target_rate == 0 {
        return Err(AudioError::ResampleError("sample rate is zero".to_string()));
    }

    let frames = audio.frames();
    let ratio = f64::from(target_rate) / f64::from(audio.sample_rate);

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, frames, 2)
        .map_err(|e| AudioError::ResampleError(e.to_string()))?;

    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    for frame in audio.samples.chunks_exact(2) {
        left.push(frame[0]);
        right.push(frame[1]);
    }

    let output = resampler
        .process(&[left, right], None)
        .map_err(|e| AudioError::ResampleError(e.to_string()))?;

    let (left, right) = match output.as_slice() {
        [left, right] => (left, right),
        _ => {
            return Err(AudioError::ResampleError(
                "unexpected channel count".to_string(),
            ))
        }
    };

    let mut samples = Vec::with_capacity(left.len() * 2);
    for (l, r) in left.iter().zip(right) {
        samples.push(*l);
        samples.push(*r);
    }

    Ok(DecodedAudio {
        samples,
        sample_rate: target_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_from_url() {
        assert_eq!(extension_hint("https://cdn.example.com/a/song.mp3"), Some("mp3"));
        assert_eq!(extension_hint("song.flac?token=abc#t=10"), Some("flac"));
        assert_eq!(extension_hint("https://example.com/stream"), None);
        assert_eq!(extension_hint("https://example.com/.hidden"), None);
    }

    #[test]
    fn mono_is_duplicated() {
        let mut out = Vec::new();
        append_stereo(&mut out, &[0.1, 0.2], 1);
        assert_eq!(out, vec![0.1, 0.1, 0.2, 0.2]);
    }

    #[test]
    fn extra_channels_are_dropped() {
        let mut out = Vec::new();
        append_stereo(&mut out, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3);
        assert_eq!(out, vec![1.0, 2.0, 4.0, 5.0]);
    }

    #[test]
    fn duration_from_frames() {
        let audio = DecodedAudio {
            samples: vec![0.0; 44_100 * 2],
            sample_rate: 44_100,
        };
        assert_eq!(audio.frames(), 44_100);
        assert!((audio.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn same_rate_is_untouched() {
        let audio = DecodedAudio {
            samples: vec![0.5; 20],
            sample_rate: 48_000,
        };
        assert_eq!(resample(audio.clone(), 48_000).unwrap(), audio);
    }

    #[test]
    fn garbage_is_rejected() {
        let result = decode_bytes(b"definitely not audio".to_vec(), None);
        assert!(matches!(result, Err(AudioError::Decode(_))));
    }
}
