use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Target capture rate; plenty for speech and keeps uploads small.
const TARGET_RATE: u32 = 16_000;

/// A live microphone capture. Dropping it stops the stream and releases the
/// input device.
pub struct Capture {
    // Held only for its Drop; cpal stops the stream when this goes away.
    _stream: cpal::Stream,
    pub sample_rate: u32,
}

/// Start capturing from the default input device into the shared chunk buffer
/// as mono f32 at ~16kHz (downsampled from the native rate if needed).
pub fn start_capture(
    buffer: Arc<Mutex<Vec<f32>>>,
) -> Result<Capture, Box<dyn std::error::Error>> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or("No input device found")?;

    log::info!("Input device: {:?}", device.description());

    let supported: Vec<_> = device.supported_input_configs()?.collect();
    let native_16k_mono = supported.iter().find(|c| {
        c.channels() == 1
            && c.min_sample_rate() <= TARGET_RATE
            && c.max_sample_rate() >= TARGET_RATE
            && c.sample_format() == cpal::SampleFormat::F32
    });

    let (config, sample_rate, downsample_factor) = match native_16k_mono {
        Some(cfg) => (cfg.with_sample_rate(TARGET_RATE).config(), TARGET_RATE, 1usize),
        None => {
            let default_config = device.default_input_config()?;
            let native_rate = default_config.sample_rate();
            let factor = (native_rate / TARGET_RATE).max(1) as usize;
            let effective = native_rate / factor as u32;
            log::info!("Using native rate {native_rate}Hz, downsampling by {factor}x to ~{effective}Hz");
            (default_config.config(), effective, factor)
        }
    };

    let channels = config.channels as usize;

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            let mut buf = buffer.lock().unwrap();
            for (i, frame) in data.chunks(channels).enumerate() {
                if i % downsample_factor == 0 {
                    let mono = frame.iter().sum::<f32>() / channels as f32;
                    buf.push(mono);
                }
            }
        },
        |err| log::error!("Input stream error: {err}"),
        None,
    )?;

    stream.play()?;
    Ok(Capture {
        _stream: stream,
        sample_rate,
    })
}

/// Encode captured f32 samples as a WAV upload body (mono 16-bit PCM).
pub fn samples_to_wav(
    samples: &[f32],
    sample_rate: u32,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &s in samples {
        let clamped = s.clamp(-1.0, 1.0);
        writer.write_sample((clamped * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_output_is_mono_16bit_at_given_rate() {
        let samples = vec![0.0f32, 0.5, -0.5, 1.0];
        let bytes = samples_to_wav(&samples, 16_000).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");

        let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 4);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let bytes = samples_to_wav(&[2.0f32, -2.0], 16_000).unwrap();
        let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
        let values: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(values[0], i16::MAX);
        assert_eq!(values[1], -i16::MAX);
    }
}
