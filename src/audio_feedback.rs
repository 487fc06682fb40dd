use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::f32::consts::PI;

/// Type of cue to play.
#[derive(Debug, Clone, Copy)]
pub enum CueType {
    /// Recording started: ascending 600→900 Hz
    Start,
    /// Recording stopped: descending 900→600 Hz
    Stop,
    /// Spoken fallback unavailable: long descending 500→250 Hz
    Trouble,
}

impl CueType {
    fn sweep(self) -> (f32, f32) {
        match self {
            CueType::Start => (600.0, 900.0),
            CueType::Stop => (900.0, 600.0),
            CueType::Trouble => (500.0, 250.0),
        }
    }

    fn duration_secs(self) -> f32 {
        match self {
            CueType::Start | CueType::Stop => 0.15,
            CueType::Trouble => 0.5,
        }
    }
}

/// Generate the cue as a faded frequency sweep.
fn cue_samples(cue: CueType, sample_rate: f32) -> Vec<f32> {
    let total = (sample_rate * cue.duration_secs()) as usize;
    let (freq_start, freq_end) = cue.sweep();

    let mut samples = Vec::with_capacity(total);
    for i in 0..total {
        let t = i as f32 / sample_rate;
        let progress = i as f32 / total as f32;
        let freq = freq_start + (freq_end - freq_start) * progress;
        let envelope = 1.0 - progress;
        samples.push((2.0 * PI * freq * t).sin() * envelope * 0.3);
    }
    samples
}

/// Play a short cue. Spawns a thread and returns immediately.
pub fn play_cue(cue: CueType) {
    std::thread::spawn(move || {
        if let Err(e) = play_cue_blocking(cue) {
            log::warn!("Cue failed: {e}");
        }
    });
}

fn play_cue_blocking(cue: CueType) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or("No output device found")?;
    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate() as f32;
    let channels = config.channels() as usize;

    let samples = std::sync::Arc::new(cue_samples(cue, sample_rate));
    let total = samples.len();
    let sample_idx = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));

    let samples_cb = samples.clone();
    let sample_idx_cb = sample_idx.clone();

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            let mut idx = sample_idx_cb.load(std::sync::atomic::Ordering::Relaxed);
            for frame in data.chunks_mut(channels) {
                let value = if idx < total { samples_cb[idx] } else { 0.0 };
                for sample in frame.iter_mut() {
                    *sample = value;
                }
                idx += 1;
            }
            sample_idx_cb.store(idx, std::sync::atomic::Ordering::Relaxed);
        },
        |err| log::error!("Audio output error: {err}"),
        None,
    )?;

    stream.play()?;

    // Wait for playback to finish + small buffer
    let wait_ms = (cue.duration_secs() * 1000.0) as u64 + 50;
    std::thread::sleep(std::time::Duration::from_millis(wait_ms));

    drop(stream);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cue_length_matches_duration() {
        let samples = cue_samples(CueType::Start, 48_000.0);
        assert_eq!(samples.len(), (48_000.0 * 0.15) as usize);
    }

    #[test]
    fn cue_is_bounded_and_fades_out() {
        let samples = cue_samples(CueType::Trouble, 44_100.0);
        assert!(samples.iter().all(|s| s.abs() <= 0.3));
        // Tail of the envelope is quieter than the head.
        let head: f32 = samples[..100].iter().map(|s| s.abs()).sum();
        let tail: f32 = samples[samples.len() - 100..].iter().map(|s| s.abs()).sum();
        assert!(tail < head);
    }
}
