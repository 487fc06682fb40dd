use std::cell::RefCell;
use std::rc::Rc;

use super::pipeline::dispatch_agent_call;
use super::state::{AppState, ChatStatus, update_status};
use crate::audio_feedback::{CueType, play_cue};

/// Start recording audio from the microphone.
pub fn start_recording(state: &Rc<RefCell<AppState>>) {
    log::info!("Starting recording");

    // Each turn gets a fresh chunk buffer
    {
        let s = state.borrow();
        s.audio_buffer.lock().unwrap().clear();
    }

    play_cue(CueType::Start);

    let buffer = state.borrow().audio_buffer.clone();
    match crate::recorder::start_capture(buffer) {
        Ok(capture) => {
            let mut s = state.borrow_mut();
            s.sample_rate = capture.sample_rate;
            s.capture = Some(capture);
            s.status = ChatStatus::Recording;
            if let Some(ref widgets) = s.widgets {
                widgets.set_recording(true);
                widgets.set_status("Listening…", false);
            }
        }
        Err(e) => {
            log::error!("Failed to start recording: {e}");
            if let Some(ref widgets) = state.borrow().widgets {
                widgets.set_recording(false);
            }
            update_status(state, ChatStatus::Idle, &format!("Mic error: {e}"), true);
        }
    }
}

/// Stop recording, release the input device and hand the turn to the agent.
pub fn stop_recording(state: &Rc<RefCell<AppState>>) {
    log::info!("Stopping recording");

    // Dropping the capture stops the stream and frees the microphone
    drop(state.borrow_mut().capture.take());

    play_cue(CueType::Stop);

    {
        let mut s = state.borrow_mut();
        s.status = ChatStatus::Processing;
        if let Some(ref widgets) = s.widgets {
            widgets.set_recording(false);
            widgets.set_status("Processing…", false);
        }
    }

    let samples: Vec<f32> = state.borrow().audio_buffer.lock().unwrap().clone();
    let sample_rate = state.borrow().sample_rate;

    if samples.is_empty() {
        update_status(state, ChatStatus::Idle, "No audio captured", true);
        return;
    }

    log::info!(
        "Captured {} samples ({:.1}s at {}Hz)",
        samples.len(),
        samples.len() as f32 / sample_rate as f32,
        sample_rate
    );

    match crate::recorder::samples_to_wav(&samples, sample_rate) {
        Ok(wav) => dispatch_agent_call(state, wav),
        Err(e) => {
            log::error!("WAV encoding failed: {e}");
            update_status(state, ChatStatus::Idle, &format!("Encoding failed: {e}"), true);
        }
    }
}
