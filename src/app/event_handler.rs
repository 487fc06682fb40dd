use std::cell::RefCell;
use std::rc::Rc;

use super::recording::{start_recording, stop_recording};
use super::state::{AppState, BackendEvent, ChatStatus, ReplyOutcome, ToggleAction, update_status};
use crate::audio_feedback::{CueType, play_cue};
use crate::client::AgentReply;

/// Handle a backend event. This is the core state machine.
pub fn handle_backend_event(state: &Rc<RefCell<AppState>>, event: BackendEvent) {
    match event {
        BackendEvent::RecordToggled => {
            let action = state.borrow().status.toggle_action();
            match action {
                ToggleAction::StartRecording => start_recording(state),
                ToggleAction::StopRecording => stop_recording(state),
                ToggleAction::Ignore => {
                    log::info!("Ignoring toggle while status={:?}", state.borrow().status);
                }
            }
        }
        BackendEvent::AgentReplyReady(reply) => {
            // A reset while the upload was in flight already returned the
            // controller to Idle; the old session's reply is stale.
            if !state.borrow().status.accepts_transport_result() {
                log::info!("Dropping stale agent reply (status={:?})", state.borrow().status);
                return;
            }
            on_agent_reply(state, reply);
        }
        BackendEvent::AgentCallFailed(msg) => {
            if !state.borrow().status.accepts_transport_result() {
                log::info!("Dropping stale agent failure: {msg}");
                return;
            }
            log::error!("Agent call failed: {msg}");
            update_status(state, ChatStatus::Idle, &msg, true);
            play_spoken_fallback(state);
        }
        BackendEvent::ClipEnded => on_clip_ended(state),
        BackendEvent::PlaybackFailed(msg) => {
            log::warn!("Playback failed: {msg}");
            if state.borrow().status == ChatStatus::Playing {
                state.borrow_mut().playlist.clear();
                update_status(state, ChatStatus::Idle, "Ready", false);
            }
        }
        BackendEvent::SessionReset => reset_session(state),
    }
}

fn on_agent_reply(state: &Rc<RefCell<AppState>>, reply: AgentReply) {
    let outcome = ReplyOutcome::of(&reply);

    // The server history is canonical; replace local state wholesale.
    if let Some(history) = reply.history {
        let mut s = state.borrow_mut();
        s.history = history;
        if let Some(ref widgets) = s.widgets {
            widgets.render_history(&s.history);
        }
    }

    if let Some(ref text) = reply.llm_text {
        log::info!("Assistant: {text}");
        if let Some(ref widgets) = state.borrow().widgets {
            widgets.set_llm_text(Some(text.as_str()));
        }
    }

    let status = outcome.next_status();
    let text = outcome.status_text();
    match outcome {
        ReplyOutcome::NoAudio => update_status(state, status, text, true),
        ReplyOutcome::Play(clips) => {
            let first = {
                let mut s = state.borrow_mut();
                s.playlist.load(clips);
                s.status = status;
                s.playlist.next()
            };
            update_status(state, status, text, false);

            if let Some(url) = first {
                if let Some(ref widgets) = state.borrow().widgets {
                    crate::player::play_clip(&widgets.media, &url);
                }
            }
        }
    }
}

fn on_clip_ended(state: &Rc<RefCell<AppState>>) {
    // Fallback clips and post-reset stragglers end while not Playing; drop them.
    if state.borrow().status != ChatStatus::Playing {
        return;
    }

    let next = state.borrow_mut().playlist.next();
    match next {
        Some(url) => {
            if let Some(ref widgets) = state.borrow().widgets {
                crate::player::play_clip(&widgets.media, &url);
            }
        }
        None => {
            update_status(state, ChatStatus::Idle, "Ready", false);
            // Continuous conversation: the reply finished, listen again.
            start_recording(state);
        }
    }
}

/// Speak the locally installed fallback clip, or a trouble tone without one.
fn play_spoken_fallback(state: &Rc<RefCell<AppState>>) {
    let played = state
        .borrow()
        .widgets
        .as_ref()
        .map(|widgets| crate::player::play_fallback(&widgets.media))
        .unwrap_or(false);
    if !played {
        play_cue(CueType::Trouble);
    }
}

/// Drop the token, clear the transcript and return to Idle from any state.
fn reset_session(state: &Rc<RefCell<AppState>>) {
    log::info!("Resetting session");
    {
        let mut s = state.borrow_mut();
        s.capture = None;
        s.playlist.clear();
        s.history.clear();
        let new_id = crate::session::reset_session(&mut s.config);
        s.session_id = new_id;
        if let Err(e) = s.config.save() {
            log::warn!("Failed to persist config: {e}");
        }
        if let Some(ref widgets) = s.widgets {
            crate::player::stop(&widgets.media);
            widgets.render_history(&[]);
            widgets.set_llm_text(None);
            widgets.set_recording(false);
        }
        log::info!("New session {}", s.session_id);
    }
    update_status(state, ChatStatus::Idle, "Ready to start", false);
}
