use std::sync::{Arc, Mutex};

use crate::client::{AgentClient, AgentReply, ChatMessage};
use crate::config::Config;
use crate::player::Playlist;
use crate::ui::chat::ChatWidgets;

/// Events sent from background tasks and media callbacks to the GTK main thread.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    RecordToggled,
    AgentReplyReady(AgentReply),
    AgentCallFailed(String),
    ClipEnded,
    PlaybackFailed(String),
    SessionReset,
}

/// Conversation loop state. Exactly one instance per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatStatus {
    Idle,
    Recording,
    Processing,
    Playing,
}

/// What a record-toggle press does in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    StartRecording,
    StopRecording,
    /// Toggles while Processing or Playing are dropped, never queued.
    Ignore,
}

impl ChatStatus {
    pub fn toggle_action(self) -> ToggleAction {
        match self {
            ChatStatus::Idle => ToggleAction::StartRecording,
            ChatStatus::Recording => ToggleAction::StopRecording,
            ChatStatus::Processing | ChatStatus::Playing => ToggleAction::Ignore,
        }
    }

    /// A transport result is only valid while its turn is still in flight.
    /// A session reset (or any other transition away from Processing) makes
    /// late replies and failures stale; they must be dropped, not applied.
    pub fn accepts_transport_result(self) -> bool {
        self == ChatStatus::Processing
    }
}

/// Controller outcome of one agent reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    /// Queue the clips, in order, and speak.
    Play(Vec<String>),
    /// The reply carried no audio.
    NoAudio,
}

impl ReplyOutcome {
    pub fn of(reply: &AgentReply) -> Self {
        let clips = reply.clip_urls();
        if clips.is_empty() {
            ReplyOutcome::NoAudio
        } else {
            ReplyOutcome::Play(clips)
        }
    }

    pub fn next_status(&self) -> ChatStatus {
        match self {
            ReplyOutcome::Play(_) => ChatStatus::Playing,
            ReplyOutcome::NoAudio => ChatStatus::Idle,
        }
    }

    /// Status line shown when this outcome is applied.
    pub fn status_text(&self) -> &'static str {
        match self {
            ReplyOutcome::Play(_) => "Speaking…",
            ReplyOutcome::NoAudio => "No audio returned.",
        }
    }
}

/// Central application state. Lives on the GTK main thread inside Rc<RefCell<>>.
pub struct AppState {
    pub status: ChatStatus,
    pub config: Config,
    pub session_id: String,
    pub client: AgentClient,
    /// Stage tag forwarded as the x-debug-fail header, from VOICE_CHAT_FAIL.
    pub debug_fail: Option<String>,
    pub history: Vec<ChatMessage>,
    pub audio_buffer: Arc<Mutex<Vec<f32>>>,
    pub tokio_rt: tokio::runtime::Runtime,
    pub backend_sender: async_channel::Sender<BackendEvent>,

    // Recording state
    pub capture: Option<crate::recorder::Capture>,
    pub sample_rate: u32,

    // Playback state
    pub playlist: Playlist,

    // UI handles
    pub widgets: Option<ChatWidgets>,
}

impl AppState {
    pub fn new(sender: async_channel::Sender<BackendEvent>) -> Self {
        let mut config = Config::load();
        let session_id = crate::session::ensure_session(&mut config);
        if let Err(e) = config.save() {
            log::warn!("Failed to persist config: {e}");
        }
        let client = AgentClient::new(&config.server_url);
        let tokio_rt = tokio::runtime::Runtime::new()
            .expect("Failed to create tokio runtime");

        Self {
            status: ChatStatus::Idle,
            config,
            session_id,
            client,
            debug_fail: debug_fail_from_env(),
            history: Vec::new(),
            audio_buffer: Arc::new(Mutex::new(Vec::new())),
            tokio_rt,
            backend_sender: sender,
            capture: None,
            sample_rate: 16000,
            playlist: Playlist::default(),
            widgets: None,
        }
    }
}

/// Read the failure-injection tag, dropping anything the server doesn't know.
fn debug_fail_from_env() -> Option<String> {
    let tag = std::env::var("VOICE_CHAT_FAIL").ok()?;
    if matches!(tag.as_str(), "stt" | "llm" | "tts" | "agent") {
        log::warn!("Failure injection active: {tag}");
        Some(tag)
    } else {
        log::warn!("Ignoring unknown VOICE_CHAT_FAIL tag: {tag}");
        None
    }
}

/// Helper to update status, label text and error styling in one place.
pub fn update_status(
    state: &std::rc::Rc<std::cell::RefCell<AppState>>,
    status: ChatStatus,
    label_text: &str,
    is_error: bool,
) {
    let mut s = state.borrow_mut();
    s.status = status;
    if let Some(ref widgets) = s.widgets {
        widgets.set_status(label_text, is_error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_starts_recording_only_from_idle() {
        assert_eq!(ChatStatus::Idle.toggle_action(), ToggleAction::StartRecording);
    }

    #[test]
    fn toggle_stops_an_active_recording() {
        assert_eq!(
            ChatStatus::Recording.toggle_action(),
            ToggleAction::StopRecording
        );
    }

    #[test]
    fn toggle_is_a_noop_while_busy() {
        assert_eq!(ChatStatus::Processing.toggle_action(), ToggleAction::Ignore);
        assert_eq!(ChatStatus::Playing.toggle_action(), ToggleAction::Ignore);
    }

    #[test]
    fn transport_results_only_land_while_processing() {
        assert!(ChatStatus::Processing.accepts_transport_result());
        // After a reset the controller is Idle again; a reply or failure from
        // the previous session's upload must be dropped, not applied.
        for status in [ChatStatus::Idle, ChatStatus::Recording, ChatStatus::Playing] {
            assert!(!status.accepts_transport_result(), "{status:?}");
        }
    }

    #[test]
    fn reply_without_audio_goes_idle_with_message() {
        let outcome = ReplyOutcome::of(&AgentReply::default());
        assert_eq!(outcome, ReplyOutcome::NoAudio);
        assert_eq!(outcome.next_status(), ChatStatus::Idle);
        assert_eq!(outcome.status_text(), "No audio returned.");
    }

    #[test]
    fn reply_with_audio_enters_playing() {
        let reply = AgentReply {
            audio_urls: Some(vec!["a.mp3".into(), "b.mp3".into()]),
            ..Default::default()
        };
        let outcome = ReplyOutcome::of(&reply);
        assert_eq!(outcome.next_status(), ChatStatus::Playing);
        assert_eq!(outcome.status_text(), "Speaking…");
        assert_eq!(
            outcome,
            ReplyOutcome::Play(vec!["a.mp3".into(), "b.mp3".into()])
        );
    }
}
