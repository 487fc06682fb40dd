use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::ProviderSettings;

/// Bound on one agent round trip (upload + STT + LLM + TTS on the server).
const AGENT_TIMEOUT: Duration = Duration::from_secs(25);

/// One entry in the server-side conversation history.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Response envelope of `POST /agent/chat/{sessionId}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentReply {
    /// Canonical conversation history; replaces local state when present.
    pub history: Option<Vec<ChatMessage>>,
    /// Assistant reply text.
    pub llm_text: Option<String>,
    /// Single synthesized clip.
    pub audio_url: Option<String>,
    /// Chunked synthesis; preferred over `audio_url` when non-empty.
    pub audio_urls: Option<Vec<String>>,
    /// Server-provided failure message.
    pub error: Option<String>,
}

impl AgentReply {
    /// Clips to play for this reply, in order.
    pub fn clip_urls(&self) -> Vec<String> {
        match &self.audio_urls {
            Some(urls) if !urls.is_empty() => urls.clone(),
            _ => self.audio_url.clone().into_iter().collect(),
        }
    }
}

/// Map a raw HTTP response to a reply. A non-JSON body is treated as an empty
/// envelope so the status-derived error isn't masked by a parse error.
fn parse_reply(status: StatusCode, body: &str) -> Result<AgentReply, String> {
    let reply: AgentReply = serde_json::from_str(body).unwrap_or_default();
    if !status.is_success() {
        return Err(reply
            .error
            .unwrap_or_else(|| format!("Request failed: {}", status.as_u16())));
    }
    Ok(reply)
}

/// Transport-level failures carry the endpoint label so the status line says
/// which call died; server-provided error strings pass through verbatim.
fn transport_error(label: &str, err: &reqwest::Error) -> String {
    if err.is_timeout() {
        timeout_message(label)
    } else {
        format!("{label}: {err}")
    }
}

fn timeout_message(label: &str) -> String {
    format!("{label}: request timed out")
}

/// HTTP client for the agent server. Errors are user-facing message strings;
/// the caller applies them to the status line unchanged.
#[derive(Clone)]
pub struct AgentClient {
    http: reqwest::Client,
    base_url: String,
}

impl AgentClient {
    pub fn new(server_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    /// Upload one recorded turn and return the agent's reply.
    pub async fn send_chat(
        &self,
        session_id: &str,
        wav: Vec<u8>,
        web_search: bool,
        debug_fail: Option<&str>,
    ) -> Result<AgentReply, String> {
        let filename = format!("recording_{}.wav", chrono::Utc::now().timestamp_millis());
        let part = reqwest::multipart::Part::bytes(wav)
            .file_name(filename)
            .mime_str("audio/wav")
            .map_err(|e| format!("Agent: {e}"))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("web_search", if web_search { "true" } else { "false" })
            .text("concise", "false");

        let mut request = self
            .http
            .post(format!("{}/agent/chat/{session_id}", self.base_url))
            .multipart(form)
            .timeout(AGENT_TIMEOUT);
        if let Some(tag) = debug_fail {
            request = request.header("x-debug-fail", tag);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error("Agent", &e))?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        parse_reply(status, &body)
    }

    /// Push provider settings for this session. Only error presence matters.
    pub async fn save_config(
        &self,
        session_id: &str,
        settings: &ProviderSettings,
    ) -> Result<(), String> {
        let response = self
            .http
            .post(format!("{}/config/{session_id}", self.base_url))
            .json(settings)
            .timeout(AGENT_TIMEOUT)
            .send()
            .await
            .map_err(|e| transport_error("Config", &e))?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        parse_reply(status, &body).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_message_is_surfaced_verbatim() {
        let err = parse_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": "upstream down", "fallback_text": "I'm having trouble connecting right now"}"#,
        )
        .unwrap_err();
        assert_eq!(err, "upstream down");
    }

    #[test]
    fn error_status_without_message_uses_numeric_status() {
        let err = parse_reply(StatusCode::BAD_GATEWAY, "<html>gateway</html>").unwrap_err();
        assert_eq!(err, "Request failed: 502");
    }

    #[test]
    fn garbage_body_on_success_is_an_empty_envelope() {
        let reply = parse_reply(StatusCode::OK, "not json at all").unwrap();
        assert!(reply.history.is_none());
        assert!(reply.clip_urls().is_empty());
    }

    #[test]
    fn full_envelope_parses() {
        let body = r#"{
            "session_id": "s1",
            "text": "hello",
            "llm_text": "hi there",
            "audio_url": "https://cdn/a.mp3",
            "audio_urls": ["https://cdn/a.mp3", "https://cdn/b.mp3"],
            "turns": 2,
            "history": [
                {"role": "user", "content": "hello"},
                {"role": "assistant", "content": "hi there"}
            ]
        }"#;
        let reply = parse_reply(StatusCode::OK, body).unwrap();
        assert_eq!(reply.llm_text.as_deref(), Some("hi there"));
        let history = reply.history.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, "user");
    }

    #[test]
    fn clip_urls_prefers_chunked_list() {
        let reply = AgentReply {
            audio_url: Some("solo.mp3".into()),
            audio_urls: Some(vec!["a.mp3".into(), "b.mp3".into()]),
            ..Default::default()
        };
        assert_eq!(reply.clip_urls(), vec!["a.mp3", "b.mp3"]);
    }

    #[test]
    fn clip_urls_falls_back_to_single_url() {
        let reply = AgentReply {
            audio_url: Some("solo.mp3".into()),
            audio_urls: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(reply.clip_urls(), vec!["solo.mp3"]);
    }

    #[test]
    fn clip_urls_empty_when_no_audio() {
        assert!(AgentReply::default().clip_urls().is_empty());
    }

    #[test]
    fn elapsed_timeout_is_labelled_with_the_endpoint() {
        assert_eq!(timeout_message("Agent"), "Agent: request timed out");
        assert_eq!(timeout_message("Config"), "Config: request timed out");
        assert!(timeout_message("Agent").starts_with("Agent: "));
    }
}
