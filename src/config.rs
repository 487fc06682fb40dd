use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Provider credentials and persona, pushed to the server via
/// `POST /config/{sessionId}`. Field names match the server's config body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Murf TTS API key
    pub murf: String,
    /// AssemblyAI STT API key
    pub aai: String,
    /// Gemini LLM API key
    pub gemini: String,
    /// OpenWeatherMap API key
    pub weather: String,
    /// Web search API key
    pub search: String,
    /// Assistant persona selector
    pub persona: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            murf: String::new(),
            aai: String::new(),
            gemini: String::new(),
            weather: String::new(),
            search: String::new(),
            persona: "neutral".into(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the agent server.
    pub server_url: String,
    /// Session token; `None` until the first session is established.
    pub session_id: Option<String>,
    /// Whether the agent may use web search for replies.
    pub web_search: bool,
    pub providers: ProviderSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            session_id: None,
            web_search: false,
            providers: ProviderSettings::default(),
        }
    }
}

impl Config {
    /// Directory: ~/.config/voice-chat/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("voice-chat");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if file doesn't exist or is invalid.
    pub fn load() -> Self {
        let path = Self::path();
        match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let dir = Self::dir();
        fs::create_dir_all(&dir)?;
        let data = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(), data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server_url, "http://127.0.0.1:8000");
        assert!(config.session_id.is_none());
        assert!(!config.web_search);
        assert_eq!(config.providers.persona, "neutral");
    }

    #[test]
    fn round_trips_through_json() {
        let mut config = Config::default();
        config.session_id = Some("abc-123".into());
        config.web_search = true;
        config.providers.gemini = "key".into();

        let data = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&data).unwrap();
        assert_eq!(back.session_id.as_deref(), Some("abc-123"));
        assert!(back.web_search);
        assert_eq!(back.providers.gemini, "key");
    }

    #[test]
    fn provider_settings_use_server_field_names() {
        let settings = ProviderSettings::default();
        let value = serde_json::to_value(&settings).unwrap();
        for field in ["murf", "aai", "gemini", "weather", "search", "persona"] {
            assert!(value.get(field).is_some(), "missing field {field}");
        }
    }
}
