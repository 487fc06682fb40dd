use uuid::Uuid;

use crate::config::Config;

/// Return the session token, generating and storing a fresh UUIDv4 if none
/// exists yet. The caller is responsible for persisting the config afterwards.
pub fn ensure_session(config: &mut Config) -> String {
    if let Some(id) = &config.session_id {
        return id.clone();
    }
    let id = Uuid::new_v4().to_string();
    log::info!("Generated session token {id}");
    config.session_id = Some(id.clone());
    id
}

/// Discard the current token and establish a new one.
pub fn reset_session(config: &mut Config) -> String {
    config.session_id = None;
    ensure_session(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_token_once_and_reuses_it() {
        let mut config = Config::default();
        let first = ensure_session(&mut config);
        let second = ensure_session(&mut config);
        assert_eq!(first, second);
        assert_eq!(config.session_id.as_deref(), Some(first.as_str()));
    }

    #[test]
    fn reuses_token_from_loaded_config() {
        let mut config = Config::default();
        config.session_id = Some("existing-token".into());
        assert_eq!(ensure_session(&mut config), "existing-token");
    }

    #[test]
    fn reset_produces_a_different_token() {
        let mut config = Config::default();
        let first = ensure_session(&mut config);
        let fresh = reset_session(&mut config);
        assert_ne!(first, fresh);
        assert_eq!(config.session_id.as_deref(), Some(fresh.as_str()));
    }

    #[test]
    fn tokens_are_valid_uuids() {
        let mut config = Config::default();
        let token = ensure_session(&mut config);
        assert!(Uuid::parse_str(&token).is_ok());
    }
}
