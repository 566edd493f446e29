use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::{ApiClient, SignInResponse};
use crate::config::ClientConfig;
use crate::rbac::Session;

const SESSION_FILE: &str = "session.json";

/// Persisted result of `academy auth login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliSession {
    pub base_url: String,
    pub token: String,
    pub session: Session,
    pub expires_at: DateTime<Utc>,
    pub saved_at: DateTime<Utc>,
}

impl CliSession {
    pub fn new(base_url: &str, response: SignInResponse) -> Self {
        let now = Utc::now();
        Self {
            base_url: base_url.to_string(),
            token: response.token,
            session: response.session,
            expires_at: now + chrono::Duration::seconds(response.expires_in as i64),
            saved_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("ACADEMY_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("academy").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session_from(dir: &Path) -> anyhow::Result<Option<CliSession>> {
    let session_file = dir.join(SESSION_FILE);
    if !session_file.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(session_file)?;
    Ok(Some(serde_json::from_str(&content)?))
}

pub fn save_session_to(dir: &Path, session: &CliSession) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(session)?;
    fs::write(dir.join(SESSION_FILE), content)?;
    Ok(())
}

/// Returns whether a session file was removed.
pub fn clear_session_in(dir: &Path) -> anyhow::Result<bool> {
    let session_file = dir.join(SESSION_FILE);
    if !session_file.exists() {
        return Ok(false);
    }
    fs::remove_file(session_file)?;
    Ok(true)
}

pub fn load_session() -> anyhow::Result<Option<CliSession>> {
    load_session_from(&get_config_dir()?)
}

pub fn save_session(session: &CliSession) -> anyhow::Result<()> {
    save_session_to(&get_config_dir()?, session)
}

pub fn clear_session() -> anyhow::Result<bool> {
    clear_session_in(&get_config_dir()?)
}

/// Client for the saved session; fails when nobody is logged in.
pub fn authenticated_client(client: &ClientConfig) -> anyhow::Result<(ApiClient, CliSession)> {
    let saved = load_session()?.ok_or_else(|| anyhow::anyhow!("Not logged in (run `academy auth login <email>`)"))?;
    if saved.is_expired() {
        anyhow::bail!("Session expired at {} (run `academy auth login` again)", saved.expires_at);
    }

    let config = ClientConfig {
        base_url: saved.base_url.clone(),
        ..client.clone()
    };
    let api = ApiClient::new(&config)?.with_token(saved.token.clone());
    Ok((api, saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::Role;

    fn sample() -> CliSession {
        CliSession::new(
            "http://localhost:3001/api/data",
            SignInResponse {
                token: "abc".into(),
                session: Session {
                    user_id: "u-1".into(),
                    email: "ada@academy.test".into(),
                    name: "Ada".into(),
                    role: Role::Operator,
                    avatar_url: None,
                },
                expires_in: 3600,
            },
        )
    }

    #[test]
    fn session_file_round_trips_and_clears() {
        let dir = std::env::temp_dir().join(format!("academy-cli-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();

        assert!(load_session_from(&dir).unwrap().is_none());
        save_session_to(&dir, &sample()).unwrap();

        let loaded = load_session_from(&dir).unwrap().unwrap();
        assert_eq!(loaded.session.role, Role::Operator);
        assert!(!loaded.is_expired());

        assert!(clear_session_in(&dir).unwrap());
        assert!(!clear_session_in(&dir).unwrap());
        fs::remove_dir_all(&dir).ok();
    }
}
