use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::path::PathBuf;

use crate::rbac::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub security: SecurityConfig,
    pub uploads: UploadConfig,
    pub chat: ChatConfig,
    pub database: DatabaseConfig,
    pub roles: RoleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_page_size: u32,
}

/// Settings for the generic API client. Supplied by the environment, never hardcoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub default_headers: BTreeMap<String, String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

/// Explicit email -> role assignments. Unlisted accounts are `user`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleConfig {
    pub assignments: HashMap<String, Role>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("ACADEMY_HOST") {
            self.server.host = v;
        }
        if let Some(v) = env::var("ACADEMY_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("ACADEMY_MAX_PAGE_SIZE") {
            self.server.max_page_size = v.parse().unwrap_or(self.server.max_page_size);
        }

        // Client overrides
        if let Ok(v) = env::var("ACADEMY_API_URL") {
            self.client.base_url = v;
        }
        if let Ok(v) = env::var("ACADEMY_API_HEADERS") {
            self.client.default_headers = parse_headers(&v);
        }
        if let Ok(v) = env::var("ACADEMY_API_TIMEOUT_SECS") {
            self.client.timeout_secs = match v.trim() {
                "" | "0" | "none" => None,
                other => other.parse().ok().or(self.client.timeout_secs),
            };
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = parse_expiry_hours(&v, self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.uploads.dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_BYTES") {
            self.uploads.max_bytes = v.parse().unwrap_or(self.uploads.max_bytes);
        }

        // Chat overrides
        if let Ok(v) = env::var("CHAT_CHANNEL_CAPACITY") {
            self.chat.channel_capacity = v.parse().unwrap_or(self.chat.channel_capacity);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        // Role assignments
        if let Ok(v) = env::var("ACADEMY_ROLE_ASSIGNMENTS") {
            self.roles.assignments = parse_role_assignments(&v);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3001,
                max_page_size: 100,
            },
            client: ClientConfig {
                base_url: "http://localhost:3001/api/data".to_string(),
                default_headers: BTreeMap::new(),
                timeout_secs: Some(30),
            },
            security: SecurityConfig {
                jwt_secret: "development-secret-change-me".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            uploads: UploadConfig {
                dir: PathBuf::from("uploads"),
                max_bytes: 10 * 1024 * 1024, // 10MB
            },
            chat: ChatConfig { channel_capacity: 256 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
            },
            roles: RoleConfig::default(),
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                max_page_size: 100,
            },
            client: ClientConfig {
                base_url: "https://staging.example.com/api/data".to_string(),
                default_headers: BTreeMap::new(),
                timeout_secs: Some(15),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            uploads: UploadConfig {
                dir: PathBuf::from("/var/lib/academy/uploads"),
                max_bytes: 5 * 1024 * 1024, // 5MB
            },
            chat: ChatConfig { channel_capacity: 512 },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
            },
            roles: RoleConfig::default(),
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                max_page_size: 50,
            },
            client: ClientConfig {
                base_url: "https://app.example.com/api/data".to_string(),
                default_headers: BTreeMap::new(),
                timeout_secs: Some(10),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            uploads: UploadConfig {
                dir: PathBuf::from("/var/lib/academy/uploads"),
                max_bytes: 5 * 1024 * 1024, // 5MB
            },
            chat: ChatConfig { channel_capacity: 1024 },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
            },
            roles: RoleConfig::default(),
        }
    }
}

/// Parse `Name: value; Other: value` into a header map. Malformed pairs are skipped.
pub fn parse_headers(raw: &str) -> BTreeMap<String, String> {
    raw.split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once(':')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Parse `email=role,email=role`. Unknown roles are logged and skipped.
pub fn parse_role_assignments(raw: &str) -> HashMap<String, Role> {
    raw.split(',')
        .filter_map(|pair| {
            let (email, role) = pair.split_once('=')?;
            match role.parse::<Role>() {
                Ok(role) => Some((email.trim().to_ascii_lowercase(), role)),
                Err(e) => {
                    tracing::warn!("ignoring role assignment for {}: {}", email.trim(), e);
                    None
                }
            }
        })
        .collect()
}

/// Longest token lifetime accepted from the environment (one year).
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365;

/// Parse a token lifetime, keeping `fallback` for junk, zero or anything above a year.
fn parse_expiry_hours(raw: &str, fallback: u64) -> u64 {
    match raw.trim().parse::<u64>() {
        Ok(hours) if (1..=MAX_JWT_EXPIRY_HOURS).contains(&hours) => hours,
        _ => {
            tracing::warn!("ignoring SECURITY_JWT_EXPIRY_HOURS={:?}; keeping {} hours", raw, fallback);
            fallback
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.security.jwt_secret.is_empty());
        assert_eq!(config.client.timeout_secs, Some(30));
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.security.jwt_expiry_hours, 4);
        assert_eq!(config.server.max_page_size, 50);
    }

    #[test]
    fn parses_header_list() {
        let headers = parse_headers("X-Tenant: academy; Accept-Language: en ; broken");
        assert_eq!(headers.get("X-Tenant").map(String::as_str), Some("academy"));
        assert_eq!(headers.get("Accept-Language").map(String::as_str), Some("en"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn parses_role_assignments() {
        let roles = parse_role_assignments("Ada@Academy.test=admin, ops@academy.test=operator,x@y=root");
        assert_eq!(roles.get("ada@academy.test"), Some(&Role::Admin));
        assert_eq!(roles.get("ops@academy.test"), Some(&Role::Operator));
        assert_eq!(roles.len(), 2);
    }

    #[test]
    fn expiry_override_is_bounded() {
        assert_eq!(parse_expiry_hours("12", 4), 12);
        assert_eq!(parse_expiry_hours(" 8760 ", 4), MAX_JWT_EXPIRY_HOURS);
        assert_eq!(parse_expiry_hours("8761", 4), 4);
        assert_eq!(parse_expiry_hours("10000000000000", 4), 4);
        assert_eq!(parse_expiry_hours("0", 4), 4);
        assert_eq!(parse_expiry_hours("soon", 4), 4);
    }
}
