//! Environment-driven settings.
//!
//! Every struct reads its values in `Default`, so `Foo::default()` is the
//! production path and tests build the struct literally.

use std::path::PathBuf;

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(fallback)
}

/// Bind address and deployment environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: env_or("HOST", "127.0.0.1"),
            port: env_parse("PORT", 3001),
            environment: env_or("ENVIRONMENT", "development"),
        }
    }
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Upstream chat-completion API used by the chat proxy.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Full URL of the OpenAI-compatible `/chat/completions` endpoint.
    pub api_url: String,
    /// Bearer key; `None` makes every chat call fail with a configuration error.
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: env_or(
                "CHAT_API_URL",
                "https://ai.gateway.lovable.dev/v1/chat/completions",
            ),
            api_key: std::env::var("CHAT_API_KEY").ok().filter(|k| !k.is_empty()),
            model: env_or("CHAT_MODEL", "google/gemini-2.5-flash"),
        }
    }
}

/// Local object storage for uploaded media.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directory that plays the role of the `media` bucket.
    pub root: PathBuf,
    /// Prefix used to build public URLs, e.g. `https://example.com/media`.
    pub public_base_url: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        let base = env_or("PUBLIC_BASE_URL", "http://127.0.0.1:3001");
        Self {
            root: PathBuf::from(env_or("MEDIA_DIR", "uploads/media")),
            public_base_url: format!("{}/media", base.trim_end_matches('/')),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_production_flag() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: "production".to_string(),
        };
        assert!(config.is_production());
    }

    #[test]
    fn test_media_config_public_url_has_media_suffix() {
        let config = MediaConfig::default();
        assert!(config.public_base_url.ends_with("/media"));
        assert!(!config.public_base_url.ends_with("//media"));
    }

    #[test]
    fn test_chat_config_default_has_model() {
        let config = ChatConfig::default();
        assert!(!config.model.is_empty());
        assert!(config.api_url.starts_with("http"));
    }
}
