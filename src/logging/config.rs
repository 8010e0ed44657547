use std::path::PathBuf;

/// Settings for the tracing subscriber, read from the environment.
#[derive(Debug, Clone)]
pub struct LogSettings {
    pub environment: String,
    pub level: String,
    pub directory: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if environment == "production" {
                "info".to_string()
            } else {
                "debug".to_string()
            }
        });
        let directory = std::env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"));

        Self {
            environment,
            level,
            directory,
        }
    }
}

impl LogSettings {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Filter directive used when `RUST_LOG` is not set.
    pub fn default_directive(&self) -> String {
        format!(
            "beyond_house_backend={},tower_http=debug,axum=info,sqlx=warn",
            self.level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_targets_crate() {
        let settings = LogSettings {
            environment: "development".to_string(),
            level: "trace".to_string(),
            directory: PathBuf::from("logs"),
        };
        assert!(settings
            .default_directive()
            .starts_with("beyond_house_backend=trace"));
        assert!(!settings.is_production());
    }
}
