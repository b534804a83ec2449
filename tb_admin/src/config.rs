//! Admin CLI configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use tourney_bracket::bracket::UserId;
use tourney_bracket::db::DatabaseConfig;

/// Complete CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Database configuration
    pub database: DatabaseConfig,
    /// Acting user recorded on audit entries
    pub actor_id: Option<UserId>,
    /// Apply pending migrations before running the command
    pub run_migrations: bool,
}

impl AdminConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `actor_override` - Optional acting user override (from CLI args)
    /// * `migrate_override` - Force migrations on (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if `TB_ACTOR_ID` is set but not a user ID
    pub fn from_env(
        database_url_override: Option<String>,
        actor_override: Option<UserId>,
        migrate_override: bool,
    ) -> Result<Self, ConfigError> {
        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        let actor_id = match actor_override {
            Some(id) => Some(id),
            None => match std::env::var("TB_ACTOR_ID") {
                Ok(raw) => Some(raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    var: "TB_ACTOR_ID".to_string(),
                    reason: format!("Expected a numeric user ID, got {raw:?}"),
                })?),
                Err(_) => None,
            },
        };

        let run_migrations = migrate_override || parse_env_or("TB_RUN_MIGRATIONS", false);

        Ok(AdminConfig {
            database,
            actor_id,
            run_migrations,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "DATABASE_URL".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
