/// Configuration management for the identity bridge
use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Main bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub cache: CacheSettings,
    pub resolver: ResolverSettings,
    pub token: TokenSettings,
    pub logging: LoggingConfig,
}

/// Identity cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Entry time-to-live in seconds
    pub ttl_seconds: u64,
    /// Maximum number of live entries
    pub max_size: usize,
}

/// Resolver HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User-Agent header for HTTP requests
    pub user_agent: String,
}

/// Local auth token issuer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSettings {
    /// HMAC secret for locally issued tokens
    pub secret: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl BridgeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> BridgeResult<Self> {
        dotenv::dotenv().ok();

        let ttl_seconds = env::var("BRIDGE_CACHE_TTL_SECONDS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| {
                BridgeError::InvalidArgument("Invalid cache TTL seconds".to_string())
            })?;
        let max_size = env::var("BRIDGE_CACHE_MAX_SIZE")
            .unwrap_or_else(|_| "128".to_string())
            .parse()
            .map_err(|_| BridgeError::InvalidArgument("Invalid cache max size".to_string()))?;

        let timeout_seconds = env::var("BRIDGE_RESOLVER_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);
        let user_agent =
            env::var("BRIDGE_USER_AGENT").unwrap_or_else(|_| "identity-bridge/0.1".to_string());

        let token_secret =
            env::var("BRIDGE_TOKEN_SECRET").unwrap_or_else(|_| "identity-bridge-dev".to_string());

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let config = BridgeConfig {
            cache: CacheSettings {
                ttl_seconds,
                max_size,
            },
            resolver: ResolverSettings {
                timeout_seconds,
                user_agent,
            },
            token: TokenSettings {
                secret: token_secret,
            },
            logging: LoggingConfig { level: log_level },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> BridgeResult<()> {
        if self.cache.ttl_seconds < 1 {
            return Err(BridgeError::InvalidArgument(
                "Cache TTL must be at least 1 second".to_string(),
            ));
        }
        if self.cache.max_size < 1 {
            return Err(BridgeError::InvalidArgument(
                "Cache max size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Cache TTL as a duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_seconds)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            cache: CacheSettings {
                ttl_seconds: 10,
                max_size: 128,
            },
            resolver: ResolverSettings {
                timeout_seconds: 10,
                user_agent: "identity-bridge/0.1".to_string(),
            },
            token: TokenSettings {
                secret: "identity-bridge-dev".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BridgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache.ttl_seconds, 10);
        assert_eq!(config.cache.max_size, 128);
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = BridgeConfig::default();
        config.cache.ttl_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut config = BridgeConfig::default();
        config.cache.max_size = 0;
        assert!(config.validate().is_err());
    }
}
