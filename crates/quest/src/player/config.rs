//! Player session configuration.

use serde::{Deserialize, Serialize};

use super::PlayerError;

/// Player session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// HS256 signing secret. Supports `env:VAR_NAME`.
    /// A random secret is generated at startup when unset.
    pub secret: Option<String>,

    /// Name of the session cookie.
    pub cookie_name: String,

    /// Cookie and token lifetime in seconds.
    pub max_age_secs: u64,

    /// Add the `Secure` attribute to the cookie.
    pub secure_cookie: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            secret: None,
            cookie_name: "quest_session".to_string(),
            max_age_secs: 60 * 60 * 24,
            secure_cookie: false,
        }
    }
}

impl PlayerConfig {
    /// Resolve the signing secret, expanding `env:VAR_NAME` syntax.
    pub fn resolve_secret(&self) -> Result<Option<String>, PlayerError> {
        match &self.secret {
            None => Ok(None),
            Some(value) => {
                if let Some(var_name) = value.strip_prefix("env:") {
                    match std::env::var(var_name) {
                        Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
                        Ok(_) => Err(PlayerError::Config(format!(
                            "environment variable {var_name} is empty"
                        ))),
                        Err(_) => Err(PlayerError::Config(format!(
                            "environment variable {var_name} is not set"
                        ))),
                    }
                } else if value.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(value.clone()))
                }
            }
        }
    }

    /// Generate a random signing secret.
    pub fn generate_secret() -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::rng();
        (0..SECRET_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_secret_literal() {
        let config = PlayerConfig {
            secret: Some("literal-secret".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_secret().unwrap(), Some("literal-secret".to_string()));
    }

    #[test]
    fn test_resolve_secret_env_var() {
        // SAFETY: test-only variable with a unique name
        unsafe {
            std::env::set_var("QUEST_TEST_PLAYER_SECRET_81723", "from-env");
        }
        let config = PlayerConfig {
            secret: Some("env:QUEST_TEST_PLAYER_SECRET_81723".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_secret().unwrap(), Some("from-env".to_string()));
    }

    #[test]
    fn test_resolve_secret_missing_env_var() {
        let config = PlayerConfig {
            secret: Some("env:QUEST_TEST_DEFINITELY_UNSET_55102".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.resolve_secret(), Err(PlayerError::Config(_))));
    }

    #[test]
    fn test_generate_secret() {
        let secret = PlayerConfig::generate_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(secret, PlayerConfig::generate_secret());
    }
}
