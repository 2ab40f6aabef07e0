//! Signed session cookies.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::program::QuestParams;

use super::{PlayerConfig, PlayerError};

/// What a player's cookie remembers between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSession {
    /// Game session id, the bridge registry key.
    pub sid: String,
    /// Player-facing id recorded in the score log.
    pub uid: String,
    pub team: String,
    pub players: String,
}

impl PlayerSession {
    pub fn params(&self) -> QuestParams {
        QuestParams::new(&self.team, &self.players, &self.uid)
    }
}

/// JWT claims carried in the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerClaims {
    #[serde(flatten)]
    pub session: PlayerSession,
    /// Issued at (as Unix timestamp).
    pub iat: i64,
    /// Expiration time (as Unix timestamp).
    pub exp: i64,
}

/// Extract a cookie value from a `Cookie` header.
pub fn token_from_cookie_header<'a>(cookie_header: &'a str, cookie_name: &str) -> Option<&'a str> {
    cookie_header.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        if name.trim() == cookie_name {
            Some(value.trim())
        } else {
            None
        }
    })
}

/// Signing keys and cookie settings for player sessions.
#[derive(Clone)]
pub struct PlayerKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    cookie_name: String,
    max_age_secs: u64,
    secure_cookie: bool,
}

impl PlayerKeys {
    pub fn new(secret: &str, config: &PlayerConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            cookie_name: config.cookie_name.clone(),
            max_age_secs: config.max_age_secs,
            secure_cookie: config.secure_cookie,
        }
    }

    /// Build keys from config, generating a secret when none is configured.
    pub fn from_config(config: &PlayerConfig) -> Result<Self, PlayerError> {
        let secret = match config.resolve_secret()? {
            Some(secret) => secret,
            None => {
                warn!(
                    "No player session secret configured; sessions will not survive a restart"
                );
                PlayerConfig::generate_secret()
            }
        };
        Ok(Self::new(&secret, config))
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Sign a session into a token.
    pub fn issue(&self, session: &PlayerSession) -> Result<String, PlayerError> {
        let now = Utc::now().timestamp();
        let claims = PlayerClaims {
            session: session.clone(),
            iat: now,
            exp: now + self.max_age_secs as i64,
        };
        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &PlayerClaims) -> Result<String, PlayerError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| PlayerError::Internal(e.to_string()))
    }

    /// Validate a token and return the session it carries.
    pub fn verify(&self, token: &str) -> Result<PlayerSession, PlayerError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.required_spec_claims.clear();

        let data = decode::<PlayerClaims>(token, &self.decoding, &validation).map_err(|e| {
            debug!("Player token rejected: {:?}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => PlayerError::TokenExpired,
                _ => PlayerError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(data.claims.session)
    }

    /// Read and validate the session cookie from request headers.
    pub fn session_from_headers(&self, headers: &HeaderMap) -> Result<PlayerSession, PlayerError> {
        let token = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|header| token_from_cookie_header(header, &self.cookie_name))
            .ok_or(PlayerError::MissingSession)?;
        self.verify(token)
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn set_cookie(&self, token: &str) -> String {
        let secure_flag = if self.secure_cookie { " Secure;" } else { "" };
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax;{} Max-Age={}",
            self.cookie_name, token, secure_flag, self.max_age_secs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn keys(secret: &str) -> PlayerKeys {
        PlayerKeys::new(secret, &PlayerConfig::default())
    }

    fn session() -> PlayerSession {
        PlayerSession {
            sid: "8f14e45f-ceea-467f-a8f4-4f2a0b4b1c11".to_string(),
            uid: "OWLS-AG-1A2B3C".to_string(),
            team: "owls".to_string(),
            players: "ada, grace".to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let keys = keys("test-secret");
        let token = keys.issue(&session()).unwrap();
        assert_eq!(keys.verify(&token).unwrap(), session());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = keys("secret-a").issue(&session()).unwrap();
        assert!(matches!(
            keys("secret-b").verify(&token),
            Err(PlayerError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = keys("test-secret");
        let now = Utc::now().timestamp();
        let token = keys
            .encode_claims(&PlayerClaims {
                session: session(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        assert!(matches!(keys.verify(&token), Err(PlayerError::TokenExpired)));
    }

    #[test]
    fn test_session_from_headers() {
        let keys = keys("test-secret");
        let token = keys.issue(&session()).unwrap();

        let mut headers = HeaderMap::new();
        assert!(matches!(
            keys.session_from_headers(&headers),
            Err(PlayerError::MissingSession)
        ));

        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; quest_session={token}")).unwrap(),
        );
        assert_eq!(keys.session_from_headers(&headers).unwrap(), session());
    }

    #[test]
    fn test_token_from_cookie_header() {
        assert_eq!(token_from_cookie_header("a=1; b=2", "b"), Some("2"));
        assert_eq!(token_from_cookie_header(" b = 2 ", "b"), Some("2"));
        assert_eq!(token_from_cookie_header("a=1", "b"), None);
        assert_eq!(token_from_cookie_header("garbage", "b"), None);
    }

    #[test]
    fn test_set_cookie_attributes() {
        let plain = keys("s").set_cookie("tok");
        assert_eq!(plain, "quest_session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=86400");

        let secure = PlayerKeys::new(
            "s",
            &PlayerConfig {
                secure_cookie: true,
                ..Default::default()
            },
        )
        .set_cookie("tok");
        assert!(secure.contains("SameSite=Lax; Secure; Max-Age=86400"));
    }
}
