//! JWT token service implementation (HS256).

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use devbook_core::ports::{AuthError, TokenService};

/// Name of the claim carrying the user id.
const USER_ID_CLAIM: &str = "user_id";

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret. `None` means tokens can be neither issued nor verified.
    pub secret: Option<String>,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            expiration_hours: 24,
            issuer: "devbook-api".to_string(),
        }
    }
}

/// Claims written into issued tokens.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: String,
    exp: i64,    // expiration timestamp
    iat: i64,    // issued at
    iss: String, // issuer
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// JWT-based token service.
pub struct JwtTokenService {
    keys: Option<Keys>,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let keys = config
            .secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .map(|secret| Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            });

        if keys.is_none() {
            tracing::warn!("No signing secret configured. Set API_SECRET to enable authentication.");
        }

        Self { keys, config }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation
    }
}

impl TokenService for JwtTokenService {
    fn issue_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        let keys = self
            .keys
            .as_ref()
            .ok_or_else(|| AuthError::SigningError("signing secret is not configured".to_string()))?;

        let now = Utc::now();
        let exp = TimeDelta::try_hours(self.config.expiration_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| AuthError::SigningError("token lifetime out of range".to_string()))?;

        let claims = Claims {
            user_id: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| AuthError::SigningError(e.to_string()))
    }

    fn verify_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let keys = self
            .keys
            .as_ref()
            .ok_or_else(|| AuthError::InvalidToken("signing secret is not configured".to_string()))?;

        let token_data = decode::<Map<String, Value>>(token, &keys.decoding, &self.validation())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::InvalidToken("token expired".to_string()),
                ErrorKind::InvalidAlgorithm => {
                    AuthError::InvalidToken("unexpected signing method".to_string())
                }
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        let user_id = token_data
            .claims
            .get(USER_ID_CLAIM)
            .and_then(Value::as_str)
            .ok_or(AuthError::ClaimMissing)?;

        Uuid::parse_str(user_id).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}
