use super::config::JwtConfig;
use super::store::TokenStore;
use crate::errors::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("Token has been revoked")]
    Revoked,

    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Token store error: {0}")]
    Store(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken(_) | AuthError::Revoked => {
                AppError::Unauthorized(err.to_string())
            }
            AuthError::Signing(_) | AuthError::Store(_) => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// User id
    pub sub: String,
    pub email: String,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
    /// Token id, used for revocation
    pub jti: String,
}

impl JwtClaims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// A freshly signed access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    /// Seconds until expiry
    pub expires_in: i64,
    pub claims: JwtClaims,
}

/// Stateless HS256 tokens backed by a revocation list.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
    store: Arc<dyn TokenStore>,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig, store: Arc<dyn TokenStore>) -> Self {
        tracing::info!(ttl_secs = config.ttl_secs, "JWT auth initialized");
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl_secs: config.ttl_secs,
            store,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn issue(&self, user_id: &str, email: &str, name: &str) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::Signing)?;

        Ok(IssuedToken {
            access_token,
            expires_in: self.ttl_secs,
            claims,
        })
    }

    /// Check signature and expiry only.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<JwtClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(AuthError::InvalidToken)
    }

    /// Verify the token and make sure it has not been revoked.
    pub async fn authenticate(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let claims = self.verify(token)?;
        if self.store.is_revoked(&claims.jti).await? {
            return Err(AuthError::Revoked);
        }
        Ok(claims)
    }

    /// Revoke the token until it would have expired anyway.
    pub async fn revoke(&self, claims: &JwtClaims) -> Result<(), AuthError> {
        self.store.revoke(&claims.jti, claims.expires_at()).await?;
        tracing::debug!(jti = %claims.jti, "Token revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::InMemoryTokenStore;

    const SECRET: &str = "test-secret-key-that-is-long-enough";

    fn auth() -> JwtAuth {
        let config = JwtConfig::new(SECRET).unwrap();
        JwtAuth::new(&config, Arc::new(InMemoryTokenStore::new()))
    }

    #[tokio::test]
    async fn issued_token_authenticates() {
        let auth = auth();
        let user_id = Uuid::now_v7();
        let issued = auth.issue(&user_id.to_string(), "a@x.com", "Alice").unwrap();

        let claims = auth.authenticate(&issued.access_token).await.unwrap();
        assert_eq!(claims.user_id(), Some(user_id));
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(issued.expires_in, 3600);
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() {
        let auth = auth();
        let issued = auth.issue("id", "a@x.com", "Alice").unwrap();

        auth.revoke(&issued.claims).await.unwrap();

        let err = auth.authenticate(&issued.access_token).await.unwrap_err();
        assert!(matches!(err, AuthError::Revoked));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let other = JwtAuth::new(
            &JwtConfig::new("another-secret-key-that-is-long-enough").unwrap(),
            Arc::new(InMemoryTokenStore::new()),
        );
        let issued = other.issue("id", "a@x.com", "Alice").unwrap();

        assert!(matches!(
            auth().verify(&issued.access_token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_invalid() {
        let config = JwtConfig::new(SECRET).unwrap().with_ttl(-10);
        let auth = JwtAuth::new(&config, Arc::new(InMemoryTokenStore::new()));
        let issued = auth.issue("id", "a@x.com", "Alice").unwrap();

        assert!(auth.verify(&issued.access_token).is_err());
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        use axum::http::StatusCode;

        assert_eq!(AppError::from(AuthError::Revoked).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::from(AuthError::Store("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
