//! Session tokens.
//!
//! Access tokens are short-lived HS256 JWTs issued by `rankforge`; they carry
//! the user id and platform role only. Refresh tokens are opaque random hex
//! strings and are persisted as SHA-256 digests on the `sessions` row.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rankforge_core::hashing::{random_token_hex, sha256_hex};
use rankforge_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{env_or, required_env};

/// `iss` claim of every access token this server mints.
pub const TOKEN_ISSUER: &str = "rankforge";

/// Random bytes in a refresh token.
const REFRESH_TOKEN_BYTES: usize = 32;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    /// Platform role (`"platform_admin"` or `"user"`). Workspace roles are
    /// looked up per request, never carried in the token.
    pub role: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// `JWT_SECRET` (required), `JWT_ACCESS_EXPIRY_MINS` (15) and
    /// `JWT_REFRESH_EXPIRY_DAYS` (7).
    ///
    /// # Panics
    ///
    /// Panics when the secret is missing or an expiry is not a positive integer.
    pub fn from_env() -> Self {
        let config = Self {
            secret: required_env("JWT_SECRET"),
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", 15),
            refresh_token_expiry_days: env_or("JWT_REFRESH_EXPIRY_DAYS", 7),
        };
        assert!(
            config.access_token_expiry_mins > 0 && config.refresh_token_expiry_days > 0,
            "JWT expiries must be positive"
        );
        config
    }

    /// Access token lifetime in seconds, as reported to clients.
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation
    }
}

pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        iss: TOKEN_ISSUER.to_string(),
        iat: now,
        exp: now + config.access_token_ttl_secs(),
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Decode an access token, checking signature, expiry and issuer.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &config.validation(),
    )
    .map(|data| data.claims)
}

/// A new refresh token as `(plaintext, digest)`. Only the digest is stored.
pub fn generate_refresh_token() -> (String, String) {
    let plaintext = random_token_hex(REFRESH_TOKEN_BYTES);
    let hash = hash_refresh_token(&plaintext);
    (plaintext, hash)
}

pub fn hash_refresh_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use jsonwebtoken::errors::ErrorKind;
    use rankforge_core::roles::{PLATFORM_ADMIN, PLATFORM_USER};

    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "unit-test-jwt-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims_at(now: i64) -> Claims {
        Claims {
            sub: 7,
            role: PLATFORM_USER.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now,
            exp: now + 900,
            jti: Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn issued_token_validates_with_role_and_issuer() {
        let config = test_config();
        let token = generate_access_token(42, PLATFORM_ADMIN, &config).unwrap();

        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, PLATFORM_ADMIN);
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.exp - claims.iat, config.access_token_ttl_secs());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config();
        let now = chrono::Utc::now().timestamp();
        // Past the default 60-second leeway.
        let claims = Claims {
            exp: now - 300,
            ..claims_at(now - 1200)
        };

        let err = validate_token(&sign(&claims, &config.secret), &config).unwrap_err();
        assert_matches!(err.kind(), ErrorKind::ExpiredSignature);
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let config = test_config();
        let claims = Claims {
            iss: "someone-else".to_string(),
            ..claims_at(chrono::Utc::now().timestamp())
        };

        let err = validate_token(&sign(&claims, &config.secret), &config).unwrap_err();
        assert_matches!(err.kind(), ErrorKind::InvalidIssuer);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let config = test_config();
        let claims = claims_at(chrono::Utc::now().timestamp());

        let err = validate_token(&sign(&claims, "another-secret"), &config).unwrap_err();
        assert_matches!(err.kind(), ErrorKind::InvalidSignature);
    }

    #[test]
    fn refresh_tokens_are_random_and_hashed() {
        let (plain_a, hash_a) = generate_refresh_token();
        let (plain_b, _) = generate_refresh_token();

        assert_eq!(plain_a.len(), REFRESH_TOKEN_BYTES * 2);
        assert_ne!(plain_a, plain_b);
        assert_eq!(hash_a, hash_refresh_token(&plain_a));
        assert_ne!(hash_a, plain_a);
    }
}
