use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AppError;

/// How long an issued token stays valid.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// The authenticated user's id.
    pub user_id: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i64, issued_at: DateTime<Utc>) -> Self {
        let expires_at = issued_at + Duration::days(TOKEN_TTL_DAYS);
        Self {
            user_id,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

/// Why a token was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a JWT, wrong algorithm, or claims that do not match [`Claims`].
    Malformed,
    InvalidSignature,
    Expired,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "Invalid token"),
            TokenError::InvalidSignature => write!(f, "Invalid token signature"),
            TokenError::Expired => write!(f, "Token has expired"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Signs and verifies HS256 tokens with a secret supplied at startup.
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenManager {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a token for `user_id`, valid for seven days from now.
    pub fn issue(&self, user_id: i64) -> Result<String, AppError> {
        self.sign(&Claims::new(user_id, Utc::now()))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Checks the signature and expiry and returns the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = TokenManager::new("test_secret_for_gen_verify");
        let token = tokens.issue(1).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user_id, 1);
    }

    #[test]
    fn test_expiry_is_seven_days_after_issue() {
        let tokens = TokenManager::new("test_secret");
        let claims = tokens.verify(&tokens.issue(42).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_token_expiration() {
        let tokens = TokenManager::new("test_secret_for_expiration");
        let issued_at = Utc::now() - Duration::days(TOKEN_TTL_DAYS) - Duration::seconds(5);
        let expired_token = tokens.sign(&Claims::new(2, issued_at)).unwrap();

        assert_eq!(tokens.verify(&expired_token), Err(TokenError::Expired));
    }

    #[test]
    fn test_invalid_token_signature() {
        let issuer = TokenManager::new("one_secret");
        let verifier = TokenManager::new("a_completely_different_secret");
        let token = issuer.issue(3).unwrap();

        assert_eq!(verifier.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_malformed_tokens() {
        let tokens = TokenManager::new("test_secret");
        assert_eq!(tokens.verify("not-a-jwt"), Err(TokenError::Malformed));
        assert_eq!(tokens.verify(""), Err(TokenError::Malformed));

        // Well-formed JWT whose claims lack user_id.
        #[derive(Serialize)]
        struct Foreign {
            sub: String,
            exp: i64,
        }
        let foreign = encode(
            &Header::default(),
            &Foreign {
                sub: "someone".into(),
                exp: (Utc::now() + Duration::hours(1)).timestamp(),
            },
            &EncodingKey::from_secret(b"test_secret"),
        )
        .unwrap();
        assert_eq!(tokens.verify(&foreign), Err(TokenError::Malformed));
    }
}
