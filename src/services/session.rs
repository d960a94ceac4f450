//! Stateless session tokens.
//!
//! A session is an HS256 JWT carrying the user's `{id, username}`. Nothing is
//! stored server-side: a token is valid exactly while its signature checks out
//! and its expiry lies in the future.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::models::Identity;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: String,
    username: String,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl SessionCodec {
    #[must_use]
    pub fn new(secret: &[u8], ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_seconds,
        }
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    /// Issues a token as if signed at `issued_at` (unix seconds).
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            id: identity.id.clone(),
            username: identity.username.clone(),
            iat: issued_at,
            exp: issued_at + self.ttl_seconds,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Any failure (bad signature, expiry, garbage) yields `None`.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Identity> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| tracing::debug!(error = %e, "Rejected session token"))
            .ok()
            .map(|data| Identity {
                id: data.claims.id,
                username: data.claims.username,
            })
    }
}

/// Random 256-bit secret, hex encoded.
#[must_use]
pub fn generate_secret() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: "4f1c".to_string(),
            username: "haruka".to_string(),
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let codec = SessionCodec::new(b"test-secret", 3600);
        let token = codec.issue(&identity()).unwrap();
        assert_eq!(codec.verify(&token), Some(identity()));
    }

    #[test]
    fn test_expired_token_is_anonymous() {
        let codec = SessionCodec::new(b"test-secret", 3600);
        let two_hours_ago = Utc::now().timestamp() - 2 * 3600;
        let token = codec.issue_at(&identity(), two_hours_ago).unwrap();
        assert_eq!(codec.verify(&token), None);

        let almost_expired = Utc::now().timestamp() - 3500;
        let token = codec.issue_at(&identity(), almost_expired).unwrap();
        assert_eq!(codec.verify(&token), Some(identity()));
    }

    #[test]
    fn test_foreign_or_garbage_tokens() {
        let codec = SessionCodec::new(b"test-secret", 3600);
        let other = SessionCodec::new(b"other-secret", 3600);
        let token = other.issue(&identity()).unwrap();

        assert_eq!(codec.verify(&token), None);
        assert_eq!(codec.verify(""), None);
        assert_eq!(codec.verify("not.a.jwt"), None);

        let mut tampered = codec.issue(&identity()).unwrap();
        tampered.push('x');
        assert_eq!(codec.verify(&tampered), None);
    }

    #[test]
    fn test_generate_secret() {
        let a = generate_secret();
        assert_eq!(a.len(), 64);
        assert_ne!(a, generate_secret());
    }
}
