//! Bearer token signing and verification.
//!
//! Tokens carry the user id and email and no expiry; they stay valid for as
//! long as the signature checks out.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims embedded in every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub email: String,
}

#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens are issued without an exp claim; signature validity is the
        // only lifetime bound.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn sign(&self, id: i32, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            id,
            email: email.to_string(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_roundtrip() {
        let signer = TokenSigner::new("test-secret");
        let token = signer.sign(42, "a@b.com").unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.id, 42);
        assert_eq!(claims.email, "a@b.com");
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let signer = TokenSigner::new("secret-one");
        let other = TokenSigner::new("secret-two");

        let token = signer.sign(1, "a@b.com").unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn rejects_garbage() {
        let signer = TokenSigner::new("test-secret");
        assert!(signer.verify("not-a-token").is_err());
        assert!(signer.verify("").is_err());
    }
}
