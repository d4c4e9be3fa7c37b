//! Signed identity tokens.
//!
//! [`AuthGate`] turns a user id into an HS256-signed token and back. Tokens
//! carry `{"user": {"id": ...}}` and do not expire; trust rests entirely on
//! the signature, so verification never consults the user store.

mod password;

pub use password::{hash_password, verify_password};

use std::collections::HashSet;
use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{Error, Result};

/// Server-held signing secret. Redacted from `Debug` output.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

impl JwtSecret {
    /// A blank secret is a startup configuration failure.
    pub fn new(secret: impl Into<String>) -> anyhow::Result<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            anyhow::bail!("JWT secret must not be empty");
        }
        Ok(Self(SecretString::new(secret.into())))
    }

    fn expose(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }

    pub(crate) fn len(&self) -> usize {
        self.0.expose_secret().len()
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.len())
    }
}

/// The authenticated identity making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    user: Principal,
    iat: i64,
}

/// Issues and verifies identity tokens.
#[derive(Clone)]
pub struct AuthGate {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl AuthGate {
    pub fn new(secret: &JwtSecret, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens are non-expiring; only the signature and payload shape matter.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding_key: EncodingKey::from_secret(secret.expose()),
            decoding_key: DecodingKey::from_secret(secret.expose()),
            validation,
            clock,
        }
    }

    pub fn issue_token(&self, principal_id: Uuid) -> Result<String> {
        let claims = Claims {
            user: Principal { id: principal_id },
            iat: self.clock.now().timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Internal(anyhow::anyhow!("failed to sign token: {e}")))
    }

    /// Resolve a bearer credential into a principal.
    ///
    /// `None` means no credential was presented at all.
    pub fn verify_token(&self, token: Option<&str>) -> Result<Principal> {
        let token = match token.map(str::trim) {
            Some(token) if !token.is_empty() => token,
            _ => return Err(Error::Unauthenticated),
        };

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.user)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                Error::InvalidToken
            })
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}
