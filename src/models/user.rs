use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account.
///
/// The password hash is an argon2 PHC string. It is skipped on serialization
/// so a `User` can never leak it through a response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Lower-cased, unique.
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub occupation: String,
    pub branch: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a new account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUserInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub occupation: Option<String>,
    pub branch: Option<String>,
}

/// Credentials for logging in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response for a successful registration or login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub success: bool,
    #[serde(rename = "jwtToken")]
    pub jwt_token: String,
}

impl TokenResponse {
    pub fn new(jwt_token: String) -> Self {
        Self {
            success: true,
            jwt_token,
        }
    }
}
