//! User accounts and session records.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::SESSION_TOKEN_LEN;

/// User account row. `password_hash` is an argon2 PHC string and never
/// leaves the storage layer; API responses use [`UserSummary`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public projection of a [`User`] safe to return from the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

/// Database-backed session row keyed by its random token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Request payload for registering a user.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Request payload for logging in.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl User {
    /// Create a new user with a fresh id, stamped with the current time.
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

impl From<&User> for UserSummary {
    fn from(value: &User) -> Self {
        Self {
            id: value.id.clone(),
            username: value.username.clone(),
        }
    }
}

impl Session {
    /// Create a session for `user_id` with a random alphanumeric token.
    ///
    /// # Arguments
    /// - `user_id`: Owning user's id.
    /// - `ttl_hours`: Lifetime before the session expires.
    pub fn new(user_id: &str, ttl_hours: i64) -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_TOKEN_LEN)
            .map(char::from)
            .collect();
        let now = Utc::now();
        Self {
            token,
            user_id: user_id.to_string(),
            created_at: now,
            expires_at: now + Duration::hours(ttl_hours),
        }
    }

    /// Whether the session has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
