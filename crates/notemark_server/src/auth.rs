//! Session authentication and password hashing.
//!
//! Sessions are opaque random tokens stored server-side and carried in an
//! HttpOnly cookie. Passwords are hashed with Argon2id in PHC string format.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use notemark_core::db::Database;
use notemark_core::models::user::{RegisterRequest, User};
use notemark_core::AppError;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "notemark_session";

const MAX_USERNAME_LEN: usize = 64;
const MIN_PASSWORD_LEN: usize = 8;

/// Hash a password with Argon2id and a fresh random salt.
///
/// # Returns
/// The PHC-formatted hash string.
///
/// # Errors
/// Returns an error if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::StorageMessage(format!("Password hashing failed: {err}")))
}

/// Check a password against a stored PHC hash.
///
/// Malformed stored hashes verify as false rather than erroring, so a
/// corrupted row reads as a failed login instead of a 500.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Validate a registration payload.
///
/// # Returns
/// The trimmed username on success.
///
/// # Errors
/// Returns [`AppError::BadRequest`] describing the first failed rule.
pub fn validate_registration(req: &RegisterRequest) -> Result<&str, AppError> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AppError::BadRequest(
            "Username cannot contain whitespace".to_string(),
        ));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(username)
}

/// Resolve the calling user from the session cookie.
///
/// # Returns
/// The authenticated [`User`].
///
/// # Errors
/// Returns [`AppError::Unauthorized`] when the cookie is missing, the
/// session is expired or unknown, or the user row no longer exists.
pub fn authenticate(db: &Database, jar: &CookieJar) -> Result<User, AppError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Err(AppError::Unauthorized);
    };
    let Some(session) = db.sessions.get_valid(cookie.value())? else {
        return Err(AppError::Unauthorized);
    };
    db.users.get(&session.user_id)?.ok_or(AppError::Unauthorized)
}

/// Build the session cookie for a freshly issued token.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .build()
}

/// Cookie used to clear the session on logout.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}
