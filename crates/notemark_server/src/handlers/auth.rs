//! Authentication HTTP handlers.

use crate::{auth, error::HttpError, AppState};
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use notemark_core::models::user::{LoginRequest, RegisterRequest, Session, User, UserSummary};
use notemark_core::AppError;

fn open_session(state: &AppState, user: &User) -> Result<Session, AppError> {
    let session = Session::new(&user.id, state.config.session_ttl_hours);
    state.db.sessions.insert(&session)?;
    Ok(session)
}

/// Register a new account and open a session for it.
///
/// # Arguments
/// - `state`: Application state.
/// - `jar`: Incoming cookie jar.
/// - `req`: Registration payload.
///
/// # Returns
/// `201 Created` with the new user summary and a session cookie.
///
/// # Errors
/// Returns an error if validation fails, the username is taken, or
/// persistence fails.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<UserSummary>), HttpError> {
    let username = auth::validate_registration(&req)?.to_string();
    let password_hash = auth::hash_password(&req.password)?;

    let user = User::new(username, password_hash);
    state.db.users.create(&user)?;
    let session = open_session(&state, &user)?;

    tracing::info!("Registered user '{}'", user.username);
    let jar = jar.add(auth::session_cookie(session.token));
    Ok((StatusCode::CREATED, jar, Json(UserSummary::from(&user))))
}

/// Log in with username and password.
///
/// # Arguments
/// - `state`: Application state.
/// - `jar`: Incoming cookie jar.
/// - `req`: Login payload.
///
/// # Returns
/// The user summary and a fresh session cookie.
///
/// # Errors
/// Returns [`AppError::Unauthorized`] on a bad username or password, or an
/// error when persistence fails. Unknown usernames and wrong passwords are
/// indistinguishable in the response.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserSummary>), HttpError> {
    let Some(user) = state.db.users.get_by_username(req.username.trim())? else {
        return Err(AppError::Unauthorized.into());
    };
    if !auth::verify_password(&req.password, &user.password_hash) {
        return Err(AppError::Unauthorized.into());
    }

    let session = open_session(&state, &user)?;
    let jar = jar.add(auth::session_cookie(session.token));
    Ok((jar, Json(UserSummary::from(&user))))
}

/// Terminate the current session, if any.
///
/// Idempotent: succeeds with `204 No Content` whether or not a live session
/// cookie was presented.
///
/// # Arguments
/// - `state`: Application state.
/// - `jar`: Incoming cookie jar.
///
/// # Returns
/// `204 No Content` with a cookie removal directive.
///
/// # Errors
/// Returns an error when session deletion fails.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), HttpError> {
    if let Some(cookie) = jar.get(auth::SESSION_COOKIE) {
        if let Some(session) = state.db.sessions.get_valid(cookie.value())? {
            state.db.sessions.delete(&session.token)?;
            // Drop the cached store so the next login reloads from disk.
            state
                .sessions
                .evict(&session.user_id)
                .map_err(super::access::store_access_error)?;
        }
    }

    let jar = jar.remove(auth::removal_cookie());
    Ok((StatusCode::NO_CONTENT, jar))
}

/// Fetch the authenticated user's summary.
///
/// # Arguments
/// - `state`: Application state.
/// - `jar`: Incoming cookie jar.
///
/// # Returns
/// The current user's summary as JSON.
///
/// # Errors
/// Returns [`AppError::Unauthorized`] without a valid session.
pub async fn me(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<UserSummary>, HttpError> {
    let user = auth::authenticate(&state.db, &jar)?;
    Ok(Json(UserSummary::from(&user)))
}
