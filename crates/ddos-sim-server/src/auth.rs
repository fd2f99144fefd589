//! Session-cookie authentication.
//!
//! Accounts register and log in with a username and password. A successful
//! login stores a [`Session`] under a random token and hands the token back
//! in the `ddos_sim.sid` cookie. Every data route is wrapped in
//! [`require_auth`], which resolves the cookie to an account and rejects
//! the request with `401` before any handler runs.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/register` | Create an account and log in |
//! | `POST` | `/api/login` | Log in |
//! | `POST` | `/api/logout` | Destroy the current session |
//! | `GET` | `/api/user` | The logged-in account |
//!
//! Passwords are stored as `<hash>.<salt>`: a 64-byte scrypt key
//! (`N = 2^14, r = 8, p = 1`) derived with a random hex salt, the key
//! hex-encoded. Verification compares keys in constant time.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use scrypt::{Params, scrypt};
use subtle::ConstantTimeEq;
use tracing::{debug, info};

use ddos_sim_store::{Session, SessionId};
use ddos_sim_types::{Account, Credentials, NewAccount, PublicAccount};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::ValidJson;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "ddos_sim.sid";

/// scrypt cost: `N = 2^14`.
const SCRYPT_LOG_N: u8 = 14;

/// scrypt block size.
const SCRYPT_R: u32 = 8;

/// scrypt parallelism.
const SCRYPT_P: u32 = 1;

/// Derived key length in bytes.
const KEY_LEN: usize = 64;

/// Random salt length in bytes, before hex encoding.
const SALT_LEN: usize = 16;

// ---------------------------------------------------------------------------
// Credential hashing
// ---------------------------------------------------------------------------

/// Hash `password` with a fresh random salt.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] if the scrypt parameters are rejected.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = hex::encode(rand::random::<[u8; SALT_LEN]>());
    let digest = derive(password, &salt).map_err(ApiError::Internal)?;
    Ok(format!("{}.{salt}", hex::encode(digest)))
}

/// Check `password` against a stored `<hash>.<salt>` string.
///
/// Malformed stored values never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((hash_hex, salt)) = stored.split_once('.') else {
        return false;
    };
    let Ok(expected) = hex::decode(hash_hex) else {
        return false;
    };
    match derive(password, salt) {
        Ok(actual) => expected.as_slice().ct_eq(actual.as_slice()).into(),
        Err(detail) => {
            debug!(%detail, "Password derivation failed");
            false
        }
    }
}

/// scrypt over the hex salt string, as stored next to the hash.
fn derive(password: &str, salt: &str) -> Result<[u8; KEY_LEN], String> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
        .map_err(|e| format!("scrypt params: {e}"))?;
    let mut out = [0u8; KEY_LEN];
    scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut out)
        .map_err(|e| format!("scrypt output: {e}"))?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Cookies
// ---------------------------------------------------------------------------

/// Extract the session token from the request's `Cookie` headers.
pub fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| SessionId::from_token(token))
}

fn session_cookie(state: &AppState, id: &SessionId) -> Result<HeaderValue, ApiError> {
    let secure = if state.session_config.secure_cookie {
        "; Secure"
    } else {
        ""
    };
    let cookie = format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{secure}",
        state.session_config.ttl_secs
    );
    HeaderValue::from_str(&cookie).map_err(|e| ApiError::Internal(format!("bad cookie: {e}")))
}

const fn cleared_cookie() -> HeaderValue {
    HeaderValue::from_static("ddos_sim.sid=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Create a session for `account` and return its cookie header value.
async fn start_session(state: &AppState, account: &Account) -> Result<HeaderValue, ApiError> {
    let id = SessionId::generate();
    let session = Session::new(account.id, Utc::now(), state.session_config.ttl());
    let cookie = session_cookie(state, &id)?;
    state.sessions.write().await.put(id, session);
    Ok(cookie)
}

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

/// The account behind an authenticated request.
///
/// Inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub PublicAccount);

/// Reject requests without a live session.
///
/// On success the resolved [`AuthUser`] is added to the request
/// extensions for downstream handlers.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = resolve_user(&state, request.headers()).await?;
    request.extensions_mut().insert(AuthUser(user));
    Ok(next.run(request).await)
}

async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<PublicAccount, ApiError> {
    let id = session_from_headers(headers).ok_or(ApiError::Unauthorized)?;
    let session = state
        .sessions
        .write()
        .await
        .get(&id, Utc::now())
        .ok_or(ApiError::Unauthorized)?;

    let store = state.store.read().await;
    let account = store.account(session.account_id).ok_or_else(|| {
        debug!(account_id = %session.account_id, "Session refers to a missing account");
        ApiError::Unauthorized
    })?;
    Ok(account.public())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Register a new account and log it in.
///
/// # Route
///
/// `POST /api/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidJson(credentials): ValidJson<Credentials>,
) -> Result<Response, ApiError> {
    let password_hash = hash_password(&credentials.password)?;
    let account = state.store.write().await.create_account(NewAccount {
        username: credentials.username,
        password_hash,
    })?;
    let cookie = start_session(&state, &account).await?;
    info!(account_id = %account.id, username = %account.username, "Account registered");

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(account.public()),
    )
        .into_response())
}

/// Log in with a username and password.
///
/// # Route
///
/// `POST /api/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(credentials): ValidJson<Credentials>,
) -> Result<Response, ApiError> {
    let account = {
        let store = state.store.read().await;
        store
            .account_by_username(&credentials.username)
            .filter(|a| verify_password(&credentials.password, &a.password_hash))
            .cloned()
            .ok_or(ApiError::InvalidCredentials)?
    };
    let cookie = start_session(&state, &account).await?;
    info!(account_id = %account.id, "Logged in");

    Ok(([(header::SET_COOKIE, cookie)], Json(account.public())).into_response())
}

/// Destroy the caller's session, if any, and clear the cookie.
///
/// Always succeeds.
///
/// # Route
///
/// `POST /api/logout`
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(id) = session_from_headers(&headers) {
        let removed = state.sessions.write().await.expire(&id);
        debug!(removed, "Logout");
    }
    (StatusCode::OK, [(header::SET_COOKIE, cleared_cookie())]).into_response()
}

/// Return the logged-in account.
///
/// # Route
///
/// `GET /api/user`
pub async fn current_user(
    axum::Extension(AuthUser(user)): axum::Extension<AuthUser>,
) -> Json<PublicAccount> {
    Json(user)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let stored = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn stored_format_is_hex_key_dot_hex_salt() {
        let stored = hash_password("pw").unwrap();
        let (key, salt) = stored.split_once('.').unwrap();
        assert_eq!(key.len(), KEY_LEN * 2);
        assert_eq!(salt.len(), SALT_LEN * 2);
        assert!(hex::decode(key).is_ok());
        assert!(hex::decode(salt).is_ok());
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(hash_password("pw").unwrap(), hash_password("pw").unwrap());
    }

    #[test]
    fn truncated_key_never_matches() {
        let stored = hash_password("pw").unwrap();
        let (key, salt) = stored.split_once('.').unwrap();
        let short = format!("{}.{salt}", &key[..32]);
        assert!(!verify_password("pw", &short));
    }

    #[test]
    fn malformed_stored_hash_never_matches() {
        assert!(!verify_password("pw", "no-dot-here"));
        assert!(!verify_password("pw", "zz.zz"));
        assert!(!verify_password("pw", ""));
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; ddos_sim.sid=abc123; lang=en"),
        );
        assert_eq!(
            session_from_headers(&headers),
            Some(SessionId::from_token("abc123"))
        );
    }

    #[test]
    fn missing_cookie_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_from_headers(&headers), None);
        assert_eq!(session_from_headers(&HeaderMap::new()), None);
    }
}
