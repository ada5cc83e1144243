// src/auth/session.rs
//! Cookie de session et contexte de requête.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, HeaderValue, header, request::Parts};
use chrono::{Duration, Utc};
use diesel::SqliteConnection;
use uuid::Uuid;

use crate::auth::permissions::Permission;
use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::session::Session;
use crate::db::models::user::User;
use crate::db::repositories::session_repository::SessionRepository;
use crate::db::repositories::user_repository::UserRepository;
use crate::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "sessionid";
const FORWARDED_FOR: &str = "x-forwarded-for";
const UNKNOWN_IP: &str = "unknown";

/// Crée et enregistre une nouvelle session
pub fn open_session(
    conn: &mut SqliteConnection,
    user_id: Option<i32>,
    current_app: Option<&str>,
    dark_mode: bool,
    ttl_hours: i64,
) -> Result<Session, RepositoryError> {
    let now = Utc::now().naive_utc();
    SessionRepository::create(
        conn,
        &Session {
            id: Uuid::new_v4().simple().to_string(),
            user_id,
            current_app: current_app.map(str::to_string),
            dark_mode,
            created_at: now,
            expires_at: now + Duration::hours(ttl_hours),
        },
    )
}

/// `Set-Cookie` posant le jeton de session
pub fn session_cookie(token: &str, ttl_hours: i64, secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        ttl_hours * 3600
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| AppError::internal(format!("Invalid cookie: {e}")))
}

/// `Set-Cookie` qui efface le jeton côté client
pub fn clear_session_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static("sessionid=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0; Secure")
    } else {
        HeaderValue::from_static("sessionid=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
    }
}

pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            cookie
                .trim()
                .strip_prefix("sessionid=")
                .filter(|token| !token.is_empty())
                .map(str::to_string)
        })
}

/// Première entrée de `X-Forwarded-For`, sinon l'adresse du pair
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => UNKNOWN_IP.to_string(),
    }
}

/// État de session chargé pour une requête.
/// Une session expirée est supprimée et traitée comme absente; un compte
/// désactivé est traité comme anonyme.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub session: Option<Session>,
    pub user: Option<User>,
    pub permissions: Vec<String>,
    pub ip_address: String,
}

impl RequestContext {
    pub fn load(
        conn: &mut SqliteConnection,
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
    ) -> Result<Self, AppError> {
        let ip_address = client_ip(headers, peer);

        let session = match session_token(headers) {
            Some(token) => SessionRepository::find_by_id(conn, &token)?,
            None => None,
        };
        let session = match session {
            Some(session) if session.is_expired(Utc::now().naive_utc()) => {
                SessionRepository::delete(conn, &session.id)?;
                tracing::debug!("Expired session discarded");
                None
            }
            other => other,
        };

        let user = match session.as_ref().and_then(|s| s.user_id) {
            Some(user_id) => UserRepository::find_by_id(conn, user_id)?.filter(|u| u.is_active),
            None => None,
        };

        let permissions = match &user {
            Some(user) => UserRepository::permissions_of(conn, user.id)?
                .into_iter()
                .map(|(codename, _)| codename)
                .collect(),
            None => Vec::new(),
        };

        Ok(Self {
            session,
            user,
            permissions,
            ip_address,
        })
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.id.as_str())
    }

    pub fn dark_mode(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.dark_mode)
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.iter().any(|p| p == permission.codename())
    }

    pub fn require_login(&self) -> Result<&User, AppError> {
        self.user.as_ref().ok_or(AppError::Unauthenticated)
    }

    /// 401 sans session, 403 sans la permission
    pub fn require(&self, permission: Permission) -> Result<&User, AppError> {
        let user = self.require_login()?;
        if !self.has(permission) {
            tracing::debug!(
                username = %user.username,
                permission = permission.codename(),
                "Permission denied"
            );
            return Err(permission.denied());
        }
        Ok(user)
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let mut conn = get_connection(&state.pool)?;
        RequestContext::load(&mut conn, &parts.headers, peer)
    }
}
