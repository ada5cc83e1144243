use chrono::{Duration, Utc};
use crud_lab_api::UserLogRecord;
use diesel::SqliteConnection;
use std::fmt;

use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::user_log::NewUserLog;
use crate::db::repositories::user_log_repository::UserLogRepository;
use crate::error::AppError;

/// Événements d'authentification journalisés
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEvent {
    Login,
    Logout,
    LoginFailed,
    PasswordChange,
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEvent::Login => write!(f, "login"),
            AuditEvent::Logout => write!(f, "logout"),
            AuditEvent::LoginFailed => write!(f, "login_failed"),
            AuditEvent::PasswordChange => write!(f, "password_change"),
        }
    }
}

/// Qui a déclenché l'événement, et d'où
#[derive(Debug, Clone, Copy)]
pub struct Actor<'a> {
    pub user_id: Option<i32>,
    pub username: &'a str,
    pub ip_address: &'a str,
}

#[derive(Clone)]
pub struct AuditService {
    pool: DbPool,
}

impl AuditService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Ajoute une entrée au journal sur une connexion existante
    pub fn record(
        conn: &mut SqliteConnection,
        event: AuditEvent,
        actor: Actor<'_>,
        details: &str,
    ) -> Result<(), RepositoryError> {
        let event_type = event.to_string();
        UserLogRepository::create(
            conn,
            &NewUserLog {
                user_id: actor.user_id,
                username: actor.username,
                event_type: &event_type,
                ip_address: Some(actor.ip_address),
                timestamp: Utc::now().naive_utc(),
                details,
            },
        )?;

        tracing::info!(
            event = %event,
            username = actor.username,
            ip = actor.ip_address,
            "Audit event recorded"
        );
        Ok(())
    }

    pub fn recent(&self, limit: i64) -> Result<Vec<UserLogRecord>, AppError> {
        let mut conn = get_connection(&self.pool)?;
        let logs = UserLogRepository::recent(&mut conn, limit)?;
        Ok(logs.into_iter().map(Into::into).collect())
    }

    /// Supprime les entrées plus vieilles que `retention_days` jours
    pub fn purge(&self, retention_days: i64) -> Result<usize, RepositoryError> {
        let cutoff = Utc::now().naive_utc() - Duration::days(retention_days.max(0));
        let mut conn = get_connection(&self.pool)?;
        let removed = UserLogRepository::delete_older_than(&mut conn, cutoff)?;

        tracing::info!(removed, retention_days, %cutoff, "Purged old user logs");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_pool;

    fn actor() -> Actor<'static> {
        Actor {
            user_id: None,
            username: "ghost",
            ip_address: "10.0.0.1",
        }
    }

    #[test]
    fn event_names_match_stored_values() {
        assert_eq!(AuditEvent::Login.to_string(), "login");
        assert_eq!(AuditEvent::LoginFailed.to_string(), "login_failed");
        assert_eq!(AuditEvent::PasswordChange.to_string(), "password_change");
    }

    #[test]
    fn record_then_read_back() {
        let (pool, _dir) = test_pool();
        let service = AuditService::new(pool.clone());

        let mut conn = get_connection(&pool).unwrap();
        AuditService::record(&mut conn, AuditEvent::LoginFailed, actor(), "").unwrap();
        drop(conn);

        let logs = service.recent(10).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].event_type, "login_failed");
        assert_eq!(logs[0].ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(logs[0].user_id, None);
    }

    #[test]
    fn purge_keeps_recent_entries() {
        let (pool, _dir) = test_pool();
        let service = AuditService::new(pool.clone());

        let mut conn = get_connection(&pool).unwrap();
        AuditService::record(&mut conn, AuditEvent::Login, actor(), "").unwrap();
        UserLogRepository::create(
            &mut conn,
            &NewUserLog {
                user_id: None,
                username: "ghost",
                event_type: "logout",
                ip_address: None,
                timestamp: Utc::now().naive_utc() - Duration::days(120),
                details: "",
            },
        )
        .unwrap();
        drop(conn);

        assert_eq!(service.purge(90).unwrap(), 1);
        let logs = service.recent(10).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].event_type, "login");
    }
}
