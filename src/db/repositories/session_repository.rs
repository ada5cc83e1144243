use crate::db::error::RepositoryError;
use crate::db::models::session::Session;
use crate::db::schema::sessions;
use chrono::NaiveDateTime;
use diesel::prelude::*;

pub struct SessionRepository;

impl SessionRepository {
    pub fn create(conn: &mut SqliteConnection, session: &Session) -> Result<Session, RepositoryError> {
        diesel::insert_into(sessions::table)
            .values(session)
            .returning(Session::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    pub fn find_by_id(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> Result<Option<Session>, RepositoryError> {
        sessions::table
            .find(id)
            .select(Session::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn set_dark_mode(
        conn: &mut SqliteConnection,
        id: &str,
        dark_mode: bool,
    ) -> Result<(), RepositoryError> {
        diesel::update(sessions::table.find(id))
            .set(sessions::dark_mode.eq(dark_mode))
            .execute(conn)?;
        Ok(())
    }

    /// Idempotent: supprimer une session absente n'est pas une erreur
    pub fn delete(conn: &mut SqliteConnection, id: &str) -> Result<usize, RepositoryError> {
        diesel::delete(sessions::table.find(id))
            .execute(conn)
            .map_err(Into::into)
    }

    pub fn delete_for_user(conn: &mut SqliteConnection, user_id: i32) -> Result<usize, RepositoryError> {
        diesel::delete(sessions::table.filter(sessions::user_id.eq(user_id)))
            .execute(conn)
            .map_err(Into::into)
    }

    pub fn delete_expired(
        conn: &mut SqliteConnection,
        now: NaiveDateTime,
    ) -> Result<usize, RepositoryError> {
        diesel::delete(sessions::table.filter(sessions::expires_at.le(now)))
            .execute(conn)
            .map_err(Into::into)
    }
}
