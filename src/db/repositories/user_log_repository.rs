use crate::db::error::RepositoryError;
use crate::db::models::user_log::{NewUserLog, UserLog};
use crate::db::schema::user_logs;
use chrono::NaiveDateTime;
use diesel::prelude::*;

pub struct UserLogRepository;

impl UserLogRepository {
    pub fn create(conn: &mut SqliteConnection, entry: &NewUserLog<'_>) -> Result<UserLog, RepositoryError> {
        diesel::insert_into(user_logs::table)
            .values(entry)
            .returning(UserLog::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    /// Entrées les plus récentes d'abord
    pub fn recent(conn: &mut SqliteConnection, limit: i64) -> Result<Vec<UserLog>, RepositoryError> {
        user_logs::table
            .order((user_logs::timestamp.desc(), user_logs::id.desc()))
            .limit(limit)
            .select(UserLog::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    pub fn count(conn: &mut SqliteConnection) -> Result<i64, RepositoryError> {
        user_logs::table
            .count()
            .get_result(conn)
            .map_err(Into::into)
    }

    pub fn delete_older_than(
        conn: &mut SqliteConnection,
        cutoff: NaiveDateTime,
    ) -> Result<usize, RepositoryError> {
        diesel::delete(user_logs::table.filter(user_logs::timestamp.lt(cutoff)))
            .execute(conn)
            .map_err(Into::into)
    }
}
