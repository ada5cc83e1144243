use crate::db::schema::user_logs;
use chrono::NaiveDateTime;
use crud_lab_api::UserLogRecord;
use diesel::{Insertable, Queryable, Selectable};

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = user_logs)]
pub struct NewUserLog<'a> {
    pub user_id: Option<i32>,
    pub username: &'a str,
    pub event_type: &'a str,
    pub ip_address: Option<&'a str>,
    pub timestamp: NaiveDateTime,
    pub details: &'a str,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = user_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserLog {
    pub id: i32,
    pub user_id: Option<i32>,
    pub username: String,
    pub event_type: String,
    pub ip_address: Option<String>,
    pub timestamp: NaiveDateTime,
    pub details: String,
}

impl From<UserLog> for UserLogRecord {
    fn from(log: UserLog) -> Self {
        UserLogRecord {
            id: log.id,
            user_id: log.user_id,
            username: log.username,
            event_type: log.event_type,
            ip_address: log.ip_address,
            timestamp: log.timestamp,
            details: log.details,
        }
    }
}
