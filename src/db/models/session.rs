use crate::db::schema::sessions;
use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};

/// Session côté serveur: le cookie ne porte que `id`
#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Session {
    pub id: String,
    pub user_id: Option<i32>,
    pub current_app: Option<String>,
    pub dark_mode: bool,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl Session {
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.expires_at <= now
    }
}
