use crate::db::error::RepositoryError;
use crate::db::models::table3::{NewTable3, Table3, UpdateTable3};
use crate::db::schema::table3;
use diesel::prelude::*;

pub struct Table3Repository;

impl Table3Repository {
    pub fn count(conn: &mut SqliteConnection) -> Result<i64, RepositoryError> {
        table3::table
            .count()
            .get_result(conn)
            .map_err(Into::into)
    }

    pub fn page(
        conn: &mut SqliteConnection,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Table3>, RepositoryError> {
        table3::table
            .order(table3::id.asc())
            .limit(limit)
            .offset(offset)
            .select(Table3::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    pub fn all(conn: &mut SqliteConnection) -> Result<Vec<Table3>, RepositoryError> {
        table3::table
            .order(table3::id.asc())
            .select(Table3::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    pub fn find_by_id(
        conn: &mut SqliteConnection,
        id: i32,
    ) -> Result<Option<Table3>, RepositoryError> {
        table3::table
            .find(id)
            .select(Table3::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    /// Sous-ensemble des ids qui existent réellement, triés
    pub fn existing_ids(
        conn: &mut SqliteConnection,
        ids: &[i32],
    ) -> Result<Vec<i32>, RepositoryError> {
        table3::table
            .filter(table3::id.eq_any(ids))
            .order(table3::id.asc())
            .select(table3::id)
            .load(conn)
            .map_err(Into::into)
    }

    pub fn create(
        conn: &mut SqliteConnection,
        new_row: &NewTable3,
    ) -> Result<Table3, RepositoryError> {
        diesel::insert_into(table3::table)
            .values(new_row)
            .returning(Table3::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    pub fn update(
        conn: &mut SqliteConnection,
        id: i32,
        changes: &UpdateTable3,
    ) -> Result<Table3, RepositoryError> {
        if changes.is_empty() {
            return Self::find_by_id(conn, id)?
                .ok_or_else(|| RepositoryError::NotFound("Record not found".to_string()));
        }

        diesel::update(table3::table.find(id))
            .set(changes)
            .returning(Table3::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    pub fn delete(conn: &mut SqliteConnection, id: i32) -> Result<usize, RepositoryError> {
        diesel::delete(table3::table.find(id))
            .execute(conn)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::{get_connection, test_pool};

    fn new_row(email: &str) -> NewTable3 {
        NewTable3 {
            duration_field: 3_600,
            email_field: email.to_string(),
        }
    }

    #[test]
    fn test_duplicate_email_is_unique_violation() {
        let (pool, _dir) = test_pool();
        let mut conn = get_connection(&pool).unwrap();

        Table3Repository::create(&mut conn, &new_row("dup@example.com")).unwrap();
        let result = Table3Repository::create(&mut conn, &new_row("dup@example.com"));
        assert!(matches!(result, Err(RepositoryError::UniqueViolation(_))));
    }

    #[test]
    fn test_existing_ids_filters_unknown() {
        let (pool, _dir) = test_pool();
        let mut conn = get_connection(&pool).unwrap();

        let a = Table3Repository::create(&mut conn, &new_row("a@example.com")).unwrap();
        let ids = Table3Repository::existing_ids(&mut conn, &[999, a.id]).unwrap();
        assert_eq!(ids, vec![a.id]);
    }

    #[test]
    fn test_empty_update_returns_current_row() {
        let (pool, _dir) = test_pool();
        let mut conn = get_connection(&pool).unwrap();

        let a = Table3Repository::create(&mut conn, &new_row("same@example.com")).unwrap();
        let same = Table3Repository::update(&mut conn, a.id, &UpdateTable3::default()).unwrap();
        assert_eq!(same, a);
    }
}
