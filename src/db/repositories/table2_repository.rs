use crate::db::error::RepositoryError;
use crate::db::models::table2::{NewTable2, Table2};
use crate::db::schema::table2;
use diesel::prelude::*;

pub struct Table2Repository;

impl Table2Repository {
    pub fn count(conn: &mut SqliteConnection) -> Result<i64, RepositoryError> {
        table2::table
            .count()
            .get_result(conn)
            .map_err(Into::into)
    }

    pub fn page(
        conn: &mut SqliteConnection,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Table2>, RepositoryError> {
        table2::table
            .order(table2::id.asc())
            .limit(limit)
            .offset(offset)
            .select(Table2::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    pub fn all(conn: &mut SqliteConnection) -> Result<Vec<Table2>, RepositoryError> {
        table2::table
            .order(table2::id.asc())
            .select(Table2::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    pub fn find_by_id(
        conn: &mut SqliteConnection,
        id: i32,
    ) -> Result<Option<Table2>, RepositoryError> {
        table2::table
            .find(id)
            .select(Table2::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn find_by_ids(
        conn: &mut SqliteConnection,
        ids: &[i32],
    ) -> Result<Vec<Table2>, RepositoryError> {
        table2::table
            .filter(table2::id.eq_any(ids))
            .select(Table2::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    pub fn create(
        conn: &mut SqliteConnection,
        new_row: &NewTable2,
    ) -> Result<Table2, RepositoryError> {
        diesel::insert_into(table2::table)
            .values(new_row)
            .returning(Table2::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    pub fn update(
        conn: &mut SqliteConnection,
        id: i32,
        changes: &NewTable2,
    ) -> Result<Table2, RepositoryError> {
        diesel::update(table2::table.find(id))
            .set(changes)
            .returning(Table2::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    /// Supprime la ligne; les Table1 qui la référencent partent en cascade
    pub fn delete(conn: &mut SqliteConnection, id: i32) -> Result<usize, RepositoryError> {
        diesel::delete(table2::table.find(id))
            .execute(conn)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::{get_connection, test_pool};

    #[test]
    fn test_check_constraint_rejects_unknown_choice() {
        let (pool, _dir) = test_pool();
        let mut conn = get_connection(&pool).unwrap();

        let result = Table2Repository::create(
            &mut conn,
            &NewTable2 {
                positive_small_int: 7,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_update_changes_choice() {
        let (pool, _dir) = test_pool();
        let mut conn = get_connection(&pool).unwrap();

        let row = Table2Repository::create(
            &mut conn,
            &NewTable2 {
                positive_small_int: 1,
            },
        )
        .unwrap();
        let updated = Table2Repository::update(
            &mut conn,
            row.id,
            &NewTable2 {
                positive_small_int: 2,
            },
        )
        .unwrap();

        assert_eq!(updated.id, row.id);
        assert_eq!(updated.positive_small_int, 2);
    }

    #[test]
    fn test_update_missing_row_is_not_found() {
        let (pool, _dir) = test_pool();
        let mut conn = get_connection(&pool).unwrap();

        let result = Table2Repository::update(
            &mut conn,
            404,
            &NewTable2 {
                positive_small_int: 2,
            },
        );
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }
}
