use crate::db::error::RepositoryError;
use crate::db::models::table1::{NewTable1Link, Table1, Table1Data};
use crate::db::models::table3::Table3;
use crate::db::schema::{table1, table1_many_to_many, table3};
use diesel::prelude::*;

pub struct Table1Repository;

impl Table1Repository {
    pub fn count(conn: &mut SqliteConnection) -> Result<i64, RepositoryError> {
        table1::table
            .count()
            .get_result(conn)
            .map_err(Into::into)
    }

    /// Une page de lignes, triées par clé primaire
    pub fn page(
        conn: &mut SqliteConnection,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Table1>, RepositoryError> {
        table1::table
            .order(table1::id.asc())
            .limit(limit)
            .offset(offset)
            .select(Table1::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    pub fn all(conn: &mut SqliteConnection) -> Result<Vec<Table1>, RepositoryError> {
        table1::table
            .order(table1::id.asc())
            .select(Table1::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    pub fn find_by_id(
        conn: &mut SqliteConnection,
        id: i32,
    ) -> Result<Option<Table1>, RepositoryError> {
        table1::table
            .find(id)
            .select(Table1::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    /// Ligne qui occupe déjà ce Table2 en one-to-one
    pub fn find_by_one_to_one(
        conn: &mut SqliteConnection,
        table2_id: i32,
    ) -> Result<Option<Table1>, RepositoryError> {
        table1::table
            .filter(table1::one_to_one_id.eq(table2_id))
            .select(Table1::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    /// Lignes supprimées en cascade avec ce Table2 (foreign key ou one-to-one)
    pub fn find_referencing_table2(
        conn: &mut SqliteConnection,
        table2_id: i32,
    ) -> Result<Vec<Table1>, RepositoryError> {
        table1::table
            .filter(
                table1::foreign_key_id
                    .eq(table2_id)
                    .or(table1::one_to_one_id.eq(table2_id)),
            )
            .select(Table1::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    pub fn create(
        conn: &mut SqliteConnection,
        data: &Table1Data,
    ) -> Result<Table1, RepositoryError> {
        diesel::insert_into(table1::table)
            .values(data)
            .returning(Table1::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    /// Réécrit toutes les colonnes de la ligne
    pub fn update(
        conn: &mut SqliteConnection,
        id: i32,
        data: &Table1Data,
    ) -> Result<Table1, RepositoryError> {
        diesel::update(table1::table.find(id))
            .set(data)
            .returning(Table1::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    pub fn delete(conn: &mut SqliteConnection, id: i32) -> Result<usize, RepositoryError> {
        diesel::delete(table1::table.find(id))
            .execute(conn)
            .map_err(Into::into)
    }

    /// Remplace entièrement le many-to-many: clear puis set
    pub fn set_many_to_many(
        conn: &mut SqliteConnection,
        table1_id: i32,
        table3_ids: &[i32],
    ) -> Result<(), RepositoryError> {
        diesel::delete(
            table1_many_to_many::table.filter(table1_many_to_many::table1_id.eq(table1_id)),
        )
        .execute(conn)?;

        if table3_ids.is_empty() {
            return Ok(());
        }

        let links: Vec<NewTable1Link> = table3_ids
            .iter()
            .map(|&table3_id| NewTable1Link {
                table1_id,
                table3_id,
            })
            .collect();

        diesel::insert_into(table1_many_to_many::table)
            .values(&links)
            .execute(conn)?;

        Ok(())
    }

    /// Table3 liés à chacune des lignes données, triés par id
    pub fn many_to_many_for(
        conn: &mut SqliteConnection,
        table1_ids: &[i32],
    ) -> Result<Vec<(i32, Table3)>, RepositoryError> {
        table1_many_to_many::table
            .inner_join(table3::table)
            .filter(table1_many_to_many::table1_id.eq_any(table1_ids))
            .order(table3::id.asc())
            .select((table1_many_to_many::table1_id, Table3::as_select()))
            .load(conn)
            .map_err(Into::into)
    }
}
