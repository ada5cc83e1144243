use crud_lab_api::{Table2Input, Table2Record};
use diesel::{Connection, SqliteConnection};
use serde_json::Value;

use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::models::table2::{DEFAULT_CHOICE, NewTable2, Table2};
use crate::db::repositories::table1_repository::Table1Repository;
use crate::db::repositories::table2_repository::Table2Repository;
use crate::error::AppError;
use crate::services::crud::{CrudService, JsonWriteService};
use crate::services::table1::{as_integer, invalid};
use crate::storage::MediaStorage;

#[derive(Clone)]
pub struct Table2Service {
    pool: DbPool,
    storage: MediaStorage,
}

impl Table2Service {
    pub fn new(pool: DbPool, storage: MediaStorage) -> Self {
        Self { pool, storage }
    }

    /// Choix demandé: nombre ou chaîne numérique, null = absent
    fn requested_choice(input: &Table2Input) -> Result<Option<i16>, AppError> {
        let value = match &input.positive_small_int {
            None | Some(Value::Null) => return Ok(None),
            Some(value) => value,
        };
        let number = as_integer(value).ok_or_else(|| invalid("positive_small_int"))?;
        match i16::try_from(number) {
            Ok(choice) if Table2::is_valid_choice(choice) => Ok(Some(choice)),
            _ => Err(AppError::validation(format!(
                "Invalid choice for positive_small_int: {number}"
            ))),
        }
    }
}

impl CrudService for Table2Service {
    type Record = Table2Record;

    fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn count(&self, conn: &mut SqliteConnection) -> Result<i64, AppError> {
        Ok(Table2Repository::count(conn)?)
    }

    fn page(
        &self,
        conn: &mut SqliteConnection,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Table2Record>, AppError> {
        let rows = Table2Repository::page(conn, offset, limit)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn all(&self, conn: &mut SqliteConnection) -> Result<Vec<Table2Record>, AppError> {
        let rows = Table2Repository::all(conn)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Les Table1 liés partent en cascade: leurs fichiers sont supprimés après le commit
    fn delete(&self, id: i32) -> Result<(), AppError> {
        let mut conn = get_connection(&self.pool)?;

        let orphaned_files = conn.transaction::<Vec<String>, AppError, _>(|conn| {
            let cascaded = Table1Repository::find_referencing_table2(conn, id)?;
            if Table2Repository::delete(conn, id)? == 0 {
                return Err(AppError::not_found("Object not found"));
            }
            Ok(cascaded
                .iter()
                .flat_map(|row| row.stored_files().map(str::to_string))
                .collect())
        })?;

        tracing::info!(id, cascaded_files = orphaned_files.len(), "Deleted Table2 row");
        self.storage.discard(orphaned_files.iter().map(String::as_str));
        Ok(())
    }
}

impl JsonWriteService for Table2Service {
    type Input = Table2Input;

    fn input_id(input: &Table2Input) -> Option<i32> {
        input.id
    }

    fn create(&self, input: Table2Input) -> Result<Table2Record, AppError> {
        let value = Self::requested_choice(&input)?.unwrap_or(DEFAULT_CHOICE);
        let mut conn = get_connection(&self.pool)?;

        let row = Table2Repository::create(
            &mut conn,
            &NewTable2 {
                positive_small_int: value,
            },
        )?;
        Ok(row.into())
    }

    fn update(&self, id: i32, input: Table2Input) -> Result<Table2Record, AppError> {
        let mut conn = get_connection(&self.pool)?;
        let existing = Table2Repository::find_by_id(&mut conn, id)?
            .ok_or_else(|| AppError::not_found("Object not found"))?;

        let value = Self::requested_choice(&input)?.unwrap_or(existing.positive_small_int);
        let row = Table2Repository::update(
            &mut conn,
            id,
            &NewTable2 {
                positive_small_int: value,
            },
        )?;
        Ok(row.into())
    }
}
