use crud_lab_api::{Table3Input, Table3Record};
use diesel::SqliteConnection;

use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::table3::{NewTable3, UpdateTable3, parse_duration};
use crate::db::repositories::table3_repository::Table3Repository;
use crate::error::AppError;
use crate::services::crud::{CrudService, JsonWriteService};

pub const INVALID_DURATION: &str = r#"Invalid duration format. Use "DD HH:MM:SS" or "HH:MM:SS""#;
const EMAIL_MAX_LEN: usize = 254;

#[derive(Clone)]
pub struct Table3Service {
    pool: DbPool,
}

impl Table3Service {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn duration_seconds(raw: &str) -> Result<i64, AppError> {
    parse_duration(raw.trim()).ok_or_else(|| AppError::validation(INVALID_DURATION))
}

fn checked_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim();
    if is_valid_email(email) {
        Ok(email.to_string())
    } else {
        Err(AppError::validation("Enter a valid email address."))
    }
}

/// Vérification de forme: `local@domaine.tld`, sans espace
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > EMAIL_MAX_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && !local.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

fn map_duplicate(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::UniqueViolation(_) => {
            AppError::duplicate("Table3 with this email_field already exists.")
        }
        other => other.into(),
    }
}

impl CrudService for Table3Service {
    type Record = Table3Record;

    fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn count(&self, conn: &mut SqliteConnection) -> Result<i64, AppError> {
        Ok(Table3Repository::count(conn)?)
    }

    fn page(
        &self,
        conn: &mut SqliteConnection,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Table3Record>, AppError> {
        let rows = Table3Repository::page(conn, offset, limit)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn all(&self, conn: &mut SqliteConnection) -> Result<Vec<Table3Record>, AppError> {
        let rows = Table3Repository::all(conn)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Les liens many-to-many partent en cascade, les Table1 restent
    fn delete(&self, id: i32) -> Result<(), AppError> {
        let mut conn = get_connection(&self.pool)?;
        if Table3Repository::delete(&mut conn, id)? == 0 {
            return Err(AppError::not_found("Object not found"));
        }
        tracing::info!(id, "Deleted Table3 row");
        Ok(())
    }
}

impl JsonWriteService for Table3Service {
    type Input = Table3Input;

    fn input_id(input: &Table3Input) -> Option<i32> {
        input.id
    }

    fn create(&self, input: Table3Input) -> Result<Table3Record, AppError> {
        let duration_field = match input.duration_field.as_deref() {
            Some(raw) => duration_seconds(raw)?,
            None => return Err(AppError::validation("duration_field is required.")),
        };
        let email_field = match input.email_field.as_deref() {
            Some(raw) => checked_email(raw)?,
            None => return Err(AppError::validation("email_field is required.")),
        };

        let mut conn = get_connection(&self.pool)?;
        let row = Table3Repository::create(
            &mut conn,
            &NewTable3 {
                duration_field,
                email_field,
            },
        )
        .map_err(map_duplicate)?;
        Ok(row.into())
    }

    fn update(&self, id: i32, input: Table3Input) -> Result<Table3Record, AppError> {
        let changes = UpdateTable3 {
            duration_field: input.duration_field.as_deref().map(duration_seconds).transpose()?,
            email_field: input.email_field.as_deref().map(checked_email).transpose()?,
        };

        let mut conn = get_connection(&self.pool)?;
        let row = Table3Repository::update(&mut conn, id, &changes).map_err(map_duplicate)?;
        Ok(row.into())
    }
}
