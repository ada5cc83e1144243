use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use crud_lab_api::{RelationOptions, Table1Fields, Table1Record, Table1SearchRecord};
use diesel::SqliteConnection;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::models::table1::{CHAR_FIELD_MAX_LEN, Table1, Table1Data};
use crate::db::models::table2::Table2;
use crate::db::models::table3::Table3;
use crate::db::repositories::table1_repository::Table1Repository;
use crate::db::repositories::table2_repository::Table2Repository;
use crate::db::repositories::table3_repository::Table3Repository;
use crate::error::AppError;
use crate::ingestion::{Table1Submission, relation_id, relation_ids};
use crate::services::crud::CrudService;
use crate::storage::{MediaKind, MediaStorage};

// ============================================================
// Champs reçus -> modifications typées
// ============================================================

/// Modifications demandées par un corps Table1.
///
/// Pour les champs de base, `None` = absent (la valeur stockée est conservée) et
/// `Some(None)` = remis à null. Les relations sont toujours remplacées.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table1Changes {
    pub integer_field: Option<Option<i32>>,
    pub float_field: Option<Option<f64>>,
    pub char_field: Option<String>,
    pub text_field: Option<String>,
    pub boolean_field: Option<bool>,
    pub date_field: Option<Option<NaiveDate>>,
    pub time_field: Option<Option<NaiveTime>>,
    pub datetime_field: Option<Option<NaiveDateTime>>,
    pub foreign_key: Option<i32>,
    pub one_to_one: Option<i32>,
    pub many_to_many: Vec<i32>,
}

pub(crate) fn invalid(field: &str) -> AppError {
    AppError::validation(format!("Invalid value for {field}."))
}

/// Chaîne vide ou null -> null
fn normalized<'a>(fields: &'a Map<String, Value>, field: &str) -> Option<Option<&'a Value>> {
    match fields.get(field)? {
        Value::Null => Some(None),
        Value::String(s) if s.trim().is_empty() => Some(None),
        value => Some(Some(value)),
    }
}

fn optional<T>(
    fields: &Map<String, Value>,
    field: &str,
    parse: impl Fn(&Value) -> Option<T>,
) -> Result<Option<Option<T>>, AppError> {
    match normalized(fields, field) {
        None => Ok(None),
        Some(None) => Ok(Some(None)),
        Some(Some(value)) => parse(value).map(|v| Some(Some(v))).ok_or_else(|| invalid(field)),
    }
}

pub(crate) fn as_integer(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Null => Some(false),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "1" => Some(true),
            "false" | "off" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_date(value: &Value) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.as_str()?.trim(), "%Y-%m-%d").ok()
}

fn as_time(value: &Value) -> Option<NaiveTime> {
    let raw = value.as_str()?.trim();
    ["%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

fn as_datetime(value: &Value) -> Option<NaiveDateTime> {
    let raw = value.as_str()?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

impl Table1Changes {
    pub fn parse(fields: &Map<String, Value>) -> Result<Self, AppError> {
        let char_field = match fields.get("char_field") {
            None => None,
            Some(Value::Null) => Some(String::new()),
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(invalid("char_field")),
        };
        let text_field = match fields.get("text_field") {
            None => None,
            Some(Value::Null) => Some(String::new()),
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(invalid("text_field")),
        };
        let boolean_field = fields
            .get("boolean_field")
            .map(|v| as_bool(v).ok_or_else(|| invalid("boolean_field")))
            .transpose()?;

        Ok(Self {
            integer_field: optional(fields, "integer_field", as_integer)?,
            float_field: optional(fields, "float_field", as_float)?,
            char_field,
            text_field,
            boolean_field,
            date_field: optional(fields, "date_field", as_date)?,
            time_field: optional(fields, "time_field", as_time)?,
            datetime_field: optional(fields, "datetime_field", as_datetime)?,
            foreign_key: relation_id(fields.get("foreign_key")),
            one_to_one: relation_id(fields.get("one_to_one")),
            many_to_many: relation_ids(fields.get("many_to_many")),
        })
    }

    /// Applique les champs de base présents; les relations sont résolues à part
    pub fn apply(&self, data: &mut Table1Data) {
        if let Some(v) = self.integer_field {
            data.integer_field = v;
        }
        if let Some(v) = self.float_field {
            data.float_field = v;
        }
        if let Some(v) = &self.char_field {
            data.char_field = v.clone();
        }
        if let Some(v) = &self.text_field {
            data.text_field = v.clone();
        }
        if let Some(v) = self.boolean_field {
            data.boolean_field = v;
        }
        if let Some(v) = self.date_field {
            data.date_field = v;
        }
        if let Some(v) = self.time_field {
            data.time_field = v;
        }
        if let Some(v) = self.datetime_field {
            data.datetime_field = v;
        }
    }
}

fn validate_char_field(value: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::validation("char_field is required."));
    }
    if value.chars().count() > CHAR_FIELD_MAX_LEN {
        return Err(AppError::validation(format!(
            "char_field must be between 1 and {CHAR_FIELD_MAX_LEN} characters."
        )));
    }
    Ok(())
}

// ============================================================
// Relations chargées pour un lot de lignes
// ============================================================

struct RelationIndex {
    table2: HashMap<i32, Table2>,
    links: HashMap<i32, Vec<Table3>>,
}

impl RelationIndex {
    fn load(conn: &mut SqliteConnection, rows: &[Table1]) -> Result<Self, AppError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let table2_ids: Vec<i32> = rows
            .iter()
            .flat_map(|r| [r.foreign_key_id, r.one_to_one_id])
            .flatten()
            .collect();

        let table2 = Table2Repository::find_by_ids(conn, &table2_ids)?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let mut links: HashMap<i32, Vec<Table3>> = HashMap::new();
        for (table1_id, table3) in Table1Repository::many_to_many_for(conn, &ids)? {
            links.entry(table1_id).or_default().push(table3);
        }

        Ok(Self { table2, links })
    }

    fn table2<T: From<Table2>>(&self, id: Option<i32>) -> Option<T> {
        id.and_then(|id| self.table2.get(&id)).copied().map(Into::into)
    }

    fn take_links<T: From<Table3>>(&mut self, table1_id: i32) -> Vec<T> {
        self.links
            .remove(&table1_id)
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect()
    }
}

// ============================================================
// Service
// ============================================================

#[derive(Clone)]
pub struct Table1Service {
    pool: DbPool,
    storage: MediaStorage,
}

impl Table1Service {
    pub fn new(pool: DbPool, storage: MediaStorage) -> Self {
        Self { pool, storage }
    }

    fn fields(&self, row: &Table1) -> Table1Fields {
        Table1Fields {
            id: row.id,
            integer_field: row.integer_field,
            float_field: row.float_field,
            char_field: row.char_field.clone(),
            text_field: row.text_field.clone(),
            boolean_field: row.boolean_field,
            date_field: row.date_field,
            time_field: row.time_field,
            datetime_field: row.datetime_field,
            image_field: row.image_field.as_deref().map(|p| self.storage.url(p)),
            file_field: row.file_field.as_deref().map(|p| self.storage.url(p)),
        }
    }

    fn render(
        &self,
        conn: &mut SqliteConnection,
        rows: Vec<Table1>,
    ) -> Result<Vec<Table1Record>, AppError> {
        let mut index = RelationIndex::load(conn, &rows)?;
        Ok(rows
            .into_iter()
            .map(|row| Table1Record {
                fields: self.fields(&row),
                foreign_key: index.table2(row.foreign_key_id),
                one_to_one: index.table2(row.one_to_one_id),
                many_to_many: index.take_links(row.id),
            })
            .collect())
    }

    /// Toutes les lignes, non paginées, avec libellés et durées
    pub fn search(&self) -> Result<Vec<Table1SearchRecord>, AppError> {
        let mut conn = get_connection(&self.pool)?;
        let rows = Table1Repository::all(&mut conn)?;
        let mut index = RelationIndex::load(&mut conn, &rows)?;

        Ok(rows
            .into_iter()
            .map(|row| Table1SearchRecord {
                fields: self.fields(&row),
                foreign_key: index.table2(row.foreign_key_id),
                one_to_one: index.table2(row.one_to_one_id),
                many_to_many: index.take_links(row.id),
            })
            .collect())
    }

    pub fn create(&self, submission: Table1Submission) -> Result<Table1Record, AppError> {
        let changes = Table1Changes::parse(&submission.fields)?;
        match &changes.char_field {
            Some(value) => validate_char_field(value)?,
            None => return Err(AppError::validation("char_field is required.")),
        }
        self.save(None, changes, submission)
    }

    pub fn update(&self, id: i32, submission: Table1Submission) -> Result<Table1Record, AppError> {
        let changes = Table1Changes::parse(&submission.fields)?;
        if let Some(value) = &changes.char_field {
            validate_char_field(value)?;
        }
        self.save(Some(id), changes, submission)
    }

    fn resolve_table2(
        conn: &mut SqliteConnection,
        id: Option<i32>,
    ) -> Result<Option<i32>, AppError> {
        match id {
            None => Ok(None),
            Some(id) => Table2Repository::find_by_id(conn, id)?
                .map(|row| Some(row.id))
                .ok_or_else(|| AppError::invalid_input("Table2 object not found")),
        }
    }

    /// Écrit les fichiers reçus; en cas d'échec partiel, rien ne reste sur disque
    fn store_uploads(
        &self,
        submission: Table1Submission,
    ) -> Result<Vec<(MediaKind, String)>, AppError> {
        let mut stored: Vec<(MediaKind, String)> = Vec::new();
        for (kind, upload) in submission.uploads() {
            match self.storage.save(kind, &upload.file_name, &upload.bytes) {
                Ok(path) => stored.push((kind, path)),
                Err(e) => {
                    self.storage.discard(stored.iter().map(|(_, path)| path.as_str()));
                    return Err(e.into());
                }
            }
        }
        Ok(stored)
    }

    /// Lecture de la ligne, validation et écriture dans une seule transaction
    /// IMMEDIATE: deux PUT concurrents sont sérialisés et chacun part de la
    /// ligne réellement stockée. Les fichiers remplacés ne sont supprimés
    /// qu'après le commit, les nouveaux sont supprimés si la transaction échoue.
    fn save(
        &self,
        id: Option<i32>,
        changes: Table1Changes,
        submission: Table1Submission,
    ) -> Result<Table1Record, AppError> {
        let mut conn = get_connection(&self.pool)?;
        let stored = self.store_uploads(submission)?;

        let result = conn.immediate_transaction::<_, AppError, _>(|conn| {
            let mut data = match id {
                Some(id) => Table1Repository::find_by_id(conn, id)?
                    .ok_or_else(|| AppError::not_found("Object not found"))?
                    .to_data(),
                None => Table1Data::default(),
            };
            changes.apply(&mut data);
            validate_char_field(&data.char_field)?;

            // Relations: remplacées entièrement, absent = vidé
            data.foreign_key_id = Self::resolve_table2(conn, changes.foreign_key)?;
            data.one_to_one_id = Self::resolve_table2(conn, changes.one_to_one)?;
            if let Some(table2_id) = data.one_to_one_id
                && let Some(holder) = Table1Repository::find_by_one_to_one(conn, table2_id)?
                && Some(holder.id) != id
            {
                return Err(AppError::validation(
                    "Table1 with this one_to_one already exists.",
                ));
            }
            let table3_ids = if changes.many_to_many.is_empty() {
                Vec::new()
            } else {
                Table3Repository::existing_ids(conn, &changes.many_to_many)?
            };

            let mut replaced: Vec<String> = Vec::new();
            for (kind, path) in &stored {
                let slot = match kind {
                    MediaKind::Image => &mut data.image_field,
                    MediaKind::File => &mut data.file_field,
                };
                if let Some(previous) = slot.replace(path.clone()) {
                    replaced.push(previous);
                }
            }

            let row = match id {
                Some(id) => Table1Repository::update(conn, id, &data)?,
                None => Table1Repository::create(conn, &data)?,
            };
            Table1Repository::set_many_to_many(conn, row.id, &table3_ids)?;
            Ok((row, replaced, table3_ids.len()))
        });

        let (row, replaced, links) = match result {
            Ok(saved) => saved,
            Err(e) => {
                if !stored.is_empty() {
                    tracing::warn!(
                        error = %e,
                        files = stored.len(),
                        "Table1 write rolled back, discarding uploads"
                    );
                    self.storage.discard(stored.iter().map(|(_, path)| path.as_str()));
                }
                return Err(e);
            }
        };
        self.storage.discard(replaced.iter().map(String::as_str));

        tracing::info!(
            id = row.id,
            created = id.is_none(),
            links,
            "Saved Table1 row"
        );
        self.render(&mut conn, vec![row])?
            .pop()
            .ok_or_else(|| AppError::internal("Saved Table1 row could not be rendered"))
    }
}

impl CrudService for Table1Service {
    type Record = Table1Record;

    fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn count(&self, conn: &mut SqliteConnection) -> Result<i64, AppError> {
        Ok(Table1Repository::count(conn)?)
    }

    fn page(
        &self,
        conn: &mut SqliteConnection,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Table1Record>, AppError> {
        let rows = Table1Repository::page(conn, offset, limit)?;
        self.render(conn, rows)
    }

    fn all(&self, conn: &mut SqliteConnection) -> Result<Vec<Table1Record>, AppError> {
        let rows = Table1Repository::all(conn)?;
        self.render(conn, rows)
    }

    fn options(&self, conn: &mut SqliteConnection) -> Result<Option<RelationOptions>, AppError> {
        Ok(Some(RelationOptions {
            table2_options: Table2Repository::all(conn)?
                .into_iter()
                .map(Into::into)
                .collect(),
            table3_options: Table3Repository::all(conn)?
                .into_iter()
                .map(Into::into)
                .collect(),
        }))
    }

    fn delete(&self, id: i32) -> Result<(), AppError> {
        let mut conn = get_connection(&self.pool)?;
        let row = Table1Repository::find_by_id(&mut conn, id)?
            .ok_or_else(|| AppError::not_found("Object not found"))?;

        Table1Repository::delete(&mut conn, id)?;
        self.storage.discard(row.stored_files());
        tracing::info!(id, "Deleted Table1 row");
        Ok(())
    }
}
