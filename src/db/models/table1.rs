use crate::db::schema::{table1, table1_many_to_many};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};

/// Longueur maximale de `char_field`
pub const CHAR_FIELD_MAX_LEN: usize = 15;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = table1)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Table1 {
    pub id: i32,
    pub integer_field: Option<i32>,
    pub float_field: Option<f64>,
    pub char_field: String,
    pub text_field: String,
    pub boolean_field: bool,
    pub date_field: Option<NaiveDate>,
    pub time_field: Option<NaiveTime>,
    pub datetime_field: Option<NaiveDateTime>,
    pub image_field: Option<String>,
    pub file_field: Option<String>,
    pub foreign_key_id: Option<i32>,
    pub one_to_one_id: Option<i32>,
}

impl Table1 {
    /// Stored paths of the uploaded files attached to this row
    pub fn stored_files(&self) -> impl Iterator<Item = &str> {
        self.image_field
            .as_deref()
            .into_iter()
            .chain(self.file_field.as_deref())
    }

    /// Full column state of this row, used as the base of an update
    pub fn to_data(&self) -> Table1Data {
        Table1Data {
            integer_field: self.integer_field,
            float_field: self.float_field,
            char_field: self.char_field.clone(),
            text_field: self.text_field.clone(),
            boolean_field: self.boolean_field,
            date_field: self.date_field,
            time_field: self.time_field,
            datetime_field: self.datetime_field,
            image_field: self.image_field.clone(),
            file_field: self.file_field.clone(),
            foreign_key_id: self.foreign_key_id,
            one_to_one_id: self.one_to_one_id,
        }
    }
}

/// Every writable column. Used both for inserts and full-row updates,
/// `None` is written as NULL.
#[derive(Insertable, AsChangeset, Debug, Clone, Default, PartialEq)]
#[diesel(table_name = table1)]
#[diesel(treat_none_as_null = true)]
pub struct Table1Data {
    pub integer_field: Option<i32>,
    pub float_field: Option<f64>,
    pub char_field: String,
    pub text_field: String,
    pub boolean_field: bool,
    pub date_field: Option<NaiveDate>,
    pub time_field: Option<NaiveTime>,
    pub datetime_field: Option<NaiveDateTime>,
    pub image_field: Option<String>,
    pub file_field: Option<String>,
    pub foreign_key_id: Option<i32>,
    pub one_to_one_id: Option<i32>,
}

#[derive(Insertable, Debug, Clone, Copy)]
#[diesel(table_name = table1_many_to_many)]
pub struct NewTable1Link {
    pub table1_id: i32,
    pub table3_id: i32,
}
