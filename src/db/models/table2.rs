use crate::db::schema::table2;
use crud_lab_api::{Table2Detail, Table2Record};
use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};

/// Allowed values of `positive_small_int` with their labels
pub const CHOICES: [(i16, &str); 2] = [(1, "option1"), (2, "option2")];

pub const DEFAULT_CHOICE: i16 = 1;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Copy, PartialEq, Eq)]
#[diesel(table_name = table2)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Table2 {
    pub id: i32,
    pub positive_small_int: i16,
}

impl Table2 {
    pub fn is_valid_choice(value: i16) -> bool {
        CHOICES.iter().any(|(v, _)| *v == value)
    }

    /// Libellé lisible du choix ("option1", "option2")
    pub fn display(&self) -> &'static str {
        CHOICES
            .iter()
            .find(|(v, _)| *v == self.positive_small_int)
            .map_or("", |(_, label)| label)
    }
}

impl From<Table2> for Table2Record {
    fn from(row: Table2) -> Self {
        Table2Record {
            id: row.id,
            positive_small_int: row.positive_small_int,
        }
    }
}

impl From<Table2> for Table2Detail {
    fn from(row: Table2) -> Self {
        Table2Detail {
            id: row.id,
            positive_small_int: row.positive_small_int,
            display: row.display().to_string(),
        }
    }
}

#[derive(Insertable, AsChangeset, Debug, Clone, Copy)]
#[diesel(table_name = table2)]
pub struct NewTable2 {
    pub positive_small_int: i16,
}
