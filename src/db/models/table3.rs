use crate::db::schema::table3;
use crud_lab_api::{Table3Record, Table3Ref};
use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};

const SECONDS_PER_DAY: i64 = 86_400;

/// `duration_field` est stocké en secondes
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = table3)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Table3 {
    pub id: i32,
    pub duration_field: i64,
    pub email_field: String,
}

impl From<Table3> for Table3Ref {
    fn from(row: Table3) -> Self {
        Table3Ref {
            id: row.id,
            email_field: row.email_field,
        }
    }
}

impl From<Table3> for Table3Record {
    fn from(row: Table3) -> Self {
        Table3Record {
            id: row.id,
            duration_field: format_duration(row.duration_field),
            email_field: row.email_field,
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = table3)]
pub struct NewTable3 {
    pub duration_field: i64,
    pub email_field: String,
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = table3)]
pub struct UpdateTable3 {
    pub duration_field: Option<i64>,
    pub email_field: Option<String>,
}

impl UpdateTable3 {
    pub fn is_empty(&self) -> bool {
        self.duration_field.is_none() && self.email_field.is_none()
    }
}

/// Parse "DD HH:MM:SS" or "HH:MM:SS" into seconds
pub fn parse_duration(raw: &str) -> Option<i64> {
    let (days, clock) = match raw.split(' ').collect::<Vec<_>>().as_slice() {
        [clock] => (0, *clock),
        [days, clock] => (days.trim().parse::<i64>().ok()?, *clock),
        _ => return None,
    };

    let parts = clock
        .split(':')
        .map(|p| p.trim().parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()?;
    let [hours, minutes, seconds] = parts.as_slice() else {
        return None;
    };

    days.checked_mul(SECONDS_PER_DAY)?
        .checked_add(hours.checked_mul(3_600)?)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(*seconds)
}

/// Render seconds as "D HH:MM:SS", days omitted when zero
pub fn format_duration(total_seconds: i64) -> String {
    let days = total_seconds.div_euclid(SECONDS_PER_DAY);
    let rem = total_seconds.rem_euclid(SECONDS_PER_DAY);
    let clock = format!("{:02}:{:02}:{:02}", rem / 3_600, (rem % 3_600) / 60, rem % 60);

    if days == 0 {
        clock
    } else {
        format!("{days} {clock}")
    }
}
