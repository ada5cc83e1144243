use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Generic `{"data": ...}` envelope returned by the CRUD endpoints
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// -------- PAGINATION --------

/// Pagination metadata.
///
/// When pagination is disabled only `enabled` and `total_items` are present.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub page_size: Option<i64>,
    pub total_items: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub total_pages: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub has_next: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub has_previous: Option<bool>,
}

/// Options offered to clients building a Table1 form
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RelationOptions {
    pub table2_options: Vec<Table2Record>,
    pub table3_options: Vec<Table3Ref>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
    #[serde(flatten)]
    pub options: Option<RelationOptions>,
}

// -------- ENTITIES --------

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table2Record {
    pub id: i32,
    pub positive_small_int: i16,
}

/// Table2 with its human readable choice label
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Table2Detail {
    pub id: i32,
    pub positive_small_int: i16,
    pub display: String,
}

/// Compact `{id, email_field}` shape used for many-to-many relations
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Table3Ref {
    pub id: i32,
    pub email_field: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Table3Record {
    pub id: i32,
    /// "D HH:MM:SS", days omitted when zero
    pub duration_field: String,
    pub email_field: String,
}

/// Scalar columns of a Table1 row, files already resolved to URLs
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Table1Fields {
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
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Table1Record {
    #[serde(flatten)]
    pub fields: Table1Fields,
    pub foreign_key: Option<Table2Record>,
    pub one_to_one: Option<Table2Record>,
    pub many_to_many: Vec<Table3Ref>,
}

/// Richer rendering used by the search endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Table1SearchRecord {
    #[serde(flatten)]
    pub fields: Table1Fields,
    pub foreign_key: Option<Table2Detail>,
    pub one_to_one: Option<Table2Detail>,
    pub many_to_many: Vec<Table3Record>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub data: Vec<Table1SearchRecord>,
    pub count: usize,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardResponse {
    pub table1_count: i64,
    pub table2_count: i64,
    pub table3_count: i64,
}

// -------- USERS & SESSIONS --------

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub date_joined: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub message: String,
    pub username: String,
    pub current_app: String,
    pub home_url: String,
    pub logout_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileResponse {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub is_admin: bool,
    pub groups: Vec<String>,
    /// Sous-application de la session (`json_app`, `rest`, `layered`)
    pub current_app: Option<String>,
    pub home_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserWithRole {
    pub user: UserResponse,
    pub role: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserLogRecord {
    pub id: i32,
    pub user_id: Option<i32>,
    pub username: String,
    pub event_type: String,
    pub ip_address: Option<String>,
    pub timestamp: NaiveDateTime,
    pub details: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DarkModeResponse {
    pub dark_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> Table1Fields {
        Table1Fields {
            id: 7,
            integer_field: Some(5),
            float_field: None,
            char_field: "abc".to_string(),
            text_field: String::new(),
            boolean_field: false,
            date_field: None,
            time_field: None,
            datetime_field: None,
            image_field: None,
            file_field: None,
        }
    }

    #[test]
    fn table1_record_flattens_scalar_fields() {
        let record = Table1Record {
            fields: sample_fields(),
            foreign_key: None,
            one_to_one: Some(Table2Record {
                id: 2,
                positive_small_int: 1,
            }),
            many_to_many: vec![],
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["char_field"], "abc");
        assert!(json["foreign_key"].is_null());
        assert_eq!(json["one_to_one"]["positive_small_int"], 1);
        assert_eq!(json["many_to_many"], serde_json::json!([]));
    }

    #[test]
    fn disabled_pagination_only_reports_total() {
        let pagination = Pagination {
            enabled: false,
            page: None,
            page_size: None,
            total_items: 3,
            total_pages: None,
            has_next: None,
            has_previous: None,
        };

        let json = serde_json::to_value(pagination).unwrap();
        assert_eq!(json, serde_json::json!({"enabled": false, "total_items": 3}));
    }

    #[test]
    fn list_response_without_options_has_no_option_keys() {
        let list = ListResponse::<Table2Record> {
            data: vec![],
            pagination: Pagination {
                enabled: false,
                page: None,
                page_size: None,
                total_items: 0,
                total_pages: None,
                has_next: None,
                has_previous: None,
            },
            options: None,
        };

        let json = serde_json::to_value(&list).unwrap();
        assert!(json.get("table2_options").is_none());
        assert!(json.get("data").is_some());
    }
}
