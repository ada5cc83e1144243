//! Lecture des corps de requête Table1.
//!
//! Deux formes acceptées:
//! - `multipart/form-data` avec un champ `data` (objet JSON) et des parties fichier
//!   `image_field` / `file_field`;
//! - un corps JSON où `image_field` / `file_field` peuvent être des objets inline
//!   `{"name": "...", "content": "<mime>;base64,<payload>"}`.

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::storage::MediaKind;

pub const IMAGE_FIELD: &str = "image_field";
pub const FILE_FIELD: &str = "file_field";

/// Fichier reçu, pas encore écrit sur disque
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table1Submission {
    /// Champs de base et relations, tels que reçus
    pub fields: Map<String, Value>,
    pub image: Option<Upload>,
    pub file: Option<Upload>,
}

impl Table1Submission {
    /// `id` fourni par le client, s'il est entier
    pub fn id(&self) -> Option<i32> {
        self.fields.get("id").and_then(integer_id)
    }

    pub fn uploads(self) -> impl Iterator<Item = (MediaKind, Upload)> {
        self.image
            .map(|u| (MediaKind::Image, u))
            .into_iter()
            .chain(self.file.map(|u| (MediaKind::File, u)))
    }

    pub fn from_json_bytes(body: &[u8]) -> Result<Self, AppError> {
        let fields = parse_object(body)?;
        Self::from_parts(fields, None, None)
    }

    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut fields = Map::new();
        let mut image = None;
        let mut file = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "data" => {
                    let text = field.text().await?;
                    fields = parse_object(text.as_bytes())?;
                }
                IMAGE_FIELD | FILE_FIELD => {
                    let Some(file_name) = field.file_name().map(str::to_string) else {
                        continue;
                    };
                    let bytes = field.bytes().await?;
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    let upload = Upload {
                        file_name,
                        bytes: bytes.to_vec(),
                    };
                    if name == IMAGE_FIELD {
                        image = Some(upload);
                    } else {
                        file = Some(upload);
                    }
                }
                other => tracing::debug!(field = other, "Ignoring multipart field"),
            }
        }

        Self::from_parts(fields, image, file)
    }

    /// Les fichiers inline du JSON remplacent les parties multipart de même nom
    fn from_parts(
        mut fields: Map<String, Value>,
        image: Option<Upload>,
        file: Option<Upload>,
    ) -> Result<Self, AppError> {
        let inline_image = take_inline_file(&mut fields, IMAGE_FIELD)?;
        let inline_file = take_inline_file(&mut fields, FILE_FIELD)?;

        Ok(Self {
            fields,
            image: inline_image.or(image),
            file: inline_file.or(file),
        })
    }
}

impl<S> FromRequest<S> for Table1Submission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::invalid_input(e.body_text()))?;
            Self::from_multipart(multipart).await
        } else {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| AppError::invalid_input(e.body_text()))?;
            Self::from_json_bytes(&body)
        }
    }
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::invalid_input("Invalid JSON data")),
    }
}

/// Retire le champ fichier du JSON. Seul un objet `{name, content}` est décodé,
/// toute autre forme est ignorée.
fn take_inline_file(fields: &mut Map<String, Value>, field: &str) -> Result<Option<Upload>, AppError> {
    let Some(Value::Object(inline)) = fields.remove(field) else {
        return Ok(None);
    };
    let (Some(Value::String(name)), Some(Value::String(content))) =
        (inline.get("name"), inline.get("content"))
    else {
        return Ok(None);
    };

    let bytes = decode_data_uri(content)
        .ok_or_else(|| AppError::invalid_input(format!("Invalid base64 data for {field}")))?;

    Ok(Some(Upload {
        file_name: name.clone(),
        bytes,
    }))
}

/// `<mime>;base64,<payload>`: exactement un séparateur
fn decode_data_uri(content: &str) -> Option<Vec<u8>> {
    let mut parts = content.split(";base64,");
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_mime), Some(payload), None) => STANDARD.decode(payload.trim()).ok(),
        _ => None,
    }
}

fn integer_id(value: &Value) -> Option<i32> {
    value.as_i64().and_then(|id| i32::try_from(id).ok())
}

/// `5` ou `{"id": 5}`; toute autre forme signifie "pas de relation"
pub fn relation_id(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Object(obj) => obj.get("id").and_then(integer_id),
        other => integer_id(other),
    }
}

/// `[1, {"id": 2}, ...]`; les éléments mal formés sont ignorés
pub fn relation_ids(value: Option<&Value>) -> Vec<i32> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|item| relation_id(Some(item))).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_with_inline_image_is_decoded() {
        let body = json!({
            "char_field": "abc",
            "image_field": {"name": "dot.png", "content": "data:image/png;base64,aGVsbG8="}
        });
        let submission = Table1Submission::from_json_bytes(body.to_string().as_bytes()).unwrap();

        let image = submission.image.expect("image decoded");
        assert_eq!(image.file_name, "dot.png");
        assert_eq!(image.bytes, b"hello");
        assert!(!submission.fields.contains_key(IMAGE_FIELD));
        assert_eq!(submission.fields["char_field"], "abc");
    }

    #[test]
    fn malformed_base64_names_the_field() {
        let body = json!({
            "file_field": {"name": "a.txt", "content": "text/plain;base64,@@@"}
        });
        let err = Table1Submission::from_json_bytes(body.to_string().as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid base64 data for file_field");
    }

    #[test]
    fn missing_or_repeated_delimiter_is_rejected() {
        assert!(decode_data_uri("text/plain,aGVsbG8=").is_none());
        assert!(decode_data_uri("a;base64,b;base64,c").is_none());
        assert_eq!(decode_data_uri("text/plain;base64,aGk=").unwrap(), b"hi");
    }

    #[test]
    fn other_file_shapes_are_ignored() {
        let body = json!({"image_field": "/media/images/old.png", "file_field": {"name": "x"}});
        let submission = Table1Submission::from_json_bytes(body.to_string().as_bytes()).unwrap();
        assert!(submission.image.is_none());
        assert!(submission.file.is_none());
    }

    #[test]
    fn non_object_body_is_invalid_json() {
        let err = Table1Submission::from_json_bytes(b"[1,2]").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON data");
        let err = Table1Submission::from_json_bytes(b"{oops").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON data");
    }

    #[test]
    fn relation_shapes() {
        assert_eq!(relation_id(Some(&json!(3))), Some(3));
        assert_eq!(relation_id(Some(&json!({"id": 4}))), Some(4));
        assert_eq!(relation_id(Some(&json!("4"))), None);
        assert_eq!(relation_id(Some(&json!(null))), None);
        assert_eq!(relation_id(None), None);

        assert_eq!(
            relation_ids(Some(&json!([1, {"id": 2}, "x", {"pk": 3}]))),
            vec![1, 2]
        );
        assert!(relation_ids(Some(&json!({"id": 1}))).is_empty());
    }

    #[test]
    fn submission_id_reads_integer_only() {
        let submission = Table1Submission::from_json_bytes(br#"{"id": 12}"#).unwrap();
        assert_eq!(submission.id(), Some(12));
        let submission = Table1Submission::from_json_bytes(br#"{"id": "12"}"#).unwrap();
        assert_eq!(submission.id(), None);
    }
}
