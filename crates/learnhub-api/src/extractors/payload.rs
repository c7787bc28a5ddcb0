//! Request bodies that arrive either as JSON or as multipart forms.
//!
//! Multipart text fields become JSON strings (`name[]` or repeated names
//! become arrays) and are handed to the same `Deserialize` impl as a JSON
//! body; the lenient field deserializers take care of `"1"`, `"5"` and
//! JSON-encoded lists. File parts are collected separately.

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use learnhub_core::error::AppError;
use learnhub_service::UploadedFile;

use crate::error::ApiError;

/// A decoded body plus any uploaded files.
#[derive(Debug)]
pub struct Payload<T> {
    /// Decoded fields.
    pub data: T,
    /// File parts, in submission order.
    pub files: Vec<UploadedFile>,
}

impl<T> Payload<T> {
    /// The single uploaded file, if any.
    pub fn into_single_file(self) -> (T, Option<UploadedFile>) {
        let file = self.files.into_iter().next();
        (self.data, file)
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

fn malformed(e: impl std::fmt::Display) -> AppError {
    AppError::validation(format!("Malformed request body: {e}"))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, AppError> {
    serde_json::from_value(value).map_err(malformed)
}

/// Insert a text field, turning `name[]` and repeated names into arrays.
fn insert_field(fields: &mut Map<String, Value>, name: &str, value: String) {
    let (key, is_list) = match name.strip_suffix("[]") {
        Some(key) => (key, true),
        None => (name, false),
    };
    let value = Value::String(value);

    match fields.get_mut(key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None if is_list => {
            fields.insert(key.to_string(), Value::Array(vec![value]));
        }
        None => {
            fields.insert(key.to_string(), value);
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<(Value, Vec<UploadedFile>), AppError> {
    let mut fields = Map::new();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(malformed)?;
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                debug!(field = %name, file_name = %file_name, size = data.len(), "Multipart file received");
                files.push(UploadedFile::new(file_name, content_type, data));
            }
            None => {
                let text = field.text().await.map_err(malformed)?;
                insert_field(&mut fields, &name, text);
            }
        }
    }
    Ok((Value::Object(fields), files))
}

fn read_json(body: &Bytes) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(malformed)
}

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let multipart = Multipart::from_request(req, state).await.map_err(malformed)?;
            let (value, files) = read_multipart(multipart).await?;
            return Ok(Self {
                data: decode(value)?,
                files,
            });
        }

        let body = Bytes::from_request(req, state).await.map_err(malformed)?;
        Ok(Self {
            data: decode(read_json(&body)?)?,
            files: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_list_fields_become_arrays() {
        let mut fields = Map::new();
        insert_field(&mut fields, "title", "Reminder".into());
        insert_field(&mut fields, "document_ids[]", "a".into());
        insert_field(&mut fields, "document_ids[]", "b".into());
        insert_field(&mut fields, "tag", "x".into());
        insert_field(&mut fields, "tag", "y".into());

        assert_eq!(
            Value::Object(fields),
            json!({
                "title": "Reminder",
                "document_ids": ["a", "b"],
                "tag": ["x", "y"],
            })
        );
    }

    #[test]
    fn test_blank_json_body_is_an_empty_object() {
        assert_eq!(read_json(&Bytes::from_static(b"  ")).unwrap(), json!({}));
        assert!(read_json(&Bytes::from_static(b"{nope")).is_err());
    }
}
