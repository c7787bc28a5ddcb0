//! HTTP request handlers, one module per resource.

pub mod attempt;
pub mod automation;
pub mod course;
pub mod document;
pub mod folder;
pub mod health;
pub mod partner;
pub mod questionnaire;
pub mod quiz;
pub mod statistics;

use axum::body::Body;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use learnhub_service::ExportFile;

/// `Content-Disposition: attachment` value for `file_name`.
fn attachment(file_name: &str) -> HeaderValue {
    let safe: String = file_name
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// A file download response.
pub(crate) fn file_response(file_name: &str, content_type: &str, body: Body) -> Response {
    let content_type =
        HeaderValue::from_str(content_type).unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    (
        StatusCode::OK,
        [(CONTENT_TYPE, content_type), (CONTENT_DISPOSITION, attachment(file_name))],
        body,
    )
        .into_response()
}

/// Serve a rendered export.
pub(crate) fn export_response(file: ExportFile) -> Response {
    file_response(&file.file_name, file.content_type, Body::from(file.data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_header_escapes_quotes() {
        assert_eq!(attachment("a\"b.csv"), "attachment; filename=\"a_b.csv\"");
    }
}
