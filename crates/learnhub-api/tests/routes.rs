mod common;

use axum::http::{StatusCode, header};
use serde_json::json;

use common::{Part, TestApp};
use learnhub_entity::user::Role;

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["data"]["status"], "ok");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new();
    let response = app.get("/api/courses", None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    let body = response.json();
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = TestApp::new();
    let response = app.get("/api/courses", Some("not-a-jwt")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_guest_has_no_tenant() {
    let app = TestApp::new();
    let token = app.token_for(uuid::Uuid::new_v4(), Role::Guest, None);
    let response = app.get("/api/courses", Some(&token)).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["success"], false);
}

#[tokio::test]
async fn test_member_cannot_manage_courses() {
    let app = TestApp::new();
    let token = app.token(Role::Member);
    let response = app
        .json("POST", "/api/courses", &token, json!({ "title": "Welding 101" }))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_on_trigger_flow_action_stores_zero_days() {
    let app = TestApp::new();
    let token = app.token(Role::Organization);
    let course_id = app.course(&token, "Forklift safety").await;

    let response = app
        .json(
            "POST",
            &format!("/api/courses/{course_id}/flow-actions"),
            &token,
            json!({
                "title": "Welcome",
                "type": "email",
                "recipient": "learner",
                "dest_type": "email",
                "ref_date": "enrollment",
                "time_type": "on",
                "n_days": 5,
                "email_id": uuid::Uuid::new_v4(),
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["n_days"], 0);
    assert_eq!(body["data"]["course_id"], course_id.as_str());

    let list = app
        .get(&format!("/api/courses/{course_id}/flow-actions"), Some(&token))
        .await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.json()["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_inconsistent_trigger_is_unprocessable() {
    let app = TestApp::new();
    let token = app.token(Role::Organization);
    let course_id = app.course(&token, "Forklift safety").await;

    let response = app
        .json(
            "POST",
            &format!("/api/courses/{course_id}/flow-actions"),
            &token,
            json!({
                "title": "Reminder",
                "type": "email",
                "recipient": "learner",
                "dest_type": "email",
                "ref_date": "start",
                "time_type": "before",
                "email_id": uuid::Uuid::new_v4(),
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.json();
    assert_eq!(body["success"], false);
    assert!(body["errors"]["n_days"].is_array());
}

#[tokio::test]
async fn test_multipart_flow_action_snapshots_library_document() {
    let app = TestApp::new();
    let token = app.token(Role::Organization);
    let course_id = app.course(&token, "Forklift safety").await;

    let upload = app
        .multipart(
            "/api/documents",
            &token,
            &[
                Part::Text("title", "Handbook"),
                Part::Text("course_id", &course_id),
                Part::File("file", "handbook.pdf", b"%PDF-1.7"),
            ],
        )
        .await;
    assert_eq!(upload.status, StatusCode::CREATED);
    let document_id = upload.json()["data"]["id"].as_str().unwrap().to_string();

    let document_ids = format!("[\"{document_id}\", \"{}\"]", uuid::Uuid::new_v4());
    let email_id = uuid::Uuid::new_v4().to_string();
    let response = app
        .multipart(
            &format!("/api/courses/{course_id}/flow-actions"),
            &token,
            &[
                Part::Text("title", "Welcome pack"),
                Part::Text("type", "document"),
                Part::Text("recipient", "learner"),
                Part::Text("dest_type", "email"),
                Part::Text("ref_date", "enrollment"),
                Part::Text("time_type", "after"),
                Part::Text("n_days", "3"),
                Part::Text("is_active", "1"),
                Part::Text("email_id", &email_id),
                Part::Text("document_ids", &document_ids),
                Part::File("files[]", "agenda.pdf", b"%PDF-1.7 agenda"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let data = &response.json()["data"];
    assert_eq!(data["n_days"], 3);
    assert_eq!(data["is_active"], true);
    let files = data["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert!(files.iter().any(|f| f["source"] == "document"));
    assert!(files.iter().any(|f| f["source"] == "upload"));
}

#[tokio::test]
async fn test_system_folder_cannot_be_deleted() {
    let app = TestApp::new();
    let token = app.token(Role::Organization);
    let course_id = app.course(&token, "Forklift safety").await;

    let upload = app
        .multipart(
            "/api/documents",
            &token,
            &[
                Part::Text("course_id", &course_id),
                Part::File("file", "handbook.pdf", b"%PDF-1.7"),
            ],
        )
        .await;
    assert_eq!(upload.status, StatusCode::CREATED);

    let folders = app
        .get(&format!("/api/document-folders?course_id={course_id}"), Some(&token))
        .await;
    assert_eq!(folders.status, StatusCode::OK);
    let body = folders.json();
    let system = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["is_system"] == true)
        .unwrap()
        .clone();
    let folder_id = system["id"].as_str().unwrap();

    let response = app
        .delete(&format!("/api/document-folders/{folder_id}"), &token)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let show = app
        .get(&format!("/api/document-folders/{folder_id}"), Some(&token))
        .await;
    assert_eq!(show.status, StatusCode::OK);
    assert_eq!(show.json()["data"]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_document_download_streams_the_file() {
    let app = TestApp::new();
    let token = app.token(Role::Organization);

    let upload = app
        .multipart(
            "/api/documents",
            &token,
            &[Part::File("file", "handbook.pdf", b"%PDF-1.7 body")],
        )
        .await;
    assert_eq!(upload.status, StatusCode::CREATED);
    let document_id = upload.json()["data"]["id"].as_str().unwrap().to_string();

    let member = app.token(Role::Member);
    let response = app
        .get(&format!("/api/documents/{document_id}/download"), Some(&member))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"%PDF-1.7 body");
    assert!(response.header(header::CONTENT_DISPOSITION).contains("handbook.pdf"));
}

#[tokio::test]
async fn test_funder_export_is_a_spreadsheet_download() {
    let app = TestApp::new();
    let token = app.token(Role::Organization);

    let created = app
        .json("POST", "/api/funders", &token, json!({ "name": "OPCO Atlas", "type": "opco" }))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let response = app.get("/api/funders/export?format=xlsx", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert!(response.header(header::CONTENT_DISPOSITION).contains(".xlsx"));
    assert!(String::from_utf8_lossy(&response.body).contains("OPCO Atlas"));

    let member = app.token(Role::Member);
    let denied = app.get("/api/funders/export", Some(&member)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_export_format_is_a_field_error() {
    let app = TestApp::new();
    let token = app.token(Role::Organization);

    let response = app.get("/api/companies/export?format=pdf", Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json()["errors"]["format"].is_array());
}

#[tokio::test]
async fn test_statistics_overview_is_owner_only() {
    let app = TestApp::new();
    let owner = app.token(Role::Organization);
    app.course(&owner, "Forklift safety").await;

    let response = app.get("/api/statistics/overview", Some(&owner)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["success"], true);

    let member = app.token(Role::Member);
    let denied = app.get("/api/statistics/overview", Some(&member)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
}
