//! Route definitions for the LearnHub HTTP API.
//!
//! Resource routes are mounted under `/api`; `/health` stays at the root
//! so probes never need a token.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let server = &state.config.server;
    let body_limit = server.body_limit_bytes;
    let timeout = Duration::from_secs(server.request_timeout_seconds);
    let cors = middleware::cors::build_cors_layer(&server.cors);

    let api_routes = Router::new()
        .merge(course_routes())
        .merge(automation_routes())
        .merge(document_routes())
        .merge(folder_routes())
        .merge(questionnaire_routes())
        .merge(quiz_routes())
        .merge(attempt_routes())
        .merge(partner_routes())
        .route("/statistics/overview", get(handlers::statistics::overview));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(handlers::health::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Courses and their sessions
fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(handlers::course::list).post(handlers::course::create))
        .route("/courses/{id}", get(handlers::course::show).put(handlers::course::update))
        .route(
            "/courses/{id}/sessions",
            get(handlers::course::sessions).post(handlers::course::create_session),
        )
        .route("/sessions/{id}", get(handlers::course::show_session))
}

/// Flow actions of courses and sessions
fn automation_routes() -> Router<AppState> {
    use handlers::automation as flow;

    Router::new()
        .route(
            "/courses/{id}/flow-actions",
            get(flow::course_list).post(flow::course_create),
        )
        .route(
            "/courses/{id}/flow-actions/{rule_id}",
            get(flow::course_show).put(flow::course_update).delete(flow::course_delete),
        )
        .route(
            "/sessions/{id}/flow-actions",
            get(flow::session_list).post(flow::session_create),
        )
        .route(
            "/sessions/{id}/flow-actions/{rule_id}",
            get(flow::session_show).put(flow::session_update).delete(flow::session_delete),
        )
}

/// Document library
fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/documents", get(handlers::document::list).post(handlers::document::upload))
        .route(
            "/documents/{id}",
            get(handlers::document::show)
                .put(handlers::document::update)
                .delete(handlers::document::destroy),
        )
        .route("/documents/{id}/download", get(handlers::document::download))
}

/// Document folders and their items
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/document-folders",
            get(handlers::folder::list).post(handlers::folder::create),
        )
        .route(
            "/document-folders/{id}",
            get(handlers::folder::show)
                .put(handlers::folder::update)
                .delete(handlers::folder::destroy),
        )
        .route("/document-folders/{id}/items", post(handlers::folder::add_item))
        .route("/document-folders/{id}/items/reorder", put(handlers::folder::reorder))
        .route(
            "/document-folders/{id}/items/{document_id}",
            axum::routing::delete(handlers::folder::remove_item),
        )
}

/// Questionnaires
fn questionnaire_routes() -> Router<AppState> {
    use handlers::questionnaire as q;

    Router::new()
        .route("/questionnaires", get(q::list).post(q::create))
        .route("/questionnaires/{id}", get(q::show).put(q::update).delete(q::destroy))
        .route("/questionnaires/{id}/publish", post(q::publish))
        .route("/questionnaires/{id}/unpublish", post(q::unpublish))
        .route("/questionnaires/{id}/duplicate", post(q::duplicate))
        .route("/questionnaires/{id}/questions/reorder", put(q::reorder))
}

/// Quiz authoring
fn quiz_routes() -> Router<AppState> {
    use handlers::quiz;

    Router::new()
        .route("/quizzes", get(quiz::list).post(quiz::create))
        .route("/quizzes/{id}", get(quiz::show).put(quiz::update).delete(quiz::destroy))
        .route("/quizzes/{id}/publish", post(quiz::publish))
        .route("/quizzes/{id}/unpublish", post(quiz::unpublish))
        .route("/quizzes/{id}/duplicate", post(quiz::duplicate))
        .route("/quizzes/{id}/questions", post(quiz::add_question))
        .route("/quizzes/{id}/questions/reorder", put(quiz::reorder))
        .route(
            "/quizzes/{id}/questions/{question_id}",
            put(quiz::update_question).delete(quiz::delete_question),
        )
}

/// Quiz attempts
fn attempt_routes() -> Router<AppState> {
    use handlers::attempt;

    Router::new()
        .route("/quizzes/{id}/attempts", get(attempt::list).post(attempt::start))
        .route("/quizzes/{id}/attempts/export", get(attempt::export))
        .route("/quiz-attempts/{id}/submit", post(attempt::submit))
        .route("/quiz-attempts/{id}/grade", post(attempt::grade))
        .route("/quiz-attempts/{id}/abandon", post(attempt::abandon))
}

/// Companies and funders
fn partner_routes() -> Router<AppState> {
    use handlers::partner;

    Router::new()
        .route("/companies", get(partner::list_companies).post(partner::create_company))
        .route("/companies/export", get(partner::export_companies))
        .route(
            "/companies/{id}",
            get(partner::show_company)
                .put(partner::update_company)
                .delete(partner::delete_company),
        )
        .route("/funders", get(partner::list_funders).post(partner::create_funder))
        .route("/funders/export", get(partner::export_funders))
        .route(
            "/funders/{id}",
            get(partner::show_funder)
                .put(partner::update_funder)
                .delete(partner::delete_funder),
        )
}
