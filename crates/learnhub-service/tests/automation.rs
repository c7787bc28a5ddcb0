mod common;

use bytes::Bytes;
use uuid::Uuid;

use common::Harness;
use learnhub_core::error::ErrorKind;
use learnhub_entity::automation::{FileSource, RuleOwner, TRIGGER_INCONSISTENT, TimeType};
use learnhub_entity::user::Role;
use learnhub_service::UploadedFile;
use learnhub_service::automation::RulePayload;
use learnhub_service::document::DocumentPayload;
use learnhub_service::questionnaire::QuestionnairePayload;

fn payload() -> RulePayload {
    RulePayload {
        title: Some("Welcome pack".into()),
        kind: Some("email".into()),
        recipient: Some("learner".into()),
        dest_type: Some("email".into()),
        ref_date: Some("enrollment".into()),
        time_type: Some("on".into()),
        email_id: Some(Some(Uuid::new_v4())),
        ..RulePayload::default()
    }
}

fn pdf(name: &str) -> UploadedFile {
    UploadedFile::new(name, Some("application/pdf".into()), Bytes::from_static(b"%PDF-1.7"))
}

#[tokio::test]
async fn test_on_trigger_stores_zero_days() {
    let h = Harness::new();
    let ctx = h.owner().await;
    let course = h.course(&ctx, "Forklift safety").await;

    let rule = h
        .services
        .automation
        .create(
            &ctx,
            RuleOwner::Course(course.id),
            RulePayload {
                n_days: Some(5),
                ..payload()
            },
            vec![],
        )
        .await
        .unwrap();

    assert_eq!(rule.rule.time_type, TimeType::On);
    assert_eq!(rule.rule.n_days, 0);
    assert_eq!(rule.rule.course_id, Some(course.id));
}

#[tokio::test]
async fn test_inconsistent_trigger_is_rejected_without_side_effects() {
    let h = Harness::new();
    let ctx = h.owner().await;
    let course = h.course(&ctx, "Welding").await;
    let owner = RuleOwner::Course(course.id);

    let err = h
        .services
        .automation
        .create(
            &ctx,
            owner,
            RulePayload {
                time_type: Some("before".into()),
                ..payload()
            },
            vec![pdf("brief.pdf")],
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.fields.unwrap().get("n_days").unwrap()[0].code, TRIGGER_INCONSISTENT);
    assert!(h.services.automation.list(&ctx, owner).await.unwrap().is_empty());
    assert!(h.storage.keys().await.is_empty());
}

#[tokio::test]
async fn test_attachments_and_links() {
    let h = Harness::new();
    let ctx = h.owner().await;
    let course = h.course(&ctx, "First aid").await;
    let other = h.course(&ctx, "Other").await;

    let library = h
        .services
        .documents
        .upload(&ctx, DocumentPayload::default(), Some(pdf("charter.pdf")))
        .await
        .unwrap();
    let foreign = h
        .services
        .documents
        .upload(
            &ctx,
            DocumentPayload {
                course_id: Some(other.id),
                ..DocumentPayload::default()
            },
            Some(pdf("other.pdf")),
        )
        .await
        .unwrap();
    let survey = h
        .services
        .questionnaires
        .create(
            &ctx,
            QuestionnairePayload {
                title: Some("Satisfaction".into()),
                ..QuestionnairePayload::default()
            },
        )
        .await
        .unwrap();

    let rule = h
        .services
        .automation
        .create(
            &ctx,
            RuleOwner::Course(course.id),
            RulePayload {
                document_ids: Some(vec![library.id, foreign.id, Uuid::new_v4()]),
                questionnaire_ids: Some(vec![survey.questionnaire.id, Uuid::new_v4()]),
                ..payload()
            },
            vec![pdf("Convocation.pdf")],
        )
        .await
        .unwrap();

    assert_eq!(rule.files.len(), 2);
    let upload = rule.files.iter().find(|f| f.source == FileSource::Upload).unwrap();
    assert_eq!(upload.name, "Convocation.pdf");
    assert_eq!(upload.extension.as_deref(), Some("pdf"));
    assert!(upload.path.starts_with(&format!("automation/courses/{}/{}/", course.id, rule.rule.id)));
    let snapshot = rule.files.iter().find(|f| f.source == FileSource::Document).unwrap();
    assert_eq!(snapshot.source_document_id, Some(library.id));
    assert_eq!(snapshot.path, library.path);
    assert_eq!(rule.questionnaire_ids, vec![survey.questionnaire.id]);
}

#[tokio::test]
async fn test_update_replaces_links_and_appends_documents() {
    let h = Harness::new();
    let ctx = h.owner().await;
    let course = h.course(&ctx, "Hygiene").await;
    let owner = RuleOwner::Course(course.id);

    let doc = h
        .services
        .documents
        .upload(&ctx, DocumentPayload::default(), Some(pdf("rules.pdf")))
        .await
        .unwrap();
    let survey = h
        .services
        .questionnaires
        .create(
            &ctx,
            QuestionnairePayload {
                title: Some("Exit survey".into()),
                ..QuestionnairePayload::default()
            },
        )
        .await
        .unwrap();

    let created = h
        .services
        .automation
        .create(
            &ctx,
            owner,
            RulePayload {
                document_ids: Some(vec![doc.id]),
                questionnaire_ids: Some(vec![survey.questionnaire.id]),
                ..payload()
            },
            vec![],
        )
        .await
        .unwrap();
    let id = created.rule.id;

    let untouched = h
        .services
        .automation
        .update(
            &ctx,
            owner,
            id,
            RulePayload {
                document_ids: Some(vec![]),
                ..RulePayload::default()
            },
            vec![],
        )
        .await
        .unwrap();
    assert_eq!(untouched.files.len(), 1);
    assert_eq!(untouched.questionnaire_ids, vec![survey.questionnaire.id]);

    let cleared = h
        .services
        .automation
        .update(
            &ctx,
            owner,
            id,
            RulePayload {
                questionnaire_ids: Some(vec![]),
                document_ids: Some(vec![doc.id]),
                ..RulePayload::default()
            },
            vec![],
        )
        .await
        .unwrap();
    assert!(cleared.questionnaire_ids.is_empty());
    assert_eq!(cleared.files.len(), 2);
}

#[tokio::test]
async fn test_session_rules_and_delete_cleanup() {
    let h = Harness::new();
    let ctx = h.owner().await;
    let course = h.course(&ctx, "Crane operation").await;
    let session = h
        .services
        .courses
        .create_session(
            &ctx,
            course.id,
            learnhub_service::course::CreateSessionRequest {
                title: "Spring".into(),
                starts_at: h.now(),
                ends_at: h.now(),
            },
        )
        .await
        .unwrap();
    let owner = RuleOwner::Session(session.id);

    let rule = h
        .services
        .automation
        .create(&ctx, owner, payload(), vec![pdf("plan.pdf")])
        .await
        .unwrap();
    assert_eq!(rule.rule.session_id, Some(session.id));
    assert_eq!(h.storage.keys().await.len(), 1);

    // the same rule is invisible through the parent course
    let err = h
        .services
        .automation
        .show(&ctx, RuleOwner::Course(course.id), rule.rule.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    h.services.automation.delete(&ctx, owner, rule.rule.id).await.unwrap();
    assert!(h.storage.keys().await.is_empty());
}

#[tokio::test]
async fn test_other_tenant_sees_nothing() {
    let h = Harness::new();
    let ctx = h.owner().await;
    let course = h.course(&ctx, "Private").await;

    let stranger = h.in_org(Uuid::new_v4(), Role::Organization).await;
    let err = h
        .services
        .automation
        .list(&stranger, RuleOwner::Course(course.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = h
        .services
        .context(learnhub_auth::Principal::new(Uuid::new_v4(), Role::Guest, None))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::TenantNotFound);
}

#[tokio::test]
async fn test_update_with_blank_title_is_rejected() {
    let h = Harness::new();
    let ctx = h.owner().await;
    let course = h.course(&ctx, "First aid").await;
    let owner = RuleOwner::Course(course.id);

    let created = h.services.automation.create(&ctx, owner, payload(), vec![]).await.unwrap();
    let blank: RulePayload = serde_json::from_value(serde_json::json!({ "title": "" })).unwrap();

    let err = h
        .services
        .automation
        .update(&ctx, owner, created.rule.id, blank, vec![])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    let fields = err.fields.unwrap();
    assert_eq!(fields.get("title").unwrap()[0].code, "required");

    let stored = h.services.automation.show(&ctx, owner, created.rule.id).await.unwrap();
    assert_eq!(stored.rule.title, "Welcome pack");
}
