mod common;

use bytes::Bytes;
use uuid::Uuid;

use common::Harness;
use learnhub_core::error::ErrorKind;
use learnhub_core::types::{PageRequest, SortField};
use learnhub_database::store::{AttemptFilter, PartnerFilter, QuizFilter};
use learnhub_entity::partner::{LEARNER_ACTIVE, LEARNER_INACTIVE, Learner};
use learnhub_entity::quiz::AttemptStatus;
use learnhub_entity::user::Role;
use learnhub_service::document::{AddFolderItemRequest, CreateFolderRequest, DocumentPayload};
use learnhub_service::partner::{CompanyPayload, FunderPayload};
use learnhub_service::quiz::{QuizOptionInput, QuizPayload, QuizQuestionInput, SubmitAttemptRequest};
use learnhub_service::validation::ReorderRequest;
use learnhub_service::{ExportFormat, UploadedFile};

fn file(name: &str) -> UploadedFile {
    UploadedFile::new(name, None, Bytes::from_static(b"content"))
}

fn company(siret: &str) -> CompanyPayload {
    CompanyPayload {
        name: Some("Acme".into()),
        siret: Some(siret.into()),
        ..CompanyPayload::default()
    }
}

fn question(text: &str) -> QuizQuestionInput {
    QuizQuestionInput {
        text: Some(text.into()),
        kind: Some("single".into()),
        points: Some(2),
        options: Some(vec![
            QuizOptionInput {
                text: "yes".into(),
                is_correct: true,
            },
            QuizOptionInput {
                text: "no".into(),
                is_correct: false,
            },
        ]),
    }
}

#[tokio::test]
async fn test_course_documents_land_in_the_system_folder() {
    let h = Harness::new();
    let ctx = h.owner().await;
    let course = h.course(&ctx, "Electrical safety").await;

    let doc = h
        .services
        .documents
        .upload(
            &ctx,
            DocumentPayload {
                title: Some("Handbook".into()),
                course_id: Some(course.id),
                ..DocumentPayload::default()
            },
            Some(file("handbook.pdf")),
        )
        .await
        .unwrap();

    let system = h.services.folders.ensure_system_folder(&ctx, course.id).await.unwrap();
    assert!(system.is_system);
    let shown = h.services.folders.show(&ctx, system.id).await.unwrap();
    assert_eq!(shown.items.len(), 1);
    assert_eq!(shown.items[0].document.id, doc.id);

    let err = h.services.folders.destroy(&ctx, system.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    h.services.documents.destroy(&ctx, doc.id).await.unwrap();
    assert!(h.storage.keys().await.is_empty());
}

#[tokio::test]
async fn test_upload_requires_a_file_and_a_known_course() {
    let h = Harness::new();
    let ctx = h.owner().await;

    let err = h
        .services
        .documents
        .upload(&ctx, DocumentPayload::default(), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = h
        .services
        .documents
        .upload(
            &ctx,
            DocumentPayload {
                course_id: Some(Uuid::new_v4()),
                ..DocumentPayload::default()
            },
            Some(file("notes.txt")),
        )
        .await
        .unwrap_err();
    assert!(err.fields.unwrap().contains("course_id"));
    assert!(h.storage.keys().await.is_empty());
}

#[tokio::test]
async fn test_folder_reorder() {
    let h = Harness::new();
    let ctx = h.owner().await;
    let folder = h
        .services
        .folders
        .create(
            &ctx,
            CreateFolderRequest {
                name: "Onboarding".into(),
                icon: None,
                color: None,
                course_id: None,
            },
        )
        .await
        .unwrap();

    let mut ids = Vec::new();
    for name in ["a.pdf", "b.pdf", "c.pdf"] {
        let doc = h
            .services
            .documents
            .upload(&ctx, DocumentPayload::default(), Some(file(name)))
            .await
            .unwrap();
        h.services
            .folders
            .add_document(&ctx, folder.id, AddFolderItemRequest { document_id: doc.id })
            .await
            .unwrap();
        ids.push(doc.id);
    }

    ids.reverse();
    let reordered = h
        .services
        .folders
        .reorder(&ctx, folder.id, ReorderRequest { ids: ids.clone() })
        .await
        .unwrap();
    let order: Vec<Uuid> = reordered.items.iter().map(|i| i.document.id).collect();
    assert_eq!(order, ids);

    let err = h
        .services
        .folders
        .reorder(
            &ctx,
            folder.id,
            ReorderRequest {
                ids: vec![Uuid::new_v4()],
            },
        )
        .await
        .unwrap_err();
    assert!(err.kind.is_client_error());
}

#[tokio::test]
async fn test_partner_delete_guard_and_unique_siret() {
    let h = Harness::new();
    let ctx = h.owner().await;

    let acme = h
        .services
        .partners
        .create_company(&ctx, company("732 829 320 00074"))
        .await
        .unwrap();
    assert_eq!(acme.siret, "73282932000074");

    let err = h
        .services
        .partners
        .create_company(&ctx, company("73282932000074"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.fields.unwrap().get("siret").unwrap()[0].code, "unique");

    let other_org = h.in_org(Uuid::new_v4(), Role::Organization).await;
    h.services
        .partners
        .create_company(&other_org, company("73282932000074"))
        .await
        .unwrap();

    let learner = Learner {
        id: Uuid::new_v4(),
        organization_id: h.organization_id,
        user_id: Uuid::new_v4(),
        first_name: "Ada".into(),
        last_name: "Martin".into(),
        email: None,
        company_id: Some(acme.id),
        funder_id: None,
        status: LEARNER_ACTIVE,
    };
    let learner_id = learner.id;
    h.store.insert_learner(learner).await;

    let err = h.services.partners.delete_company(&ctx, acme.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::BusinessRule);

    assert!(h.store.set_learner_status(learner_id, LEARNER_INACTIVE).await);
    h.services.partners.delete_company(&ctx, acme.id).await.unwrap();
    let err = h.services.partners.company(&ctx, acme.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_funder_defaults_and_export() {
    let h = Harness::new();
    let ctx = h.owner().await;

    let funder = h
        .services
        .partners
        .create_funder(
            &ctx,
            FunderPayload {
                name: Some("Regional fund".into()),
                ..FunderPayload::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(funder.siret, None);

    let export = h
        .services
        .exports
        .funders(&ctx, &PartnerFilter::default(), SortField::default(), ExportFormat::Csv)
        .await
        .unwrap();
    assert_eq!(export.file_name, "funders_20260105_090000.csv");
    let text = String::from_utf8_lossy(&export.data);
    assert!(text.contains("Regional fund"));
}

#[tokio::test]
async fn test_quiz_lifecycle() {
    let h = Harness::new();
    let author = h.owner().await;
    let learner = h.as_role(Role::Member).await;

    let empty = h
        .services
        .quizzes
        .create(
            &author,
            QuizPayload {
                title: Some("Empty".into()),
                ..QuizPayload::default()
            },
        )
        .await
        .unwrap();
    let err = h
        .services
        .quizzes
        .set_published(&author, empty.quiz.id, true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BusinessRule);

    let quiz = h
        .services
        .quizzes
        .create(
            &author,
            QuizPayload {
                title: Some("Safety check".into()),
                questions: Some(vec![question("Helmet?"), question("Gloves?")]),
                ..QuizPayload::default()
            },
        )
        .await
        .unwrap();
    let quiz_id = quiz.quiz.id;

    let hidden = h.services.quizzes.show(&learner, quiz_id).await.unwrap_err();
    assert_eq!(hidden.kind, ErrorKind::NotFound);
    let listed = h
        .services
        .quizzes
        .list(&learner, &QuizFilter::default(), SortField::default(), &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 0);

    h.services.quizzes.set_published(&author, quiz_id, true).await.unwrap();

    let attempt = h.services.attempts.start(&learner, quiz_id).await.unwrap();
    let refused = h.services.attempts.start(&learner, quiz_id).await.unwrap_err();
    assert_eq!(refused.kind, ErrorKind::Forbidden);

    let mut answers = learnhub_entity::quiz::AttemptAnswers::new();
    let first = &quiz.questions[0];
    answers.insert(first.question.id, vec![first.options[0].id]);
    let submitted = h
        .services
        .attempts
        .submit(&learner, attempt.id, SubmitAttemptRequest { answers: Some(answers) })
        .await
        .unwrap();
    assert_eq!(submitted.status, AttemptStatus::Submitted);

    let graded = h.services.attempts.grade(&author, attempt.id).await.unwrap();
    assert_eq!(graded.status, AttemptStatus::Graded);
    assert_eq!(graded.score, Some(2));
    assert_eq!(graded.max_score, Some(4));
    let regrade = h.services.attempts.grade(&author, attempt.id).await.unwrap_err();
    assert_eq!(regrade.kind, ErrorKind::BusinessRule);

    let someone_else = h.as_role(Role::Member).await;
    let theirs = h
        .services
        .attempts
        .list(&someone_else, quiz_id, &AttemptFilter::default(), &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(theirs.total, 0);
    let all = h
        .services
        .attempts
        .list(&author, quiz_id, &AttemptFilter::default(), &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total, 1);
}

#[tokio::test]
async fn test_quiz_duplicate_and_reorder() {
    let h = Harness::new();
    let ctx = h.owner().await;
    let quiz = h
        .services
        .quizzes
        .create(
            &ctx,
            QuizPayload {
                title: Some("Original".into()),
                is_published: Some(true),
                questions: Some(vec![question("One"), question("Two")]),
                ..QuizPayload::default()
            },
        )
        .await
        .unwrap();

    let copy = h.services.quizzes.duplicate(&ctx, quiz.quiz.id).await.unwrap();
    assert_ne!(copy.quiz.id, quiz.quiz.id);
    assert!(!copy.quiz.is_published);
    assert_eq!(copy.questions.len(), 2);

    let ids: Vec<Uuid> = quiz.questions.iter().rev().map(|q| q.question.id).collect();
    let reordered = h
        .services
        .quizzes
        .reorder(&ctx, quiz.quiz.id, ReorderRequest { ids: ids.clone() })
        .await
        .unwrap();
    let order: Vec<Uuid> = reordered.questions.iter().map(|q| q.question.id).collect();
    assert_eq!(order, ids);
}

#[tokio::test]
async fn test_quiz_without_questions_is_never_published() {
    let h = Harness::new();
    let ctx = h.owner().await;

    let err = h
        .services
        .quizzes
        .create(
            &ctx,
            QuizPayload {
                title: Some("Empty".into()),
                is_published: Some(true),
                ..QuizPayload::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BusinessRule);

    let draft = h
        .services
        .quizzes
        .create(
            &ctx,
            QuizPayload {
                title: Some("Draft".into()),
                ..QuizPayload::default()
            },
        )
        .await
        .unwrap();
    let err = h
        .services
        .quizzes
        .update(
            &ctx,
            draft.quiz.id,
            QuizPayload {
                is_published: Some(true),
                ..QuizPayload::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BusinessRule);
    let draft = h.services.quizzes.show(&ctx, draft.quiz.id).await.unwrap();
    assert!(!draft.quiz.is_published);

    let live = h
        .services
        .quizzes
        .create(
            &ctx,
            QuizPayload {
                title: Some("Live".into()),
                is_published: Some(true),
                questions: Some(vec![question("Only one")]),
                ..QuizPayload::default()
            },
        )
        .await
        .unwrap();
    let last = live.questions[0].question.id;
    let err = h
        .services
        .quizzes
        .delete_question(&ctx, live.quiz.id, last)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BusinessRule);

    h.services.quizzes.set_published(&ctx, live.quiz.id, false).await.unwrap();
    let emptied = h.services.quizzes.delete_question(&ctx, live.quiz.id, last).await.unwrap();
    assert!(!emptied.is_published);
}

#[tokio::test]
async fn test_shuffle_only_applies_to_takers() {
    let h = Harness::new();
    let author = h.owner().await;
    let learner = h.as_role(Role::Member).await;

    let texts = ["A", "B", "C", "D", "E", "F", "G", "H"];
    let quiz = h
        .services
        .quizzes
        .create(
            &author,
            QuizPayload {
                title: Some("Shuffled".into()),
                is_shuffle: Some(true),
                is_published: Some(true),
                questions: Some(texts.iter().map(|t| question(t)).collect()),
                ..QuizPayload::default()
            },
        )
        .await
        .unwrap();
    let stored: Vec<Uuid> = quiz.questions.iter().map(|q| q.question.id).collect();

    let seen = h.services.quizzes.show(&learner, quiz.quiz.id).await.unwrap();
    let mut seen_ids: Vec<Uuid> = seen.questions.iter().map(|q| q.question.id).collect();
    seen_ids.sort();
    let mut expected = stored.clone();
    expected.sort();
    assert_eq!(seen_ids, expected);
    for q in &seen.questions {
        assert_eq!(q.options.len(), 2);
    }

    let authored = h.services.quizzes.show(&author, quiz.quiz.id).await.unwrap();
    let order: Vec<Uuid> = authored.questions.iter().map(|q| q.question.id).collect();
    assert_eq!(order, stored);
}

#[tokio::test]
async fn test_abandoned_attempt_frees_a_single_take_quiz() {
    let h = Harness::new();
    let author = h.owner().await;
    let learner = h.as_role(Role::Member).await;
    let quiz = h
        .services
        .quizzes
        .create(
            &author,
            QuizPayload {
                title: Some("Single take".into()),
                is_published: Some(true),
                questions: Some(vec![question("Ready?")]),
                ..QuizPayload::default()
            },
        )
        .await
        .unwrap();

    let first = h.services.attempts.start(&learner, quiz.quiz.id).await.unwrap();
    let abandoned = h.services.attempts.abandon(&learner, first.id).await.unwrap();
    assert_eq!(abandoned.status, AttemptStatus::Abandoned);
    let again = h.services.attempts.abandon(&learner, first.id).await.unwrap_err();
    assert_eq!(again.kind, ErrorKind::BusinessRule);

    let second = h.services.attempts.start(&learner, quiz.quiz.id).await.unwrap();
    assert_ne!(second.id, first.id);
    let refused = h.services.attempts.start(&learner, quiz.quiz.id).await.unwrap_err();
    assert_eq!(refused.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_remake_quiz_allows_another_attempt() {
    let h = Harness::new();
    let author = h.owner().await;
    let learner = h.as_role(Role::Member).await;
    let quiz = h
        .services
        .quizzes
        .create(
            &author,
            QuizPayload {
                title: Some("Practice".into()),
                is_remake: Some(true),
                is_published: Some(true),
                questions: Some(vec![question("Again?")]),
                ..QuizPayload::default()
            },
        )
        .await
        .unwrap();

    let first = h.services.attempts.start(&learner, quiz.quiz.id).await.unwrap();
    h.services
        .attempts
        .submit(&learner, first.id, SubmitAttemptRequest::default())
        .await
        .unwrap();
    let second = h.services.attempts.start(&learner, quiz.quiz.id).await.unwrap();
    assert_eq!(second.status, AttemptStatus::InProgress);

    let mine = h
        .services
        .attempts
        .list(&learner, quiz.quiz.id, &AttemptFilter::default(), &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(mine.total, 2);
}

#[tokio::test]
async fn test_statistics_overview() {
    let h = Harness::new();
    let ctx = h.owner().await;
    h.course(&ctx, "One").await;
    h.course(&ctx, "Two").await;
    h.services
        .partners
        .create_company(&ctx, company("73282932000074"))
        .await
        .unwrap();

    let overview = h.services.statistics.overview(&ctx).await.unwrap();
    assert_eq!(overview.courses, 2);
    assert_eq!(overview.companies, 1);
    assert_eq!(overview.funders, 0);
    assert_eq!(overview.graded_attempts, 0);
}
