//! Automation rule service: CRUD over the rules of a course or session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;
use learnhub_core::traits::{Clock, StorageProvider};
use learnhub_database::store::{AutomationRuleStore, CourseStore, DocumentStore, QuestionnaireStore};
use learnhub_entity::automation::{
    AutomationRule, AutomationRuleFile, CreateAutomationRule, CreateRuleFile, FileSource, RuleOwner,
};
use learnhub_storage::keys;

use super::payload::RulePayload;
use super::validate::{self, ValidRule};
use crate::context::RequestContext;
use crate::upload::{UploadLimits, UploadedFile};

/// A rule with its attachments and linked questionnaires.
#[derive(Debug, Clone, Serialize)]
pub struct AutomationRuleDetails {
    /// The rule columns.
    #[serde(flatten)]
    pub rule: AutomationRule,
    /// Uploads and document snapshots, oldest first.
    pub files: Vec<AutomationRuleFile>,
    /// Linked questionnaires.
    pub questionnaire_ids: Vec<Uuid>,
}

/// Manages automation rules.
#[derive(Debug, Clone)]
pub struct AutomationService {
    rules: Arc<dyn AutomationRuleStore>,
    courses: Arc<dyn CourseStore>,
    documents: Arc<dyn DocumentStore>,
    questionnaires: Arc<dyn QuestionnaireStore>,
    storage: Arc<dyn StorageProvider>,
    clock: Arc<dyn Clock>,
    limits: UploadLimits,
}

impl AutomationService {
    /// Creates a new automation service.
    pub fn new(
        rules: Arc<dyn AutomationRuleStore>,
        courses: Arc<dyn CourseStore>,
        documents: Arc<dyn DocumentStore>,
        questionnaires: Arc<dyn QuestionnaireStore>,
        storage: Arc<dyn StorageProvider>,
        clock: Arc<dyn Clock>,
        limits: UploadLimits,
    ) -> Self {
        Self {
            rules,
            courses,
            documents,
            questionnaires,
            storage,
            clock,
            limits,
        }
    }

    /// Rules of a course or session, newest first.
    pub async fn list(&self, ctx: &RequestContext, owner: RuleOwner) -> AppResult<Vec<AutomationRule>> {
        self.owner_course(ctx, owner).await?;
        self.rules.list_rules(ctx.org(), owner).await
    }

    /// One rule with its files and questionnaire links.
    pub async fn show(&self, ctx: &RequestContext, owner: RuleOwner, id: Uuid) -> AppResult<AutomationRuleDetails> {
        self.owner_course(ctx, owner).await?;
        let rule = self.find(ctx, owner, id).await?;
        self.details(rule).await
    }

    /// Validate and insert a rule with its uploads, document snapshots and
    /// questionnaire links.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        owner: RuleOwner,
        payload: RulePayload,
        files: Vec<UploadedFile>,
    ) -> AppResult<AutomationRuleDetails> {
        let course_id = self.owner_course(ctx, owner).await?;
        let valid = validate::for_create(&payload)?;
        self.check_files(&files)?;

        let now = self.clock.now();
        let rule_id = Uuid::new_v4();
        let snapshots = self
            .document_snapshots(ctx, course_id, payload.document_ids.as_deref().unwrap_or_default(), now)
            .await?;
        let questionnaire_ids = self
            .linkable_questionnaires(ctx, course_id, payload.questionnaire_ids.as_deref().unwrap_or_default())
            .await?;

        let uploads = self.store_uploads(owner, rule_id, files, now).await?;
        let data = new_rule(ctx, owner, rule_id, valid, now);
        let attachments: Vec<CreateRuleFile> = uploads.iter().cloned().chain(snapshots).collect();

        let rule = match self.rules.create_rule(&data, &attachments, &questionnaire_ids).await {
            Ok(rule) => rule,
            Err(e) => {
                self.discard_uploads(&uploads).await;
                return Err(e);
            }
        };

        info!(
            user_id = %ctx.user_id(),
            rule_id = %rule.id,
            kind = %rule.kind,
            files = attachments.len(),
            questionnaires = questionnaire_ids.len(),
            "Automation rule created"
        );

        self.details(rule).await
    }

    /// Apply a partial update. New uploads and documents are appended;
    /// `questionnaire_ids`, when present, replaces every link.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        owner: RuleOwner,
        id: Uuid,
        payload: RulePayload,
        files: Vec<UploadedFile>,
    ) -> AppResult<AutomationRuleDetails> {
        let course_id = self.owner_course(ctx, owner).await?;
        let current = self.find(ctx, owner, id).await?;
        let valid = validate::for_update(&payload, &current)?;
        self.check_files(&files)?;

        let now = self.clock.now();
        let snapshots = self
            .document_snapshots(ctx, course_id, payload.document_ids.as_deref().unwrap_or_default(), now)
            .await?;
        let questionnaire_ids = match payload.questionnaire_ids.as_deref() {
            Some(ids) => Some(self.linkable_questionnaires(ctx, course_id, ids).await?),
            None => None,
        };

        let uploads = self.store_uploads(owner, current.id, files, now).await?;
        let attachments: Vec<CreateRuleFile> = uploads.iter().cloned().chain(snapshots).collect();
        let rule = apply(current, valid, now);

        let rule = match self
            .rules
            .update_rule(&rule, &attachments, questionnaire_ids.as_deref())
            .await
        {
            Ok(rule) => rule,
            Err(e) => {
                self.discard_uploads(&uploads).await;
                return Err(e);
            }
        };

        info!(
            user_id = %ctx.user_id(),
            rule_id = %rule.id,
            new_files = attachments.len(),
            relinked = questionnaire_ids.is_some(),
            "Automation rule updated"
        );

        self.details(rule).await
    }

    /// Delete a rule and the blobs it uploaded. Document snapshots point at
    /// library blobs, which stay.
    pub async fn delete(&self, ctx: &RequestContext, owner: RuleOwner, id: Uuid) -> AppResult<()> {
        self.owner_course(ctx, owner).await?;
        let rule = self.find(ctx, owner, id).await?;

        let removed = self.rules.delete_rule(ctx.org(), rule.id).await?;
        for file in removed.iter().filter(|f| f.source == FileSource::Upload) {
            if let Err(e) = self.storage.delete(&file.path).await {
                warn!(rule_id = %rule.id, path = %file.path, error = %e, "Failed to delete rule attachment");
            }
        }

        info!(user_id = %ctx.user_id(), rule_id = %rule.id, "Automation rule deleted");
        Ok(())
    }

    /// The course a rule owner belongs to; not-found outside the tenant.
    async fn owner_course(&self, ctx: &RequestContext, owner: RuleOwner) -> AppResult<Uuid> {
        match owner {
            RuleOwner::Course(id) => self
                .courses
                .find_course(ctx.org(), id)
                .await?
                .map(|c| c.id)
                .ok_or_else(|| AppError::not_found("Course not found")),
            RuleOwner::Session(id) => self
                .courses
                .find_session(ctx.org(), id)
                .await?
                .map(|s| s.course_id)
                .ok_or_else(|| AppError::not_found("Session not found")),
        }
    }

    async fn find(&self, ctx: &RequestContext, owner: RuleOwner, id: Uuid) -> AppResult<AutomationRule> {
        self.rules
            .find_rule(ctx.org(), owner, id)
            .await?
            .ok_or_else(|| AppError::not_found("Automation rule not found"))
    }

    async fn details(&self, rule: AutomationRule) -> AppResult<AutomationRuleDetails> {
        let files = self.rules.rule_files(rule.id).await?;
        let questionnaire_ids = self.rules.rule_questionnaire_ids(rule.id).await?;
        Ok(AutomationRuleDetails {
            rule,
            files,
            questionnaire_ids,
        })
    }

    fn check_files(&self, files: &[UploadedFile]) -> AppResult<()> {
        files.iter().try_for_each(|file| self.limits.check("files", file))
    }

    /// Snapshot every document the rule's course can see. Ids that do not
    /// resolve are dropped.
    async fn document_snapshots(
        &self,
        ctx: &RequestContext,
        course_id: Uuid,
        ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> AppResult<Vec<CreateRuleFile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = self.documents.find_documents(ctx.org(), ids).await?;

        let mut snapshots = Vec::with_capacity(ids.len());
        for id in ids {
            match found.iter().find(|d| d.id == *id && d.is_attachable_to(course_id)) {
                Some(doc) => snapshots.push(CreateRuleFile {
                    id: Uuid::new_v4(),
                    source: FileSource::Document,
                    source_document_id: Some(doc.id),
                    name: doc.file_name.clone(),
                    path: doc.path.clone(),
                    size_bytes: doc.size_bytes,
                    mime_type: doc.mime_type.clone(),
                    extension: doc.extension.clone(),
                    created_at: now,
                }),
                None => warn!(document_id = %id, course_id = %course_id, "Skipping unresolvable document"),
            }
        }
        Ok(snapshots)
    }

    /// The subset of `ids` the rule's course may link, in request order.
    async fn linkable_questionnaires(
        &self,
        ctx: &RequestContext,
        course_id: Uuid,
        ids: &[Uuid],
    ) -> AppResult<Vec<Uuid>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = self.questionnaires.find_questionnaires(ctx.org(), ids).await?;

        let mut linked: Vec<Uuid> = Vec::with_capacity(ids.len());
        for id in ids {
            if linked.contains(id) {
                continue;
            }
            if found.iter().any(|q| q.id == *id && q.is_linkable_from(course_id)) {
                linked.push(*id);
            } else {
                warn!(questionnaire_id = %id, course_id = %course_id, "Skipping unlinkable questionnaire");
            }
        }
        Ok(linked)
    }

    /// Write uploads under the rule's prefix. On failure, blobs already
    /// written are removed again.
    async fn store_uploads(
        &self,
        owner: RuleOwner,
        rule_id: Uuid,
        files: Vec<UploadedFile>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<CreateRuleFile>> {
        let segment = owner.storage_segment();
        let mut stored = Vec::with_capacity(files.len());

        for file in files {
            let path = keys::rule_attachment(&segment, rule_id, &file.file_name);
            let row = CreateRuleFile {
                id: Uuid::new_v4(),
                source: FileSource::Upload,
                source_document_id: None,
                name: file.file_name.clone(),
                path: path.clone(),
                size_bytes: file.size_bytes(),
                mime_type: file.mime_type(),
                extension: file.extension(),
                created_at: now,
            };
            if let Err(e) = self.storage.write(&path, file.data).await {
                self.discard_uploads(&stored).await;
                return Err(e);
            }
            stored.push(row);
        }
        Ok(stored)
    }

    async fn discard_uploads(&self, uploads: &[CreateRuleFile]) {
        for file in uploads {
            if let Err(e) = self.storage.delete(&file.path).await {
                warn!(path = %file.path, error = %e, "Failed to remove orphaned upload");
            }
        }
    }
}

fn new_rule(
    ctx: &RequestContext,
    owner: RuleOwner,
    id: Uuid,
    valid: ValidRule,
    now: DateTime<Utc>,
) -> CreateAutomationRule {
    CreateAutomationRule {
        id,
        organization_id: ctx.org(),
        owner,
        title: valid.title,
        kind: valid.kind,
        recipient: valid.recipient,
        dest_type: valid.destination.dest_type(),
        dest: valid.destination.dest().map(str::to_string),
        ref_date: valid.trigger.ref_date(),
        time_type: valid.trigger.time_type(),
        n_days: valid.trigger.n_days(),
        custom_time: valid.custom_time,
        email_id: valid.email_id,
        is_active: valid.is_active,
        created_at: now,
    }
}

fn apply(mut rule: AutomationRule, valid: ValidRule, now: DateTime<Utc>) -> AutomationRule {
    rule.title = valid.title;
    rule.kind = valid.kind;
    rule.recipient = valid.recipient;
    rule.dest_type = valid.destination.dest_type();
    rule.dest = valid.destination.dest().map(str::to_string);
    rule.ref_date = valid.trigger.ref_date();
    rule.time_type = valid.trigger.time_type();
    rule.n_days = valid.trigger.n_days();
    rule.custom_time = valid.custom_time;
    rule.email_id = valid.email_id;
    rule.is_active = valid.is_active;
    rule.updated_at = now;
    rule
}
