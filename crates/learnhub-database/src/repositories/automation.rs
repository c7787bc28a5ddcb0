//! Automation rule repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;
use learnhub_entity::automation::{
    AutomationRule, AutomationRuleFile, CreateAutomationRule, CreateRuleFile, RuleOwner,
};

use super::db_error;
use crate::store::AutomationRuleStore;

/// Owner predicate shared by list and find; `$2` is the course id, `$3` the session id.
const OWNER_FILTER: &str = "organization_id = $1 \
    AND course_id IS NOT DISTINCT FROM $2 AND session_id IS NOT DISTINCT FROM $3";

/// Repository for automation rules, their files and questionnaire links.
#[derive(Debug, Clone)]
pub struct AutomationRuleRepository {
    pool: PgPool,
}

impl AutomationRuleRepository {
    /// Create a new automation rule repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_files(
        tx: &mut Transaction<'_, Postgres>,
        rule_id: Uuid,
        files: &[CreateRuleFile],
    ) -> AppResult<()> {
        for file in files {
            sqlx::query(
                "INSERT INTO automation_rule_files \
                    (id, rule_id, source, source_document_id, name, path, size_bytes, mime_type, extension, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(file.id)
            .bind(rule_id)
            .bind(file.source)
            .bind(file.source_document_id)
            .bind(&file.name)
            .bind(&file.path)
            .bind(file.size_bytes)
            .bind(&file.mime_type)
            .bind(&file.extension)
            .bind(file.created_at)
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to attach rule file"))?;
        }
        Ok(())
    }

    async fn link_questionnaires(
        tx: &mut Transaction<'_, Postgres>,
        rule_id: Uuid,
        questionnaire_ids: &[Uuid],
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        for questionnaire_id in questionnaire_ids {
            sqlx::query(
                "INSERT INTO automation_rule_questionnaires (rule_id, questionnaire_id, created_at) \
                 VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
            )
            .bind(rule_id)
            .bind(questionnaire_id)
            .bind(at)
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to link questionnaire"))?;
        }
        Ok(())
    }
}

#[async_trait]
impl AutomationRuleStore for AutomationRuleRepository {
    async fn list_rules(&self, organization_id: Uuid, owner: RuleOwner) -> AppResult<Vec<AutomationRule>> {
        sqlx::query_as::<_, AutomationRule>(&format!(
            "SELECT * FROM automation_rules WHERE {OWNER_FILTER} ORDER BY created_at DESC, id ASC"
        ))
        .bind(organization_id)
        .bind(owner.course_id())
        .bind(owner.session_id())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list automation rules"))
    }

    async fn find_rule(
        &self,
        organization_id: Uuid,
        owner: RuleOwner,
        id: Uuid,
    ) -> AppResult<Option<AutomationRule>> {
        sqlx::query_as::<_, AutomationRule>(&format!(
            "SELECT * FROM automation_rules WHERE {OWNER_FILTER} AND id = $4"
        ))
        .bind(organization_id)
        .bind(owner.course_id())
        .bind(owner.session_id())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find automation rule"))
    }

    async fn rule_files(&self, rule_id: Uuid) -> AppResult<Vec<AutomationRuleFile>> {
        sqlx::query_as::<_, AutomationRuleFile>(
            "SELECT * FROM automation_rule_files WHERE rule_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(rule_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list rule files"))
    }

    async fn rule_questionnaire_ids(&self, rule_id: Uuid) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT questionnaire_id FROM automation_rule_questionnaires \
             WHERE rule_id = $1 ORDER BY created_at ASC, questionnaire_id ASC",
        )
        .bind(rule_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list rule questionnaires"))
    }

    async fn create_rule(
        &self,
        data: &CreateAutomationRule,
        files: &[CreateRuleFile],
        questionnaire_ids: &[Uuid],
    ) -> AppResult<AutomationRule> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let rule = sqlx::query_as::<_, AutomationRule>(
            "INSERT INTO automation_rules \
                (id, organization_id, course_id, session_id, title, type, recipient, dest_type, dest, \
                 ref_date, time_type, n_days, custom_time, email_id, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16) \
             RETURNING *",
        )
        .bind(data.id)
        .bind(data.organization_id)
        .bind(data.owner.course_id())
        .bind(data.owner.session_id())
        .bind(&data.title)
        .bind(data.kind)
        .bind(data.recipient)
        .bind(data.dest_type)
        .bind(&data.dest)
        .bind(data.ref_date)
        .bind(data.time_type)
        .bind(data.n_days)
        .bind(data.custom_time)
        .bind(data.email_id)
        .bind(data.is_active)
        .bind(data.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create automation rule"))?;

        Self::insert_files(&mut tx, rule.id, files).await?;
        Self::link_questionnaires(&mut tx, rule.id, questionnaire_ids, rule.created_at).await?;

        tx.commit().await.map_err(db_error("Failed to commit automation rule"))?;
        Ok(rule)
    }

    async fn update_rule(
        &self,
        rule: &AutomationRule,
        new_files: &[CreateRuleFile],
        questionnaire_ids: Option<&[Uuid]>,
    ) -> AppResult<AutomationRule> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let updated = sqlx::query_as::<_, AutomationRule>(
            "UPDATE automation_rules SET \
                title = $3, type = $4, recipient = $5, dest_type = $6, dest = $7, ref_date = $8, \
                time_type = $9, n_days = $10, custom_time = $11, email_id = $12, is_active = $13, \
                updated_at = $14 \
             WHERE id = $1 AND organization_id = $2 RETURNING *",
        )
        .bind(rule.id)
        .bind(rule.organization_id)
        .bind(&rule.title)
        .bind(rule.kind)
        .bind(rule.recipient)
        .bind(rule.dest_type)
        .bind(&rule.dest)
        .bind(rule.ref_date)
        .bind(rule.time_type)
        .bind(rule.n_days)
        .bind(rule.custom_time)
        .bind(rule.email_id)
        .bind(rule.is_active)
        .bind(rule.updated_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to update automation rule"))?
        .ok_or_else(|| AppError::not_found(format!("Automation rule {} not found", rule.id)))?;

        Self::insert_files(&mut tx, rule.id, new_files).await?;

        if let Some(ids) = questionnaire_ids {
            sqlx::query("DELETE FROM automation_rule_questionnaires WHERE rule_id = $1")
                .bind(rule.id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to unlink questionnaires"))?;
            Self::link_questionnaires(&mut tx, rule.id, ids, rule.updated_at).await?;
        }

        tx.commit().await.map_err(db_error("Failed to commit automation rule"))?;
        Ok(updated)
    }

    async fn delete_rule(&self, organization_id: Uuid, id: Uuid) -> AppResult<Vec<AutomationRuleFile>> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let files = sqlx::query_as::<_, AutomationRuleFile>(
            "SELECT f.* FROM automation_rule_files f \
             JOIN automation_rules r ON r.id = f.rule_id \
             WHERE r.id = $1 AND r.organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to list rule files"))?;

        let deleted = sqlx::query("DELETE FROM automation_rules WHERE id = $1 AND organization_id = $2")
            .bind(id)
            .bind(organization_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete automation rule"))?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Automation rule {id} not found")));
        }

        tx.commit().await.map_err(db_error("Failed to commit rule deletion"))?;
        Ok(files)
    }
}
