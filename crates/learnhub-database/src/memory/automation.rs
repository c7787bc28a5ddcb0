use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;
use learnhub_entity::automation::{
    AutomationRule, AutomationRuleFile, CreateAutomationRule, CreateRuleFile, RuleOwner,
};

use super::{MemoryState, MemoryStore};
use crate::store::AutomationRuleStore;

fn owned_by(rule: &AutomationRule, organization_id: Uuid, owner: RuleOwner) -> bool {
    rule.organization_id == organization_id && rule.owner() == owner
}

fn link_questionnaires(state: &mut MemoryState, rule_id: Uuid, questionnaire_ids: &[Uuid], at: DateTime<Utc>) {
    for questionnaire_id in questionnaire_ids {
        let linked = state
            .rule_questionnaires
            .iter()
            .any(|(r, q, _)| *r == rule_id && q == questionnaire_id);
        if !linked && state.questionnaires.contains_key(questionnaire_id) {
            state.rule_questionnaires.push((rule_id, *questionnaire_id, at));
        }
    }
}

#[async_trait]
impl AutomationRuleStore for MemoryStore {
    async fn list_rules(&self, organization_id: Uuid, owner: RuleOwner) -> AppResult<Vec<AutomationRule>> {
        let state = self.state.read().await;
        let mut rows: Vec<AutomationRule> = state
            .rules
            .values()
            .filter(|r| owned_by(r, organization_id, owner))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn find_rule(
        &self,
        organization_id: Uuid,
        owner: RuleOwner,
        id: Uuid,
    ) -> AppResult<Option<AutomationRule>> {
        let state = self.state.read().await;
        Ok(state.rules.get(&id).filter(|r| owned_by(r, organization_id, owner)).cloned())
    }

    async fn rule_files(&self, rule_id: Uuid) -> AppResult<Vec<AutomationRuleFile>> {
        let state = self.state.read().await;
        Ok(state.rule_files.iter().filter(|f| f.rule_id == rule_id).cloned().collect())
    }

    async fn rule_questionnaire_ids(&self, rule_id: Uuid) -> AppResult<Vec<Uuid>> {
        let state = self.state.read().await;
        Ok(state
            .rule_questionnaires
            .iter()
            .filter(|(r, _, _)| *r == rule_id)
            .map(|(_, q, _)| *q)
            .collect())
    }

    async fn create_rule(
        &self,
        data: &CreateAutomationRule,
        files: &[CreateRuleFile],
        questionnaire_ids: &[Uuid],
    ) -> AppResult<AutomationRule> {
        let mut state = self.state.write().await;
        let rule = AutomationRule {
            id: data.id,
            organization_id: data.organization_id,
            course_id: data.owner.course_id(),
            session_id: data.owner.session_id(),
            title: data.title.clone(),
            kind: data.kind,
            recipient: data.recipient,
            dest_type: data.dest_type,
            dest: data.dest.clone(),
            ref_date: data.ref_date,
            time_type: data.time_type,
            n_days: data.n_days,
            custom_time: data.custom_time,
            email_id: data.email_id,
            is_active: data.is_active,
            created_at: data.created_at,
            updated_at: data.created_at,
        };
        state.rules.insert(rule.id, rule.clone());
        state
            .rule_files
            .extend(files.iter().cloned().map(|f| f.into_file(rule.id)));
        link_questionnaires(&mut state, rule.id, questionnaire_ids, rule.created_at);
        Ok(rule)
    }

    async fn update_rule(
        &self,
        rule: &AutomationRule,
        new_files: &[CreateRuleFile],
        questionnaire_ids: Option<&[Uuid]>,
    ) -> AppResult<AutomationRule> {
        let mut state = self.state.write().await;
        let exists = state
            .rules
            .get(&rule.id)
            .is_some_and(|r| r.organization_id == rule.organization_id);
        if !exists {
            return Err(AppError::not_found(format!("Automation rule {} not found", rule.id)));
        }
        state.rules.insert(rule.id, rule.clone());
        state
            .rule_files
            .extend(new_files.iter().cloned().map(|f| f.into_file(rule.id)));
        if let Some(ids) = questionnaire_ids {
            state.rule_questionnaires.retain(|(r, _, _)| *r != rule.id);
            link_questionnaires(&mut state, rule.id, ids, rule.updated_at);
        }
        Ok(rule.clone())
    }

    async fn delete_rule(&self, organization_id: Uuid, id: Uuid) -> AppResult<Vec<AutomationRuleFile>> {
        let mut state = self.state.write().await;
        if !state.rules.get(&id).is_some_and(|r| r.organization_id == organization_id) {
            return Err(AppError::not_found(format!("Automation rule {id} not found")));
        }
        state.rules.remove(&id);
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.rule_files)
            .into_iter()
            .partition(|f| f.rule_id == id);
        state.rule_files = kept;
        state.rule_questionnaires.retain(|(r, _, _)| *r != id);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use learnhub_entity::document::AudienceType;
    use learnhub_entity::questionnaire::Questionnaire;

    use super::*;

    #[test]
    fn test_links_carry_the_given_time() {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        let mut state = MemoryState::default();
        let questionnaire = Questionnaire {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            course_id: None,
            title: "Exit survey".into(),
            description: None,
            audience_type: AudienceType::Students,
            is_published: false,
            created_by: Uuid::new_v4(),
            created_at: at,
            updated_at: at,
        };
        state.questionnaires.insert(questionnaire.id, questionnaire.clone());

        let rule_id = Uuid::new_v4();
        link_questionnaires(&mut state, rule_id, &[questionnaire.id, Uuid::new_v4()], at);
        link_questionnaires(&mut state, rule_id, &[questionnaire.id], at + chrono::Duration::days(1));

        assert_eq!(state.rule_questionnaires, vec![(rule_id, questionnaire.id, at)]);
    }
}
