use async_trait::async_trait;
use uuid::Uuid;

use learnhub_core::error::AppError;
use learnhub_core::result::AppResult;
use learnhub_core::types::{PageRequest, PageResponse, SortField};
use learnhub_entity::questionnaire::{
    CreateQuestionnaire, NewQuestionnaireQuestion, Questionnaire, QuestionnaireQuestion,
};

use super::{MemoryState, MemoryStore, sort_rows};
use crate::store::filter::matches_search;
use crate::store::{QuestionnaireFilter, QuestionnaireStore, reorder_rejected};

fn insert_questions(state: &mut MemoryState, questionnaire_id: Uuid, questions: Vec<NewQuestionnaireQuestion>) {
    for (index, question) in questions.into_iter().enumerate() {
        let row = question.into_question(questionnaire_id, index as i32);
        state.questionnaire_questions.insert(row.id, row);
    }
}

#[async_trait]
impl QuestionnaireStore for MemoryStore {
    async fn list_questionnaires(
        &self,
        organization_id: Uuid,
        filter: &QuestionnaireFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Questionnaire>> {
        let state = self.state.read().await;
        let mut rows: Vec<Questionnaire> = state
            .questionnaires
            .values()
            .filter(|q| q.organization_id == organization_id)
            .filter(|q| filter.course_id.is_none_or(|c| q.course_id == Some(c)))
            .filter(|q| filter.audience_type.is_none_or(|a| q.audience_type == a))
            .filter(|q| filter.is_published.is_none_or(|p| q.is_published == p))
            .filter(|q| matches_search(filter.search.as_deref(), &[q.title.as_str()]))
            .cloned()
            .collect();
        sort_rows(&mut rows, sort);
        Ok(page.apply(rows))
    }

    async fn find_questionnaire(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Questionnaire>> {
        let state = self.state.read().await;
        Ok(state.questionnaires.get(&id).filter(|q| q.organization_id == organization_id).cloned())
    }

    async fn find_questionnaires(&self, organization_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<Questionnaire>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.questionnaires.get(id))
            .filter(|q| q.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn questionnaire_questions(&self, questionnaire_id: Uuid) -> AppResult<Vec<QuestionnaireQuestion>> {
        let state = self.state.read().await;
        let mut rows: Vec<QuestionnaireQuestion> = state
            .questionnaire_questions
            .values()
            .filter(|q| q.questionnaire_id == questionnaire_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.order_index.cmp(&b.order_index).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn create_questionnaire(
        &self,
        data: &CreateQuestionnaire,
        questions: Vec<NewQuestionnaireQuestion>,
    ) -> AppResult<Questionnaire> {
        let mut state = self.state.write().await;
        let questionnaire = Questionnaire {
            id: Uuid::new_v4(),
            organization_id: data.organization_id,
            course_id: data.course_id,
            title: data.title.clone(),
            description: data.description.clone(),
            audience_type: data.audience_type,
            is_published: data.is_published,
            created_by: data.created_by,
            created_at: data.created_at,
            updated_at: data.created_at,
        };
        state.questionnaires.insert(questionnaire.id, questionnaire.clone());
        insert_questions(&mut state, questionnaire.id, questions);
        Ok(questionnaire)
    }

    async fn update_questionnaire(
        &self,
        questionnaire: &Questionnaire,
        questions: Option<Vec<NewQuestionnaireQuestion>>,
    ) -> AppResult<Questionnaire> {
        let mut state = self.state.write().await;
        let exists = state
            .questionnaires
            .get(&questionnaire.id)
            .is_some_and(|q| q.organization_id == questionnaire.organization_id);
        if !exists {
            return Err(AppError::not_found(format!("Questionnaire {} not found", questionnaire.id)));
        }
        state.questionnaires.insert(questionnaire.id, questionnaire.clone());
        if let Some(questions) = questions {
            state
                .questionnaire_questions
                .retain(|_, q| q.questionnaire_id != questionnaire.id);
            insert_questions(&mut state, questionnaire.id, questions);
        }
        Ok(questionnaire.clone())
    }

    async fn delete_questionnaire(&self, organization_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if !state.questionnaires.get(&id).is_some_and(|q| q.organization_id == organization_id) {
            return Ok(false);
        }
        state.questionnaires.remove(&id);
        state.questionnaire_questions.retain(|_, q| q.questionnaire_id != id);
        state.rule_questionnaires.retain(|(_, q, _)| *q != id);
        Ok(true)
    }

    async fn reorder_questionnaire_questions(&self, questionnaire_id: Uuid, question_ids: &[Uuid]) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(foreign) = question_ids.iter().find(|id| {
            !state
                .questionnaire_questions
                .get(*id)
                .is_some_and(|q| q.questionnaire_id == questionnaire_id)
        }) {
            return Err(reorder_rejected(*foreign));
        }
        for (index, id) in question_ids.iter().enumerate() {
            if let Some(question) = state.questionnaire_questions.get_mut(id) {
                question.order_index = index as i32;
            }
        }
        Ok(())
    }
}
