use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use learnhub_core::result::AppResult;
use learnhub_core::types::{PageRequest, PageResponse, SortField};
use learnhub_entity::partner::{Company, CompanyData, Funder, FunderData, PartnerRef};
use learnhub_entity::quiz::AttemptStatus;
use learnhub_entity::statistics::OrganizationOverview;

use super::{MemoryState, MemoryStore, sort_rows};
use crate::store::filter::matches_search;
use crate::store::{DeleteOutcome, PartnerFilter, PartnerStore, StatisticsStore, duplicate_siret};

/// Name containment, or SIRET prefix when the term is all digits.
fn partner_matches(filter: &PartnerFilter, name: &str, siret: Option<&str>) -> bool {
    if matches_search(filter.search.as_deref(), &[name]) {
        return true;
    }
    let term = filter.search.as_deref().map(str::trim).unwrap_or_default();
    term.bytes().all(|b| b.is_ascii_digit()) && siret.is_some_and(|s| s.starts_with(term))
}

fn companies(state: &MemoryState, organization_id: Uuid, filter: &PartnerFilter, sort: SortField) -> Vec<Company> {
    let mut rows: Vec<Company> = state
        .companies
        .values()
        .filter(|c| c.organization_id == organization_id)
        .filter(|c| partner_matches(filter, &c.name, Some(&c.siret)))
        .cloned()
        .collect();
    sort_rows(&mut rows, sort);
    rows
}

fn funders(state: &MemoryState, organization_id: Uuid, filter: &PartnerFilter, sort: SortField) -> Vec<Funder> {
    let mut rows: Vec<Funder> = state
        .funders
        .values()
        .filter(|f| f.organization_id == organization_id)
        .filter(|f| partner_matches(filter, &f.name, f.siret.as_deref()))
        .cloned()
        .collect();
    sort_rows(&mut rows, sort);
    rows
}

fn company_siret_taken(state: &MemoryState, organization_id: Uuid, siret: &str, except: Option<Uuid>) -> bool {
    state
        .companies
        .values()
        .any(|c| c.organization_id == organization_id && c.siret == siret && Some(c.id) != except)
}

fn funder_siret_taken(state: &MemoryState, organization_id: Uuid, siret: Option<&str>, except: Option<Uuid>) -> bool {
    let Some(siret) = siret else {
        return false;
    };
    state.funders.values().any(|f| {
        f.organization_id == organization_id && f.siret.as_deref() == Some(siret) && Some(f.id) != except
    })
}

#[async_trait]
impl PartnerStore for MemoryStore {
    async fn list_companies(
        &self,
        organization_id: Uuid,
        filter: &PartnerFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Company>> {
        let state = self.state.read().await;
        Ok(page.apply(companies(&state, organization_id, filter, sort)))
    }

    async fn all_companies(&self, organization_id: Uuid, filter: &PartnerFilter, sort: SortField) -> AppResult<Vec<Company>> {
        let state = self.state.read().await;
        Ok(companies(&state, organization_id, filter, sort))
    }

    async fn find_company(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Company>> {
        let state = self.state.read().await;
        Ok(state.companies.get(&id).filter(|c| c.organization_id == organization_id).cloned())
    }

    async fn create_company(&self, organization_id: Uuid, data: &CompanyData, now: DateTime<Utc>) -> AppResult<Company> {
        let mut state = self.state.write().await;
        if company_siret_taken(&state, organization_id, &data.siret, None) {
            return Err(duplicate_siret());
        }
        let company = Company {
            id: Uuid::new_v4(),
            organization_id,
            name: data.name.clone(),
            siret: data.siret.clone(),
            email: data.email.clone(),
            phone: data.phone.clone(),
            address: data.address.clone(),
            city: data.city.clone(),
            postal_code: data.postal_code.clone(),
            created_at: now,
            updated_at: now,
        };
        state.companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn update_company(
        &self,
        organization_id: Uuid,
        id: Uuid,
        data: &CompanyData,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Company>> {
        let mut state = self.state.write().await;
        if !state.companies.get(&id).is_some_and(|c| c.organization_id == organization_id) {
            return Ok(None);
        }
        if company_siret_taken(&state, organization_id, &data.siret, Some(id)) {
            return Err(duplicate_siret());
        }
        let Some(company) = state.companies.get_mut(&id) else {
            return Ok(None);
        };
        company.name = data.name.clone();
        company.siret = data.siret.clone();
        company.email = data.email.clone();
        company.phone = data.phone.clone();
        company.address = data.address.clone();
        company.city = data.city.clone();
        company.postal_code = data.postal_code.clone();
        company.updated_at = now;
        Ok(Some(company.clone()))
    }

    async fn list_funders(
        &self,
        organization_id: Uuid,
        filter: &PartnerFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Funder>> {
        let state = self.state.read().await;
        Ok(page.apply(funders(&state, organization_id, filter, sort)))
    }

    async fn all_funders(&self, organization_id: Uuid, filter: &PartnerFilter, sort: SortField) -> AppResult<Vec<Funder>> {
        let state = self.state.read().await;
        Ok(funders(&state, organization_id, filter, sort))
    }

    async fn find_funder(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Funder>> {
        let state = self.state.read().await;
        Ok(state.funders.get(&id).filter(|f| f.organization_id == organization_id).cloned())
    }

    async fn create_funder(&self, organization_id: Uuid, data: &FunderData, now: DateTime<Utc>) -> AppResult<Funder> {
        let mut state = self.state.write().await;
        if funder_siret_taken(&state, organization_id, data.siret.as_deref(), None) {
            return Err(duplicate_siret());
        }
        let funder = Funder {
            id: Uuid::new_v4(),
            organization_id,
            name: data.name.clone(),
            kind: data.kind,
            siret: data.siret.clone(),
            email: data.email.clone(),
            phone: data.phone.clone(),
            created_at: now,
            updated_at: now,
        };
        state.funders.insert(funder.id, funder.clone());
        Ok(funder)
    }

    async fn update_funder(
        &self,
        organization_id: Uuid,
        id: Uuid,
        data: &FunderData,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Funder>> {
        let mut state = self.state.write().await;
        if !state.funders.get(&id).is_some_and(|f| f.organization_id == organization_id) {
            return Ok(None);
        }
        if funder_siret_taken(&state, organization_id, data.siret.as_deref(), Some(id)) {
            return Err(duplicate_siret());
        }
        let Some(funder) = state.funders.get_mut(&id) else {
            return Ok(None);
        };
        funder.name = data.name.clone();
        funder.kind = data.kind;
        funder.siret = data.siret.clone();
        funder.email = data.email.clone();
        funder.phone = data.phone.clone();
        funder.updated_at = now;
        Ok(Some(funder.clone()))
    }

    async fn delete_partner(&self, organization_id: Uuid, partner: PartnerRef) -> AppResult<DeleteOutcome> {
        let mut state = self.state.write().await;
        let exists = match partner {
            PartnerRef::Company(id) => state.companies.get(&id).is_some_and(|c| c.organization_id == organization_id),
            PartnerRef::Funder(id) => state.funders.get(&id).is_some_and(|f| f.organization_id == organization_id),
        };
        if !exists {
            return Ok(DeleteOutcome::NotFound);
        }

        let active = state
            .learners
            .values()
            .filter(|l| l.is_active() && l.references(partner))
            .count() as i64;
        if active > 0 {
            return Ok(DeleteOutcome::HasActiveLearners(active));
        }

        match partner {
            PartnerRef::Company(id) => {
                state.companies.remove(&id);
                for learner in state.learners.values_mut().filter(|l| l.company_id == Some(id)) {
                    learner.company_id = None;
                }
            }
            PartnerRef::Funder(id) => {
                state.funders.remove(&id);
                for learner in state.learners.values_mut().filter(|l| l.funder_id == Some(id)) {
                    learner.funder_id = None;
                }
            }
        }
        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl StatisticsStore for MemoryStore {
    async fn overview(&self, organization_id: Uuid) -> AppResult<OrganizationOverview> {
        let state = self.state.read().await;
        let count = |n: usize| n as i64;

        let graded: Vec<f64> = state
            .attempts
            .values()
            .filter(|a| a.status == AttemptStatus::Graded)
            .filter(|a| {
                state
                    .quizzes
                    .get(&a.quiz_id)
                    .is_some_and(|q| q.organization_id == organization_id)
            })
            .map(|a| a.percentage().unwrap_or(0.0))
            .collect();
        let average_score_percent = (!graded.is_empty())
            .then(|| (graded.iter().sum::<f64>() / graded.len() as f64 * 100.0).round() / 100.0);

        Ok(OrganizationOverview {
            courses: count(state.courses.values().filter(|c| c.organization_id == organization_id).count()),
            sessions: count(state.sessions.values().filter(|s| s.organization_id == organization_id).count()),
            active_learners: count(
                state
                    .learners
                    .values()
                    .filter(|l| l.organization_id == organization_id && l.is_active())
                    .count(),
            ),
            companies: count(state.companies.values().filter(|c| c.organization_id == organization_id).count()),
            funders: count(state.funders.values().filter(|f| f.organization_id == organization_id).count()),
            published_quizzes: count(
                state
                    .quizzes
                    .values()
                    .filter(|q| q.organization_id == organization_id && q.is_published)
                    .count(),
            ),
            graded_attempts: count(graded.len()),
            average_score_percent,
        })
    }
}
