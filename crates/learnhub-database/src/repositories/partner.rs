//! Company and funder repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use learnhub_core::error::{AppError, ErrorKind};
use learnhub_core::result::AppResult;
use learnhub_core::types::{PageRequest, PageResponse, SortField};
use learnhub_entity::partner::{Company, CompanyData, Funder, FunderData, LEARNER_ACTIVE, PartnerRef};

use super::{db_error, violates};
use crate::store::filter::like_pattern;
use crate::store::{DeleteOutcome, PartnerFilter, PartnerStore, duplicate_siret};

const PARTNER_FILTER: &str = "organization_id = $1 \
    AND ($2::text IS NULL OR name ILIKE $2 OR siret LIKE $3)";

const COMPANY_SIRET_KEY: &str = "companies_organization_siret_key";
const FUNDER_SIRET_KEY: &str = "funders_organization_siret_key";

/// Repository for companies and funders.
#[derive(Debug, Clone)]
pub struct PartnerRepository {
    pool: PgPool,
}

/// ILIKE pattern on the name and prefix pattern on the SIRET.
fn partner_patterns(filter: &PartnerFilter) -> (Option<String>, Option<String>) {
    let name = like_pattern(filter.search.as_deref());
    let siret = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .map(|s| format!("{s}%"));
    (name, siret)
}

/// Map a write failure, turning the SIRET unique violation into a field error.
fn write_error(constraint: &'static str, message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if violates(&e, constraint) {
            duplicate_siret()
        } else {
            AppError::with_source(ErrorKind::Database, message, e)
        }
    }
}

impl PartnerRepository {
    /// Create a new partner repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, table: &str, organization_id: Uuid, filter: &PartnerFilter) -> AppResult<i64> {
        let (name, siret) = partner_patterns(filter);
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE {PARTNER_FILTER}"))
            .bind(organization_id)
            .bind(name)
            .bind(siret)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count partners"))
    }

    async fn select_companies(
        &self,
        organization_id: Uuid,
        filter: &PartnerFilter,
        sort: SortField,
        page: Option<&PageRequest>,
    ) -> AppResult<Vec<Company>> {
        let (name, siret) = partner_patterns(filter);
        let (limit, offset) = page.map_or((None, 0), |p| (Some(p.limit() as i64), p.offset() as i64));
        sqlx::query_as::<_, Company>(&format!(
            "SELECT * FROM companies WHERE {PARTNER_FILTER} {} LIMIT $4 OFFSET $5",
            sort.order_by("name")
        ))
        .bind(organization_id)
        .bind(name)
        .bind(siret)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list companies"))
    }

    async fn select_funders(
        &self,
        organization_id: Uuid,
        filter: &PartnerFilter,
        sort: SortField,
        page: Option<&PageRequest>,
    ) -> AppResult<Vec<Funder>> {
        let (name, siret) = partner_patterns(filter);
        let (limit, offset) = page.map_or((None, 0), |p| (Some(p.limit() as i64), p.offset() as i64));
        sqlx::query_as::<_, Funder>(&format!(
            "SELECT * FROM funders WHERE {PARTNER_FILTER} {} LIMIT $4 OFFSET $5",
            sort.order_by("name")
        ))
        .bind(organization_id)
        .bind(name)
        .bind(siret)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list funders"))
    }
}

#[async_trait]
impl PartnerStore for PartnerRepository {
    async fn list_companies(
        &self,
        organization_id: Uuid,
        filter: &PartnerFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Company>> {
        let total = self.count("companies", organization_id, filter).await?;
        let items = self.select_companies(organization_id, filter, sort, Some(page)).await?;
        Ok(PageResponse::new(items, page, total as u64))
    }

    async fn all_companies(&self, organization_id: Uuid, filter: &PartnerFilter, sort: SortField) -> AppResult<Vec<Company>> {
        self.select_companies(organization_id, filter, sort, None).await
    }

    async fn find_company(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Company>> {
        sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1 AND organization_id = $2")
            .bind(id)
            .bind(organization_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find company"))
    }

    async fn create_company(&self, organization_id: Uuid, data: &CompanyData, now: DateTime<Utc>) -> AppResult<Company> {
        sqlx::query_as::<_, Company>(
            "INSERT INTO companies \
                (id, organization_id, name, siret, email, phone, address, city, postal_code, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(&data.name)
        .bind(&data.siret)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.postal_code)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error(COMPANY_SIRET_KEY, "Failed to create company"))
    }

    async fn update_company(
        &self,
        organization_id: Uuid,
        id: Uuid,
        data: &CompanyData,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Company>> {
        sqlx::query_as::<_, Company>(
            "UPDATE companies SET name = $3, siret = $4, email = $5, phone = $6, address = $7, \
                city = $8, postal_code = $9, updated_at = $10 \
             WHERE id = $1 AND organization_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(organization_id)
        .bind(&data.name)
        .bind(&data.siret)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.postal_code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error(COMPANY_SIRET_KEY, "Failed to update company"))
    }

    async fn list_funders(
        &self,
        organization_id: Uuid,
        filter: &PartnerFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Funder>> {
        let total = self.count("funders", organization_id, filter).await?;
        let items = self.select_funders(organization_id, filter, sort, Some(page)).await?;
        Ok(PageResponse::new(items, page, total as u64))
    }

    async fn all_funders(&self, organization_id: Uuid, filter: &PartnerFilter, sort: SortField) -> AppResult<Vec<Funder>> {
        self.select_funders(organization_id, filter, sort, None).await
    }

    async fn find_funder(&self, organization_id: Uuid, id: Uuid) -> AppResult<Option<Funder>> {
        sqlx::query_as::<_, Funder>("SELECT * FROM funders WHERE id = $1 AND organization_id = $2")
            .bind(id)
            .bind(organization_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find funder"))
    }

    async fn create_funder(&self, organization_id: Uuid, data: &FunderData, now: DateTime<Utc>) -> AppResult<Funder> {
        sqlx::query_as::<_, Funder>(
            "INSERT INTO funders (id, organization_id, name, kind, siret, email, phone, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(&data.name)
        .bind(data.kind)
        .bind(&data.siret)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error(FUNDER_SIRET_KEY, "Failed to create funder"))
    }

    async fn update_funder(
        &self,
        organization_id: Uuid,
        id: Uuid,
        data: &FunderData,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Funder>> {
        sqlx::query_as::<_, Funder>(
            "UPDATE funders SET name = $3, kind = $4, siret = $5, email = $6, phone = $7, updated_at = $8 \
             WHERE id = $1 AND organization_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(organization_id)
        .bind(&data.name)
        .bind(data.kind)
        .bind(&data.siret)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error(FUNDER_SIRET_KEY, "Failed to update funder"))
    }

    async fn delete_partner(&self, organization_id: Uuid, partner: PartnerRef) -> AppResult<DeleteOutcome> {
        let table = match partner {
            PartnerRef::Company(_) => "companies",
            PartnerRef::Funder(_) => "funders",
        };
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let locked: Option<Uuid> = sqlx::query_scalar(&format!(
            "SELECT id FROM {table} WHERE id = $1 AND organization_id = $2 FOR UPDATE"
        ))
        .bind(partner.id())
        .bind(organization_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock partner"))?;

        if locked.is_none() {
            return Ok(DeleteOutcome::NotFound);
        }

        let active: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM learners WHERE {} = $1 AND status = $2",
            partner.learner_column()
        ))
        .bind(partner.id())
        .bind(LEARNER_ACTIVE)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to count active learners"))?;

        if active > 0 {
            return Ok(DeleteOutcome::HasActiveLearners(active));
        }

        sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(partner.id())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete partner"))?;

        tx.commit().await.map_err(db_error("Failed to commit partner deletion"))?;
        Ok(DeleteOutcome::Deleted)
    }
}
