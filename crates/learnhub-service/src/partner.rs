//! Companies and funders referenced by learners.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use learnhub_core::error::{AppError, FieldErrors};
use learnhub_core::result::AppResult;
use learnhub_core::traits::Clock;
use learnhub_core::types::{PageRequest, PageResponse, SortField, lenient};
use learnhub_database::store::{DeleteOutcome, PartnerFilter, PartnerStore};
use learnhub_entity::partner::{
    Company, CompanyData, Funder, FunderData, FunderKind, PartnerRef, is_valid_siret,
};

use crate::context::RequestContext;
use crate::validation::{collect, non_blank, parse_enum, required};

/// Company fields; on update absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CompanyPayload {
    /// Legal name.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[validate(length(max = 255, message = "The name field may not be greater than 255 characters"))]
    pub name: Option<String>,
    /// 14-digit SIRET.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub siret: Option<String>,
    /// Contact email.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[validate(email(message = "The email field must be a valid email address"))]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[validate(length(max = 32, message = "The phone field may not be greater than 32 characters"))]
    pub phone: Option<String>,
    /// Street address.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub address: Option<String>,
    /// City.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub city: Option<String>,
    /// Postal code.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[validate(length(max = 16, message = "The postal_code field may not be greater than 16 characters"))]
    pub postal_code: Option<String>,
}

/// Funder fields; on update absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct FunderPayload {
    /// Name.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[validate(length(max = 255, message = "The name field may not be greater than 255 characters"))]
    pub name: Option<String>,
    /// Funding category.
    #[serde(default, rename = "type", alias = "kind", deserialize_with = "lenient::opt_string")]
    pub kind: Option<String>,
    /// Optional 14-digit SIRET.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub siret: Option<String>,
    /// Contact email.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[validate(email(message = "The email field must be a valid email address"))]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[validate(length(max = 32, message = "The phone field may not be greater than 32 characters"))]
    pub phone: Option<String>,
}

fn check_siret(fields: &mut FieldErrors, siret: Option<&str>) {
    if let Some(siret) = siret
        && !is_valid_siret(siret)
    {
        fields.add("siret", "digits", "The siret field must be 14 digits");
    }
}

fn company_data(payload: CompanyPayload, current: Option<CompanyData>) -> AppResult<CompanyData> {
    let mut fields = FieldErrors::new();
    collect(&payload, &mut fields);
    let siret = non_blank(payload.siret).map(|s| s.replace(' ', ""));
    check_siret(&mut fields, siret.as_deref());

    let data = match current {
        Some(current) => CompanyData {
            name: non_blank(payload.name).unwrap_or(current.name),
            siret: siret.unwrap_or(current.siret),
            email: non_blank(payload.email).or(current.email),
            phone: non_blank(payload.phone).or(current.phone),
            address: non_blank(payload.address).or(current.address),
            city: non_blank(payload.city).or(current.city),
            postal_code: non_blank(payload.postal_code).or(current.postal_code),
        },
        None => {
            let name = required(&mut fields, "name", non_blank(payload.name));
            let siret = required(&mut fields, "siret", siret);
            fields.into_result()?;
            let (Some(name), Some(siret)) = (name, siret) else {
                return Err(AppError::validation("The given data was invalid"));
            };
            return Ok(CompanyData {
                name,
                siret,
                email: non_blank(payload.email),
                phone: non_blank(payload.phone),
                address: non_blank(payload.address),
                city: non_blank(payload.city),
                postal_code: non_blank(payload.postal_code),
            });
        }
    };
    fields.into_result()?;
    Ok(data)
}

fn funder_data(payload: FunderPayload, current: Option<FunderData>) -> AppResult<FunderData> {
    let mut fields = FieldErrors::new();
    collect(&payload, &mut fields);
    let siret = non_blank(payload.siret).map(|s| s.replace(' ', ""));
    check_siret(&mut fields, siret.as_deref());
    let kind = parse_enum::<FunderKind>(&mut fields, "type", payload.kind.as_deref());

    let data = match current {
        Some(current) => FunderData {
            name: non_blank(payload.name).unwrap_or(current.name),
            kind: kind.unwrap_or(current.kind),
            siret: siret.or(current.siret),
            email: non_blank(payload.email).or(current.email),
            phone: non_blank(payload.phone).or(current.phone),
        },
        None => {
            let name = required(&mut fields, "name", non_blank(payload.name));
            fields.into_result()?;
            let Some(name) = name else {
                return Err(AppError::validation("The given data was invalid"));
            };
            return Ok(FunderData {
                name,
                kind: kind.unwrap_or(FunderKind::Opco),
                siret,
                email: non_blank(payload.email),
                phone: non_blank(payload.phone),
            });
        }
    };
    fields.into_result()?;
    Ok(data)
}

fn deleted(outcome: DeleteOutcome, what: &str) -> AppResult<()> {
    match outcome {
        DeleteOutcome::Deleted => Ok(()),
        DeleteOutcome::NotFound => Err(AppError::not_found(format!("{what} not found"))),
        DeleteOutcome::HasActiveLearners(count) => Err(AppError::business_rule(format!(
            "This {} cannot be deleted: {count} active learner(s) are attached to it",
            what.to_lowercase()
        ))),
    }
}

/// Manages companies and funders.
#[derive(Debug, Clone)]
pub struct PartnerService {
    partners: Arc<dyn PartnerStore>,
    clock: Arc<dyn Clock>,
}

impl PartnerService {
    /// Creates a new partner service.
    pub fn new(partners: Arc<dyn PartnerStore>, clock: Arc<dyn Clock>) -> Self {
        Self { partners, clock }
    }

    /// Companies matching `filter`.
    pub async fn list_companies(
        &self,
        ctx: &RequestContext,
        filter: &PartnerFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Company>> {
        self.partners.list_companies(ctx.org(), filter, sort, page).await
    }

    /// One company.
    pub async fn company(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Company> {
        self.partners
            .find_company(ctx.org(), id)
            .await?
            .ok_or_else(|| AppError::not_found("Company not found"))
    }

    /// Create a company. A SIRET already used in the organization is a
    /// field error on `siret`.
    pub async fn create_company(&self, ctx: &RequestContext, payload: CompanyPayload) -> AppResult<Company> {
        let data = company_data(payload, None)?;
        let company = self.partners.create_company(ctx.org(), &data, self.clock.now()).await?;
        info!(user_id = %ctx.user_id(), company_id = %company.id, "Company created");
        Ok(company)
    }

    /// Update a company.
    pub async fn update_company(&self, ctx: &RequestContext, id: Uuid, payload: CompanyPayload) -> AppResult<Company> {
        let current = self.company(ctx, id).await?;
        let data = company_data(payload, Some(current.data()))?;
        let company = self
            .partners
            .update_company(ctx.org(), id, &data, self.clock.now())
            .await?
            .ok_or_else(|| AppError::not_found("Company not found"))?;
        info!(company_id = %company.id, "Company updated");
        Ok(company)
    }

    /// Delete a company no active learner references.
    pub async fn delete_company(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let outcome = self.partners.delete_partner(ctx.org(), PartnerRef::Company(id)).await?;
        deleted(outcome, "Company")?;
        info!(user_id = %ctx.user_id(), company_id = %id, "Company deleted");
        Ok(())
    }

    /// Funders matching `filter`.
    pub async fn list_funders(
        &self,
        ctx: &RequestContext,
        filter: &PartnerFilter,
        sort: SortField,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Funder>> {
        self.partners.list_funders(ctx.org(), filter, sort, page).await
    }

    /// One funder.
    pub async fn funder(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Funder> {
        self.partners
            .find_funder(ctx.org(), id)
            .await?
            .ok_or_else(|| AppError::not_found("Funder not found"))
    }

    /// Create a funder.
    pub async fn create_funder(&self, ctx: &RequestContext, payload: FunderPayload) -> AppResult<Funder> {
        let data = funder_data(payload, None)?;
        let funder = self.partners.create_funder(ctx.org(), &data, self.clock.now()).await?;
        info!(user_id = %ctx.user_id(), funder_id = %funder.id, "Funder created");
        Ok(funder)
    }

    /// Update a funder.
    pub async fn update_funder(&self, ctx: &RequestContext, id: Uuid, payload: FunderPayload) -> AppResult<Funder> {
        let current = self.funder(ctx, id).await?;
        let data = funder_data(payload, Some(current.data()))?;
        let funder = self
            .partners
            .update_funder(ctx.org(), id, &data, self.clock.now())
            .await?
            .ok_or_else(|| AppError::not_found("Funder not found"))?;
        info!(funder_id = %funder.id, "Funder updated");
        Ok(funder)
    }

    /// Delete a funder no active learner references.
    pub async fn delete_funder(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let outcome = self.partners.delete_partner(ctx.org(), PartnerRef::Funder(id)).await?;
        deleted(outcome, "Funder")?;
        info!(user_id = %ctx.user_id(), funder_id = %id, "Funder deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use learnhub_core::error::ErrorKind;

    use super::*;

    #[test]
    fn test_company_requires_name_and_valid_siret() {
        let err = company_data(CompanyPayload::default(), None).unwrap_err();
        let fields = err.fields.unwrap();
        assert!(fields.contains("name"));
        assert!(fields.contains("siret"));

        let err = company_data(
            CompanyPayload {
                name: Some("Acme".into()),
                siret: Some("123".into()),
                ..CompanyPayload::default()
            },
            None,
        )
        .unwrap_err();
        assert_eq!(err.fields.unwrap().get("siret").unwrap()[0].code, "digits");
    }

    #[test]
    fn test_company_update_merges() {
        let current = CompanyData {
            name: "Acme".into(),
            siret: "73282932000074".into(),
            email: None,
            phone: None,
            address: None,
            city: Some("Lyon".into()),
            postal_code: None,
        };
        let data = company_data(
            CompanyPayload {
                siret: Some("732 829 320 00082".into()),
                ..CompanyPayload::default()
            },
            Some(current),
        )
        .unwrap();
        assert_eq!(data.siret, "73282932000082");
        assert_eq!(data.city.as_deref(), Some("Lyon"));
    }

    #[test]
    fn test_funder_kind() {
        let data = funder_data(
            FunderPayload {
                name: Some("OPCO Atlas".into()),
                ..FunderPayload::default()
            },
            None,
        )
        .unwrap();
        assert_eq!(data.kind, FunderKind::Opco);
        assert_eq!(data.siret, None);

        let err = funder_data(
            FunderPayload {
                name: Some("x".into()),
                kind: Some("charity".into()),
                ..FunderPayload::default()
            },
            None,
        )
        .unwrap_err();
        assert!(err.fields.unwrap().contains("type"));
    }

    #[test]
    fn test_delete_outcomes() {
        assert!(deleted(DeleteOutcome::Deleted, "Company").is_ok());
        assert_eq!(deleted(DeleteOutcome::NotFound, "Company").unwrap_err().kind, ErrorKind::NotFound);
        let err = deleted(DeleteOutcome::HasActiveLearners(2), "Funder").unwrap_err();
        assert_eq!(err.kind, ErrorKind::BusinessRule);
        assert!(err.message.contains("2 active learner"));
    }
}
