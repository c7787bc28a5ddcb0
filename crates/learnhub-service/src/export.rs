//! CSV downloads of partner and attempt lists.
//!
//! Files are `;`-delimited UTF-8 with a byte order mark so spreadsheet
//! software opens them with the right encoding and columns. The `xlsx`
//! format carries the same bytes under a spreadsheet content type and
//! extension.

use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use learnhub_core::error::{AppError, ErrorKind};
use learnhub_core::result::AppResult;
use learnhub_core::traits::Clock;
use learnhub_core::types::SortField;
use learnhub_database::store::{AttemptFilter, PartnerFilter, PartnerStore};
use learnhub_entity::partner::{Company, Funder};
use learnhub_entity::quiz::QuizAttempt;

use crate::context::RequestContext;
use crate::quiz::AttemptService;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const DELIMITER: u8 = b';';

/// Requested download format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Plain CSV.
    #[default]
    Csv,
    /// CSV served as a spreadsheet.
    Xlsx,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    /// `Content-Type` of the download.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "csv" => Ok(Self::Csv),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            other => Err(AppError::field(
                "format",
                "in",
                format!("The selected format {other} is invalid. Expected one of: csv, xlsx"),
            )),
        }
    }
}

/// A rendered download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    /// Suggested file name.
    pub file_name: String,
    /// `Content-Type` header value.
    pub content_type: &'static str,
    /// File contents.
    pub data: Bytes,
}

/// Serialize rows to the download format.
fn render<I, R>(header: &[&str], rows: I) -> AppResult<Bytes>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(UTF8_BOM.to_vec());

    let csv_error = |e: csv::Error| AppError::with_source(ErrorKind::Internal, "Failed to write export", e);
    writer.write_record(header).map_err(csv_error)?;
    for row in rows {
        writer.write_record(row).map_err(csv_error)?;
    }
    let data = writer
        .into_inner()
        .map_err(|e| AppError::internal(format!("Failed to finish export: {e}")))?;
    Ok(Bytes::from(data))
}

fn file_name(stem: &str, format: ExportFormat, now: DateTime<Utc>) -> String {
    format!("{stem}_{}.{}", now.format("%Y%m%d_%H%M%S"), format.extension())
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn company_row(c: Company) -> Vec<String> {
    vec![
        c.name,
        c.siret,
        opt(&c.email),
        opt(&c.phone),
        opt(&c.address),
        opt(&c.postal_code),
        opt(&c.city),
        c.created_at.to_rfc3339(),
    ]
}

fn funder_row(f: Funder) -> Vec<String> {
    vec![
        f.name,
        f.kind.to_string(),
        opt(&f.siret),
        opt(&f.email),
        opt(&f.phone),
        f.created_at.to_rfc3339(),
    ]
}

fn attempt_row(a: QuizAttempt) -> Vec<String> {
    let percentage = a.percentage().map(|p| format!("{p:.2}")).unwrap_or_default();
    vec![
        a.id.to_string(),
        a.user_id.to_string(),
        a.status.to_string(),
        a.score.map(|s| s.to_string()).unwrap_or_default(),
        a.max_score.map(|s| s.to_string()).unwrap_or_default(),
        percentage,
        a.started_at.to_rfc3339(),
        a.submitted_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        a.graded_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
    ]
}

/// Builds export files from the same queries as the list endpoints.
#[derive(Debug, Clone)]
pub struct ExportService {
    partners: Arc<dyn PartnerStore>,
    attempts: AttemptService,
    clock: Arc<dyn Clock>,
}

impl ExportService {
    /// Creates a new export service.
    pub fn new(partners: Arc<dyn PartnerStore>, attempts: AttemptService, clock: Arc<dyn Clock>) -> Self {
        Self {
            partners,
            attempts,
            clock,
        }
    }

    /// Every company matching `filter`.
    pub async fn companies(
        &self,
        ctx: &RequestContext,
        filter: &PartnerFilter,
        sort: SortField,
        format: ExportFormat,
    ) -> AppResult<ExportFile> {
        let rows = self.partners.all_companies(ctx.org(), filter, sort).await?;
        let count = rows.len();
        let data = render(
            &["Name", "SIRET", "Email", "Phone", "Address", "Postal code", "City", "Created at"],
            rows.into_iter().map(company_row),
        )?;
        info!(user_id = %ctx.user_id(), rows = count, "Companies exported");
        Ok(self.file("companies", format, data))
    }

    /// Every funder matching `filter`.
    pub async fn funders(
        &self,
        ctx: &RequestContext,
        filter: &PartnerFilter,
        sort: SortField,
        format: ExportFormat,
    ) -> AppResult<ExportFile> {
        let rows = self.partners.all_funders(ctx.org(), filter, sort).await?;
        let count = rows.len();
        let data = render(
            &["Name", "Type", "SIRET", "Email", "Phone", "Created at"],
            rows.into_iter().map(funder_row),
        )?;
        info!(user_id = %ctx.user_id(), rows = count, "Funders exported");
        Ok(self.file("funders", format, data))
    }

    /// Every attempt of a quiz matching `filter`.
    pub async fn attempts(
        &self,
        ctx: &RequestContext,
        quiz_id: Uuid,
        filter: &AttemptFilter,
        format: ExportFormat,
    ) -> AppResult<ExportFile> {
        let (quiz, rows) = self.attempts.all(ctx, quiz_id, filter).await?;
        let count = rows.len();
        let data = render(
            &[
                "Attempt", "User", "Status", "Score", "Max score", "Percent", "Started at", "Submitted at",
                "Graded at",
            ],
            rows.into_iter().map(attempt_row),
        )?;
        info!(user_id = %ctx.user_id(), quiz_id = %quiz.id, rows = count, "Quiz attempts exported");
        Ok(self.file(&format!("quiz_{}_attempts", quiz.id.simple()), format, data))
    }

    fn file(&self, stem: &str, format: ExportFormat, data: Bytes) -> ExportFile {
        ExportFile {
            file_name: file_name(stem, format, self.clock.now()),
            content_type: format.content_type(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_render_has_bom_and_semicolons() {
        let data = render(
            &["Name", "City"],
            vec![vec!["Acme; Inc".to_string(), "Lyon".to_string()]],
        )
        .unwrap();
        assert!(data.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&data[UTF8_BOM.len()..]).unwrap();
        assert_eq!(text, "Name;City\n\"Acme; Inc\";Lyon\n");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_file_name() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 5, 9).unwrap();
        assert_eq!(file_name("companies", ExportFormat::Xlsx, at), "companies_20260301_080509.xlsx");
    }
}
