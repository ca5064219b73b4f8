//! In-Memory Training Dataset
//!
//! Builds typed registrations from the raw row matrix the Sheets API returns.
//! The first row is the header; columns are located by name so the sheet may
//! reorder or append columns freely.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{
    Registration, COL_COMPANY, COL_DATE, COL_REVENUE, COL_TRAINING, COL_TYPE,
};
use crate::core::period::Period;
use crate::utils::text::{
    clean_company_name, clean_training_name, company_matches_query, parse_amount, parse_date,
};

/// Parsed sheet snapshot
#[derive(Debug, Clone)]
pub struct TrainingDataset {
    rows: Vec<Registration>,
    /// Unique company names in data order (empty when the sheet has no
    /// Bedrijf column)
    companies: Vec<String>,
    /// Rows dropped during parsing (bad date or revenue)
    skipped: usize,
    loaded_at: DateTime<Utc>,
}

impl TrainingDataset {
    /// Build a dataset from the raw `values` matrix.
    ///
    /// Errors when the matrix is empty or a required column is missing;
    /// individual malformed rows are skipped with a warning.
    pub fn from_rows(values: &[Vec<String>]) -> AppResult<Self> {
        let header = values.first().ok_or_else(AppError::data_empty)?;

        let col = |name: &str| -> Option<usize> {
            header.iter().position(|h| h.trim() == name)
        };

        let date_idx = col(COL_DATE).ok_or_else(|| AppError::missing_column(COL_DATE))?;
        let training_idx = col(COL_TRAINING).ok_or_else(|| AppError::missing_column(COL_TRAINING))?;
        let revenue_idx = col(COL_REVENUE).ok_or_else(|| AppError::missing_column(COL_REVENUE))?;
        let type_idx = col(COL_TYPE).ok_or_else(|| AppError::missing_column(COL_TYPE))?;
        let company_idx = col(COL_COMPANY);

        let mut rows = Vec::with_capacity(values.len() - 1);
        let mut companies: Vec<String> = Vec::new();
        let mut skipped = 0usize;

        let cell = |row: &[String], idx: usize| -> String {
            row.get(idx).cloned().unwrap_or_default()
        };

        for (i, raw) in values.iter().enumerate().skip(1) {
            let date_raw = cell(raw, date_idx);
            let Some(registered_at) = parse_date(&date_raw) else {
                warn!("⚠️ Row {}: unparseable date '{}', skipping", i + 1, date_raw);
                skipped += 1;
                continue;
            };

            let revenue_raw = cell(raw, revenue_idx);
            let Some(revenue) = parse_amount(&revenue_raw) else {
                warn!("⚠️ Row {}: unparseable revenue '{}', skipping", i + 1, revenue_raw);
                skipped += 1;
                continue;
            };

            let company = company_idx.map(|idx| clean_company_name(&cell(raw, idx)));
            if let Some(name) = &company {
                if !name.is_empty() && !companies.iter().any(|c| c == name) {
                    companies.push(name.clone());
                }
            }

            rows.push(Registration {
                registered_at,
                training: clean_training_name(&cell(raw, training_idx)),
                revenue,
                kind: cell(raw, type_idx).trim().to_string(),
                company,
            });
        }

        if rows.is_empty() {
            return Err(AppError::data_empty());
        }

        debug!("Parsed {} registrations ({} skipped)", rows.len(), skipped);

        Ok(Self {
            rows,
            companies,
            skipped,
            loaded_at: Utc::now(),
        })
    }

    pub fn rows(&self) -> &[Registration] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Unique company names, data order
    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    /// Registrations inside a period
    pub fn filter_by_period(&self, period: Period, today: NaiveDate) -> Vec<&Registration> {
        self.rows
            .iter()
            .filter(|r| period.contains(r.registered_at, today))
            .collect()
    }

    /// Registrations inside a period, optionally narrowed to one company
    pub fn filter(
        &self,
        period: Period,
        company: Option<&str>,
        today: NaiveDate,
    ) -> Vec<&Registration> {
        self.rows
            .iter()
            .filter(|r| period.contains(r.registered_at, today))
            .filter(|r| match company {
                Some(name) => r.company.as_deref() == Some(name),
                None => true,
            })
            .collect()
    }

    /// First company name mentioned in a query, if any.
    ///
    /// Case-insensitive containment over the known companies first; when
    /// nothing matches, a word-wise pass catches partial mentions
    /// ("exporteer ing" finds "ING Bank").
    pub fn detect_company(&self, query: &str) -> Option<String> {
        let lowered = query.to_lowercase();
        self.companies
            .iter()
            .find(|c| lowered.contains(&c.to_lowercase()))
            .or_else(|| {
                self.companies
                    .iter()
                    .find(|c| company_matches_query(c, query))
            })
            .cloned()
    }

    /// Sum of revenue over a set of registrations
    pub fn total_revenue(rows: &[&Registration]) -> f64 {
        rows.iter().map(|r| r.revenue).sum()
    }
}
