//! CSV Export
//!
//! Serializes a filtered set of registrations in the same column layout the
//! sheet uses, for download via the export endpoint.

use crate::models::errors::AppResult;
use crate::models::types::{
    Registration, COL_COMPANY, COL_DATE, COL_REVENUE, COL_TRAINING, COL_TYPE,
};
use crate::utils::text::format_amount;

/// Write registrations as CSV into an in-memory buffer.
pub fn to_csv(rows: &[&Registration]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([COL_DATE, COL_TRAINING, COL_REVENUE, COL_TYPE, COL_COMPANY])?;

    for row in rows {
        writer.write_record([
            row.registered_at.format("%d-%m-%Y").to_string(),
            row.training.clone(),
            format!("€ {}", format_amount(row.revenue)),
            row.kind.clone(),
            row.company.clone().unwrap_or_default(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| crate::models::errors::AppError::internal(e.to_string()))
}

/// Timestamped attachment filename for an export download
pub fn export_filename(now: chrono::DateTime<chrono::Local>) -> String {
    format!("training_export_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row() -> Registration {
        Registration {
            registered_at: NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
            training: "Green Belt".to_string(),
            revenue: 1250.0,
            kind: "Lean".to_string(),
            company: Some("ACME".to_string()),
        }
    }

    #[test]
    fn test_csv_layout() {
        let reg = row();
        let bytes = to_csv(&[&reg]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Datum Inschrijving,Training,Omzet,Type,Bedrijf"
        );
        assert_eq!(lines.next().unwrap(), "05-02-2024,Green Belt,\"€ 1,250.00\",Lean,ACME");
    }

    #[test]
    fn test_csv_empty() {
        let bytes = to_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_export_filename_shape() {
        let now = chrono::Local::now();
        let name = export_filename(now);
        assert!(name.starts_with("training_export_"));
        assert!(name.ends_with(".csv"));
    }
}
