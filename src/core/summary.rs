//! Period Summaries & Trends
//!
//! Aggregates a period-filtered slice of the dataset into the numbers the
//! model reasons over: total revenue, per-training and per-type breakdowns,
//! and percent changes against the previous period.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::dataset::TrainingDataset;
use crate::core::period::Period;
use crate::models::types::Registration;
use crate::utils::text::format_amount;

/// Per-training aggregate
#[derive(Debug, Clone, Serialize)]
pub struct TrainingDetail {
    pub total_registrations: usize,
    /// Date of the first registration seen for this training (d-m-Y)
    pub registration_date: String,
    pub value: f64,
}

/// Per-type aggregate
#[derive(Debug, Clone, Serialize)]
pub struct TypeBreakdown {
    pub total_revenue: f64,
    pub total_registrations: usize,
}

/// Percent change for one training type
#[derive(Debug, Clone, Serialize)]
pub struct TypeTrend {
    pub current_value: f64,
    pub previous_value: f64,
    pub change_percentage: f64,
}

/// Changes against the previous period
#[derive(Debug, Clone, Default, Serialize)]
pub struct Trends {
    /// Total revenue change in percent (0 when there is no baseline)
    pub total_change_percentage: f64,
    pub by_type: BTreeMap<String, TypeTrend>,
}

/// Full summary for one period
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub total_value: f64,
    pub trainings: BTreeMap<String, TrainingDetail>,
    pub by_type: BTreeMap<String, TypeBreakdown>,
    /// Dutch description of the period
    pub period: String,
    pub trends: Trends,
}

fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

impl TrainingSummary {
    /// Summarize a period of the dataset, including trends against the
    /// period's predecessor when it has one.
    pub fn build(dataset: &TrainingDataset, period: Period, today: NaiveDate) -> Self {
        let rows = dataset.filter_by_period(period, today);
        let previous_rows = period
            .previous(today)
            .map(|prev| dataset.filter_by_period(prev, today))
            .filter(|rows| !rows.is_empty());

        let mut trainings: BTreeMap<String, TrainingDetail> = BTreeMap::new();
        let mut by_type: BTreeMap<String, TypeBreakdown> = BTreeMap::new();

        for row in &rows {
            trainings
                .entry(row.training.clone())
                .and_modify(|d| {
                    d.total_registrations += 1;
                    d.value += row.revenue;
                })
                .or_insert_with(|| TrainingDetail {
                    total_registrations: 1,
                    registration_date: row.registered_at.format("%d-%m-%Y").to_string(),
                    value: row.revenue,
                });

            by_type
                .entry(row.kind.clone())
                .and_modify(|t| {
                    t.total_revenue += row.revenue;
                    t.total_registrations += 1;
                })
                .or_insert_with(|| TypeBreakdown {
                    total_revenue: row.revenue,
                    total_registrations: 1,
                });
        }

        Self {
            total_value: TrainingDataset::total_revenue(&rows),
            trainings,
            by_type,
            period: period.description(today),
            trends: Self::calculate_trends(&rows, previous_rows.as_deref()),
        }
    }

    /// Percent changes between the current and previous period rows
    fn calculate_trends(current: &[&Registration], previous: Option<&[&Registration]>) -> Trends {
        let current_total = TrainingDataset::total_revenue(current);
        let previous_total = previous.map(TrainingDataset::total_revenue).unwrap_or(0.0);

        let mut trends = Trends {
            total_change_percentage: percent_change(current_total, previous_total),
            by_type: BTreeMap::new(),
        };

        let Some(previous) = previous else {
            return trends;
        };

        let mut current_by_type: BTreeMap<&str, f64> = BTreeMap::new();
        for row in current {
            *current_by_type.entry(row.kind.as_str()).or_default() += row.revenue;
        }
        let mut previous_by_type: BTreeMap<&str, f64> = BTreeMap::new();
        for row in previous {
            *previous_by_type.entry(row.kind.as_str()).or_default() += row.revenue;
        }

        for (kind, &current_value) in &current_by_type {
            let previous_value = previous_by_type.get(kind).copied().unwrap_or(0.0);
            trends.by_type.insert(
                kind.to_string(),
                TypeTrend {
                    current_value,
                    previous_value,
                    change_percentage: percent_change(current_value, previous_value),
                },
            );
        }

        trends
    }

    /// Dutch context string fed to the model
    pub fn to_context(&self, today: NaiveDate) -> String {
        let mut context = format!("Huidige Datum: {}\n", today.format("%d-%m-%Y"));
        context += &format!("Getoonde periode: {}\n\n", self.period);
        context += "Analyse van Inschrijvingen:\n\n";

        context += &format!("Totale Omzet: €{}\n", format_amount(self.total_value));

        if self.trends.total_change_percentage != 0.0 {
            context += &format!(
                "Verschil met vorige periode: {:.1}%\n",
                self.trends.total_change_percentage
            );
        }

        context += "\nOmzet per Type:\n";
        for (type_name, data) in &self.by_type {
            context += &format!("\n{}:\n", type_name);
            context += &format!("- Totale Omzet: €{}\n", format_amount(data.total_revenue));
            context += &format!("- Aantal Inschrijvingen: {}\n", data.total_registrations);

            if let Some(trend) = self.trends.by_type.get(type_name) {
                if trend.previous_value > 0.0 {
                    context += &format!(
                        "- Verschil met vorige periode: {:.1}%\n",
                        trend.change_percentage
                    );
                }
            }
        }

        context += "\nTraining Details:\n";
        for (training, data) in &self.trainings {
            context += &format!("\n{}:\n", training);
            context += &format!("- Inschrijvingen: {}\n", data.total_registrations);
            context += &format!("- Inschrijfdatum: {}\n", data.registration_date);
            context += &format!("- Waarde: €{}\n", format_amount(data.value));
        }

        context
    }
}

/// Dutch system prompt wrapping the context
pub fn system_prompt(context: &str) -> String {
    format!(
        "Je bent een Nederlandse AI assistent die trainingsdata analyseert. \
         Je kunt de volgende soorten analyses uitvoeren:\n\
         1. Omzet per maand of jaar\n\
         2. Vergelijkingen tussen periodes (percentages)\n\
         3. Overzichten van verkochte trainingen per type\n\
         4. Trends en ontwikkelingen\n\n\
         De getoonde data bevat alle inschrijvingen. \
         Hier is de samenvatting van de gevraagde periode:\n\n{}\n\
         Geef specifieke, data-gedreven antwoorden met waar mogelijk percentages en vergelijkingen. \
         Gebruik het € symbool voor geldbedragen en gebruik punten voor duizendtallen. \
         Als er om vergelijkingen wordt gevraagd, toon dan de verschillen in percentages. \
         Geef je antwoord in het Nederlands.",
        context
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> TrainingDataset {
        let rows = vec![
            vec!["Datum Inschrijving", "Training", "Omzet", "Type"],
            vec!["05-01-2024", "Green Belt", "€ 1.000,00", "Lean"],
            vec!["20-01-2024", "Green Belt", "€ 1.000,00", "Lean"],
            vec!["05-02-2024", "Green Belt", "€ 3.000,00", "Lean"],
            vec!["10-02-2024", "Black Belt", "€ 2.000,00", "Six Sigma"],
        ];
        let matrix: Vec<Vec<String>> = rows
            .into_iter()
            .map(|r| r.into_iter().map(String::from).collect())
            .collect();
        TrainingDataset::from_rows(&matrix).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_summary_totals() {
        let summary = TrainingSummary::build(
            &dataset(),
            Period::SpecificMonth {
                year: 2024,
                month: 2,
            },
            today(),
        );
        assert_eq!(summary.total_value, 5000.0);
        assert_eq!(summary.trainings["Green Belt"].total_registrations, 1);
        assert_eq!(summary.by_type["Six Sigma"].total_revenue, 2000.0);
        assert_eq!(summary.period, "februari 2024");
    }

    #[test]
    fn test_trends_against_previous_month() {
        let summary = TrainingSummary::build(
            &dataset(),
            Period::SpecificMonth {
                year: 2024,
                month: 2,
            },
            today(),
        );
        // January: 2000, February: 5000 -> +150%
        assert!((summary.trends.total_change_percentage - 150.0).abs() < 1e-9);
        let lean = &summary.trends.by_type["Lean"];
        assert_eq!(lean.previous_value, 2000.0);
        assert_eq!(lean.current_value, 3000.0);
        assert!((lean.change_percentage - 50.0).abs() < 1e-9);
        // Six Sigma had no baseline -> 0 percent reported
        assert_eq!(summary.trends.by_type["Six Sigma"].change_percentage, 0.0);
    }

    #[test]
    fn test_no_trends_for_all_time() {
        let summary = TrainingSummary::build(&dataset(), Period::AllTime, today());
        assert_eq!(summary.trends.total_change_percentage, 0.0);
        assert!(summary.trends.by_type.is_empty());
        assert_eq!(summary.total_value, 7000.0);
    }

    #[test]
    fn test_context_mentions_period_and_totals() {
        let summary = TrainingSummary::build(&dataset(), Period::AllTime, today());
        let context = summary.to_context(today());
        assert!(context.contains("Getoonde periode: Alle data"));
        assert!(context.contains("Totale Omzet: €7,000.00"));
        assert!(context.contains("Green Belt"));
    }

    #[test]
    fn test_system_prompt_embeds_context() {
        let prompt = system_prompt("CTX");
        assert!(prompt.contains("CTX"));
        assert!(prompt.contains("Nederlands"));
    }
}
