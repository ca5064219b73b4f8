//! Query Period Extraction
//!
//! Questions arrive in Dutch free text ("wat was de omzet in maart 2024?").
//! A period is pulled out of the text and drives both the dataset filter and
//! the previous-period trend comparison.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref YEAR: Regex = Regex::new(r"20\d{2}").unwrap();
}

/// Dutch month names, index 0 = januari
pub const MONTH_NAMES: [&str; 12] = [
    "januari",
    "februari",
    "maart",
    "april",
    "mei",
    "juni",
    "juli",
    "augustus",
    "september",
    "oktober",
    "november",
    "december",
];

/// Period referenced by a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    SpecificMonth { year: i32, month: u32 },
    Year { year: i32 },
    CurrentMonth,
    PreviousMonth,
    CurrentYear,
    PreviousYear,
    AllTime,
}

/// A period resolved against a reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolved {
    Month { year: i32, month: u32 },
    Year { year: i32 },
    All,
}

fn previous_month_of(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

impl Period {
    /// Parse the period referenced by a query, relative to `today`.
    ///
    /// Precedence mirrors the question patterns: a bare year, a month name
    /// (with optional year), then relative phrases, then all time.
    pub fn parse(query: &str, today: NaiveDate) -> Self {
        let query = query.to_lowercase();

        let year = YEAR
            .find(&query)
            .and_then(|m| m.as_str().parse::<i32>().ok());

        let month = MONTH_NAMES
            .iter()
            .position(|name| query.contains(name))
            .map(|i| i as u32 + 1);

        if let Some(year) = year {
            if month.is_none() {
                return Self::Year { year };
            }
        }

        if let Some(month) = month {
            return Self::SpecificMonth {
                year: year.unwrap_or_else(|| today.year()),
                month,
            };
        }

        if query.contains("vorige maand") {
            Self::PreviousMonth
        } else if query.contains("deze maand") {
            Self::CurrentMonth
        } else if query.contains("dit jaar") {
            Self::CurrentYear
        } else if query.contains("vorig jaar") {
            Self::PreviousYear
        } else {
            Self::AllTime
        }
    }

    fn resolve(&self, today: NaiveDate) -> Resolved {
        match *self {
            Self::SpecificMonth { year, month } => Resolved::Month { year, month },
            Self::Year { year } => Resolved::Year { year },
            Self::CurrentMonth => Resolved::Month {
                year: today.year(),
                month: today.month(),
            },
            Self::PreviousMonth => {
                let (year, month) = previous_month_of(today.year(), today.month());
                Resolved::Month { year, month }
            }
            Self::CurrentYear => Resolved::Year { year: today.year() },
            Self::PreviousYear => Resolved::Year {
                year: today.year() - 1,
            },
            Self::AllTime => Resolved::All,
        }
    }

    /// Does a registration date fall inside this period?
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self.resolve(today) {
            Resolved::Month { year, month } => date.year() == year && date.month() == month,
            Resolved::Year { year } => date.year() == year,
            Resolved::All => true,
        }
    }

    /// The period to compare against for trends, when one exists.
    ///
    /// Relative past periods ("vorige maand", "vorig jaar") and all-time have
    /// no comparison baseline.
    pub fn previous(&self, today: NaiveDate) -> Option<Period> {
        match *self {
            Self::SpecificMonth { year, month } => {
                let (year, month) = previous_month_of(year, month);
                Some(Self::SpecificMonth { year, month })
            }
            Self::Year { year } => Some(Self::Year { year: year - 1 }),
            Self::CurrentMonth => {
                let (year, month) = previous_month_of(today.year(), today.month());
                Some(Self::SpecificMonth { year, month })
            }
            Self::CurrentYear => Some(Self::Year {
                year: today.year() - 1,
            }),
            Self::PreviousMonth | Self::PreviousYear | Self::AllTime => None,
        }
    }

    /// Dutch description of the period shown in the model context.
    pub fn description(&self, today: NaiveDate) -> String {
        match *self {
            Self::SpecificMonth { year, month } => {
                format!("{} {}", MONTH_NAMES[month as usize - 1], year)
            }
            Self::CurrentMonth => format!(
                "1-{}-{} tot {}",
                today.month(),
                today.year(),
                today.format("%d-%m-%Y")
            ),
            Self::PreviousMonth => {
                // End date is today shifted back one month, clamped to the
                // month's length (15 maart -> 15 februari, 31 maart -> 29 februari)
                let (year, month) = previous_month_of(today.year(), today.month());
                let end = today.day().min(last_day_of(year, month));
                format!("1-{}-{} tot {}-{}-{}", month, year, end, month, year)
            }
            _ => "Alle data".to_string(),
        }
    }
}

/// Last calendar day of a month
fn last_day_of(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}
