//! History filters and date windows.
//!
//! Dates go over the wire as `YYYY-MM-DDTHH:MM:SS±HH:MM`; both ends of a
//! window are inclusive.

use chrono::{DateTime, FixedOffset, Months, NaiveTime, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::entities::Cursor;

/// Largest page the provider serves
pub const MAX_ROWS: u32 = 50;

/// Longest history window the provider serves, in days
pub const MAX_WINDOW_DAYS: i64 = 90;

const PROVIDER_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

pub fn format_provider_date(date: &DateTime<FixedOffset>) -> String {
    date.format(PROVIDER_DATE_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    All,
    In,
    Out,
    QiwiCard,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::All => "ALL",
            OperationType::In => "IN",
            OperationType::Out => "OUT",
            OperationType::QiwiCard => "QIWI_CARD",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OperationType::All => "All",
            OperationType::In => "Top-up",
            OperationType::Out => "Payment",
            OperationType::QiwiCard => "Card payment",
        }
    }
}

impl FromStr for OperationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "ALL" => Ok(OperationType::All),
            "IN" => Ok(OperationType::In),
            "OUT" => Ok(OperationType::Out),
            "QIWI_CARD" | "CARD" => Ok(OperationType::QiwiCard),
            _ => Err(format!("Invalid operation type: {}", s)),
        }
    }
}

/// Wallet funding sources the history can be filtered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundingSource {
    #[serde(rename = "QW_RUB")]
    QwRub,
    #[serde(rename = "QW_USD")]
    QwUsd,
    #[serde(rename = "QW_EUR")]
    QwEur,
    #[serde(rename = "CARD")]
    Card,
    /// Mobile phone balance
    #[serde(rename = "MK")]
    Mk,
}

impl FundingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundingSource::QwRub => "QW_RUB",
            FundingSource::QwUsd => "QW_USD",
            FundingSource::QwEur => "QW_EUR",
            FundingSource::Card => "CARD",
            FundingSource::Mk => "MK",
        }
    }
}

impl fmt::Display for FundingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FundingSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "QW_RUB" | "RUB" => Ok(FundingSource::QwRub),
            "QW_USD" | "USD" => Ok(FundingSource::QwUsd),
            "QW_EUR" | "EUR" => Ok(FundingSource::QwEur),
            "CARD" => Ok(FundingSource::Card),
            "MK" => Ok(FundingSource::Mk),
            _ => Err(format!("Invalid funding source: {}", s)),
        }
    }
}

/// Preset history windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Yesterday,
    LastWeek,
    LastMonth,
    /// The longest window the provider allows
    Max,
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "today" | "day" => Ok(Period::Today),
            "yesterday" => Ok(Period::Yesterday),
            "week" => Ok(Period::LastWeek),
            "month" => Ok(Period::LastMonth),
            "max" | "all" => Ok(Period::Max),
            _ => Err(format!("Invalid period: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl DateWindow {
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        DateWindow { start, end }
    }

    /// Resolve a preset relative to `now`
    ///
    /// Day boundaries are taken in `now`'s offset. The last-week window runs
    /// from the end of the day seven days ago until `now`.
    pub fn for_period(period: Period, now: DateTime<FixedOffset>) -> Self {
        match period {
            Period::Today => DateWindow::new(start_of_day(now), end_of_day(now)),
            Period::Yesterday => {
                let yesterday = now - TimeDelta::days(1);
                DateWindow::new(start_of_day(yesterday), end_of_day(yesterday))
            }
            Period::LastWeek => DateWindow::new(end_of_day(now - TimeDelta::days(7)), now),
            Period::LastMonth => {
                let month_ago = now.checked_sub_months(Months::new(1)).unwrap_or(now);
                DateWindow::new(start_of_day(month_ago), end_of_day(now))
            }
            Period::Max => DateWindow::new(
                start_of_day(now - TimeDelta::days(MAX_WINDOW_DAYS)),
                end_of_day(now),
            ),
        }
    }

    pub fn contains(&self, date: &DateTime<FixedOffset>) -> bool {
        *date >= self.start && *date <= self.end
    }
}

fn at_local_time(date: DateTime<FixedOffset>, time: NaiveTime) -> DateTime<FixedOffset> {
    let offset = *date.offset();
    offset
        .from_local_datetime(&date.date_naive().and_time(time))
        .single()
        .unwrap_or(date)
}

fn start_of_day(date: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    at_local_time(date, NaiveTime::MIN)
}

fn end_of_day(date: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    match NaiveTime::from_hms_opt(23, 59, 59) {
        Some(time) => at_local_time(date, time),
        None => date,
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("At least one funding source is required")]
    NoSources,

    #[error("Window start {start} is after its end {end}")]
    InvertedWindow { start: String, end: String },
}

/// Payment history query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentFilters {
    pub operation: OperationType,
    pub sources: Vec<FundingSource>,
    pub start_date: DateTime<FixedOffset>,
    pub end_date: DateTime<FixedOffset>,
    pub rows: u32,
}

impl PaymentFilters {
    /// All operations on the rouble account, full pages
    pub fn new(window: DateWindow) -> Self {
        PaymentFilters {
            operation: OperationType::All,
            sources: vec![FundingSource::QwRub],
            start_date: window.start,
            end_date: window.end,
            rows: MAX_ROWS,
        }
    }

    pub fn with_operation(mut self, operation: OperationType) -> Self {
        self.operation = operation;
        self
    }

    pub fn with_sources(mut self, sources: Vec<FundingSource>) -> Self {
        self.sources = sources;
        self
    }

    /// Page size, clamped to `1..=MAX_ROWS`
    pub fn with_rows(mut self, rows: u32) -> Self {
        self.rows = rows.clamp(1, MAX_ROWS);
        self
    }

    /// Add a source if absent, remove it if present
    pub fn toggle_source(&mut self, source: FundingSource) {
        if let Some(pos) = self.sources.iter().position(|s| *s == source) {
            self.sources.remove(pos);
        } else {
            self.sources.push(source);
        }
    }

    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start_date, self.end_date)
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.sources.is_empty() {
            return Err(FilterError::NoSources);
        }
        if self.start_date > self.end_date {
            return Err(FilterError::InvertedWindow {
                start: format_provider_date(&self.start_date),
                end: format_provider_date(&self.end_date),
            });
        }
        Ok(())
    }

    /// Query parameters for the totals endpoint: sources, operation and window
    pub fn totals_query(&self) -> Vec<(String, String)> {
        let mut query = vec![("operation".to_string(), self.operation.as_str().to_string())];
        query.extend(
            self.sources
                .iter()
                .map(|s| ("sources".to_string(), s.as_str().to_string())),
        );
        query.push(("startDate".to_string(), format_provider_date(&self.start_date)));
        query.push(("endDate".to_string(), format_provider_date(&self.end_date)));
        query
    }

    /// Query parameters for one page of history, continuing from `cursor`
    pub fn page_query(&self, cursor: Option<&Cursor>) -> Vec<(String, String)> {
        let mut query = vec![("rows".to_string(), self.rows.clamp(1, MAX_ROWS).to_string())];
        query.extend(self.totals_query());
        if let Some(cursor) = cursor {
            query.push(("nextTxnDate".to_string(), format_provider_date(&cursor.date)));
            query.push(("nextTxnId".to_string(), cursor.id.to_string()));
        }
        query
    }
}
