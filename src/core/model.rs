//! Domain records and the ledger collaborator contract

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Hours a stored exchange rate stays usable before resolution refreshes it.
pub const RATE_MAX_AGE_HOURS: i64 = 24;

/// A persisted conversion rate for one ordered currency pair.
///
/// `amount_in_to = amount_in_from * rate`. At most one row exists per
/// ordered pair; stale rows are overwritten, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub updated_at: DateTime<Utc>,
}

impl ExchangeRate {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.updated_at) < Duration::hours(RATE_MAX_AGE_HOURS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub amount: f64,
    pub currency: String,
    pub category: String,
    pub date: NaiveDate,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub amount: f64,
    pub currency: String,
    pub source: String,
    pub date: NaiveDate,
    pub note: Option<String>,
}

/// A spending cap for one category, expressed in its own currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub category: String,
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub name: String,
    pub target_amount: f64,
    pub saved_amount: f64,
    pub currency: String,
}

/// An inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Period { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The calendar month containing `date`, first day through last day.
    pub fn month_of(date: NaiveDate) -> Self {
        Period {
            start: month_start(date),
            end: month_end(date),
        }
    }
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
}

pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap()
        .pred_opt()
        .unwrap()
}

/// First day of the month `offset` whole months before the one containing
/// `date`. `offset` 0 is the current month.
pub fn months_back(date: NaiveDate, offset: u32) -> NaiveDate {
    let total = date.year() * 12 + date.month() as i32 - 1 - offset as i32;
    NaiveDate::from_ymd_opt(total.div_euclid(12), (total.rem_euclid(12) + 1) as u32, 1).unwrap()
}

/// Read-side contract of the on-device database. Filters are applied by the
/// source when given; callers may filter again without changing results.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    async fn expenses(&self, period: Option<&Period>) -> Result<Vec<Expense>>;
    async fn income(&self, period: Option<&Period>) -> Result<Vec<Income>>;
    async fn budgets(&self) -> Result<Vec<Budget>>;
    async fn goals(&self) -> Result<Vec<Goal>>;
}
