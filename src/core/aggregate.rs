//! Multi-currency aggregation over ledger records
//!
//! Records keep their own currency; every monetary field of an
//! `AggregationResult` is normalized into the target currency before
//! summation. Stored records are never mutated, only derived values.

use crate::core::category::CategoryCatalog;
use crate::core::convert::CurrencyConverter;
use crate::core::model::{Expense, Income, Period};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// How many records the `top_*` lists keep.
pub const TOP_N: usize = 10;

/// Optional record filters. Category names match under alias resolution, so
/// a filter of `["food"]` also selects records labelled `طعام`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFilter<'a> {
    pub period: Option<&'a Period>,
    pub categories: Option<&'a [String]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub expenses: f64,
    pub income: f64,
}

/// One entry of a top-N list, already converted to the target currency.
#[derive(Debug, Clone, PartialEq)]
pub struct TopRecord {
    pub label: String,
    pub amount: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct AggregationResult {
    pub target_currency: String,
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
    /// Expense totals per canonical category, sorted descending by amount.
    pub by_category: Vec<CategoryTotal>,
    /// Per-day totals in ascending date order.
    pub by_day: Vec<DailyTotal>,
    pub top_expenses: Vec<TopRecord>,
    pub top_income: Vec<TopRecord>,
}

impl AggregationResult {
    fn empty(target_currency: &str) -> Self {
        AggregationResult {
            target_currency: target_currency.to_string(),
            total_income: 0.0,
            total_expenses: 0.0,
            balance: 0.0,
            by_category: Vec::new(),
            by_day: Vec::new(),
            top_expenses: Vec::new(),
            top_income: Vec::new(),
        }
    }
}

fn matches(
    filter: &RecordFilter<'_>,
    catalog: &CategoryCatalog,
    date: NaiveDate,
    name: &str,
) -> bool {
    if let Some(period) = filter.period {
        if !period.contains(date) {
            return false;
        }
    }
    if let Some(categories) = filter.categories {
        if !categories.iter().any(|c| catalog.same(c, name)) {
            return false;
        }
    }
    true
}

/// Safe percentage share; a zero total yields 0, never NaN or infinity.
fn percentage(amount: f64, total: f64) -> f64 {
    if total > 0.0 { amount / total * 100.0 } else { 0.0 }
}

pub async fn aggregate(
    expenses: &[Expense],
    income: &[Income],
    filter: &RecordFilter<'_>,
    catalog: &CategoryCatalog,
    converter: &CurrencyConverter,
    target_currency: &str,
) -> AggregationResult {
    let mut result = AggregationResult::empty(target_currency);

    let mut converted_expenses = Vec::new();
    for expense in expenses
        .iter()
        .filter(|e| matches(filter, catalog, e.date, &e.category))
    {
        let amount = converter
            .convert(expense.amount, &expense.currency, target_currency)
            .await;
        converted_expenses.push((expense, amount));
    }

    let mut converted_income = Vec::new();
    for record in income
        .iter()
        .filter(|i| matches(filter, catalog, i.date, &i.source))
    {
        let amount = converter
            .convert(record.amount, &record.currency, target_currency)
            .await;
        converted_income.push((record, amount));
    }

    result.total_expenses = converted_expenses.iter().map(|(_, a)| a).sum();
    result.total_income = converted_income.iter().map(|(_, a)| a).sum();
    result.balance = result.total_income - result.total_expenses;

    // Group expenses by canonical category, keeping first-appearance order
    // so that equal totals stay deterministic after the sort below.
    let mut groups: Vec<CategoryTotal> = Vec::new();
    for (expense, amount) in &converted_expenses {
        let key = catalog.resolve(&expense.category);
        match groups.iter_mut().find(|g| g.category == key) {
            Some(group) => {
                group.amount += amount;
                group.count += 1;
            }
            None => groups.push(CategoryTotal {
                category: key.to_string(),
                amount: *amount,
                percentage: 0.0,
                count: 1,
            }),
        }
    }
    for group in &mut groups {
        group.percentage = percentage(group.amount, result.total_expenses);
    }
    groups.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    result.by_category = groups;

    let mut days: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for (expense, amount) in &converted_expenses {
        days.entry(expense.date).or_default().0 += amount;
    }
    for (record, amount) in &converted_income {
        days.entry(record.date).or_default().1 += amount;
    }
    result.by_day = days
        .into_iter()
        .map(|(date, (expenses, income))| DailyTotal {
            date,
            expenses,
            income,
        })
        .collect();

    result.top_expenses = top_records(
        converted_expenses
            .iter()
            .map(|(e, a)| (catalog.resolve(&e.category).to_string(), *a, e.date)),
    );
    result.top_income = top_records(
        converted_income
            .iter()
            .map(|(i, a)| (catalog.resolve(&i.source).to_string(), *a, i.date)),
    );

    result
}

fn top_records(records: impl Iterator<Item = (String, f64, NaiveDate)>) -> Vec<TopRecord> {
    let mut out: Vec<TopRecord> = records
        .map(|(label, amount, date)| TopRecord {
            label,
            amount,
            date,
        })
        .collect();
    // Stable sort: equal amounts keep their original record order.
    out.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    out.truncate(TOP_N);
    out
}
