//! Summary orchestration over the ledger collaborator
//!
//! The functions UI layers call: fetch records from a `LedgerSource`,
//! normalize through the converter, and feed the pure calculators. Monthly
//! windows take an explicit `today` so callers stay deterministic and
//! independently testable.

use crate::core::aggregate::{AggregationResult, RecordFilter, aggregate};
use crate::core::category::CategoryCatalog;
use crate::core::convert::CurrencyConverter;
use crate::core::model::{Goal, LedgerSource, Period, months_back};
use crate::core::progress::{
    BudgetStatus, ExpenseForecast, GoalEta, MonthlyExpenses, SAVINGS_WINDOW_MONTHS,
    average_monthly_savings, budget_status, forecast_expenses, time_to_goal,
};
use anyhow::Result;
use chrono::NaiveDate;
use futures::future::join_all;
use tracing::debug;

/// Aggregates the source's records for a period into the target currency.
pub async fn period_summary(
    source: &dyn LedgerSource,
    catalog: &CategoryCatalog,
    converter: &CurrencyConverter,
    period: Option<&Period>,
    categories: Option<&[String]>,
    target_currency: &str,
) -> Result<AggregationResult> {
    let expenses = source.expenses(period).await?;
    let income = source.income(period).await?;
    let filter = RecordFilter { period, categories };
    Ok(aggregate(&expenses, &income, &filter, catalog, converter, target_currency).await)
}

/// Status of every budget against the period's spending. Expenses match a
/// budget through alias resolution and are converted into the budget's own
/// currency before comparison.
pub async fn budget_overview(
    source: &dyn LedgerSource,
    catalog: &CategoryCatalog,
    converter: &CurrencyConverter,
    period: &Period,
) -> Result<Vec<BudgetStatus>> {
    let budgets = source.budgets().await?;
    let expenses = source.expenses(Some(period)).await?;

    let mut statuses = Vec::with_capacity(budgets.len());
    for budget in &budgets {
        let mut spent = 0.0;
        for expense in expenses
            .iter()
            .filter(|e| period.contains(e.date) && catalog.same(&e.category, &budget.category))
        {
            spent += converter
                .convert(expense.amount, &expense.currency, &budget.currency)
                .await;
        }
        statuses.push(budget_status(budget, spent));
    }
    Ok(statuses)
}

/// Balance (income − expenses) for each of the trailing `months` calendar
/// months, current month first.
pub async fn monthly_balances(
    source: &dyn LedgerSource,
    catalog: &CategoryCatalog,
    converter: &CurrencyConverter,
    months: usize,
    today: NaiveDate,
    target_currency: &str,
) -> Result<Vec<f64>> {
    let windows: Vec<Period> = (0..months)
        .map(|offset| Period::month_of(months_back(today, offset as u32)))
        .collect();

    let summaries = join_all(windows.iter().map(|period| {
        period_summary(source, catalog, converter, Some(period), None, target_currency)
    }))
    .await;

    summaries
        .into_iter()
        .map(|summary| summary.map(|s| s.balance))
        .collect()
}

/// Average monthly savings over the default trailing window.
pub async fn average_savings(
    source: &dyn LedgerSource,
    catalog: &CategoryCatalog,
    converter: &CurrencyConverter,
    months: usize,
    today: NaiveDate,
    target_currency: &str,
) -> Result<f64> {
    let balances =
        monthly_balances(source, catalog, converter, months, today, target_currency).await?;
    let average = average_monthly_savings(&balances);
    debug!("Average savings over {months} months: {average} {target_currency}");
    Ok(average)
}

/// Projected time until a goal's remaining amount is saved, based on the
/// savings history measured in the goal's own currency.
pub async fn goal_outlook(
    source: &dyn LedgerSource,
    catalog: &CategoryCatalog,
    converter: &CurrencyConverter,
    goal: &Goal,
    today: NaiveDate,
) -> Result<GoalEta> {
    let average = average_savings(
        source,
        catalog,
        converter,
        SAVINGS_WINDOW_MONTHS,
        today,
        &goal.currency,
    )
    .await?;
    Ok(time_to_goal(goal.target_amount - goal.saved_amount, average))
}

/// Next-month expense prediction from the trailing months' history.
pub async fn expense_forecast(
    source: &dyn LedgerSource,
    catalog: &CategoryCatalog,
    converter: &CurrencyConverter,
    months: usize,
    today: NaiveDate,
    target_currency: &str,
) -> Result<ExpenseForecast> {
    let windows: Vec<Period> = (0..months)
        .map(|offset| Period::month_of(months_back(today, offset as u32)))
        .collect();

    let summaries = join_all(windows.iter().map(|period| {
        period_summary(source, catalog, converter, Some(period), None, target_currency)
    }))
    .await;

    let mut samples = Vec::with_capacity(windows.len());
    for (period, summary) in windows.iter().zip(summaries) {
        let summary = summary?;
        samples.push(MonthlyExpenses {
            month: period.start,
            total: summary.total_expenses,
            by_category: summary
                .by_category
                .into_iter()
                .map(|c| (c.category, c.amount))
                .collect(),
        });
    }
    Ok(forecast_expenses(&samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Budget, Expense, Income};
    use crate::core::progress::Confidence;
    use crate::core::resolver::{FallbackRate, FallbackTable};
    use crate::store::memory::{MemoryLedger, MemoryRateStore};
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(amount: f64, currency: &str, category: &str, d: NaiveDate) -> Expense {
        Expense {
            amount,
            currency: currency.to_string(),
            category: category.to_string(),
            date: d,
            note: None,
        }
    }

    fn income_record(amount: f64, d: NaiveDate) -> Income {
        Income {
            amount,
            currency: "IQD".to_string(),
            source: "salary".to_string(),
            date: d,
            note: None,
        }
    }

    fn converter() -> CurrencyConverter {
        let fallback = FallbackTable::from_entries(&[FallbackRate {
            from: "USD".to_string(),
            to: "IQD".to_string(),
            rate: 1315.0,
        }]);
        CurrencyConverter::new(Arc::new(MemoryRateStore::new()), fallback)
    }

    #[tokio::test]
    async fn test_monthly_balances_newest_first() {
        let ledger = MemoryLedger {
            expenses: vec![
                expense(100.0, "IQD", "food", date(2025, 3, 10)),
                expense(50.0, "IQD", "food", date(2025, 2, 14)),
                expense(100.0, "IQD", "food", date(2025, 1, 20)),
            ],
            income: vec![
                income_record(500.0, date(2025, 3, 1)),
                income_record(200.0, date(2025, 1, 5)),
            ],
            ..Default::default()
        };

        let balances = monthly_balances(
            &ledger,
            &CategoryCatalog::default(),
            &converter(),
            3,
            date(2025, 3, 15),
            "IQD",
        )
        .await
        .unwrap();

        assert_eq!(balances, vec![400.0, -50.0, 100.0]);
    }

    #[tokio::test]
    async fn test_average_savings_over_ledger_history() {
        let ledger = MemoryLedger {
            expenses: vec![expense(50.0, "IQD", "food", date(2025, 2, 14))],
            income: vec![
                income_record(500.0, date(2025, 3, 1)),
                income_record(200.0, date(2025, 1, 5)),
            ],
            ..Default::default()
        };

        // Balances are [500, -50, 200]; loss months are excluded.
        let average = average_savings(
            &ledger,
            &CategoryCatalog::default(),
            &converter(),
            3,
            date(2025, 3, 15),
            "IQD",
        )
        .await
        .unwrap();

        assert_eq!(average, 350.0);
    }

    #[tokio::test]
    async fn test_budget_overview_matches_aliases_and_converts() {
        let ledger = MemoryLedger {
            expenses: vec![
                expense(100.0, "USD", "food", date(2025, 3, 5)),
                expense(1000.0, "IQD", "طعام", date(2025, 3, 6)),
                expense(9999.0, "IQD", "transport", date(2025, 3, 7)),
            ],
            budgets: vec![Budget {
                category: "food".to_string(),
                amount: 200000.0,
                currency: "IQD".to_string(),
            }],
            ..Default::default()
        };

        let statuses = budget_overview(
            &ledger,
            &CategoryCatalog::default(),
            &converter(),
            &Period::month_of(date(2025, 3, 1)),
        )
        .await
        .unwrap();

        assert_eq!(statuses.len(), 1);
        let status = &statuses[0];
        assert_eq!(status.spent, 131500.0 + 1000.0);
        assert_eq!(status.remaining, 200000.0 - 132500.0);
        assert!(!status.exceeded);
    }

    #[tokio::test]
    async fn test_goal_outlook_terminal_states() {
        let ledger = MemoryLedger::default();
        let catalog = CategoryCatalog::default();
        let converter = converter();

        let reached = Goal {
            name: "bike".to_string(),
            target_amount: 1000.0,
            saved_amount: 1000.0,
            currency: "IQD".to_string(),
        };
        let eta = goal_outlook(&ledger, &catalog, &converter, &reached, date(2025, 3, 15))
            .await
            .unwrap();
        assert_eq!(eta.months, Some(0));
        assert_eq!(eta.label, "complete");

        // No savings history: unavailable, not zero-time.
        let open = Goal {
            saved_amount: 0.0,
            ..reached
        };
        let eta = goal_outlook(&ledger, &catalog, &converter, &open, date(2025, 3, 15))
            .await
            .unwrap();
        assert_eq!(eta.months, None);
        assert_eq!(eta.days, None);
        assert_eq!(eta.label, "unavailable");
    }

    #[tokio::test]
    async fn test_expense_forecast_from_monthly_windows() {
        let ledger = MemoryLedger {
            expenses: vec![
                expense(100.0, "IQD", "food", date(2025, 3, 10)),
                expense(102.0, "IQD", "food", date(2025, 2, 10)),
                expense(98.0, "IQD", "food", date(2025, 1, 10)),
            ],
            ..Default::default()
        };

        let forecast = expense_forecast(
            &ledger,
            &CategoryCatalog::default(),
            &converter(),
            3,
            date(2025, 3, 15),
            "IQD",
        )
        .await
        .unwrap();

        assert_eq!(forecast.expected_total, 100.0);
        assert_eq!(forecast.by_category[0].0, "food");
        assert_eq!(forecast.confidence, Confidence::High);
    }
}
