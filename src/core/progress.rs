//! Budget, savings, and goal progress calculators
//!
//! Pure functions over already-aggregated amounts. Everything here is
//! recomputed on every query; nothing is cached or persisted.

use crate::core::model::Budget;
use chrono::NaiveDate;

/// Months of history the savings average looks back over.
pub const SAVINGS_WINDOW_MONTHS: usize = 6;

/// Months of history the expense forecast looks back over.
pub const FORECAST_WINDOW_MONTHS: usize = 3;

/// Month length used by goal projections. A fixed approximation, not
/// calendar-accurate.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Derived status of one budget against its period spending.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    pub category: String,
    pub currency: String,
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percentage: f64,
    pub exceeded: bool,
}

/// `spent` must already be converted into the budget's own currency.
pub fn budget_status(budget: &Budget, spent: f64) -> BudgetStatus {
    let percentage = if budget.amount > 0.0 {
        spent / budget.amount * 100.0
    } else {
        0.0
    };
    BudgetStatus {
        category: budget.category.clone(),
        currency: budget.currency.clone(),
        limit: budget.amount,
        spent,
        remaining: budget.amount - spent,
        percentage,
        // Spending exactly the budget is not an overrun.
        exceeded: spent > budget.amount,
    }
}

/// Average savings over a series of monthly balances.
///
/// Months with a positive balance carry the average; loss and break-even
/// months are excluded, not counted as zero. Only when no month is positive
/// does the mean run over all months, floored at zero so the figure is
/// never a negative "savings" number.
pub fn average_monthly_savings(balances: &[f64]) -> f64 {
    if balances.is_empty() {
        return 0.0;
    }
    let positive: Vec<f64> = balances.iter().copied().filter(|b| *b > 0.0).collect();
    if !positive.is_empty() {
        positive.iter().sum::<f64>() / positive.len() as f64
    } else {
        (balances.iter().sum::<f64>() / balances.len() as f64).max(0.0)
    }
}

/// Projected time to finish saving for a goal.
///
/// The two terminal states are distinct: an already-reached goal reports
/// zero time, while missing savings history reports `None` fields — callers
/// must not collapse them into one sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalEta {
    pub months: Option<u32>,
    pub days: Option<u32>,
    pub label: String,
}

pub fn time_to_goal(remaining: f64, average_monthly_savings: f64) -> GoalEta {
    if remaining <= 0.0 {
        return GoalEta {
            months: Some(0),
            days: Some(0),
            label: "complete".to_string(),
        };
    }
    if average_monthly_savings <= 0.0 {
        return GoalEta {
            months: None,
            days: None,
            label: "unavailable".to_string(),
        };
    }

    let months_needed = remaining / average_monthly_savings;
    if months_needed < 1.0 {
        let days = (months_needed * DAYS_PER_MONTH).ceil() as u32;
        return GoalEta {
            months: Some(0),
            days: Some(days),
            label: format!("{days} days"),
        };
    }

    let whole_months = months_needed.floor() as u32;
    if months_needed < 12.0 {
        let days = ((months_needed - whole_months as f64) * DAYS_PER_MONTH).ceil() as u32;
        let label = if days == 0 {
            format!("{whole_months} months")
        } else {
            format!("{whole_months} months {days} days")
        };
        return GoalEta {
            months: Some(whole_months),
            days: Some(days),
            label,
        };
    }

    let years = whole_months / 12;
    let months = whole_months % 12;
    let label = if months == 0 {
        format!("{years} years")
    } else {
        format!("{years} years {months} months")
    };
    GoalEta {
        months: Some(whole_months),
        days: Some(0),
        label,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// One month of expense history feeding the forecast.
#[derive(Debug, Clone)]
pub struct MonthlyExpenses {
    /// First day of the month.
    pub month: NaiveDate,
    pub total: f64,
    pub by_category: Vec<(String, f64)>,
}

/// Expected spending for the coming month, averaged from history.
#[derive(Debug, Clone)]
pub struct ExpenseForecast {
    pub expected_total: f64,
    /// Expected amount per category, sorted descending.
    pub by_category: Vec<(String, f64)>,
    pub confidence: Confidence,
}

/// Averages the trailing window and classifies confidence from the
/// coefficient of variation of the monthly totals.
pub fn forecast_expenses(samples: &[MonthlyExpenses]) -> ExpenseForecast {
    if samples.is_empty() {
        return ExpenseForecast {
            expected_total: 0.0,
            by_category: Vec::new(),
            confidence: Confidence::Low,
        };
    }

    let n = samples.len() as f64;
    let mean = samples.iter().map(|s| s.total).sum::<f64>() / n;

    let mut by_category: Vec<(String, f64)> = Vec::new();
    for sample in samples {
        for (category, amount) in &sample.by_category {
            match by_category.iter_mut().find(|(c, _)| c == category) {
                Some((_, sum)) => *sum += amount,
                None => by_category.push((category.clone(), *amount)),
            }
        }
    }
    for (_, sum) in &mut by_category {
        // A category absent in some month still averages over the window.
        *sum /= n;
    }
    by_category.sort_by(|a, b| b.1.total_cmp(&a.1));

    let variance = samples
        .iter()
        .map(|s| (s.total - mean).powi(2))
        .sum::<f64>()
        / n;
    let cv = if mean > 0.0 { variance.sqrt() / mean } else { 0.0 };

    let confidence = if cv < 0.15 && samples.len() >= 3 {
        Confidence::High
    } else if cv > 0.3 || samples.len() < 2 {
        Confidence::Low
    } else {
        Confidence::Medium
    };

    ExpenseForecast {
        expected_total: mean,
        by_category,
        confidence,
    }
}
