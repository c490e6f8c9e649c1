use crate::core::currency::RateStore;
use crate::core::model::{Budget, ExchangeRate, Expense, Goal, Income, LedgerSource, Period};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory rate store backed by a HashMap keyed on the ordered pair.
pub struct MemoryRateStore {
    inner: Arc<Mutex<HashMap<(String, String), ExchangeRate>>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Inserts a row verbatim, `updated_at` included. Lets tests plant
    /// stale rows; normal writes go through `upsert`.
    pub async fn seed(&self, rate: ExchangeRate) {
        let mut rates = self.inner.lock().await;
        rates.insert((rate.from.clone(), rate.to.clone()), rate);
    }
}

impl Default for MemoryRateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn get(&self, from: &str, to: &str) -> Option<ExchangeRate> {
        let rates = self.inner.lock().await;
        let row = rates.get(&(from.to_string(), to.to_string())).cloned();
        if row.is_some() {
            debug!("Rate store HIT for {from} -> {to}");
        } else {
            debug!("Rate store MISS for {from} -> {to}");
        }
        row
    }

    async fn upsert(&self, from: &str, to: &str, rate: f64) {
        let mut rates = self.inner.lock().await;
        debug!("Rate store PUT for {from} -> {to}: {rate}");
        rates.insert(
            (from.to_string(), to.to_string()),
            ExchangeRate {
                from: from.to_string(),
                to: to.to_string(),
                rate,
                updated_at: Utc::now(),
            },
        );
    }

    async fn list(&self) -> Vec<ExchangeRate> {
        let rates = self.inner.lock().await;
        rates.values().cloned().collect()
    }
}

/// In-memory ledger for tests and embedders without a database.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    pub expenses: Vec<Expense>,
    pub income: Vec<Income>,
    pub budgets: Vec<Budget>,
    pub goals: Vec<Goal>,
}

#[async_trait]
impl LedgerSource for MemoryLedger {
    async fn expenses(&self, period: Option<&Period>) -> Result<Vec<Expense>> {
        Ok(self
            .expenses
            .iter()
            .filter(|e| period.is_none_or(|p| p.contains(e.date)))
            .cloned()
            .collect())
    }

    async fn income(&self, period: Option<&Period>) -> Result<Vec<Income>> {
        Ok(self
            .income
            .iter()
            .filter(|i| period.is_none_or(|p| p.contains(i.date)))
            .cloned()
            .collect())
    }

    async fn budgets(&self) -> Result<Vec<Budget>> {
        Ok(self.budgets.clone())
    }

    async fn goals(&self) -> Result<Vec<Goal>> {
        Ok(self.goals.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_store_get_upsert() {
        let store = MemoryRateStore::new();

        // Initially, the store is empty
        assert!(store.get("USD", "IQD").await.is_none());

        store.upsert("USD", "IQD", 1315.0).await;

        let row = store.get("USD", "IQD").await.unwrap();
        assert_eq!(row.rate, 1315.0);
        assert!(row.is_fresh(Utc::now()));

        // The reverse pair is a distinct row
        assert!(store.get("IQD", "USD").await.is_none());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_existing_row() {
        let store = MemoryRateStore::new();
        store.upsert("USD", "IQD", 1315.0).await;
        store.upsert("USD", "IQD", 1400.0).await;

        assert_eq!(store.get("USD", "IQD").await.unwrap().rate, 1400.0);
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_ledger_period_filter() {
        let date = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
        let ledger = MemoryLedger {
            expenses: vec![
                Expense {
                    amount: 10.0,
                    currency: "IQD".to_string(),
                    category: "food".to_string(),
                    date: date(5),
                    note: None,
                },
                Expense {
                    amount: 20.0,
                    currency: "IQD".to_string(),
                    category: "food".to_string(),
                    date: date(25),
                    note: None,
                },
            ],
            ..Default::default()
        };

        let period = Period::new(date(1), date(10));
        let filtered = ledger.expenses(Some(&period)).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].amount, 10.0);

        let all = ledger.expenses(None).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
