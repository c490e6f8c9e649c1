use chrono::NaiveDate;
use masarif::core::category::CategoryCatalog;
use masarif::core::config::default_fallback_rates;
use masarif::core::convert::CurrencyConverter;
use masarif::core::model::{Expense, Period};
use masarif::core::resolver::{FallbackTable, RateResolver};
use masarif::core::summary::period_summary;
use masarif::store::disk::FjallRateStore;
use masarif::store::memory::{MemoryLedger, MemoryRateStore};
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_aggregation_persists_fallback_rate_end_to_end() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = Arc::new(FjallRateStore::open(dir.path()).expect("Failed to open store"));
    let converter = CurrencyConverter::new(
        store.clone(),
        FallbackTable::from_entries(&default_fallback_rates()),
    );
    let catalog = CategoryCatalog::default();

    let ledger = MemoryLedger {
        expenses: vec![Expense {
            amount: 100.0,
            currency: "USD".to_string(),
            category: "food".to_string(),
            date: date(2025, 1, 5),
            note: None,
        }],
        ..Default::default()
    };

    let period = Period::new(date(2025, 1, 1), date(2025, 1, 31));
    let summary = period_summary(&ledger, &catalog, &converter, Some(&period), None, "IQD")
        .await
        .expect("Aggregation failed");

    // 100 USD at the fallback rate of 1315.
    assert_eq!(summary.target_currency, "IQD");
    assert_eq!(summary.total_expenses, 131500.0);
    assert_eq!(summary.total_income, 0.0);
    assert_eq!(summary.balance, -131500.0);

    assert_eq!(summary.by_category.len(), 1);
    assert_eq!(summary.by_category[0].category, "food");
    assert_eq!(summary.by_category[0].amount, 131500.0);
    assert_eq!(summary.by_category[0].percentage, 100.0);
    assert_eq!(summary.by_category[0].count, 1);

    // The fallback hit was persisted as a fresh row.
    use masarif::core::currency::RateStore;
    let row = store.get("USD", "IQD").await.expect("Rate was not stored");
    assert_eq!(row.rate, 1315.0);
    assert!(row.is_fresh(chrono::Utc::now()));
}

#[test_log::test(tokio::test)]
async fn test_concurrent_resolution_of_missing_pair_is_benign() {
    // Two resolutions of the same missing pair may interleave: both miss the
    // store, both consult the fallback table, both upsert. The writes carry
    // the same value, so last-write-wins leaves a single correct row.
    let store = Arc::new(MemoryRateStore::new());
    let resolver = RateResolver::new(
        store.clone(),
        FallbackTable::from_entries(&default_fallback_rates()),
    );

    let (a, b) = tokio::join!(
        resolver.resolve("USD", "IQD"),
        resolver.resolve("USD", "IQD")
    );
    assert_eq!(a, 1315.0);
    assert_eq!(b, 1315.0);

    use masarif::core::currency::RateStore;
    let rows = store.list().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].rate, 1315.0);
}

#[test_log::test(tokio::test)]
async fn test_reverse_consistency_through_the_converter() {
    // With only USD -> IQD stored, converting back uses the inverse.
    let store = Arc::new(MemoryRateStore::new());
    use masarif::core::currency::RateStore;
    store.upsert("USD", "IQD", 1250.0).await;

    let converter = CurrencyConverter::new(store, FallbackTable::default());
    let converted = converter.convert(1250.0, "IQD", "USD").await;
    assert!((converted - 1.0).abs() < 1e-9);
}
