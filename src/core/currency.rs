//! Currency metadata and the rate-store contract

use crate::core::model::ExchangeRate;
use async_trait::async_trait;

/// Display metadata for a supported currency. Not used by any numeric path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
}

/// Currencies the tracker lets a user pick as a record or target currency.
pub const CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo {
        code: "IQD",
        symbol: "د.ع",
        name: "Iraqi Dinar",
    },
    CurrencyInfo {
        code: "USD",
        symbol: "$",
        name: "US Dollar",
    },
    CurrencyInfo {
        code: "EUR",
        symbol: "€",
        name: "Euro",
    },
    CurrencyInfo {
        code: "GBP",
        symbol: "£",
        name: "British Pound",
    },
    CurrencyInfo {
        code: "TRY",
        symbol: "₺",
        name: "Turkish Lira",
    },
    CurrencyInfo {
        code: "SAR",
        symbol: "ر.س",
        name: "Saudi Riyal",
    },
    CurrencyInfo {
        code: "AED",
        symbol: "د.إ",
        name: "UAE Dirham",
    },
    CurrencyInfo {
        code: "KWD",
        symbol: "د.ك",
        name: "Kuwaiti Dinar",
    },
];

pub fn currency_info(code: &str) -> Option<&'static CurrencyInfo> {
    CURRENCIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
}

pub fn is_supported(code: &str) -> bool {
    currency_info(code).is_some()
}

/// Persistence contract for exchange rates.
///
/// A missing pair is a normal state, so reads return `Option` rather than an
/// error. Implementations swallow their own storage failures the same way;
/// conversions must keep working when the store misbehaves.
#[async_trait]
pub trait RateStore: Send + Sync {
    async fn get(&self, from: &str, to: &str) -> Option<ExchangeRate>;

    /// Overwrites any existing row for the ordered pair and stamps
    /// `updated_at` with the current time.
    async fn upsert(&self, from: &str, to: &str, rate: f64);

    async fn list(&self) -> Vec<ExchangeRate>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_lookup_is_case_insensitive() {
        assert_eq!(currency_info("usd").unwrap().code, "USD");
        assert_eq!(currency_info("IQD").unwrap().symbol, "د.ع");
        assert!(currency_info("XXX").is_none());
    }

    #[test]
    fn test_supported_set() {
        assert!(is_supported("IQD"));
        assert!(is_supported("eur"));
        assert!(!is_supported("BTC"));
    }
}
