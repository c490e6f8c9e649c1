//! Exchange-rate resolution
//!
//! Resolution is an ordered pipeline of fallbacks: fresh stored rate,
//! inverted reverse rate, static table refresh, identity default. Each tier
//! short-circuits, and `resolve_detailed` reports which tier produced the
//! number so the tiers stay testable in isolation. The pipeline is total:
//! it always returns a usable rate, even with an empty store and an unknown
//! currency.

use crate::core::currency::RateStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// One entry of the static fallback matrix. Supplied as configuration data;
/// see `core::config::default_fallback_rates` for the embedded default set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackRate {
    pub from: String,
    pub to: String,
    pub rate: f64,
}

/// Static pairwise rate matrix consulted when no stored rate resolves.
#[derive(Debug, Clone, Default)]
pub struct FallbackTable {
    rates: HashMap<(String, String), f64>,
}

impl FallbackTable {
    pub fn from_entries(entries: &[FallbackRate]) -> Self {
        let mut rates = HashMap::new();
        for entry in entries {
            rates.insert(
                (entry.from.to_uppercase(), entry.to.to_uppercase()),
                entry.rate,
            );
        }
        FallbackTable { rates }
    }

    /// Rate for the ordered pair, if the matrix knows it. Pairs are not
    /// inverted here; both directions must be listed as entries.
    pub fn rate(&self, from: &str, to: &str) -> Option<f64> {
        self.rates
            .get(&(from.to_uppercase(), to.to_uppercase()))
            .copied()
    }
}

/// Which tier of the pipeline produced a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    /// Same currency on both sides; no store access happened.
    Identity,
    /// Fresh stored row for the ordered pair.
    Stored,
    /// Inverse of the stored reverse pair.
    Inverted,
    /// Static table hit, persisted to the store as a side effect.
    Fallback,
    /// Nothing resolved; the conversion is silently degraded to 1.
    Unresolved,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRate {
    pub rate: f64,
    pub origin: RateOrigin,
}

pub struct RateResolver {
    store: Arc<dyn RateStore>,
    fallback: FallbackTable,
}

impl RateResolver {
    pub fn new(store: Arc<dyn RateStore>, fallback: FallbackTable) -> Self {
        RateResolver { store, fallback }
    }

    /// Resolves a positive conversion rate for the pair. Total; never fails.
    pub async fn resolve(&self, from: &str, to: &str) -> f64 {
        self.resolve_detailed(from, to).await.rate
    }

    pub async fn resolve_detailed(&self, from: &str, to: &str) -> ResolvedRate {
        let from = from.to_uppercase();
        let to = to.to_uppercase();

        if from == to {
            return ResolvedRate {
                rate: 1.0,
                origin: RateOrigin::Identity,
            };
        }

        let direct = self.store.get(&from, &to).await;
        if let Some(stored) = direct.as_ref().filter(|r| r.is_fresh(Utc::now())) {
            debug!("Fresh stored rate {} -> {}: {}", from, to, stored.rate);
            return ResolvedRate {
                rate: stored.rate,
                origin: RateOrigin::Stored,
            };
        }

        match direct {
            // A stale direct row is never returned; fall through to refresh.
            Some(stale) => {
                debug!(
                    "Stored rate {} -> {} is stale (updated {}), refreshing",
                    from, to, stale.updated_at
                );
            }
            // No direct row at all: the reverse pair inverts. The reverse
            // row's age is not checked before inverting.
            None => {
                if let Some(reverse) = self.store.get(&to, &from).await {
                    debug!(
                        "Inverting reverse rate {} -> {}: {}",
                        to, from, reverse.rate
                    );
                    return ResolvedRate {
                        rate: 1.0 / reverse.rate,
                        origin: RateOrigin::Inverted,
                    };
                }
            }
        }

        if let Some(rate) = self.fallback.rate(&from, &to) {
            debug!("Fallback table rate {} -> {}: {}", from, to, rate);
            self.store.upsert(&from, &to, rate).await;
            return ResolvedRate {
                rate,
                origin: RateOrigin::Fallback,
            };
        }

        warn!(
            "No exchange rate available for {} -> {}, defaulting to 1",
            from, to
        );
        ResolvedRate {
            rate: 1.0,
            origin: RateOrigin::Unresolved,
        }
    }
}
