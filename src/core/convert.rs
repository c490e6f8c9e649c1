//! Currency conversion

use crate::core::currency::RateStore;
use crate::core::resolver::{FallbackTable, RateResolver};
use std::sync::Arc;
use tracing::debug;

/// Converts amounts between currencies through the resolution pipeline.
///
/// Never fails: the worst case is an unresolved pair, which converts at an
/// identity rate with a logged warning. Resolution may persist a fallback
/// rate row as a side effect.
pub struct CurrencyConverter {
    resolver: RateResolver,
}

impl CurrencyConverter {
    pub fn new(store: Arc<dyn RateStore>, fallback: FallbackTable) -> Self {
        CurrencyConverter {
            resolver: RateResolver::new(store, fallback),
        }
    }

    pub fn resolver(&self) -> &RateResolver {
        &self.resolver
    }

    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> f64 {
        // Exact identity; no rate multiplication, no resolver call.
        if from.eq_ignore_ascii_case(to) {
            return amount;
        }
        let rate = self.resolver.resolve(from, to).await;
        let converted = amount * rate;
        debug!("Converted {amount} {from} -> {converted} {to} at rate {rate}");
        converted
    }
}
