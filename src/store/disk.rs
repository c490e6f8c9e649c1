use crate::core::currency::RateStore;
use crate::core::model::ExchangeRate;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

/// Persistent rate store on a fjall keyspace partition.
///
/// Keys are `"FROM:TO"`, values are JSON rows. Storage failures degrade to
/// a miss or a dropped write with a debug log; a broken store must not
/// block conversions.
pub struct FjallRateStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl FjallRateStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let keyspace = fjall::Config::new(path).open()?;
        let partition =
            keyspace.open_partition("exchange_rates", PartitionCreateOptions::default())?;
        Ok(Self {
            keyspace,
            partition,
        })
    }

    fn key(from: &str, to: &str) -> String {
        format!("{from}:{to}")
    }
}

#[async_trait]
impl RateStore for FjallRateStore {
    async fn get(&self, from: &str, to: &str) -> Option<ExchangeRate> {
        let key = Self::key(from, to);
        let res: Result<Option<ExchangeRate>> = (|| {
            if let Some(value) = self.partition.get(key.as_bytes())? {
                let row: ExchangeRate = serde_json::from_slice(&value)?;
                debug!("Rate store HIT for {key}");
                return Ok(Some(row));
            }
            debug!("Rate store MISS for {key}");
            Ok(None)
        })();

        match res {
            Ok(row) => row,
            Err(e) => {
                debug!("FjallRateStore get error: {e}");
                None
            }
        }
    }

    async fn upsert(&self, from: &str, to: &str, rate: f64) {
        let row = ExchangeRate {
            from: from.to_string(),
            to: to.to_string(),
            rate,
            updated_at: Utc::now(),
        };
        let res: Result<()> = (|| {
            self.partition
                .insert(Self::key(from, to).as_bytes(), serde_json::to_vec(&row)?)?;
            self.keyspace.persist(PersistMode::Buffer)?;
            debug!("Rate store PUT for {from}:{to}");
            Ok(())
        })();
        if let Err(e) = res {
            debug!("FjallRateStore upsert error: {e}");
        }
    }

    async fn list(&self) -> Vec<ExchangeRate> {
        let mut rows = Vec::new();
        for item in self.partition.iter() {
            match item {
                Ok((_, value)) => match serde_json::from_slice(&value) {
                    Ok(row) => rows.push(row),
                    Err(e) => debug!("FjallRateStore skipping undecodable row: {e}"),
                },
                Err(e) => {
                    debug!("FjallRateStore list error: {e}");
                    break;
                }
            }
        }
        rows
    }
}
