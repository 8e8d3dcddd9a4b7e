use std::time::Duration;

use anyhow::{anyhow, ensure, Result};
use common::{Config, ConfigLoader};
use kv_store::StoreKind;

pub const DEFAULT_POOL_SIZE: usize = 5_000_000;
pub const DEFAULT_CAPACITY_POWER: u32 = 22;
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

pub const MAX_CAPACITY_POWER: u32 = 32;

#[derive(Clone, Debug, PartialEq)]
pub struct StressOptions {
    pub readers: usize,
    pub writers: usize,
    pub pool_size: usize,
    pub capacity_power: u32,
    pub store: StoreKind,
    pub seed: Option<u64>,
    pub report_interval: Duration,
    /// End the run after this many reports regardless of progress.
    pub max_reports: Option<usize>,
    /// End the run once every writer finished its pass and this many further reports were made.
    pub reports_after_writers: Option<usize>,
}

impl StressOptions {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.readers > 0, "readers must be a positive integer");
        ensure!(self.writers > 0, "writers must be a positive integer");
        ensure!(
            self.capacity_power <= MAX_CAPACITY_POWER,
            "power must be at most {}, was {}",
            MAX_CAPACITY_POWER,
            self.capacity_power
        );
        ensure!(
            !self.report_interval.is_zero(),
            "the report interval must be greater than zero"
        );
        ensure!(
            self.max_reports != Some(0),
            "max_reports must be a positive integer"
        );

        Ok(())
    }

    pub fn capacity_hint(&self) -> Result<usize> {
        1usize
            .checked_shl(self.capacity_power)
            .ok_or_else(|| anyhow!("power {} is too large", self.capacity_power))
    }
}

impl Default for StressOptions {
    fn default() -> Self {
        Self {
            readers: 1,
            writers: 1,
            pool_size: DEFAULT_POOL_SIZE,
            capacity_power: DEFAULT_CAPACITY_POWER,
            store: StoreKind::default(),
            seed: None,
            report_interval: DEFAULT_REPORT_INTERVAL,
            max_reports: None,
            reports_after_writers: None,
        }
    }
}

impl Config for StressOptions {
    fn load(config: &ConfigLoader) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            readers: config.parse("readers")?.unwrap_or(defaults.readers),
            writers: config.parse("writers")?.unwrap_or(defaults.writers),
            pool_size: config.parse("pool_size")?.unwrap_or(defaults.pool_size),
            capacity_power: config
                .parse("power")?
                .unwrap_or(defaults.capacity_power),
            store: config.parse("store")?.unwrap_or(defaults.store),
            seed: config.parse("seed")?,
            report_interval: config
                .parse("interval_ms")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.report_interval),
            max_reports: config.parse("max_reports")?,
            reports_after_writers: config.parse("reports_after_writers")?,
        })
    }
}
