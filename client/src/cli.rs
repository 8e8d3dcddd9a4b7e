use std::num::NonZeroUsize;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use common::ConfigLoader;
use kv_store::StoreKind;
use stress::StressOptions;

const CONFIG_SCOPE: &str = "stress";

#[derive(Parser, Debug)]
#[clap(author, version)]
#[clap(name = "kv-stress")]
#[clap(about = "Runs concurrent readers and writers against a key-value store, checking every read", long_about = None)]
#[clap(
    after_help = "Throughput reports and the final summary are logged at info level. Filters set with RUST_LOG above info (warn, error) hide them."
)]
pub struct Cli {
    /// Number of reader threads [default: 1]
    #[clap(short, long)]
    pub readers: Option<NonZeroUsize>,

    /// Number of writer threads, each inserting the whole key pool [default: 1]
    #[clap(short, long)]
    pub writers: Option<NonZeroUsize>,

    /// Config file with a `stress` section
    #[clap(short, long)]
    pub config: Option<String>,

    /// Number of keys in the pool [default: 5000000]
    #[clap(short = 'n', long)]
    pub keys: Option<usize>,

    /// Store capacity hint as a power of two, at most 32 [default: 22]
    #[clap(short, long)]
    pub power: Option<u32>,

    /// Store under test, `sharded` or `locked` [default: sharded]
    #[clap(short, long)]
    pub store: Option<StoreKind>,

    /// Seed for key generation and reader sampling
    #[clap(long)]
    pub seed: Option<u64>,

    /// Milliseconds between throughput reports [default: 1000]
    #[clap(long)]
    pub interval_ms: Option<u64>,

    /// Stop after this many reports
    #[clap(long)]
    pub max_reports: Option<NonZeroUsize>,

    /// Stop once all writers finished and this many more reports were printed
    #[clap(long)]
    pub reports_after_writers: Option<usize>,
}

impl Cli {
    /// Loads options from the config file (or the environment alone) and applies the flags given
    /// on the command line over them.
    pub fn options(&self) -> Result<StressOptions> {
        let config = match &self.config {
            Some(path) => ConfigLoader::new(path, CONFIG_SCOPE.to_string())?,
            None => ConfigLoader::from_env(CONFIG_SCOPE.to_string()),
        };

        let mut options: StressOptions = config.load()?;
        self.apply(&mut options);

        Ok(options)
    }

    fn apply(&self, options: &mut StressOptions) {
        if let Some(readers) = self.readers {
            options.readers = readers.get();
        }
        if let Some(writers) = self.writers {
            options.writers = writers.get();
        }
        if let Some(keys) = self.keys {
            options.pool_size = keys;
        }
        if let Some(power) = self.power {
            options.capacity_power = power;
        }
        if let Some(store) = self.store {
            options.store = store;
        }
        if let Some(seed) = self.seed {
            options.seed = Some(seed);
        }
        if let Some(interval_ms) = self.interval_ms {
            options.report_interval = Duration::from_millis(interval_ms);
        }
        if let Some(max_reports) = self.max_reports {
            options.max_reports = Some(max_reports.get());
        }
        if let Some(reports_after_writers) = self.reports_after_writers {
            options.reports_after_writers = Some(reports_after_writers);
        }
    }
}
