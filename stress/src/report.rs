use std::fmt;
use std::time::{Duration, Instant};

use super::{PaddedStats, Role, StatsSnapshot};

const MILLION: f64 = 1_000_000.0;

#[derive(Clone, Debug, PartialEq)]
pub struct TaskThroughput {
    pub role: Role,
    pub id: usize,
    /// Successful operations per second, in millions, since the previous sample.
    pub mops: f64,
    pub successes: usize,
}

/// Per-task throughput over one reporting interval.
#[derive(Clone, Debug, PartialEq)]
pub struct ThroughputReport {
    pub elapsed: Duration,
    pub readers: Vec<TaskThroughput>,
    pub writers: Vec<TaskThroughput>,
}

impl fmt::Display for ThroughputReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[tput in MOPS]")?;

        for reader in &self.readers {
            write!(f, " reader{} {:4.2}", reader.id, reader.mops)?;
        }

        for writer in &self.writers {
            write!(
                f,
                " writer{} {:4.2} ({})",
                writer.id, writer.mops, writer.successes
            )?;
        }

        Ok(())
    }
}

/// Turns the running success counters of every task into per-interval rates.
pub struct Sampler<'a> {
    readers: &'a [PaddedStats],
    writers: &'a [PaddedStats],
    last_readers: Vec<usize>,
    last_writers: Vec<usize>,
    last_at: Instant,
}

impl<'a> Sampler<'a> {
    pub fn new(readers: &'a [PaddedStats], writers: &'a [PaddedStats], start: Instant) -> Self {
        Self {
            readers,
            writers,
            last_readers: vec![0; readers.len()],
            last_writers: vec![0; writers.len()],
            last_at: start,
        }
    }

    pub fn sample(&mut self, now: Instant) -> ThroughputReport {
        let elapsed = now.saturating_duration_since(self.last_at);
        self.last_at = now;

        ThroughputReport {
            elapsed,
            readers: throughput(self.readers, &mut self.last_readers, elapsed),
            writers: throughput(self.writers, &mut self.last_writers, elapsed),
        }
    }
}

fn throughput(
    stats: &[PaddedStats],
    last: &mut [usize],
    elapsed: Duration,
) -> Vec<TaskThroughput> {
    let secs = elapsed.as_secs_f64();

    stats
        .iter()
        .zip(last.iter_mut())
        .map(|(stats, last)| {
            let successes = stats.successes();
            let delta = successes.saturating_sub(*last);
            *last = successes;

            TaskThroughput {
                role: stats.role(),
                id: stats.id(),
                mops: if secs > 0.0 {
                    delta as f64 / secs / MILLION
                } else {
                    0.0
                },
                successes,
            }
        })
        .collect()
}

/// Totals for a finished run.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub elapsed: Duration,
    pub reports: usize,
    pub total_inserted: usize,
    pub store_len: usize,
    pub readers: Vec<StatsSnapshot>,
    pub writers: Vec<StatsSnapshot>,
}

impl Summary {
    pub fn from_stats(
        readers: &[PaddedStats],
        writers: &[PaddedStats],
        total_inserted: usize,
        store_len: usize,
        reports: usize,
        elapsed: Duration,
    ) -> Self {
        Self {
            elapsed,
            reports,
            total_inserted,
            store_len,
            readers: readers.iter().map(|stats| stats.snapshot()).collect(),
            writers: writers.iter().map(|stats| stats.snapshot()).collect(),
        }
    }

    pub fn reads(&self) -> StatsSnapshot {
        self.readers.iter().copied().sum()
    }

    pub fn writes(&self) -> StatsSnapshot {
        self.writers.iter().copied().sum()
    }

    pub fn has_mismatches(&self) -> bool {
        self.reads().mismatches > 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reads = self.reads();
        let writes = self.writes();

        write!(
            f,
            "Elapsed: {:.2}s, Reports: {}, Inserted: {}, Store Entries: {}, Writes: {}, Write Failures: {}, Reads: {}, Read Matches: {}, Misses: {}, Mismatches: {}",
            self.elapsed.as_secs_f64(),
            self.reports,
            self.total_inserted,
            self.store_len,
            writes.ops,
            writes.failures,
            reads.ops,
            reads.successes,
            reads.misses,
            reads.mismatches
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ThreadStats;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_sampler_reports_delta_rate() {
        let readers = ThreadStats::allocate(Role::Reader, 2);
        let writers = ThreadStats::allocate(Role::Writer, 1);
        let start = Instant::now();
        let mut sampler = Sampler::new(&readers, &writers, start);

        for _ in 0..2_000_000 {
            readers[0].record_success();
        }
        for _ in 0..500_000 {
            writers[0].record_success();
        }

        let report = sampler.sample(start + Duration::from_secs(2));

        assert_eq!(report.elapsed, Duration::from_secs(2));
        assert_approx_eq!(report.readers[0].mops, 1.0);
        assert_approx_eq!(report.readers[1].mops, 0.0);
        assert_approx_eq!(report.writers[0].mops, 0.25);
        assert_eq!(report.writers[0].successes, 500_000);

        for _ in 0..1_000_000 {
            readers[0].record_success();
        }

        let report = sampler.sample(start + Duration::from_secs(3));

        assert_approx_eq!(report.readers[0].mops, 1.0);
        assert_approx_eq!(report.writers[0].mops, 0.0);
        assert_eq!(report.writers[0].successes, 500_000);
    }

    #[test]
    fn test_sampler_zero_elapsed() {
        let readers = ThreadStats::allocate(Role::Reader, 1);
        let start = Instant::now();
        let mut sampler = Sampler::new(&readers, &[], start);

        readers[0].record_success();

        let report = sampler.sample(start);

        assert_approx_eq!(report.readers[0].mops, 0.0);
        assert!(report.writers.is_empty());
    }

    #[test]
    fn test_report_line() {
        let report = ThroughputReport {
            elapsed: Duration::from_secs(1),
            readers: vec![TaskThroughput {
                role: Role::Reader,
                id: 0,
                mops: 1.5,
                successes: 1_500_000,
            }],
            writers: vec![TaskThroughput {
                role: Role::Writer,
                id: 0,
                mops: 0.25,
                successes: 250_000,
            }],
        };

        assert_eq!(
            report.to_string(),
            "[tput in MOPS] reader0 1.50 writer0 0.25 (250000)"
        );
    }

    #[test]
    fn test_summary_totals() {
        let readers = ThreadStats::allocate(Role::Reader, 2);
        let writers = ThreadStats::allocate(Role::Writer, 1);

        readers[0].record_op();
        readers[0].record_success();
        readers[1].record_op();
        readers[1].record_mismatch();
        writers[0].record_op();
        writers[0].record_failure();

        let summary = Summary::from_stats(&readers, &writers, 0, 0, 1, Duration::from_secs(1));

        assert_eq!(summary.reads().ops, 2);
        assert_eq!(summary.reads().mismatches, 1);
        assert_eq!(summary.writes().failures, 1);
        assert!(summary.has_mismatches());
        assert!(summary.to_string().contains("Mismatches: 1"));
    }
}
