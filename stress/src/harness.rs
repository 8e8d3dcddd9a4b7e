use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use common::create_worker_rng;
use kv_store::Store;
use log::info;

use super::{
    InsertionCursor, KeyPool, PaddedStats, Reader, Role, Sampler, StartGate, StopSignal,
    StressOptions, Summary, ThreadStats, Writer,
};

/// Builds the key pool and the configured store, then runs the harness against them.
pub fn run(options: &StressOptions, stop: &StopSignal) -> Result<Summary> {
    options.validate()?;

    info!("Initializing {} keys", options.pool_size);
    let pool = KeyPool::generate(options.pool_size, options.seed)?;

    let capacity_hint = options.capacity_hint()?;
    info!(
        "Initializing {} store with capacity hint {}",
        options.store, capacity_hint
    );
    let store = options.store.build(capacity_hint)?;

    run_harness(options, &pool, &*store, stop)
}

/// Drives `options.writers` writers and `options.readers` readers against `store` and reports
/// throughput every interval until `stop` is raised or a configured limit is reached. Every task
/// is joined before this returns.
pub fn run_harness<S>(
    options: &StressOptions,
    pool: &KeyPool,
    store: &S,
    stop: &StopSignal,
) -> Result<Summary>
where
    S: Store + ?Sized,
{
    options.validate()?;

    let reader_stats = ThreadStats::allocate(Role::Reader, options.readers);
    let writer_stats = ThreadStats::allocate(Role::Writer, options.writers);
    let cursor = InsertionCursor::new();
    let gate = StartGate::new();
    let writers_done = AtomicUsize::new(0);
    let seed = pool.seed().or(options.seed).unwrap_or_default();

    let (reports, elapsed) = crossbeam::scope(|s| -> Result<_> {
        let cursor = &cursor;
        let gate = &gate;
        let writers_done = &writers_done;

        for stats in writer_stats.iter() {
            let spawned = s
                .builder()
                .name(format!("writer{}", stats.id()))
                .spawn(move |_| {
                    if !gate.wait(stop) {
                        return;
                    }

                    Writer::new(pool, store, cursor, stats).run();
                    writers_done.fetch_add(1, Ordering::Release);
                });

            if let Err(err) = spawned {
                stop.stop();
                return Err(err)
                    .with_context(|| format!("Can't create thread for writer{}", stats.id()));
            }
        }

        for stats in reader_stats.iter() {
            let rng = create_worker_rng(seed, stats.id());
            let spawned = s
                .builder()
                .name(format!("reader{}", stats.id()))
                .spawn(move |_| {
                    if !gate.wait(stop) {
                        return;
                    }

                    Reader::new(pool, store, cursor, stats, rng).run(stop);
                });

            if let Err(err) = spawned {
                stop.stop();
                return Err(err)
                    .with_context(|| format!("Can't create thread for reader{}", stats.id()));
            }
        }

        let start = Instant::now();
        gate.open();

        let reports = report_until_done(
            options,
            &reader_stats,
            &writer_stats,
            writers_done,
            stop,
            start,
        );

        stop.stop();

        let pending = options.writers - writers_done.load(Ordering::Acquire);
        if pending > 0 {
            info!("Waiting for {} writers to finish their pass", pending);
        }

        Ok((reports, start.elapsed()))
    })
    .map_err(|_| anyhow!("A harness thread panicked"))??;

    let summary = Summary::from_stats(
        &reader_stats,
        &writer_stats,
        cursor.total_inserted(),
        store.len(),
        reports,
        elapsed,
    );

    info!("{}", summary);

    Ok(summary)
}

fn report_until_done(
    options: &StressOptions,
    reader_stats: &[PaddedStats],
    writer_stats: &[PaddedStats],
    writers_done: &AtomicUsize,
    stop: &StopSignal,
    start: Instant,
) -> usize {
    let mut sampler = Sampler::new(reader_stats, writer_stats, start);
    let mut reports = 0;
    let mut reports_since_writers_done = 0;

    while !stop.wait_timeout(options.report_interval) {
        let writers_finished = writers_done.load(Ordering::Acquire) == options.writers;
        let report = sampler.sample(Instant::now());

        info!("{}", report);
        reports += 1;

        if writers_finished {
            reports_since_writers_done += 1;
        }

        if options.max_reports.is_some_and(|max| reports >= max) {
            info!("Reached {} reports, stopping", reports);
            break;
        }

        if options
            .reports_after_writers
            .is_some_and(|after| writers_finished && reports_since_writers_done >= after)
        {
            info!(
                "Writers finished {} reports ago, stopping",
                reports_since_writers_done
            );
            break;
        }
    }

    reports
}
