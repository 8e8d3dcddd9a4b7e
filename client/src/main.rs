mod cli;

use std::future::Future;
use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info, warn};
use stress::{StopSignal, StressOptions, Summary};

/// Exit status when a second interrupt abandons writers still finishing their pass.
const FORCED_EXIT_CODE: i32 = 130;

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let options = cli.options()?;
    options.validate()?;

    info!("{:?}", options);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("Failed to build the signal runtime")?;

    let summary = runtime.block_on(async_main(options))?;

    drop(runtime);

    if summary.has_mismatches() {
        error!(
            "{} reads returned the value of another key",
            summary.reads().mismatches
        );
        std::process::exit(1);
    }

    Ok(())
}

async fn async_main(options: StressOptions) -> Result<Summary> {
    let stop = StopSignal::new();

    let interrupt = stop.clone();
    tokio::spawn(async move {
        if let Some(code) = watch_interrupts(&interrupt, tokio::signal::ctrl_c).await {
            std::process::exit(code);
        }
    });

    tokio::task::spawn_blocking(move || stress::run(&options, &stop))
        .await
        .context("The harness task did not complete")?
}

/// The first interrupt stops the readers and lets writers finish their pass. A second one returns
/// the status the process should exit with right away.
async fn watch_interrupts<F, Fut>(stop: &StopSignal, mut interrupted: F) -> Option<i32>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    interrupted().await.ok()?;
    info!("Interrupted, stopping readers. Writers finish their pass, interrupt again to exit now");
    stop.stop();

    interrupted().await.ok()?;
    warn!("Interrupted again, exiting without waiting for writers");

    Some(FORCED_EXIT_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::{pending, ready};

    #[tokio::test]
    async fn test_second_interrupt_forces_exit() {
        let stop = StopSignal::new();

        let code = watch_interrupts(&stop, || ready(Ok(()))).await;

        assert_eq!(code, Some(FORCED_EXIT_CODE));
        assert!(stop.is_stopped());
    }

    #[tokio::test]
    async fn test_first_interrupt_only_stops() {
        let stop = StopSignal::new();
        let mut calls = 0;

        let watch = watch_interrupts(&stop, || {
            calls += 1;
            let first = calls == 1;
            async move {
                if first {
                    Ok(())
                } else {
                    pending().await
                }
            }
        });

        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(50), watch).await;

        assert!(timed_out.is_err());
        assert!(stop.is_stopped());
    }

    #[tokio::test]
    async fn test_failed_handler_never_stops() {
        let stop = StopSignal::new();

        let code = watch_interrupts(&stop, || {
            ready(Err(io::Error::new(io::ErrorKind::Other, "no handler")))
        })
        .await;

        assert_eq!(code, None);
        assert!(!stop.is_stopped());
    }
}
