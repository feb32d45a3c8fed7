/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinHandle;

mod opts;
pub use opts::{ProcArgs, add_global_args, parse_global_args};

pub mod build;
pub mod keys;
pub mod kind;
pub mod log;
pub mod report;
pub mod runner;
pub mod schedule;
pub mod signal;
pub mod sink;
pub mod stats;
pub mod tags;
pub mod value;

use report::StatsReporter;
use runner::{RunContext, Runner};
use signal::QuitAction;
use sink::StatsdSink;
use stats::EmitSnapshot;

/// Generate metrics until a quit signal is received.
///
/// The final totals are logged before returning.
pub async fn run(proc_args: &ProcArgs) -> anyhow::Result<()> {
    let quit = QuitAction::default();
    signal::register_quit(quit.clone()).context("failed to register quit signals")?;

    let ctx = Arc::new(RunContext::new(proc_args.value_mode().build()));
    let mut runner = Runner::new(Arc::clone(&ctx));
    for config in proc_args.kinds() {
        if config.is_idle() {
            continue;
        }
        let sink = StatsdSink::build(proc_args.statsd_config(), proc_args.tags())?;
        runner
            .spawn_kind(config, sink)
            .context(format!("failed to start {} firehose", config.kind()))?;
    }

    let reporter = StatsReporter::new(Arc::clone(&ctx)).spawn(proc_args.report_interval());
    shutdown_on_quit(&runner, &reporter, &quit).await;
    Ok(())
}

/// Wait for `quit`, then stop the runner and the reporter and log the final
/// totals once.
///
/// Workers are not waited for. The logged totals are returned.
pub async fn shutdown_on_quit(
    runner: &Runner,
    reporter: &JoinHandle<()>,
    quit: &QuitAction,
) -> EmitSnapshot {
    quit.wait().await;
    runner.stop();
    reporter.abort();

    let totals = runner.context().stats().snapshot();
    report::log_final_totals(&totals);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::kind::MetricKind;
    use crate::runner::KindConfig;
    use crate::signal::AsyncSignalAction;
    use crate::sink::recording::RecordingSink;
    use crate::value::ValueMode;

    fn new_context() -> Arc<RunContext> {
        Arc::new(RunContext::new(ValueMode::Fixed.build()))
    }

    fn fire(quit: &QuitAction) {
        let quit = quit.clone();
        tokio::spawn(async move { quit.run().await });
    }

    #[tokio::test]
    async fn final_totals_on_quit() {
        let ctx = new_context();
        for _ in 0..120 {
            ctx.stats().add_emitted(MetricKind::Gauge);
        }
        for _ in 0..45 {
            ctx.stats().add_emitted(MetricKind::Counter);
        }
        let runner = Runner::new(Arc::clone(&ctx));
        let reporter = StatsReporter::new(Arc::clone(&ctx)).spawn(Duration::from_secs(60));
        let quit = QuitAction::default();
        fire(&quit);

        let totals = tokio::time::timeout(
            Duration::from_secs(5),
            shutdown_on_quit(&runner, &reporter, &quit),
        )
        .await
        .unwrap();
        assert_eq!(totals.get(MetricKind::Gauge), 120);
        assert_eq!(totals.get(MetricKind::Counter), 45);
        assert_eq!(totals.get(MetricKind::Distribution), 0);
        assert_eq!(totals.get(MetricKind::Histogram), 0);
        assert!(reporter.await.unwrap_err().is_cancelled());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn quit_stops_emission() {
        let ctx = new_context();
        let mut runner = Runner::new(Arc::clone(&ctx));
        let mut config = KindConfig::new(MetricKind::Counter);
        config.count = 2;
        config.tick = Duration::from_millis(10);
        config.interval = Duration::from_millis(20);
        let sink = RecordingSink::default();
        runner.spawn_kind(&config, sink.clone()).unwrap();

        for _ in 0..500 {
            if sink.len() >= 4 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(sink.len() >= 4);

        let reporter = StatsReporter::new(Arc::clone(&ctx)).spawn(Duration::from_millis(50));
        let quit = QuitAction::default();
        fire(&quit);
        let totals = shutdown_on_quit(&runner, &reporter, &quit).await;
        runner.join().await;
        // workers drain what was already queued
        tokio::time::sleep(Duration::from_millis(100)).await;

        let emitted = ctx.stats().emitted(MetricKind::Counter);
        assert!(totals.get(MetricKind::Counter) >= 4);
        assert!(totals.get(MetricKind::Counter) <= emitted);
        assert_eq!(emitted as usize, sink.len());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(ctx.stats().emitted(MetricKind::Counter), emitted);
    }
}
