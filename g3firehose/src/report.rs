/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::kind::MetricKind;
use crate::runner::RunContext;
use crate::stats::EmitSnapshot;

fn kind_label(kind: MetricKind) -> &'static str {
    match kind {
        MetricKind::Gauge => "gauges",
        MetricKind::Counter => "counters",
        MetricKind::Distribution => "dists",
        MetricKind::Histogram => "hists",
    }
}

pub(crate) fn progress_line(kind: MetricKind, total: u64, diff: u64) -> String {
    format!("{} updated: {total}, diff: {diff}", kind_label(kind))
}

pub(crate) fn final_line(kind: MetricKind, total: u64) -> String {
    format!("{} updated: {total}", kind_label(kind))
}

/// Periodically logs the cumulative emission counts and their increase.
pub struct StatsReporter {
    ctx: Arc<RunContext>,
    last: EmitSnapshot,
}

impl StatsReporter {
    pub fn new(ctx: Arc<RunContext>) -> Self {
        StatsReporter {
            ctx,
            last: EmitSnapshot::default(),
        }
    }

    /// Take a new snapshot, log it and make it the next baseline.
    ///
    /// Returns the totals and the increase since the previous call.
    pub fn report(&mut self) -> (EmitSnapshot, EmitSnapshot) {
        let current = self.ctx.stats().snapshot();
        let diff = current.delta(&self.last);
        for kind in MetricKind::ALL {
            info!("{}", progress_line(kind, current.get(kind), diff.get(kind)));
        }
        self.last = current;
        (current, diff)
    }

    pub fn spawn(mut self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                self.report();
            }
        })
    }
}

pub fn log_final_totals(snapshot: &EmitSnapshot) {
    info!(":: FINAL TOTALS");
    for kind in MetricKind::ALL {
        info!("{}", final_line(kind, snapshot.get(kind)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueMode;

    fn new_context() -> Arc<RunContext> {
        Arc::new(RunContext::new(ValueMode::Fixed.build()))
    }

    #[test]
    fn lines() {
        assert_eq!(
            progress_line(MetricKind::Gauge, 120, 20),
            "gauges updated: 120, diff: 20"
        );
        assert_eq!(final_line(MetricKind::Counter, 45), "counters updated: 45");
        assert_eq!(final_line(MetricKind::Distribution, 0), "dists updated: 0");
        assert_eq!(final_line(MetricKind::Histogram, 0), "hists updated: 0");
    }

    #[test]
    fn diff_since_last_report() {
        let ctx = new_context();
        let mut reporter = StatsReporter::new(Arc::clone(&ctx));

        for _ in 0..3 {
            ctx.stats().add_emitted(MetricKind::Gauge);
        }
        let (total, diff) = reporter.report();
        assert_eq!(total.get(MetricKind::Gauge), 3);
        assert_eq!(diff.get(MetricKind::Gauge), 3);

        ctx.stats().add_emitted(MetricKind::Gauge);
        ctx.stats().add_emitted(MetricKind::Counter);
        let (total, diff) = reporter.report();
        assert_eq!(total.get(MetricKind::Gauge), 4);
        assert_eq!(diff.get(MetricKind::Gauge), 1);
        assert_eq!(diff.get(MetricKind::Counter), 1);

        let (total, diff) = reporter.report();
        assert_eq!(total.get(MetricKind::Gauge), 4);
        assert_eq!(diff, EmitSnapshot::default());
    }
}
