/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, anyhow};
use log::{Level, debug, info, log};

use crate::keys;
use crate::kind::MetricKind;
use crate::schedule::{
    DUE_QUEUE_SIZE, DueItems, EmissionSchedule, ScheduleConfig, ScheduleError, ScheduledItem,
    Scheduler, TICK_RESOLUTION,
};
use crate::sink::{Emission, MetricSink, MetricValue};
use crate::stats::EmitStats;
use crate::value::ValueGenerator;

/// Level of the per emission diagnostics, shown with a single `-v`.
pub(crate) const EMISSION_LOG_LEVEL: Level = Level::Debug;

/// State shared by all the workers of one run.
pub struct RunContext {
    stats: EmitStats,
    value_generator: Box<dyn ValueGenerator>,
    sample_rate: f64,
}

impl RunContext {
    pub fn new(value_generator: Box<dyn ValueGenerator>) -> Self {
        RunContext {
            stats: EmitStats::default(),
            value_generator,
            sample_rate: 1.0,
        }
    }

    #[inline]
    pub fn stats(&self) -> &EmitStats {
        &self.stats
    }

    fn value(&self, kind: MetricKind) -> MetricValue {
        match kind {
            MetricKind::Counter => MetricValue::Integer(self.value_generator.integer()),
            MetricKind::Gauge | MetricKind::Distribution | MetricKind::Histogram => {
                MetricValue::Float(self.value_generator.float())
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct KindConfig {
    kind: MetricKind,
    pub count: usize,
    pub freq: usize,
    pub interval: Duration,
    pub tick: Duration,
}

impl KindConfig {
    pub fn new(kind: MetricKind) -> Self {
        KindConfig {
            kind,
            count: 0,
            freq: 1,
            interval: Duration::from_secs(1),
            tick: TICK_RESOLUTION,
        }
    }

    #[inline]
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// No slot at all in a cycle.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.count == 0 || self.freq == 0
    }

    pub fn check(&self) -> Result<ScheduleConfig, ScheduleError> {
        ScheduleConfig::configure(self.tick, self.interval)
    }

    pub fn build_schedule(&self) -> Result<EmissionSchedule, ScheduleError> {
        let items = keys::generate(self.kind.metric_name(), self.count)
            .map(|key| ScheduledItem::new(key, self.freq));
        Ok(self.check()?.populate(items))
    }
}

/// Owns the schedulers and the worker threads of all metric kinds.
pub struct Runner {
    ctx: Arc<RunContext>,
    schedulers: Vec<Scheduler>,
    workers: Vec<JoinHandle<()>>,
}

impl Runner {
    pub fn new(ctx: Arc<RunContext>) -> Self {
        Runner {
            ctx,
            schedulers: Vec::with_capacity(MetricKind::ALL.len()),
            workers: Vec::with_capacity(MetricKind::ALL.len()),
        }
    }

    pub fn context(&self) -> &Arc<RunContext> {
        &self.ctx
    }

    /// Start the scheduler of one kind and its worker thread.
    ///
    /// Must be called inside the tokio runtime. Nothing is spawned for a kind
    /// without any slot.
    pub fn spawn_kind<S>(&mut self, config: &KindConfig, sink: S) -> anyhow::Result<()>
    where
        S: MetricSink + Send + 'static,
    {
        let kind = config.kind();
        let schedule = config
            .build_schedule()
            .map_err(|e| anyhow!("invalid {kind} schedule: {e}"))?;
        if schedule.is_idle() {
            debug!("{kind}: nothing to schedule");
            return Ok(());
        }
        info!(
            "{kind}: {} items x {} per {:?}, {} ticks of {:?}, max burst {}",
            schedule.item_count(),
            config.freq,
            schedule.config().interval(),
            schedule.config().ticks_per_interval(),
            schedule.config().tick_period(),
            schedule.max_burst(),
        );

        let mut scheduler = Scheduler::new(schedule);
        let items = scheduler
            .start(DUE_QUEUE_SIZE)
            .map_err(|e| anyhow!("failed to start {kind} scheduler: {e}"))?;
        let worker = EmitWorker {
            kind,
            ctx: Arc::clone(&self.ctx),
            sink,
            items,
            item_tag: String::new(),
        };
        let handle = std::thread::Builder::new()
            .name(format!("firehose-{kind}"))
            .spawn(move || worker.run())
            .context(format!("failed to spawn {kind} worker thread"))?;

        self.schedulers.push(scheduler);
        self.workers.push(handle);
        Ok(())
    }

    pub fn stop(&self) {
        self.schedulers.iter().for_each(|s| s.stop());
    }

    /// Wait for the tick loops and the workers to finish after a stop.
    pub async fn join(mut self) {
        for scheduler in &mut self.schedulers {
            scheduler.join().await;
        }
        let workers = std::mem::take(&mut self.workers);
        let _ = tokio::task::spawn_blocking(move || {
            for handle in workers {
                let _ = handle.join();
            }
        })
        .await;
    }
}

struct EmitWorker<S> {
    kind: MetricKind,
    ctx: Arc<RunContext>,
    sink: S,
    items: DueItems,
    item_tag: String,
}

impl<S: MetricSink> EmitWorker<S> {
    fn run(mut self) {
        while let Some(id) = self.items.blocking_recv() {
            self.emit(&id);
            while let Some(id) = self.items.try_recv() {
                self.emit(&id);
            }
            if let Err(e) = self.sink.flush() {
                debug!("{}: failed to flush sink: {e}", self.kind);
            }
        }
        debug!("{} worker quit", self.kind);
    }

    fn emit(&mut self, id: &str) {
        self.item_tag.clear();
        self.item_tag.push_str("no:");
        self.item_tag.push_str(id);

        let emission = Emission {
            kind: self.kind,
            name: self.kind.metric_name(),
            value: self.ctx.value(self.kind),
            item_tag: &self.item_tag,
            sample_rate: self.ctx.sample_rate,
        };
        match self.sink.emit(&emission) {
            Ok(_) => {
                self.ctx.stats.add_emitted(self.kind);
                log!(
                    EMISSION_LOG_LEVEL,
                    "{} {id}: {:?}",
                    self.kind,
                    emission.value
                );
            }
            Err(e) => log!(EMISSION_LOG_LEVEL, "{} {id}: emit failed: {e}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::sink::recording::RecordingSink;
    use crate::value::ValueMode;

    fn new_runner() -> Runner {
        Runner::new(Arc::new(RunContext::new(ValueMode::Fixed.build())))
    }

    fn kind_config(kind: MetricKind, count: usize, freq: usize) -> KindConfig {
        let mut config = KindConfig::new(kind);
        config.count = count;
        config.freq = freq;
        config.tick = Duration::from_millis(10);
        config.interval = Duration::from_millis(60);
        config
    }

    async fn wait_calls(sink: &RecordingSink, n: usize) {
        for _ in 0..500 {
            if sink.len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("only {} calls received, expected {n}", sink.len());
    }

    #[test]
    fn kind_config_check() {
        let mut config = KindConfig::new(MetricKind::Gauge);
        assert!(config.check().is_ok());
        config.interval = Duration::from_millis(50);
        assert!(config.check().is_err());
        config.interval = Duration::ZERO;
        assert_eq!(config.check(), Err(ScheduleError::ZeroInterval));
    }

    #[test]
    fn kind_config_idle() {
        let mut config = KindConfig::new(MetricKind::Counter);
        assert!(config.is_idle());
        config.count = 3;
        assert!(!config.is_idle());
        config.freq = 0;
        assert!(config.is_idle());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn zero_count_makes_no_call() {
        let mut runner = new_runner();
        let ctx = Arc::clone(runner.context());
        let sink = RecordingSink::default();
        let config = kind_config(MetricKind::Gauge, 0, 2);
        assert!(config.is_idle());
        runner.spawn_kind(&config, sink.clone()).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        runner.stop();
        runner.join().await;
        assert_eq!(sink.len(), 0);
        assert_eq!(ctx.stats().emitted(MetricKind::Gauge), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn emission_order() {
        let mut runner = new_runner();
        let sink = RecordingSink::default();
        runner
            .spawn_kind(&kind_config(MetricKind::Counter, 3, 2), sink.clone())
            .unwrap();
        wait_calls(&sink, 6).await;
        runner.stop();

        let tags = sink.item_tags();
        assert_eq!(
            &tags[..6],
            &["no:c.0", "no:c.0", "no:c.1", "no:c.1", "no:c.2", "no:c.2"]
        );
        let calls = sink.calls.lock().unwrap();
        assert!(calls.iter().all(|(kind, _, value)| {
            *kind == MetricKind::Counter && *value == MetricValue::Integer(1)
        }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn counter_frozen_after_stop() {
        let mut runner = new_runner();
        let ctx = Arc::clone(runner.context());
        let sink = RecordingSink::default();
        runner
            .spawn_kind(&kind_config(MetricKind::Gauge, 4, 1), sink.clone())
            .unwrap();
        wait_calls(&sink, 8).await;
        runner.stop();
        runner.join().await;

        let emitted = ctx.stats().emitted(MetricKind::Gauge);
        assert_eq!(emitted as usize, sink.len());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(ctx.stats().emitted(MetricKind::Gauge), emitted);
        assert_eq!(ctx.stats().emitted(MetricKind::Counter), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failed_emission_not_counted() {
        let mut runner = new_runner();
        let ctx = Arc::clone(runner.context());
        let sink = RecordingSink::failing();
        runner
            .spawn_kind(&kind_config(MetricKind::Histogram, 2, 1), sink.clone())
            .unwrap();
        wait_calls(&sink, 4).await;
        runner.stop();
        runner.join().await;

        assert!(sink.len() >= 4);
        assert_eq!(ctx.stats().emitted(MetricKind::Histogram), 0);
    }
}
