/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{EmissionSchedule, ScheduleError};

pub const DUE_QUEUE_SIZE: usize = 64;

/// The receiving side of a started [`Scheduler`].
///
/// It ends once the scheduler is stopped and every queued item is taken.
pub struct DueItems {
    receiver: mpsc::Receiver<Arc<str>>,
}

impl DueItems {
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        self.receiver.recv().await
    }

    /// Blocking receive, must not be called inside the async runtime.
    pub fn blocking_recv(&mut self) -> Option<Arc<str>> {
        self.receiver.blocking_recv()
    }

    /// Take an already queued item, if any.
    pub fn try_recv(&mut self) -> Option<Arc<str>> {
        self.receiver.try_recv().ok()
    }
}

/// Fires the items of an [`EmissionSchedule`] on their ticks, cycle after
/// cycle, until stopped.
///
/// The hand-off queue is bounded. When the consumer falls behind the tick
/// loop blocks on it, and later ticks get delayed instead of items dropped.
pub struct Scheduler {
    schedule: Arc<EmissionSchedule>,
    quit_sender: watch::Sender<bool>,
    started: bool,
    task: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(schedule: EmissionSchedule) -> Self {
        let (quit_sender, _) = watch::channel(false);
        Scheduler {
            schedule: Arc::new(schedule),
            quit_sender,
            started: false,
            task: None,
        }
    }

    pub fn schedule(&self) -> &EmissionSchedule {
        &self.schedule
    }

    /// Spawn the tick loop on the current tokio runtime.
    ///
    /// A scheduler can only be started once, even after being stopped.
    pub fn start(&mut self, queue_size: usize) -> Result<DueItems, ScheduleError> {
        if self.started {
            return Err(ScheduleError::AlreadyStarted);
        }
        self.started = true;

        let (sender, receiver) = mpsc::channel(queue_size.max(1));
        let schedule = Arc::clone(&self.schedule);
        let quit_receiver = self.quit_sender.subscribe();
        if *quit_receiver.borrow() {
            // stopped before started, hand out a closed queue
            drop(sender);
        } else {
            self.task = Some(tokio::spawn(run_ticks(schedule, sender, quit_receiver)));
        }
        Ok(DueItems { receiver })
    }

    pub fn stop(&self) {
        self.quit_sender.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.quit_sender.borrow()
    }

    /// Wait for the tick loop to exit after [`Scheduler::stop`].
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_ticks(
    schedule: Arc<EmissionSchedule>,
    sender: mpsc::Sender<Arc<str>>,
    mut quit: watch::Receiver<bool>,
) {
    if schedule.is_idle() {
        let _ = quit.wait_for(|v| *v).await;
        return;
    }

    let ticks = schedule.config().ticks_per_interval();
    let mut interval = tokio::time::interval(schedule.config().tick_period());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut tick = 0usize;
    loop {
        tokio::select! {
            biased;

            _ = quit.wait_for(|v| *v) => return,
            _ = interval.tick() => {}
        }

        for id in schedule.due_at(tick) {
            tokio::select! {
                biased;

                _ = quit.wait_for(|v| *v) => return,
                r = sender.send(Arc::clone(id)) => {
                    if r.is_err() {
                        // the consumer is gone
                        return;
                    }
                }
            }
        }

        tick += 1;
        if tick == ticks {
            tick = 0;
        }
    }
}
