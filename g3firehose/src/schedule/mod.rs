/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

mod scheduler;
pub use scheduler::{DUE_QUEUE_SIZE, DueItems, Scheduler};

pub const TICK_RESOLUTION: Duration = Duration::from_millis(100);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("zero tick resolution")]
    ZeroTick,
    #[error("zero interval")]
    ZeroInterval,
    #[error("interval {interval:?} is shorter than the tick resolution {tick:?}")]
    IntervalTooShort { interval: Duration, tick: Duration },
    #[error("interval {interval:?} has too many ticks of {tick:?}")]
    IntervalTooLong { interval: Duration, tick: Duration },
    #[error("the scheduler has already been started")]
    AlreadyStarted,
}

/// One item to schedule, and how many slots it takes in each cycle.
#[derive(Clone, Debug)]
pub struct ScheduledItem {
    id: Arc<str>,
    repeat: usize,
}

impl ScheduledItem {
    pub fn new<T: Into<Arc<str>>>(id: T, repeat: usize) -> Self {
        ScheduledItem {
            id: id.into(),
            repeat,
        }
    }

    pub fn id(&self) -> &Arc<str> {
        &self.id
    }

    pub fn repeat(&self) -> usize {
        self.repeat
    }
}

/// The tick layout of a cycle, validated but without any item yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleConfig {
    tick: Duration,
    interval: Duration,
    ticks: usize,
}

impl ScheduleConfig {
    pub fn configure(tick: Duration, interval: Duration) -> Result<Self, ScheduleError> {
        if tick.is_zero() {
            return Err(ScheduleError::ZeroTick);
        }
        if interval.is_zero() {
            return Err(ScheduleError::ZeroInterval);
        }
        if interval < tick {
            return Err(ScheduleError::IntervalTooShort { interval, tick });
        }

        let ticks = usize::try_from(interval.as_nanos() / tick.as_nanos())
            .map_err(|_| ScheduleError::IntervalTooLong { interval, tick })?;
        Ok(ScheduleConfig {
            tick,
            interval,
            ticks,
        })
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[inline]
    pub fn ticks_per_interval(&self) -> usize {
        self.ticks
    }

    /// The real period between two ticks.
    ///
    /// This differs from the tick resolution when the interval is not a
    /// multiple of it, so that a cycle always lasts exactly one interval.
    pub fn tick_period(&self) -> Duration {
        let interval = self.interval.as_nanos();
        if interval % self.tick.as_nanos() == 0 {
            self.tick
        } else {
            // less than twice the tick, so it fits
            Duration::from_nanos((interval / self.ticks as u128) as u64)
        }
    }

    /// Lay out every slot of `items` on the ticks of one cycle.
    ///
    /// Slots are numbered in item order, with the repeats of one item next
    /// to each other. Slot `j` of `n` goes to tick `j * ticks / n`, so when
    /// there are more slots than ticks at most `ceil(n / ticks)` of them
    /// share one tick.
    pub fn populate<I>(self, items: I) -> EmissionSchedule
    where
        I: IntoIterator<Item = ScheduledItem>,
    {
        let items: Vec<ScheduledItem> = items.into_iter().collect();
        let slots: Vec<usize> = items
            .iter()
            .enumerate()
            .flat_map(|(i, item)| std::iter::repeat_n(i, item.repeat))
            .collect();
        EmissionSchedule {
            config: self,
            items,
            slots,
        }
    }
}

/// A populated schedule, immutable once built.
#[derive(Debug)]
pub struct EmissionSchedule {
    config: ScheduleConfig,
    items: Vec<ScheduledItem>,
    slots: Vec<usize>,
}

impl EmissionSchedule {
    #[inline]
    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.slots.is_empty()
    }

    /// Largest number of slots that share a single tick.
    pub fn max_burst(&self) -> usize {
        self.slot_count().div_ceil(self.config.ticks)
    }

    /// The tick that slot `slot` is assigned to.
    pub fn slot_tick(&self, slot: usize) -> usize {
        let n = self.slot_count() as u128;
        (slot as u128 * self.config.ticks as u128 / n) as usize
    }

    // slots of tick t are the j with floor(j * ticks / n) == t
    fn tick_slots(&self, tick: usize) -> Range<usize> {
        let n = self.slot_count() as u128;
        let ticks = self.config.ticks as u128;
        let first_slot = |t: u128| (t * n).div_ceil(ticks) as usize;
        let tick = tick as u128;
        first_slot(tick)..first_slot(tick + 1)
    }

    /// Ids of the items due at `tick`, in slot order.
    pub fn due_at(&self, tick: usize) -> impl Iterator<Item = &Arc<str>> {
        let range = if tick < self.config.ticks {
            self.tick_slots(tick)
        } else {
            0..0
        };
        self.slots[range].iter().map(|i| &self.items[*i].id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;

    fn items(prefix: &str, count: usize, freq: usize) -> Vec<ScheduledItem> {
        keys::generate(prefix, count)
            .map(|k| ScheduledItem::new(k, freq))
            .collect()
    }

    fn due_ids(schedule: &EmissionSchedule, tick: usize) -> Vec<String> {
        schedule.due_at(tick).map(|id| id.to_string()).collect()
    }

    #[test]
    fn configure_errors() {
        assert_eq!(
            ScheduleConfig::configure(Duration::ZERO, Duration::from_secs(1)),
            Err(ScheduleError::ZeroTick)
        );
        assert_eq!(
            ScheduleConfig::configure(TICK_RESOLUTION, Duration::ZERO),
            Err(ScheduleError::ZeroInterval)
        );
        assert_eq!(
            ScheduleConfig::configure(TICK_RESOLUTION, Duration::from_millis(99)),
            Err(ScheduleError::IntervalTooShort {
                interval: Duration::from_millis(99),
                tick: TICK_RESOLUTION,
            })
        );

        let config = ScheduleConfig::configure(TICK_RESOLUTION, TICK_RESOLUTION).unwrap();
        assert_eq!(config.ticks_per_interval(), 1);
    }

    #[test]
    fn one_slot_per_tick() {
        let config =
            ScheduleConfig::configure(Duration::from_secs(1), Duration::from_secs(6)).unwrap();
        let schedule = config.populate(items("item", 3, 2));
        assert_eq!(schedule.slot_count(), 6);
        assert_eq!(schedule.max_burst(), 1);

        let expected = ["item.0", "item.0", "item.1", "item.1", "item.2", "item.2"];
        for (tick, id) in expected.iter().enumerate() {
            assert_eq!(due_ids(&schedule, tick), vec![id.to_string()]);
        }
        assert!(due_ids(&schedule, 6).is_empty());
    }

    #[test]
    fn fewer_slots_than_ticks() {
        let config =
            ScheduleConfig::configure(TICK_RESOLUTION, Duration::from_secs(1)).unwrap();
        let schedule = config.populate(items("g", 3, 1));
        assert_eq!(schedule.config().ticks_per_interval(), 10);

        let slot_ticks: Vec<usize> = (0..3).map(|j| schedule.slot_tick(j)).collect();
        assert_eq!(slot_ticks, vec![0, 3, 6]);
        assert_eq!(due_ids(&schedule, 0), vec!["g.0"]);
        assert!(due_ids(&schedule, 1).is_empty());
        assert_eq!(due_ids(&schedule, 3), vec!["g.1"]);
        assert_eq!(due_ids(&schedule, 6), vec!["g.2"]);
    }

    #[test]
    fn more_slots_than_ticks() {
        let config =
            ScheduleConfig::configure(TICK_RESOLUTION, Duration::from_secs(1)).unwrap();
        let schedule = config.populate(items("c", 25, 1));
        assert_eq!(schedule.max_burst(), 3);

        let mut all = Vec::new();
        for tick in 0..10 {
            let due = due_ids(&schedule, tick);
            assert!(!due.is_empty());
            assert!(due.len() <= schedule.max_burst());
            all.extend(due);
        }
        let expected: Vec<String> = keys::generate("c", 25).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn every_slot_once_per_cycle() {
        let config =
            ScheduleConfig::configure(TICK_RESOLUTION, Duration::from_secs(3)).unwrap();
        let schedule = config.populate(items("d", 7, 5));
        let ticks = schedule.config().ticks_per_interval();

        let total: usize = (0..ticks).map(|t| schedule.due_at(t).count()).sum();
        assert_eq!(total, 35);
        for j in 0..schedule.slot_count() {
            assert!(schedule.slot_tick(j) < ticks);
        }
        for j in 1..schedule.slot_count() {
            assert!(schedule.slot_tick(j - 1) <= schedule.slot_tick(j));
        }
    }

    #[test]
    fn idle() {
        let config =
            ScheduleConfig::configure(TICK_RESOLUTION, Duration::from_secs(1)).unwrap();
        let schedule = config.populate(items("h", 0, 1));
        assert!(schedule.is_idle());
        assert_eq!(schedule.max_burst(), 0);
        assert_eq!(schedule.due_at(0).count(), 0);

        let schedule = config.populate(items("h", 4, 0));
        assert_eq!(schedule.item_count(), 4);
        assert!(schedule.is_idle());
    }

    #[test]
    fn uneven_interval() {
        let config =
            ScheduleConfig::configure(TICK_RESOLUTION, Duration::from_millis(1050)).unwrap();
        assert_eq!(config.ticks_per_interval(), 10);
        assert_eq!(config.tick_period(), Duration::from_millis(105));

        let config =
            ScheduleConfig::configure(TICK_RESOLUTION, Duration::from_secs(2)).unwrap();
        assert_eq!(config.tick_period(), TICK_RESOLUTION);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn very_long_interval() {
        // more ticks than u32::MAX
        let interval = Duration::from_secs(500_000_000) + Duration::from_millis(50);
        let config = ScheduleConfig::configure(TICK_RESOLUTION, interval).unwrap();
        assert_eq!(config.ticks_per_interval(), 5_000_000_000);
        assert_eq!(config.tick_period(), TICK_RESOLUTION);

        assert_eq!(
            ScheduleConfig::configure(Duration::from_nanos(1), Duration::MAX),
            Err(ScheduleError::IntervalTooLong {
                interval: Duration::MAX,
                tick: Duration::from_nanos(1),
            })
        );
    }
}
