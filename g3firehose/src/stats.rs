/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

use crate::kind::MetricKind;

/// Per kind count of the emissions accepted by the sink.
#[derive(Default)]
pub struct EmitStats {
    emitted: [AtomicU64; 4],
}

impl EmitStats {
    pub fn add_emitted(&self, kind: MetricKind) {
        self.emitted[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn emitted(&self, kind: MetricKind) -> u64 {
        self.emitted[kind.index()].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> EmitSnapshot {
        let mut snapshot = EmitSnapshot::default();
        for kind in MetricKind::ALL {
            snapshot.values[kind.index()] = self.emitted(kind);
        }
        snapshot
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitSnapshot {
    values: [u64; 4],
}

impl EmitSnapshot {
    pub fn get(&self, kind: MetricKind) -> u64 {
        self.values[kind.index()]
    }

    /// Per kind increase since `earlier`.
    pub fn delta(&self, earlier: &EmitSnapshot) -> EmitSnapshot {
        let mut delta = EmitSnapshot::default();
        for (i, v) in delta.values.iter_mut().enumerate() {
            *v = self.values[i].saturating_sub(earlier.values[i]);
        }
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_per_kind() {
        let stats = EmitStats::default();
        stats.add_emitted(MetricKind::Gauge);
        stats.add_emitted(MetricKind::Gauge);
        stats.add_emitted(MetricKind::Histogram);

        assert_eq!(stats.emitted(MetricKind::Gauge), 2);
        assert_eq!(stats.emitted(MetricKind::Counter), 0);
        assert_eq!(stats.emitted(MetricKind::Histogram), 1);

        let first = stats.snapshot();
        stats.add_emitted(MetricKind::Gauge);
        let second = stats.snapshot();
        let delta = second.delta(&first);
        assert_eq!(delta.get(MetricKind::Gauge), 1);
        assert_eq!(delta.get(MetricKind::Histogram), 0);
        assert!(MetricKind::ALL.iter().all(|k| second.get(*k) >= first.get(*k)));
    }
}
