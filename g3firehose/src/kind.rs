/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Gauge,
    Counter,
    Distribution,
    Histogram,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Gauge,
        MetricKind::Counter,
        MetricKind::Distribution,
        MetricKind::Histogram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
            MetricKind::Distribution => "dist",
            MetricKind::Histogram => "hist",
        }
    }

    /// Name of the emitted metric, before the namespace is prepended.
    ///
    /// It is also the prefix of the item keys of this kind.
    pub fn metric_name(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "g",
            MetricKind::Counter => "c",
            MetricKind::Distribution => "d",
            MetricKind::Histogram => "h",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            MetricKind::Gauge => 0,
            MetricKind::Counter => 1,
            MetricKind::Distribution => 2,
            MetricKind::Histogram => 3,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
