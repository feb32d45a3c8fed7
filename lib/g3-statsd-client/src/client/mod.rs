/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use crate::{MetricsName, StatsdMetricsSink, StatsdTagGroup};

mod formatter;
pub use formatter::MetricFormatter;

/// A DogStatsD client.
///
/// Metric lines are batched in memory, call [`StatsdClient::flush_sink`]
/// to push out a partially filled payload.
pub struct StatsdClient {
    prefix: MetricsName,
    sink: StatsdMetricsSink,
    tags: StatsdTagGroup,
}

impl StatsdClient {
    pub(crate) fn new(prefix: MetricsName, sink: StatsdMetricsSink) -> Self {
        StatsdClient {
            prefix,
            sink,
            tags: Default::default(),
        }
    }

    /// Add a tag sent along with every metric of this client.
    pub fn with_tag_value<T: AsRef<str>>(mut self, value: T) -> Self {
        self.tags.add_tag_value(value);
        self
    }

    pub fn flush_sink(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}
