/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use anyhow::Context;

use g3_statsd_client::{StatsdClient, StatsdClientConfig};

use crate::kind::MetricKind;
use crate::tags::MetricTags;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MetricValue {
    Integer(i64),
    Float(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Integer(v) => *v as f64,
            MetricValue::Float(v) => *v,
        }
    }
}

/// One metric observation handed to a [`MetricSink`].
pub struct Emission<'a> {
    pub kind: MetricKind,
    pub name: &'a str,
    pub value: MetricValue,
    /// Appended after the base tags of the sink.
    pub item_tag: &'a str,
    pub sample_rate: f64,
}

/// Destination of the generated metrics.
///
/// The base tags are bound to the sink when it is built. Implementations
/// may buffer, in which case `flush` sends what is left.
pub trait MetricSink {
    fn emit(&mut self, emission: &Emission<'_>) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

pub struct StatsdSink {
    client: StatsdClient,
}

impl StatsdSink {
    pub fn new(client: StatsdClient) -> Self {
        StatsdSink { client }
    }

    pub fn build(config: &StatsdClientConfig, tags: &MetricTags) -> anyhow::Result<Self> {
        let client = config
            .build()
            .context(format!("unable to build statsd client for {:?}", config.backend()))?;
        let client = tags.iter().fold(client, |c, tag| c.with_tag_value(tag));
        Ok(StatsdSink::new(client))
    }
}

impl MetricSink for StatsdSink {
    fn emit(&mut self, e: &Emission<'_>) -> io::Result<()> {
        let client = &mut self.client;
        let formatter = match (e.kind, e.value) {
            (MetricKind::Counter, MetricValue::Integer(v)) => client.count(e.name, v),
            (MetricKind::Counter, MetricValue::Float(v)) => client.count(e.name, v.round() as i64),
            (MetricKind::Gauge, MetricValue::Integer(v)) => client.gauge(e.name, v),
            (MetricKind::Gauge, MetricValue::Float(v)) => client.gauge_float(e.name, v),
            (MetricKind::Distribution, v) => client.distribution(e.name, v.as_f64()),
            (MetricKind::Histogram, v) => client.histogram(e.name, v.as_f64()),
        };
        formatter
            .with_tag_value(e.item_tag)
            .with_sample_rate(e.sample_rate)
            .send()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.client.flush_sink()
    }
}
