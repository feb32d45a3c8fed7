/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use itoa::Integer;
use ryu::Float;
use smallvec::SmallVec;

use super::StatsdClient;
use crate::StatsdTagGroup;

enum MetricType {
    Count,
    Gauge,
    Distribution,
    Histogram,
}

impl MetricType {
    fn as_str(&self) -> &'static str {
        match self {
            MetricType::Count => "c",
            MetricType::Gauge => "g",
            MetricType::Distribution => "d",
            MetricType::Histogram => "h",
        }
    }
}

pub struct MetricFormatter<'a> {
    client: &'a mut StatsdClient,
    metric_type: MetricType,
    name: &'a str,
    value: SmallVec<[u8; 24]>,
    sample_rate: Option<SmallVec<[u8; 24]>>,
    local_tags: StatsdTagGroup,
}

fn format_integer<T: Integer>(value: T) -> SmallVec<[u8; 24]> {
    let mut buffer = itoa::Buffer::new();
    SmallVec::from_slice(buffer.format(value).as_bytes())
}

fn format_float<T: Float>(value: T) -> SmallVec<[u8; 24]> {
    let mut buffer = ryu::Buffer::new();
    SmallVec::from_slice(buffer.format(value).as_bytes())
}

impl StatsdClient {
    pub fn count<'a, T: Integer>(&'a mut self, name: &'a str, value: T) -> MetricFormatter<'a> {
        self.metric_with_type(MetricType::Count, name, format_integer(value))
    }

    pub fn gauge<'a, T: Integer>(&'a mut self, name: &'a str, value: T) -> MetricFormatter<'a> {
        self.metric_with_type(MetricType::Gauge, name, format_integer(value))
    }

    pub fn gauge_float<'a, T: Float>(&'a mut self, name: &'a str, value: T) -> MetricFormatter<'a> {
        self.metric_with_type(MetricType::Gauge, name, format_float(value))
    }

    pub fn distribution<'a, T: Float>(
        &'a mut self,
        name: &'a str,
        value: T,
    ) -> MetricFormatter<'a> {
        self.metric_with_type(MetricType::Distribution, name, format_float(value))
    }

    pub fn histogram<'a, T: Float>(&'a mut self, name: &'a str, value: T) -> MetricFormatter<'a> {
        self.metric_with_type(MetricType::Histogram, name, format_float(value))
    }

    fn metric_with_type<'a>(
        &'a mut self,
        metric_type: MetricType,
        name: &'a str,
        value: SmallVec<[u8; 24]>,
    ) -> MetricFormatter<'a> {
        MetricFormatter {
            client: self,
            metric_type,
            name,
            value,
            sample_rate: None,
            local_tags: StatsdTagGroup::default(),
        }
    }
}

impl MetricFormatter<'_> {
    pub fn with_tag_value<T: AsRef<str>>(mut self, value: T) -> Self {
        self.local_tags.add_tag_value(value);
        self
    }

    /// Set the `|@rate` field. Rates of 1 or above are not encoded.
    pub fn with_sample_rate(mut self, rate: f64) -> Self {
        if rate < 1.0 {
            self.sample_rate = Some(format_float(rate));
        } else {
            self.sample_rate = None;
        }
        self
    }

    pub fn send(self) -> io::Result<()> {
        let MetricFormatter {
            client,
            metric_type,
            name,
            value,
            sample_rate,
            local_tags,
        } = self;

        let prefix = &client.prefix;
        let client_tags = &client.tags;
        client.sink.emit(|buf| {
            if !prefix.is_empty() {
                buf.extend_from_slice(prefix.as_bytes());
                buf.push(b'.');
            }
            buf.extend_from_slice(name.as_bytes());
            buf.push(b':');
            buf.extend_from_slice(value.as_slice());
            buf.push(b'|');
            buf.extend_from_slice(metric_type.as_str().as_bytes());

            if let Some(rate) = &sample_rate {
                buf.extend_from_slice(b"|@");
                buf.extend_from_slice(rate.as_slice());
            }

            let mut tag_groups = [client_tags, &local_tags]
                .into_iter()
                .filter(|tags| !tags.is_empty())
                .peekable();
            if tag_groups.peek().is_none() {
                return;
            }

            buf.extend_from_slice(b"|#");
            for (i, tags) in tag_groups.enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                buf.extend_from_slice(tags.as_bytes());
            }
        })
    }
}
