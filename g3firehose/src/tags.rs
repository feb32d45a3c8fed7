/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagsError {
    #[error("empty tag at position {0}")]
    EmptyTag(usize),
    #[error("invalid char {1:?} in tag {0}")]
    InvalidChar(String, char),
}

/// The base tags sent along with every metric.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricTags {
    inner: Arc<[String]>,
}

impl MetricTags {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.inner.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FromStr for MetricTags {
    type Err = TagsError;

    /// Parse a comma separated tag list. An empty string means no tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(MetricTags::default());
        }

        let mut tags = Vec::new();
        for (i, tag) in s.split(',').enumerate() {
            if tag.is_empty() {
                return Err(TagsError::EmptyTag(i));
            }
            if let Some(c) = tag.chars().find(|c| matches!(c, '|' | '#' | '\n')) {
                return Err(TagsError::InvalidChar(tag.to_string(), c));
            }
            tags.push(tag.to_string());
        }
        Ok(MetricTags {
            inner: Arc::from(tags),
        })
    }
}
