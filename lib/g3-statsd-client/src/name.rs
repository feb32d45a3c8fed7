/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty metrics name")]
    Empty,
    #[error("invalid char {0:?} in metrics name")]
    InvalidChar(char),
}

/// A dot separated metrics name, such as the namespace prefix of a client.
///
/// Only ascii alphanumeric chars and `.`, `_`, `-` are allowed, which keeps
/// the name free of the `:`, `|`, `@` and `#` separators of the statsd line
/// protocol.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MetricsName(String);

impl MetricsName {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for MetricsName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        {
            return Err(ParseError::InvalidChar(c));
        }
        Ok(MetricsName(s.to_string()))
    }
}

impl fmt::Display for MetricsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let name = MetricsName::from_str("firehose.load-test_1").unwrap();
        assert_eq!(name.as_str(), "firehose.load-test_1");

        assert_eq!(MetricsName::from_str(""), Err(ParseError::Empty));
        assert_eq!(
            MetricsName::from_str("a:b"),
            Err(ParseError::InvalidChar(':'))
        );
        assert_eq!(
            MetricsName::from_str("a|b"),
            Err(ParseError::InvalidChar('|'))
        );
    }
}
