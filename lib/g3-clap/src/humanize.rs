/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;
use clap::ArgMatches;
use humanize_rs::ParseError;
use humanize_rs::bytes::Bytes;

/// Parse a humanized duration string.
///
/// Values without a unit are taken as seconds, so both `1500ms` and `2`
/// are accepted.
pub fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    match humanize_rs::duration::parse(value) {
        Ok(v) => Ok(v),
        Err(ParseError::MissingUnit) => {
            if let Ok(u) = u64::from_str(value) {
                Ok(Duration::from_secs(u))
            } else if let Ok(f) = f64::from_str(value) {
                Duration::try_from_secs_f64(f).map_err(anyhow::Error::new)
            } else {
                Err(anyhow!("invalid duration string"))
            }
        }
        Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
    }
}

pub fn parse_usize(value: &str) -> anyhow::Result<usize> {
    if let Ok(u) = usize::from_str(value) {
        return Ok(u);
    }
    let v = value
        .parse::<Bytes>()
        .map_err(|e| anyhow!("invalid humanize size string: {e}"))?;
    Ok(v.size())
}

pub fn get_duration(args: &ArgMatches, id: &str) -> anyhow::Result<Option<Duration>> {
    match args.get_one::<String>(id) {
        Some(v) => parse_duration(v)
            .map(Some)
            .map_err(|e| anyhow!("invalid {id} value: {e}")),
        None => Ok(None),
    }
}

pub fn get_usize(args: &ArgMatches, id: &str) -> anyhow::Result<Option<usize>> {
    match args.get_one::<String>(id) {
        Some(v) => parse_usize(v)
            .map(Some)
            .map_err(|e| anyhow!("invalid {id} value: {e}")),
        None => Ok(None),
    }
}
