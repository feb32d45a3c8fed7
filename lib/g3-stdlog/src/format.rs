/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use slog::{KV, OwnedKVList, Record, Serializer};

use super::StdLogValue;
use crate::AsyncLogFormatter;

struct KvCollector {
    pairs: Vec<(String, String)>,
}

impl Serializer for KvCollector {
    fn emit_arguments(&mut self, key: slog::Key, val: &fmt::Arguments) -> slog::Result {
        self.pairs.push((key.to_string(), val.to_string()));
        Ok(())
    }
}

pub struct StdLogFormatter {
    append_code_position: bool,
}

impl StdLogFormatter {
    pub(crate) fn new(append_code_position: bool) -> Self {
        StdLogFormatter {
            append_code_position,
        }
    }
}

impl AsyncLogFormatter<StdLogValue> for StdLogFormatter {
    fn format_slog(
        &self,
        record: &Record,
        logger_values: &OwnedKVList,
    ) -> Result<StdLogValue, slog::Error> {
        let mut collector = KvCollector { pairs: Vec::new() };
        logger_values.serialize(record, &mut collector)?;
        record.kv().serialize(record, &mut collector)?;

        let location = if self.append_code_position {
            Some(format!("{}:{}", record.module(), record.line()))
        } else {
            None
        };

        Ok(StdLogValue {
            level: record.level(),
            message: record.msg().to_string(),
            kv_pairs: collector.pairs,
            location,
        })
    }
}
