/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default, Debug, Eq, PartialEq)]
pub struct LogSnapshot {
    pub total: u64,
    pub passed: u64,
    pub size: u64,
    pub dropped: u64,
}

#[derive(Default)]
pub struct LogStats {
    total: AtomicU64,
    passed: AtomicU64,
    size: AtomicU64,
    dropped: AtomicU64,
}

impl LogStats {
    pub fn snapshot(&self) -> LogSnapshot {
        LogSnapshot {
            total: self.total.load(Ordering::Relaxed),
            passed: self.passed.load(Ordering::Relaxed),
            size: self.size.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn add_total(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_passed(&self, size: usize) {
        self.passed.fetch_add(1, Ordering::Relaxed);
        self.size.fetch_add(size as u64, Ordering::Relaxed);
    }

    pub(crate) fn add_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }
}
