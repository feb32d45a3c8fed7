/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use slog::{Drain, o};
use slog_scope::GlobalLoggerGuard;

use g3_stdlog::{AsyncLogConfig, LogIoThread};

const PROCESS_LOG_THREAD_NAME: &str = "log-process";

/// Keeps the process logger alive.
///
/// Dropping it swaps the global logger for a discarding one and then waits
/// for the io thread to write out what is still queued. Records from threads
/// still running after that, like workers draining their queue, are lost.
pub struct LoggerGuard {
    scope_guard: Option<GlobalLoggerGuard>,
    io_thread: Option<LogIoThread>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        // slog-scope would reset to a logger that panics on any record
        let discard = slog::Logger::root(slog::Discard, o!());
        slog_scope::set_global_logger(discard).cancel_reset();
        if let Some(scope_guard) = self.scope_guard.take() {
            scope_guard.cancel_reset();
        }
        if let Some(io_thread) = self.io_thread.take() {
            io_thread.join();
        }
    }
}

fn log_level(verbose_level: u8) -> log::Level {
    match verbose_level {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    }
}

pub fn setup(verbose_level: u8) -> anyhow::Result<LoggerGuard> {
    let async_conf = AsyncLogConfig::with_name(PROCESS_LOG_THREAD_NAME);
    let (drain, io_thread) = g3_stdlog::new_async_logger(&async_conf, verbose_level > 1, true);
    let logger = slog::Logger::root(drain.fuse(), o!());

    let scope_guard = slog_scope::set_global_logger(logger);
    let guard = LoggerGuard {
        scope_guard: Some(scope_guard),
        io_thread: Some(io_thread),
    };

    slog_stdlog::init_with_level(log_level(verbose_level))
        .map_err(|e| anyhow!("failed to install log bridge: {e}"))?;
    Ok(guard)
}
