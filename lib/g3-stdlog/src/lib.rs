/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::thread::JoinHandle;

use chrono::Local;
use flume::Receiver;
use slog::Level;

mod async_log;
pub use async_log::{AsyncLogConfig, AsyncLogFormatter, AsyncLogger};

mod stats;
pub use stats::{LogSnapshot, LogStats};

mod format;
pub use format::StdLogFormatter;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub struct StdLogValue {
    level: Level,
    message: String,
    kv_pairs: Vec<(String, String)>,
    location: Option<String>,
}

impl StdLogValue {
    fn message_str(&self) -> &str {
        if self.message.is_empty() {
            "()"
        } else {
            &self.message
        }
    }
}

/// Handle of the io thread behind an [`AsyncLogger`].
///
/// The thread exits once every logger holding the sending side is dropped,
/// after all pending records have been written out.
pub struct LogIoThread {
    handle: Option<JoinHandle<()>>,
}

impl LogIoThread {
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn new_async_logger(
    async_conf: &AsyncLogConfig,
    append_code_position: bool,
    use_stdout: bool,
) -> (AsyncLogger<StdLogValue, StdLogFormatter>, LogIoThread) {
    let (sender, receiver) = flume::bounded::<StdLogValue>(async_conf.channel_capacity);

    let stats = Arc::new(LogStats::default());

    let io_thread = AsyncIoThread {
        receiver,
        stats: Arc::clone(&stats),
    };

    let handle = std::thread::Builder::new()
        .name(async_conf.thread_name.clone())
        .spawn(move || {
            if use_stdout {
                io_thread.run_with_stdout();
            } else {
                io_thread.run_with_stderr();
            }
        })
        .ok();

    (
        AsyncLogger::new(sender, StdLogFormatter::new(append_code_position), stats),
        LogIoThread { handle },
    )
}

struct AsyncIoThread {
    receiver: Receiver<StdLogValue>,
    stats: Arc<LogStats>,
}

impl AsyncIoThread {
    fn write_time<IO: Write>(&self, io: &mut IO) -> io::Result<()> {
        let datetime = Local::now();
        write!(io, "{}", datetime.format(TIME_FORMAT))
    }

    fn run_with_stderr(self) {
        let stderr = io::stderr();
        if stderr.is_terminal() {
            self.run(stderr, Self::write_console)
        } else {
            self.run(stderr, Self::write_plain)
        }
    }

    fn run_with_stdout(self) {
        let stdout = io::stdout();
        if stdout.is_terminal() {
            self.run(stdout, Self::write_console)
        } else {
            self.run(stdout, Self::write_plain)
        }
    }

    fn run<IO, F>(&self, mut io: IO, format: F)
    where
        IO: Write,
        F: Fn(&Self, &mut Vec<u8>, StdLogValue) -> io::Result<()>,
    {
        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        while let Ok(v) = self.receiver.recv() {
            buf.clear();
            let _ = format(self, &mut buf, v);
            self.write_buf(&mut io, &buf);

            while let Ok(v) = self.receiver.try_recv() {
                buf.clear();
                let _ = format(self, &mut buf, v);
                self.write_buf(&mut io, &buf);
            }

            let _ = io.flush();
        }
    }

    fn write_plain(&self, buf: &mut Vec<u8>, v: StdLogValue) -> io::Result<()> {
        self.write_time(buf)?;
        write!(buf, " {}", v.level)?;
        for (k, v) in &v.kv_pairs {
            write!(buf, " {k}: {v},")?;
        }
        write!(buf, " {}", v.message_str())?;
        if let Some(location) = &v.location {
            write!(buf, " <{location}>")?;
        }
        writeln!(buf)
    }

    fn write_console(&self, buf: &mut Vec<u8>, v: StdLogValue) -> io::Result<()> {
        use anstyle::{AnsiColor, Color, Style};

        const COLOR_MAGENTA: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Magenta)));
        const COLOR_RED: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
        const COLOR_YELLOW: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
        const COLOR_GREEN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
        const COLOR_CYAN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
        const COLOR_BLUE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue)));
        const STYLE_BOLD: Style = Style::new().bold();
        const STYLE_ITALIC: Style = Style::new().italic();

        let bold_s = STYLE_BOLD.render();
        let bold_e = STYLE_BOLD.render_reset();

        self.write_time(buf)?;
        let level_color = match v.level {
            Level::Critical => COLOR_MAGENTA,
            Level::Error => COLOR_RED,
            Level::Warning => COLOR_YELLOW,
            Level::Info => COLOR_GREEN,
            Level::Debug => COLOR_CYAN,
            Level::Trace => COLOR_BLUE,
        };
        write!(
            buf,
            " {}{}{}",
            level_color.render(),
            v.level,
            level_color.render_reset(),
        )?;

        for (k, v) in &v.kv_pairs {
            write!(buf, " {bold_s}{k}{bold_e}={v},")?;
        }

        write!(buf, " {bold_s}{}{bold_e}", v.message_str())?;

        if let Some(location) = &v.location {
            write!(
                buf,
                " <{}{location}{}>",
                STYLE_ITALIC.render(),
                STYLE_ITALIC.render_reset()
            )?;
        }
        writeln!(buf)
    }

    fn write_buf<IO: Write>(&self, io: &mut IO, buf: &[u8]) {
        match io.write_all(buf) {
            Ok(_) => self.stats.add_passed(buf.len()),
            Err(_) => self.stats.add_dropped(),
        }
    }
}
