/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{SocketAddr, UdpSocket};
#[cfg(unix)]
use std::os::unix::net::UnixDatagram;
#[cfg(unix)]
use std::path::PathBuf;
#[cfg(test)]
use std::sync::{Arc, Mutex};

#[cfg(test)]
mod buf;
#[cfg(test)]
use buf::BufMetricsSink;

enum MetricsSinkIo {
    #[cfg(test)]
    Buf(BufMetricsSink),
    Udp(UdpSocket, SocketAddr),
    #[cfg(unix)]
    Unix(UnixDatagram, PathBuf),
}

impl MetricsSinkIo {
    fn send_msg(&self, buf: &[u8]) -> io::Result<()> {
        let nw = match self {
            #[cfg(test)]
            MetricsSinkIo::Buf(b) => b.send_msg(buf)?,
            MetricsSinkIo::Udp(socket, addr) => socket.send_to(buf, addr)?,
            #[cfg(unix)]
            MetricsSinkIo::Unix(socket, path) => socket.send_to(buf, path)?,
        };
        if nw < buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("truncated statsd payload, {nw} of {} bytes sent", buf.len()),
            ));
        }
        Ok(())
    }
}

/// Batches newline separated metric lines into payloads of at most
/// `cache_size` bytes.
///
/// A single line larger than `cache_size` is still sent, alone.
pub(crate) struct StatsdMetricsSink {
    cache_size: usize,
    buf: Vec<u8>,
    io: MetricsSinkIo,
}

impl StatsdMetricsSink {
    #[cfg(test)]
    pub(crate) fn buf_with_capacity(packets: Arc<Mutex<Vec<Vec<u8>>>>, cache_size: usize) -> Self {
        StatsdMetricsSink::with_io(MetricsSinkIo::Buf(BufMetricsSink::new(packets)), cache_size)
    }

    pub(crate) fn udp_with_capacity(
        addr: SocketAddr,
        socket: UdpSocket,
        cache_size: usize,
    ) -> Self {
        StatsdMetricsSink::with_io(MetricsSinkIo::Udp(socket, addr), cache_size)
    }

    #[cfg(unix)]
    pub(crate) fn unix_with_capacity(
        path: PathBuf,
        socket: UnixDatagram,
        cache_size: usize,
    ) -> Self {
        StatsdMetricsSink::with_io(MetricsSinkIo::Unix(socket, path), cache_size)
    }

    fn with_io(io: MetricsSinkIo, cache_size: usize) -> Self {
        StatsdMetricsSink {
            cache_size,
            buf: Vec::with_capacity(cache_size),
            io,
        }
    }

    /// Append one formatted line.
    ///
    /// If the line overflows the current payload, the payload is sent out
    /// first and the line starts a new one. An error is only returned if
    /// sending that payload failed, the new line is kept either way.
    pub(crate) fn emit<F>(&mut self, format: F) -> io::Result<()>
    where
        F: FnOnce(&mut Vec<u8>),
    {
        let offset = self.buf.len();
        if offset > 0 {
            self.buf.push(b'\n');
        }
        format(&mut self.buf);

        if offset > 0 && self.buf.len() > self.cache_size {
            let line = self.buf.split_off(offset + 1);
            self.buf.truncate(offset);
            let r = self.flush_buf();
            self.buf.extend_from_slice(&line);
            return r;
        }
        Ok(())
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        self.flush_buf()
    }

    fn flush_buf(&mut self) -> io::Result<()> {
        // metrics are fire and forget, a failed payload is not kept around
        let r = self.io.send_msg(&self.buf);
        self.buf.clear();
        r
    }
}
