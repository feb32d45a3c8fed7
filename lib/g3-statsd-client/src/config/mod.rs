/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
#[cfg(unix)]
use std::os::unix::net::UnixDatagram;
#[cfg(unix)]
use std::path::PathBuf;

use crate::{MetricsName, StatsdClient, StatsdMetricsSink};

const UDP_DEFAULT_PORT: u16 = 8125;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsdBackend {
    Udp(SocketAddr, Option<IpAddr>),
    #[cfg(unix)]
    Unix(PathBuf),
}

impl Default for StatsdBackend {
    fn default() -> Self {
        StatsdBackend::Udp(
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), UDP_DEFAULT_PORT),
            None,
        )
    }
}

#[derive(Debug, Clone)]
pub struct StatsdClientConfig {
    backend: StatsdBackend,
    prefix: MetricsName,
    pub cache_size: usize,
}

impl Default for StatsdClientConfig {
    fn default() -> Self {
        StatsdClientConfig::with_prefix(MetricsName::default())
    }
}

impl StatsdClientConfig {
    pub fn with_prefix(prefix: MetricsName) -> Self {
        StatsdClientConfig {
            backend: StatsdBackend::default(),
            prefix,
            cache_size: 512,
        }
    }

    pub fn set_backend(&mut self, target: StatsdBackend) {
        self.backend = target;
    }

    pub fn backend(&self) -> &StatsdBackend {
        &self.backend
    }

    pub fn set_prefix(&mut self, prefix: MetricsName) {
        self.prefix = prefix;
    }

    pub fn prefix(&self) -> &MetricsName {
        &self.prefix
    }

    pub fn build(&self) -> io::Result<StatsdClient> {
        if self.cache_size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "zero statsd cache size",
            ));
        }

        let sink = match &self.backend {
            StatsdBackend::Udp(addr, bind) => {
                let bind_ip = bind.unwrap_or(match addr {
                    SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
                });
                let socket = UdpSocket::bind(SocketAddr::new(bind_ip, 0))?;
                StatsdMetricsSink::udp_with_capacity(*addr, socket, self.cache_size)
            }
            #[cfg(unix)]
            StatsdBackend::Unix(path) => {
                let socket = UnixDatagram::unbound()?;
                StatsdMetricsSink::unix_with_capacity(path.clone(), socket, self.cache_size)
            }
        };

        Ok(StatsdClient::new(self.prefix.clone(), sink))
    }
}
