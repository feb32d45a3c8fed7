/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::sync::{Arc, Mutex};

/// Collects every sent packet, for tests.
pub(super) struct BufMetricsSink {
    packets: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl BufMetricsSink {
    pub(super) fn new(packets: Arc<Mutex<Vec<Vec<u8>>>>) -> Self {
        BufMetricsSink { packets }
    }

    pub(super) fn send_msg(&self, msg: &[u8]) -> io::Result<usize> {
        let mut packets = self
            .packets
            .lock()
            .map_err(|_| io::Error::other("poisoned packet buffer"))?;
        packets.push(msg.to_vec());
        Ok(msg.len())
    }
}
