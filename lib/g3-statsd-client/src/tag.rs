/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

/// Pre-encoded comma separated tag list.
#[derive(Clone, Default)]
pub(crate) struct StatsdTagGroup {
    buf: Vec<u8>,
}

impl StatsdTagGroup {
    /// Append a raw tag, which may or may not contain a `:` itself.
    pub(crate) fn add_tag_value<T: AsRef<str>>(&mut self, value: T) {
        if !self.buf.is_empty() {
            self.buf.push(b',');
        }
        self.buf.extend_from_slice(value.as_ref().as_bytes());
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.buf.as_slice()
    }
}
