/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::iter::FusedIterator;

/// Lazily yields `count` keys in the form `<prefix>.<hex index>`.
pub struct KeyGenerator {
    prefix: String,
    next: usize,
    count: usize,
}

impl KeyGenerator {
    pub fn new(prefix: &str, count: usize) -> Self {
        KeyGenerator {
            prefix: prefix.to_string(),
            next: 0,
            count,
        }
    }
}

impl Iterator for KeyGenerator {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let key = format!("{}.{:x}", self.prefix, self.next);
        self.next += 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for KeyGenerator {}

impl FusedIterator for KeyGenerator {}

pub fn generate(prefix: &str, count: usize) -> KeyGenerator {
    KeyGenerator::new(prefix, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn empty() {
        let mut keys = generate("g", 0);
        assert_eq!(keys.len(), 0);
        assert!(keys.next().is_none());
    }

    #[test]
    fn hex_index() {
        let keys: Vec<String> = generate("g", 18).collect();
        assert_eq!(keys.len(), 18);
        assert_eq!(keys[0], "g.0");
        assert_eq!(keys[9], "g.9");
        assert_eq!(keys[10], "g.a");
        assert_eq!(keys[17], "g.11");
    }

    #[test]
    fn distinct_and_ascending() {
        let keys: Vec<String> = generate("c", 1000).collect();
        let set: HashSet<&String> = keys.iter().collect();
        assert_eq!(set.len(), 1000);

        let indexes: Vec<usize> = keys
            .iter()
            .map(|k| usize::from_str_radix(k.strip_prefix("c.").unwrap(), 16).unwrap())
            .collect();
        assert!(indexes.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(indexes.first(), Some(&0));
        assert_eq!(indexes.last(), Some(&999));
    }

    #[test]
    fn exhausted() {
        let mut keys = generate("h", 1);
        assert_eq!(keys.next().as_deref(), Some("h.0"));
        assert!(keys.next().is_none());
        assert!(keys.next().is_none());
        assert_eq!(keys.len(), 0);
    }
}
