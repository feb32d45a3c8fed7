/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use rand::Rng;
use rand_distr::StandardNormal;

/// Source of the synthetic metric values.
pub trait ValueGenerator: Send + Sync {
    /// Value for count like metrics.
    fn integer(&self) -> i64;
    /// Value for continuous metrics.
    fn float(&self) -> f64;
}

pub struct FixedValue {
    integer: i64,
    float: f64,
}

impl FixedValue {
    pub fn new(integer: i64, float: f64) -> Self {
        FixedValue { integer, float }
    }
}

impl Default for FixedValue {
    fn default() -> Self {
        FixedValue::new(1, 0.5)
    }
}

impl ValueGenerator for FixedValue {
    fn integer(&self) -> i64 {
        self.integer
    }

    fn float(&self) -> f64 {
        self.float
    }
}

/// Integers uniform in `[0, 10)`, floats from the standard normal
/// distribution.
#[derive(Default)]
pub struct RandomValue {}

impl ValueGenerator for RandomValue {
    fn integer(&self) -> i64 {
        rand::rng().random_range(0..10)
    }

    fn float(&self) -> f64 {
        rand::rng().sample(StandardNormal)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValueMode {
    #[default]
    Fixed,
    Random,
}

impl ValueMode {
    pub fn build(self) -> Box<dyn ValueGenerator> {
        match self {
            ValueMode::Fixed => Box::new(FixedValue::default()),
            ValueMode::Random => Box::new(RandomValue::default()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueMode::Fixed => "fixed",
            ValueMode::Random => "random",
        }
    }
}

impl FromStr for ValueMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(ValueMode::Fixed),
            "random" => Ok(ValueMode::Random),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed() {
        let g = ValueMode::Fixed.build();
        assert_eq!(g.integer(), 1);
        assert_eq!(g.float(), 0.5);
    }

    #[test]
    fn random_range() {
        let g = ValueMode::Random.build();
        for _ in 0..1000 {
            let v = g.integer();
            assert!((0..10).contains(&v));
            assert!(g.float().is_finite());
        }
    }

    #[test]
    fn parse_mode() {
        assert_eq!(ValueMode::from_str("Random"), Ok(ValueMode::Random));
        assert_eq!(ValueMode::from_str("fixed"), Ok(ValueMode::Fixed));
        assert!(ValueMode::from_str("normal").is_err());
    }
}
