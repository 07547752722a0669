//! Price bands and the partition of the price domain into bands
//!
//! The search endpoint truncates every query at a fixed result count, so the
//! catalog is walked one price band at a time. Breakpoints are plain
//! configuration: denser at low prices where most products sit.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Inclusive price interval `[min, max]`; `max = None` is unbounded above
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub min: f64,
    pub max: Option<f64>,
}

impl PriceBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max: Some(max) }
    }

    pub const fn open_ended(min: f64) -> Self {
        Self { min, max: None }
    }

    /// Both ends inclusive, matching `minPrice`/`maxPrice` on the search API
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && self.max.is_none_or(|max| price <= max)
    }
}

impl fmt::Display for PriceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "[{}, {}]", self.min, max),
            None => write!(f, "[{}, +inf)", self.min),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PartitionError {
    #[error("Partition needs at least {required} breakpoints, got {actual}")]
    TooFewBreakpoints { required: usize, actual: usize },

    #[error("Breakpoint {value} at position {index} is negative or not finite")]
    InvalidBreakpoint { index: usize, value: f64 },

    #[error("Breakpoints must be strictly increasing: {previous} is followed by {next}")]
    NotIncreasing { previous: f64, next: f64 },
}

/// Ordered, gap-free sequence of bands built from breakpoints
#[derive(Debug, Clone, PartialEq)]
pub struct PricePartition {
    bands: Vec<PriceBand>,
}

impl PricePartition {
    /// Build `[b0,b1], [b1,b2], ...` and, with `open_tail`, a final `[bn, +inf)`
    pub fn from_breakpoints(breakpoints: &[f64], open_tail: bool) -> Result<Self, PartitionError> {
        let required = if open_tail { 1 } else { 2 };
        if breakpoints.len() < required {
            return Err(PartitionError::TooFewBreakpoints {
                required,
                actual: breakpoints.len(),
            });
        }

        for (index, &value) in breakpoints.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(PartitionError::InvalidBreakpoint { index, value });
            }
        }

        for pair in breakpoints.windows(2) {
            if pair[1] <= pair[0] {
                return Err(PartitionError::NotIncreasing {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }

        let mut bands: Vec<PriceBand> = breakpoints
            .windows(2)
            .map(|pair| PriceBand::new(pair[0], pair[1]))
            .collect();

        if open_tail {
            if let Some(&last) = breakpoints.last() {
                bands.push(PriceBand::open_ended(last));
            }
        }

        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[PriceBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Lowest price covered by the partition
    pub fn floor(&self) -> Option<f64> {
        self.bands.first().map(|b| b.min)
    }
}

/// Breakpoints used when no configuration overrides them
pub const DEFAULT_BREAKPOINTS: &[f64] = &[
    0.0, 0.5, 1.0, 1.1, 1.2, 1.3, 1.4, 1.5, 1.6, 1.7, 1.8, 1.9, 2.0, 2.1, 2.2, 2.3, 2.4, 2.5, 2.6,
    2.7, 2.8, 2.9, 3.5, 4.1, 5.0, 6.0, 8.0, 10.0, 15.0, 20.0, 30.0, 50.0, 1000.0,
];
