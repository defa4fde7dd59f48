use crate::workflows::presale::error::AnalysisError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRICE_LOW: f64 = 13.0;
pub const DEFAULT_PRICE_HIGH: f64 = 16.0;

/// Target sale price band in 억 units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

impl PriceRange {
    pub fn new(low: f64, high: f64) -> Result<Self, AnalysisError> {
        let range = Self { low, high };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.low.is_finite() && self.high.is_finite() && self.low <= self.high {
            Ok(())
        } else {
            Err(AnalysisError::InvalidPriceRange {
                low: self.low,
                high: self.high,
            })
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        self.low <= price && price <= self.high
    }

    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            low: DEFAULT_PRICE_LOW,
            high: DEFAULT_PRICE_HIGH,
        }
    }
}

/// Read-only configuration shared by every row of a lead scoring run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub price_range: PriceRange,
}
