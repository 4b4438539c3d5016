use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum BarError {
    #[error("Invalid OHLC values: high ({high}) < low ({low})")]
    InvalidHighLow { high: f64, low: f64 },
    #[error("Invalid OHLC values: close ({close}) outside high-low range [{low}, {high}]")]
    InvalidClose { close: f64, high: f64, low: f64 },
    #[error("Invalid OHLC values: open ({open}) outside high-low range [{low}, {high}]")]
    InvalidOpen { open: f64, high: f64, low: f64 },
    #[error("Non-finite price in bar at {0}")]
    NonFinite(DateTime<Utc>),
}

//represents a single ohlcv bar (candlestick) of market data
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    //creates a new Bar with validation
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, BarError> {
        if ![open, high, low, close].iter().all(|v| v.is_finite()) {
            return Err(BarError::NonFinite(timestamp));
        }

        //validate high >= low
        if high < low {
            return Err(BarError::InvalidHighLow { high, low });
        }

        //validate close within [low, high]
        if close < low || close > high {
            return Err(BarError::InvalidClose { close, high, low });
        }

        //validate open within [low, high]
        if open < low || open > high {
            return Err(BarError::InvalidOpen { open, high, low });
        }

        Ok(Bar::new_unchecked(timestamp, open, high, low, close, volume))
    }

    //creates a Bar without validation
    pub fn new_unchecked(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    //returns the typical price (HLC/3)
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    //returns the range (high - low)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    //true range against the previous close
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(prev) => self
                .range()
                .max((self.high - prev).abs())
                .max((self.low - prev).abs()),
            None => self.range(),
        }
    }
}
