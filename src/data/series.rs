use crate::data::bar::Bar;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SeriesError {
    #[error("Timestamps must be strictly increasing: bar {index} at {current} does not follow {previous}")]
    NotIncreasing {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
}

//ordered ohlcv bars for one symbol and timeframe
//immutable once built, indicator columns are keyed by bar index
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    symbol: String,
    bars: Vec<Bar>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (index, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SeriesError::NotIncreasing {
                    index: index + 1,
                    previous: pair[0].timestamp,
                    current: pair[1].timestamp,
                });
            }
        }

        Ok(Series {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    //close column
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
