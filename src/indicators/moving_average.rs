use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//moving average flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaType {
    #[default]
    Sma,
    Ema,
}

impl FromStr for MaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sma" => Ok(MaType::Sma),
            "ema" => Ok(MaType::Ema),
            other => Err(format!("unknown moving average type: {}", other)),
        }
    }
}

impl fmt::Display for MaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaType::Sma => write!(f, "SMA"),
            MaType::Ema => write!(f, "EMA"),
        }
    }
}

//mean over a trailing window, shorter at the start of the series
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let period = period.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(period);
            let window = &values[start..=i];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

//simple moving average
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    rolling_mean(values, period)
}

//exponential moving average seeded with the first value
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &value in values {
        let next = match prev {
            Some(p) => alpha * value + (1.0 - alpha) * p,
            None => value,
        };
        out.push(next);
        prev = Some(next);
    }

    out
}

pub fn moving_average(values: &[f64], period: usize, ma_type: MaType) -> Vec<f64> {
    match ma_type {
        MaType::Sma => sma(values, period),
        MaType::Ema => ema(values, period),
    }
}
