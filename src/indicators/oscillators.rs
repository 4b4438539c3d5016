use crate::data::Bar;
use crate::indicators::moving_average::{ema, rolling_mean};
use serde::Serialize;

//rsi value used when the window saw no movement at all
pub const RSI_NEUTRAL: f64 = 50.0;

//relative strength index from simple rolling averages of gains and losses
//bar 0 has no delta and reads neutral
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let period = period.max(1);
    let mut out = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        //deltas exist from index 1 onward
        let start = (i + 1).saturating_sub(period).max(1);
        if start > i {
            out.push(RSI_NEUTRAL);
            continue;
        }

        let mut gain = 0.0;
        let mut loss = 0.0;
        for j in start..=i {
            let change = closes[j] - closes[j - 1];
            if change > 0.0 {
                gain += change;
            } else {
                loss -= change;
            }
        }
        let count = (i + 1 - start) as f64;
        out.push(rsi_from_averages(gain / count, loss / count));
    }

    out
}

//100 - 100 / (1 + rs), with the zero-loss cases pinned
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return RSI_NEUTRAL;
        }
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Macd {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal = ema(&line, signal);
    let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    Macd {
        line,
        signal,
        histogram,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Stochastic {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

//fast stochastic oscillator, %k reads 50 when the window has no range
pub fn stochastic(bars: &[Bar], period: usize, smoothing: usize) -> Stochastic {
    let period = period.max(1);
    let k: Vec<f64> = (0..bars.len())
        .map(|i| {
            let window = &bars[(i + 1).saturating_sub(period)..=i];
            let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let range = highest - lowest;
            if range > 0.0 {
                100.0 * (bars[i].close - lowest) / range
            } else {
                50.0
            }
        })
        .collect();
    let d = rolling_mean(&k, smoothing);

    Stochastic { k, d }
}
