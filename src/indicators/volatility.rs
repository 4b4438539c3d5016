use crate::data::Bar;
use crate::indicators::moving_average::rolling_mean;
use serde::Serialize;
use statrs::statistics::Statistics;

pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let prev_close = i.checked_sub(1).map(|p| bars[p].close);
            bar.true_range(prev_close)
        })
        .collect()
}

//average true range
pub fn atr(bars: &[Bar], period: usize) -> Vec<f64> {
    rolling_mean(&true_range(bars), period)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

//bands at k sample standard deviations around the sma
pub fn bollinger_bands(closes: &[f64], period: usize, k: f64) -> BollingerBands {
    let period = period.max(1);
    let middle = rolling_mean(closes, period);
    let deviations: Vec<f64> = (0..closes.len())
        .map(|i| {
            let window = &closes[(i + 1).saturating_sub(period)..=i];
            if window.len() < 2 {
                0.0
            } else {
                window.std_dev()
            }
        })
        .collect();

    BollingerBands {
        upper: middle.iter().zip(&deviations).map(|(m, d)| m + k * d).collect(),
        lower: middle.iter().zip(&deviations).map(|(m, d)| m - k * d).collect(),
        middle,
    }
}

//cumulative volume weighted typical price, none without any volume
pub fn vwap(bars: &[Bar]) -> Option<Vec<f64>> {
    if bars.iter().all(|b| b.volume == 0) {
        return None;
    }

    let mut cum_pv = 0.0;
    let mut cum_volume = 0.0;
    let out = bars
        .iter()
        .map(|bar| {
            cum_pv += bar.typical_price() * bar.volume as f64;
            cum_volume += bar.volume as f64;
            if cum_volume > 0.0 {
                cum_pv / cum_volume
            } else {
                bar.typical_price()
            }
        })
        .collect();

    Some(out)
}
