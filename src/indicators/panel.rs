use crate::data::Series;
use crate::indicators::moving_average::{ema, sma};
use crate::indicators::oscillators::{macd, rsi, stochastic, Macd, Stochastic};
use crate::indicators::volatility::{atr, bollinger_bands, vwap, BollingerBands};
use serde::Serialize;

//the dashboard's standard indicator set, every column parallel to the bars
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IndicatorPanel {
    pub sma_9: Vec<f64>,
    pub sma_20: Vec<f64>,
    pub sma_50: Vec<f64>,
    pub ema_9: Vec<f64>,
    pub ema_20: Vec<f64>,
    pub ema_50: Vec<f64>,
    pub rsi_14: Vec<f64>,
    pub atr_14: Vec<f64>,
    pub bollinger: BollingerBands,
    pub macd: Macd,
    pub stochastic: Stochastic,
    pub vwap: Option<Vec<f64>>,
}

impl IndicatorPanel {
    pub fn standard(series: &Series) -> Self {
        let closes = series.closes();
        let bars = series.bars();

        IndicatorPanel {
            sma_9: sma(&closes, 9),
            sma_20: sma(&closes, 20),
            sma_50: sma(&closes, 50),
            ema_9: ema(&closes, 9),
            ema_20: ema(&closes, 20),
            ema_50: ema(&closes, 50),
            rsi_14: rsi(&closes, 14),
            atr_14: atr(bars, 14),
            bollinger: bollinger_bands(&closes, 20, 2.0),
            macd: macd(&closes, 12, 26, 9),
            stochastic: stochastic(bars, 14, 3),
            vwap: vwap(bars),
        }
    }

    pub fn len(&self) -> usize {
        self.sma_9.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sma_9.is_empty()
    }
}
