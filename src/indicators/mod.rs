pub mod moving_average;
pub mod oscillators;
pub mod panel;
pub mod volatility;

pub use moving_average::{ema, moving_average, sma, MaType};
pub use oscillators::{macd, rsi, stochastic, Macd, Stochastic};
pub use panel::IndicatorPanel;
pub use volatility::{atr, bollinger_bands, true_range, vwap, BollingerBands};
