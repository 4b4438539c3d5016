use crate::data::Series;
use crate::engine::trade::TradeDirection;
use serde::Serialize;

//flags raised on one bar, several may be set together
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Signal {
    pub buy: bool,
    pub sell: bool,
    pub exit_long: bool,
    pub exit_short: bool,
}

impl Signal {
    pub fn entry(&self, direction: TradeDirection) -> bool {
        match direction {
            TradeDirection::Buy => self.buy,
            TradeDirection::Sell => self.sell,
        }
    }

    //exit flag that closes a position of the given direction
    pub fn exit(&self, direction: TradeDirection) -> bool {
        match direction {
            TradeDirection::Buy => self.exit_long,
            TradeDirection::Sell => self.exit_short,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.buy || self.sell || self.exit_long || self.exit_short)
    }
}

//indicator columns a strategy derived while scanning
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorColumns {
    pub fast_ma: Option<Vec<f64>>,
    pub slow_ma: Option<Vec<f64>>,
    pub rsi: Option<Vec<f64>>,
    pub atr: Option<Vec<f64>>,
    pub filter_ma: Option<Vec<f64>>,
}

//the series plus per-bar signal flags
#[derive(Debug, Clone)]
pub struct SignalFrame<'a> {
    pub series: &'a Series,
    pub signals: Vec<Signal>,
    pub indicators: IndicatorColumns,
}

impl<'a> SignalFrame<'a> {
    pub fn new(series: &'a Series, indicators: IndicatorColumns) -> Self {
        SignalFrame {
            series,
            signals: vec![Signal::default(); series.len()],
            indicators,
        }
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn buy_count(&self) -> usize {
        self.signals.iter().filter(|s| s.buy).count()
    }

    pub fn sell_count(&self) -> usize {
        self.signals.iter().filter(|s| s.sell).count()
    }

    //indices of bars carrying an entry flag for the direction
    pub fn entries(&self, direction: TradeDirection) -> Vec<usize> {
        self.signals
            .iter()
            .enumerate()
            .filter(|(_, s)| s.entry(direction))
            .map(|(i, _)| i)
            .collect()
    }
}
