use crate::config::MaCrossoverParams;
use crate::data::Series;
use crate::engine::simulator::SimulationRules;
use crate::engine::trade::{ClosedTrade, TradeDirection};
use crate::indicators::{atr, moving_average, rsi};
use crate::strategy::signals::{IndicatorColumns, SignalFrame};
use crate::strategy::Strategy;

//moving average crossover strategy
//buys when the fast average crosses up through the slow one
//sells on the opposite cross
#[derive(Debug, Clone)]
pub struct MovingAverageCrossover {
    name: String,
    params: MaCrossoverParams,

    //state
    trades: Vec<ClosedTrade>,
}

impl MovingAverageCrossover {
    pub fn new(params: MaCrossoverParams) -> Self {
        let name = format!(
            "MA Crossover ({} {}/{})",
            params.ma_type, params.fast_ma_period, params.slow_ma_period
        );

        MovingAverageCrossover {
            name,
            params,
            trades: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn params(&self) -> &MaCrossoverParams {
        &self.params
    }

    //direction and rsi filters, true if the signal survives
    fn passes_filters(&self, direction: TradeDirection, rsi_value: Option<f64>) -> bool {
        if !self.params.risk.trade_direction.allows(direction) {
            return false;
        }

        match (direction, rsi_value) {
            (TradeDirection::Buy, Some(value)) => value < self.params.rsi_overbought,
            (TradeDirection::Sell, Some(value)) => value > self.params.rsi_oversold,
            (_, None) => true,
        }
    }
}

impl Strategy for MovingAverageCrossover {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::to_value(&self.params).unwrap_or(serde_json::Value::Null)
    }

    fn generate_signals<'a>(&self, series: &'a Series) -> SignalFrame<'a> {
        let closes = series.closes();
        let fast = moving_average(&closes, self.params.fast_ma_period, self.params.ma_type);
        let slow = moving_average(&closes, self.params.slow_ma_period, self.params.ma_type);

        let rsi_column = self
            .params
            .use_rsi_filter
            .then(|| rsi(&closes, self.params.rsi_period));
        let atr_column = self
            .params
            .risk
            .use_atr_for_sl
            .then(|| atr(series.bars(), self.params.risk.atr_period));

        let mut frame = SignalFrame::new(
            series,
            IndicatorColumns {
                fast_ma: None,
                slow_ma: None,
                rsi: None,
                atr: atr_column,
                filter_ma: None,
            },
        );

        for i in 1..closes.len() {
            let rsi_value = rsi_column.as_ref().map(|column| column[i]);

            //upward cross
            if fast[i - 1] < slow[i - 1] && fast[i] >= slow[i] {
                frame.signals[i].buy = self.passes_filters(TradeDirection::Buy, rsi_value);
            }
            //downward cross
            else if fast[i - 1] > slow[i - 1] && fast[i] <= slow[i] {
                frame.signals[i].sell = self.passes_filters(TradeDirection::Sell, rsi_value);
            }
        }

        tracing::debug!(
            strategy = %self.name,
            buys = frame.buy_count(),
            sells = frame.sell_count(),
            "generated crossover signals"
        );

        frame.indicators.fast_ma = Some(fast);
        frame.indicators.slow_ma = Some(slow);
        frame.indicators.rsi = rsi_column;
        frame
    }

    fn simulation_rules(&self) -> SimulationRules {
        SimulationRules::from_risk(&self.params.risk)
    }

    fn trades(&self) -> &[ClosedTrade] {
        &self.trades
    }

    fn replace_trades(&mut self, trades: Vec<ClosedTrade>) {
        self.trades = trades;
    }
}
