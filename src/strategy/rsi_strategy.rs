use crate::config::RsiStrategyParams;
use crate::data::Series;
use crate::engine::simulator::SimulationRules;
use crate::engine::trade::{ClosedTrade, TradeDirection};
use crate::indicators::{atr, moving_average, rsi};
use crate::strategy::signals::{IndicatorColumns, SignalFrame};
use crate::strategy::{crossed_above, crossed_below, Strategy};

//rsi strategy
//buys when rsi leaves the oversold zone, sells when it leaves overbought
//positions are also closed when rsi crosses the exit level against them
#[derive(Debug, Clone)]
pub struct RsiStrategy {
    name: String,
    params: RsiStrategyParams,
    trades: Vec<ClosedTrade>,
}

impl RsiStrategy {
    pub fn new(params: RsiStrategyParams) -> Self {
        RsiStrategy {
            name: format!("RSI Strategy (RSI {})", params.rsi_period),
            params,
            trades: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn params(&self) -> &RsiStrategyParams {
        &self.params
    }

    fn passes_filters(&self, direction: TradeDirection, close: f64, ma: Option<f64>) -> bool {
        if !self.params.risk.trade_direction.allows(direction) {
            return false;
        }

        match (direction, ma) {
            (TradeDirection::Buy, Some(ma)) => close >= ma,
            (TradeDirection::Sell, Some(ma)) => close <= ma,
            (_, None) => true,
        }
    }
}

impl Strategy for RsiStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::to_value(&self.params).unwrap_or(serde_json::Value::Null)
    }

    fn generate_signals<'a>(&self, series: &'a Series) -> SignalFrame<'a> {
        let p = &self.params;
        let closes = series.closes();
        let rsi_values = rsi(&closes, p.rsi_period);
        let filter_ma = p
            .use_ma_filter
            .then(|| moving_average(&closes, p.ma_period, p.ma_type));
        let atr_column = p
            .risk
            .use_atr_for_sl
            .then(|| atr(series.bars(), p.risk.atr_period));

        let mut frame = SignalFrame::new(
            series,
            IndicatorColumns {
                atr: atr_column,
                ..IndicatorColumns::default()
            },
        );

        for i in 1..closes.len() {
            let (prev, current) = (rsi_values[i - 1], rsi_values[i]);
            let ma = filter_ma.as_ref().map(|column| column[i]);
            let signal = &mut frame.signals[i];

            if crossed_above(prev, current, p.rsi_oversold) {
                signal.buy = self.passes_filters(TradeDirection::Buy, closes[i], ma);
            }
            if crossed_below(prev, current, p.rsi_overbought) {
                signal.sell = self.passes_filters(TradeDirection::Sell, closes[i], ma);
            }

            signal.exit_long = prev > p.exit_rsi_level && current <= p.exit_rsi_level;
            signal.exit_short = prev < p.exit_rsi_level && current >= p.exit_rsi_level;
        }

        tracing::debug!(
            strategy = %self.name,
            buys = frame.buy_count(),
            sells = frame.sell_count(),
            "generated rsi signals"
        );

        frame.indicators.rsi = Some(rsi_values);
        frame.indicators.filter_ma = filter_ma;
        frame
    }

    fn simulation_rules(&self) -> SimulationRules {
        SimulationRules::from_risk(&self.params.risk)
            .with_exit_signals(self.params.wait_for_exit_before_new_entry)
    }

    fn trades(&self) -> &[ClosedTrade] {
        &self.trades
    }

    fn replace_trades(&mut self, trades: Vec<ClosedTrade>) {
        self.trades = trades;
    }
}
