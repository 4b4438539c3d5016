use crate::config::{RiskParams, StopLossMode};
use crate::engine::trade::{ClosedTrade, ExitReason, OpenTrade, TradeDirection};
use crate::indicators::atr;
use crate::strategy::signals::SignalFrame;
use serde::Serialize;
use std::borrow::Cow;

const DIRECTIONS: [TradeDirection; 2] = [TradeDirection::Buy, TradeDirection::Sell];

//how signals turn into trades and how trades are exited
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRules {
    pub stop_loss: StopLossMode,
    //percent distances from entry, nearest first
    pub take_profit_pct: Vec<f64>,
    pub min_risk_reward: f64,
    //close on the opposing exit flag
    pub use_exit_signals: bool,
    //no new same-direction entry while one is still open
    pub wait_for_exit: bool,
}

impl SimulationRules {
    pub fn from_risk(risk: &RiskParams) -> Self {
        SimulationRules {
            stop_loss: risk.stop_loss_mode(),
            take_profit_pct: risk.take_profit_levels(),
            min_risk_reward: risk.risk_reward_ratio,
            use_exit_signals: false,
            wait_for_exit: false,
        }
    }

    pub fn with_exit_signals(mut self, wait_for_exit: bool) -> Self {
        self.use_exit_signals = true;
        self.wait_for_exit = wait_for_exit;
        self
    }
}

//walks every signal bar forward to a closed trade
pub fn simulate_trades(frame: &SignalFrame<'_>, rules: &SimulationRules) -> Vec<ClosedTrade> {
    let bars = frame.series.bars();
    let mut trades = Vec::new();

    let atr_column: Option<Cow<'_, [f64]>> = match rules.stop_loss {
        StopLossMode::Atr { period, .. } => Some(match frame.indicators.atr.as_deref() {
            Some(column) => Cow::Borrowed(column),
            None => Cow::Owned(atr(bars, period)),
        }),
        StopLossMode::Percent(_) => None,
    };

    //bar index until which the last trade per direction stays open
    let mut active_until = [None::<usize>; 2];

    //the last bar has nothing after it to trade against
    for i in 0..bars.len().saturating_sub(1) {
        for (slot, direction) in DIRECTIONS.into_iter().enumerate() {
            if !frame.signals[i].entry(direction) {
                continue;
            }

            if rules.wait_for_exit && active_until[slot].is_some_and(|until| until > i) {
                tracing::debug!(bar = i, %direction, "entry skipped, previous trade still open");
                continue;
            }

            let atr_value = atr_column.as_ref().map(|column| column[i]);
            let Some(trade) = admit_trade(frame, i, direction, rules, atr_value) else {
                continue;
            };

            let closed = run_to_exit(trade, frame, rules);
            active_until[slot] = Some(closed.exit_index);
            trades.push(closed);
        }
    }

    trades
}

//builds the trade for a signal bar if it clears the risk:reward gate
pub fn admit_trade(
    frame: &SignalFrame<'_>,
    index: usize,
    direction: TradeDirection,
    rules: &SimulationRules,
    atr_value: Option<f64>,
) -> Option<OpenTrade> {
    let bar = frame.series.bars().get(index)?;
    let entry_price = bar.close;
    let sign = direction.sign();

    let risk_distance = match rules.stop_loss {
        StopLossMode::Percent(pct) => entry_price * pct / 100.0,
        StopLossMode::Atr { multiplier, .. } => atr_value? * multiplier,
    };

    let trade = OpenTrade {
        symbol: frame.series.symbol().to_string(),
        direction,
        entry_price,
        entry_time: bar.timestamp,
        entry_index: index,
        stop_loss: entry_price - sign * risk_distance,
        take_profit: rules
            .take_profit_pct
            .iter()
            .map(|pct| entry_price + sign * entry_price * pct / 100.0)
            .collect(),
    };

    //checked on the stored prices, so an admitted trade never reports less than the minimum
    let ratio = trade.calculate_risk_reward();
    if ratio.is_nan() || ratio <= 0.0 || ratio < rules.min_risk_reward {
        tracing::debug!(
            bar = index,
            %direction,
            ratio,
            min = rules.min_risk_reward,
            "signal rejected by risk:reward gate"
        );
        return None;
    }

    Some(trade)
}

//scans forward from the bar after entry until the trade closes
pub fn run_to_exit(trade: OpenTrade, frame: &SignalFrame<'_>, rules: &SimulationRules) -> ClosedTrade {
    let bars = frame.series.bars();
    let direction = trade.direction;

    for j in (trade.entry_index + 1)..bars.len() {
        let bar = &bars[j];

        if let Some((price, reason)) = trade.check_exit_conditions(bar.high, bar.low) {
            return trade.close(price, bar.timestamp, j, reason);
        }

        if rules.use_exit_signals && frame.signals[j].exit(direction) {
            return trade.close(bar.close, bar.timestamp, j, ExitReason::RsiExit);
        }
    }

    //forced close on the last available bar
    match bars.last() {
        Some(last) if bars.len() > trade.entry_index + 1 => {
            let last_index = bars.len() - 1;
            trade.close(last.close, last.timestamp, last_index, ExitReason::EndOfBacktest)
        }
        _ => {
            let (price, time, index) = (trade.entry_price, trade.entry_time, trade.entry_index);
            trade.close(price, time, index, ExitReason::EndOfBacktest)
        }
    }
}
