use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//trade direction (long or short)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl TradeDirection {
    //+1 for longs, -1 for shorts
    pub fn sign(&self) -> f64 {
        match self {
            TradeDirection::Buy => 1.0,
            TradeDirection::Sell => -1.0,
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDirection::Buy => write!(f, "BUY"),
            TradeDirection::Sell => write!(f, "SELL"),
        }
    }
}

//the simulator only ever emits ClosedProfit and ClosedLoss; a flat price exit is a loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    Open,
    ClosedProfit,
    ClosedLoss,
    ClosedEven,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TradeStatus::Open => "OPEN",
            TradeStatus::ClosedProfit => "CLOSED (PROFIT)",
            TradeStatus::ClosedLoss => "CLOSED (LOSS)",
            TradeStatus::ClosedEven => "CLOSED (BREAK-EVEN)",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    StopLoss,
    //1-based take-profit level
    TakeProfit(usize),
    RsiExit,
    EndOfBacktest,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "Stop-Loss"),
            ExitReason::TakeProfit(level) => write!(f, "Take-Profit {}", level),
            ExitReason::RsiExit => write!(f, "RSI Exit"),
            ExitReason::EndOfBacktest => write!(f, "end of backtest"),
        }
    }
}

//a position that has been entered but not yet exited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenTrade {
    pub symbol: String,
    pub direction: TradeDirection,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    pub entry_index: usize,
    pub stop_loss: f64,
    //nearest target first
    pub take_profit: Vec<f64>,
}

impl OpenTrade {
    //reward to the first target divided by the risk to the stop
    pub fn calculate_risk_reward(&self) -> f64 {
        let Some(&first_target) = self.take_profit.first() else {
            return 0.0;
        };

        let (risk, reward) = match self.direction {
            TradeDirection::Buy => (
                self.entry_price - self.stop_loss,
                first_target - self.entry_price,
            ),
            TradeDirection::Sell => (
                self.stop_loss - self.entry_price,
                self.entry_price - first_target,
            ),
        };

        if risk <= 0.0 {
            return 0.0;
        }

        reward / risk
    }

    //returns (price distance, percent of entry) in the trade's favour
    pub fn calculate_profit(&self, price: f64) -> (f64, f64) {
        let diff = (price - self.entry_price) * self.direction.sign();
        (diff, diff * 100.0 / self.entry_price)
    }

    //exit price and reason if this bar's range hits the stop or a target
    //the stop is checked first, assuming the worst fill order inside the bar
    pub fn check_exit_conditions(&self, high: f64, low: f64) -> Option<(f64, ExitReason)> {
        let stop_hit = match self.direction {
            TradeDirection::Buy => low <= self.stop_loss,
            TradeDirection::Sell => high >= self.stop_loss,
        };
        if stop_hit {
            return Some((self.stop_loss, ExitReason::StopLoss));
        }

        self.take_profit
            .iter()
            .enumerate()
            .find(|&(_, &level)| match self.direction {
                TradeDirection::Buy => high >= level,
                TradeDirection::Sell => low <= level,
            })
            .map(|(i, &level)| (level, ExitReason::TakeProfit(i + 1)))
    }

    //the only transition out of the open state
    pub fn close(
        self,
        exit_price: f64,
        exit_time: DateTime<Utc>,
        exit_index: usize,
        exit_reason: ExitReason,
    ) -> ClosedTrade {
        let (profit_pips, profit_percentage) = self.calculate_profit(exit_price);

        let status = match exit_reason {
            ExitReason::StopLoss => TradeStatus::ClosedLoss,
            ExitReason::TakeProfit(_) => TradeStatus::ClosedProfit,
            //price exits only win when strictly in the trade's favour
            ExitReason::RsiExit | ExitReason::EndOfBacktest => {
                if profit_pips > 0.0 {
                    TradeStatus::ClosedProfit
                } else {
                    TradeStatus::ClosedLoss
                }
            }
        };

        ClosedTrade {
            entry: self,
            status,
            exit_price,
            exit_time,
            exit_index,
            exit_reason,
            profit_pips,
            profit_percentage,
        }
    }
}

//a finished trade, exit fields always present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub entry: OpenTrade,
    pub status: TradeStatus,
    pub exit_price: f64,
    pub exit_time: DateTime<Utc>,
    pub exit_index: usize,
    pub exit_reason: ExitReason,
    pub profit_pips: f64,
    pub profit_percentage: f64,
}

impl ClosedTrade {
    pub fn direction(&self) -> TradeDirection {
        self.entry.direction
    }

    pub fn entry_price(&self) -> f64 {
        self.entry.entry_price
    }

    pub fn entry_time(&self) -> DateTime<Utc> {
        self.entry.entry_time
    }

    pub fn stop_loss(&self) -> f64 {
        self.entry.stop_loss
    }

    pub fn take_profit(&self) -> &[f64] {
        &self.entry.take_profit
    }

    pub fn calculate_risk_reward(&self) -> f64 {
        self.entry.calculate_risk_reward()
    }

    pub fn is_win(&self) -> bool {
        self.status == TradeStatus::ClosedProfit
    }

    pub fn is_loss(&self) -> bool {
        self.status == TradeStatus::ClosedLoss
    }

    //bars held, entry bar excluded
    pub fn bars_held(&self) -> usize {
        self.exit_index.saturating_sub(self.entry.entry_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn open(direction: TradeDirection, entry: f64, stop: f64, targets: &[f64]) -> OpenTrade {
        OpenTrade {
            symbol: "XAU/USD".to_string(),
            direction,
            entry_price: entry,
            entry_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            entry_index: 3,
            stop_loss: stop,
            take_profit: targets.to_vec(),
        }
    }

    fn later() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
    }

    #[test]
    fn profit_round_trip_for_both_directions() {
        let buy = open(TradeDirection::Buy, 100.0, 98.0, &[110.0]);
        assert_eq!(buy.calculate_profit(110.0), (10.0, 10.0));

        let sell = open(TradeDirection::Sell, 100.0, 102.0, &[90.0]);
        assert_eq!(sell.calculate_profit(90.0), (10.0, 10.0));
    }

    #[test]
    fn risk_reward_uses_first_target() {
        let buy = open(TradeDirection::Buy, 100.0, 98.0, &[105.0, 110.0]);
        assert_eq!(buy.calculate_risk_reward(), 2.5);

        let sell = open(TradeDirection::Sell, 100.0, 101.0, &[97.0]);
        assert_eq!(sell.calculate_risk_reward(), 3.0);
    }

    #[test]
    fn risk_reward_is_zero_without_risk_or_targets() {
        assert_eq!(open(TradeDirection::Buy, 100.0, 100.0, &[105.0]).calculate_risk_reward(), 0.0);
        assert_eq!(open(TradeDirection::Buy, 100.0, 98.0, &[]).calculate_risk_reward(), 0.0);
    }

    #[test]
    fn stop_checked_before_target_on_same_bar() {
        let buy = open(TradeDirection::Buy, 100.0, 98.0, &[105.0]);
        //bar spans both levels
        assert_eq!(
            buy.check_exit_conditions(106.0, 97.0),
            Some((98.0, ExitReason::StopLoss))
        );
    }

    #[test]
    fn first_breached_target_wins() {
        let sell = open(TradeDirection::Sell, 100.0, 102.0, &[97.0, 95.0, 90.0]);
        assert_eq!(
            sell.check_exit_conditions(99.0, 94.0),
            Some((97.0, ExitReason::TakeProfit(1)))
        );
        assert_eq!(sell.check_exit_conditions(101.0, 98.0), None);
    }

    #[test]
    fn close_classifies_price_exits() {
        let buy = open(TradeDirection::Buy, 100.0, 98.0, &[105.0]);
        let closed = buy.clone().close(101.0, later(), 7, ExitReason::RsiExit);
        assert_eq!(closed.status, TradeStatus::ClosedProfit);
        assert_eq!(closed.bars_held(), 4);

        let closed = buy.clone().close(99.0, later(), 7, ExitReason::EndOfBacktest);
        assert_eq!(closed.status, TradeStatus::ClosedLoss);
        assert_eq!(closed.profit_percentage, -1.0);

        let closed = buy.close(100.0, later(), 7, ExitReason::EndOfBacktest);
        assert_eq!(closed.status, TradeStatus::ClosedLoss);
        assert!(closed.is_loss());
    }

    #[test]
    fn close_at_entry_counts_as_loss_both_ways() {
        let sell = open(TradeDirection::Sell, 100.0, 102.0, &[95.0]);
        let closed = sell.clone().close(100.0, later(), 5, ExitReason::RsiExit);
        assert_eq!(closed.status, TradeStatus::ClosedLoss);
        assert_eq!(closed.profit_pips, 0.0);

        let closed = sell.close(100.0, later(), 5, ExitReason::EndOfBacktest);
        assert_eq!(closed.status, TradeStatus::ClosedLoss);
        assert!(!closed.is_win());
    }

    #[test]
    fn close_on_stop_is_loss() {
        let sell = open(TradeDirection::Sell, 100.0, 102.0, &[95.0]);
        let closed = sell.close(102.0, later(), 4, ExitReason::StopLoss);
        assert_eq!(closed.status, TradeStatus::ClosedLoss);
        assert_eq!(closed.profit_pips, -2.0);
        assert_eq!(closed.exit_reason.to_string(), "Stop-Loss");
    }
}
