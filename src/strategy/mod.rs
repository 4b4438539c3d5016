pub mod ma_crossover;
pub mod rsi_strategy;
pub mod signals;

use crate::config::{StrategyEntry, StrategyParams};
use crate::data::Series;
use crate::engine::backtest::{run_backtest, BacktestResult};
use crate::engine::simulator::SimulationRules;
use crate::engine::trade::ClosedTrade;
use ma_crossover::MovingAverageCrossover;
use rsi_strategy::RsiStrategy;
use signals::SignalFrame;

//strategy interface that all strategies must implement
//a strategy keeps the trades of its last backtest only
pub trait Strategy: Send {
    //returns the strategy name
    fn name(&self) -> &str;

    //parameter snapshot for reports
    fn parameters(&self) -> serde_json::Value;

    //flags buy/sell (and exit) bars, looking back one bar at most
    fn generate_signals<'a>(&self, series: &'a Series) -> SignalFrame<'a>;

    //entry and exit rules for the trade simulator
    fn simulation_rules(&self) -> SimulationRules;

    //trades of the most recent backtest
    fn trades(&self) -> &[ClosedTrade];

    fn replace_trades(&mut self, trades: Vec<ClosedTrade>);

    fn backtest(&mut self, series: &Series) -> BacktestResult {
        run_backtest(self, series)
    }
}

//builds a boxed strategy from a configuration entry
pub fn from_entry(entry: &StrategyEntry) -> Box<dyn Strategy> {
    match &entry.params {
        StrategyParams::MaCrossover(params) => {
            let mut strategy = MovingAverageCrossover::new(params.clone());
            if let Some(name) = &entry.name {
                strategy = strategy.with_name(name.clone());
            }
            Box::new(strategy)
        }
        StrategyParams::Rsi(params) => {
            let mut strategy = RsiStrategy::new(params.clone());
            if let Some(name) = &entry.name {
                strategy = strategy.with_name(name.clone());
            }
            Box::new(strategy)
        }
    }
}

//true when a series crossed above a threshold between i-1 and i
pub(crate) fn crossed_above(prev: f64, current: f64, level: f64) -> bool {
    prev <= level && current > level
}

//true when a series crossed below a threshold between i-1 and i
pub(crate) fn crossed_below(prev: f64, current: f64, level: f64) -> bool {
    prev >= level && current < level
}
