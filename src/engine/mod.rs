pub mod backtest;
pub mod simulator;
pub mod trade;

pub use backtest::{run_backtest, BacktestEngine, BacktestResult};
pub use simulator::{admit_trade, run_to_exit, simulate_trades, SimulationRules};
pub use trade::{ClosedTrade, ExitReason, OpenTrade, TradeDirection, TradeStatus};
