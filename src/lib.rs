//a Rust-based strategy backtesting and comparison engine for ohlcv series

pub mod config;
pub mod data;
pub mod engine;
pub mod indicators;
pub mod metrics;
pub mod report;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        ComparisonConfig, DirectionFilter, MaCrossoverParams, RiskParams, RsiStrategyParams,
        StopLossMode, StrategyEntry, StrategyParams, StrategyType,
    };
    pub use crate::data::{load_csv, Bar, Series};
    pub use crate::engine::{
        run_backtest, BacktestEngine, BacktestResult, ClosedTrade, ExitReason, OpenTrade,
        SimulationRules, TradeDirection, TradeStatus,
    };
    pub use crate::indicators::{IndicatorPanel, MaType};
    pub use crate::metrics::{equity_curve, write_equity_csv, EquityPoint, PerformanceMetrics};
    pub use crate::report::{ComparisonReport, TradeTable};
    pub use crate::strategy::{
        from_entry, ma_crossover::MovingAverageCrossover, rsi_strategy::RsiStrategy, Strategy,
    };
}
