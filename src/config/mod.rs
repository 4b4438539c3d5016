pub mod strategy_config;

pub use strategy_config::{
    parse_ma_type, parse_take_profit_levels, take_profit_or_default, ComparisonConfig,
    ConfigError, DirectionFilter, MaCrossoverParams, RiskParams, RsiStrategyParams, StopLossMode,
    StrategyEntry, StrategyParams, StrategyType, DEFAULT_MIN_RISK_REWARD, DEFAULT_TAKE_PROFIT_PCT,
};
