use crate::engine::trade::TradeDirection;
use crate::indicators::MaType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_TAKE_PROFIT_PCT: [f64; 3] = [1.25, 2.0, 3.0];
pub const DEFAULT_MIN_RISK_REWARD: f64 = 2.5;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Take-profit level '{0}' is not a number")]
    InvalidTakeProfit(String),
    #[error("Take-profit level {0} must be a positive percentage")]
    NonPositiveTakeProfit(f64),
    #[error("No take-profit levels given")]
    EmptyTakeProfit,
    #[error("Unknown trade direction: {0} (expected long, short or both)")]
    UnknownDirection(String),
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("Unknown moving average type: {0}")]
    UnknownMaType(String),
}

//strategy type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyType {
    MaCrossover,
    Rsi,
}

impl FromStr for StrategyType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ma" | "sma" | "ema" | "ma_crossover" => Ok(StrategyType::MaCrossover),
            "rsi" | "rsi_strategy" => Ok(StrategyType::Rsi),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

//which signal kinds a strategy may act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DirectionFilter {
    Long,
    Short,
    #[default]
    Both,
}

impl DirectionFilter {
    pub fn allows(&self, direction: TradeDirection) -> bool {
        match (self, direction) {
            (DirectionFilter::Both, _) => true,
            (DirectionFilter::Long, TradeDirection::Buy) => true,
            (DirectionFilter::Short, TradeDirection::Sell) => true,
            _ => false,
        }
    }
}

impl FromStr for DirectionFilter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" => Ok(DirectionFilter::Long),
            "short" => Ok(DirectionFilter::Short),
            "both" => Ok(DirectionFilter::Both),
            _ => Err(ConfigError::UnknownDirection(s.to_string())),
        }
    }
}

pub fn parse_ma_type(s: &str) -> Result<MaType, ConfigError> {
    s.parse::<MaType>()
        .map_err(|_| ConfigError::UnknownMaType(s.to_string()))
}

//how the stop-loss distance is derived at entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum StopLossMode {
    //percent of entry price
    Percent(f64),
    //entry -/+ atr * multiplier
    Atr { period: usize, multiplier: f64 },
}

//parses a comma separated list of take-profit percentages
//levels are returned nearest first
pub fn parse_take_profit_levels(raw: &str) -> Result<Vec<f64>, ConfigError> {
    let levels = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .map_err(|_| ConfigError::InvalidTakeProfit(part.to_string()))
        })
        .collect::<Result<Vec<f64>, ConfigError>>()?;

    normalize_take_profit(levels)
}

fn validate_take_profit(levels: &mut [f64]) -> Result<(), ConfigError> {
    if levels.is_empty() {
        return Err(ConfigError::EmptyTakeProfit);
    }
    if let Some(&bad) = levels.iter().find(|v| !v.is_finite() || **v <= 0.0) {
        return Err(ConfigError::NonPositiveTakeProfit(bad));
    }
    levels.sort_by(|a, b| a.total_cmp(b));
    Ok(())
}

fn normalize_take_profit(mut levels: Vec<f64>) -> Result<Vec<f64>, ConfigError> {
    validate_take_profit(&mut levels)?;
    levels.dedup();
    Ok(levels)
}

//parses take-profit levels, falling back to the defaults on bad input
pub fn take_profit_or_default(raw: &str) -> Vec<f64> {
    match parse_take_profit_levels(raw) {
        Ok(levels) => levels,
        Err(err) => {
            tracing::warn!(input = raw, error = %err, "invalid take-profit levels, using defaults");
            DEFAULT_TAKE_PROFIT_PCT.to_vec()
        }
    }
}

//risk and exit parameters shared by every strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    pub risk_reward_ratio: f64,
    pub stop_loss_pips: f64,
    pub take_profit_pips: Vec<f64>,
    pub use_atr_for_sl: bool,
    pub atr_multiplier: f64,
    pub atr_period: usize,
    pub trade_direction: DirectionFilter,
}

impl Default for RiskParams {
    fn default() -> Self {
        RiskParams {
            risk_reward_ratio: DEFAULT_MIN_RISK_REWARD,
            stop_loss_pips: 0.5,
            take_profit_pips: DEFAULT_TAKE_PROFIT_PCT.to_vec(),
            use_atr_for_sl: false,
            atr_multiplier: 1.5,
            atr_period: 14,
            trade_direction: DirectionFilter::Both,
        }
    }
}

impl RiskParams {
    pub fn stop_loss_mode(&self) -> StopLossMode {
        if self.use_atr_for_sl {
            StopLossMode::Atr {
                period: self.atr_period,
                multiplier: self.atr_multiplier,
            }
        } else {
            StopLossMode::Percent(self.stop_loss_pips)
        }
    }

    //take-profit levels sorted nearest first, defaults if the configured list is unusable
    pub fn take_profit_levels(&self) -> Vec<f64> {
        match normalize_take_profit(self.take_profit_pips.clone()) {
            Ok(levels) => levels,
            Err(err) => {
                tracing::warn!(levels = ?self.take_profit_pips, error = %err, "invalid take-profit levels, using defaults");
                DEFAULT_TAKE_PROFIT_PCT.to_vec()
            }
        }
    }

    pub fn set_take_profit_str(&mut self, raw: &str) {
        self.take_profit_pips = take_profit_or_default(raw);
    }
}

//moving average crossover parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaCrossoverParams {
    pub fast_ma_period: usize,
    pub slow_ma_period: usize,
    pub ma_type: MaType,
    pub use_rsi_filter: bool,
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    #[serde(flatten)]
    pub risk: RiskParams,
}

impl Default for MaCrossoverParams {
    fn default() -> Self {
        MaCrossoverParams {
            fast_ma_period: 9,
            slow_ma_period: 21,
            ma_type: MaType::Sma,
            use_rsi_filter: false,
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            risk: RiskParams::default(),
        }
    }
}

//rsi strategy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiStrategyParams {
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub exit_rsi_level: f64,
    pub use_ma_filter: bool,
    pub ma_period: usize,
    pub ma_type: MaType,
    pub wait_for_exit_before_new_entry: bool,
    #[serde(flatten)]
    pub risk: RiskParams,
}

impl Default for RsiStrategyParams {
    fn default() -> Self {
        RsiStrategyParams {
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            exit_rsi_level: 50.0,
            use_ma_filter: false,
            ma_period: 200,
            ma_type: MaType::Sma,
            wait_for_exit_before_new_entry: true,
            risk: RiskParams::default(),
        }
    }
}

//strategy-specific parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyParams {
    MaCrossover(MaCrossoverParams),
    Rsi(RsiStrategyParams),
}

impl StrategyParams {
    pub fn strategy_type(&self) -> StrategyType {
        match self {
            StrategyParams::MaCrossover(_) => StrategyType::MaCrossover,
            StrategyParams::Rsi(_) => StrategyType::Rsi,
        }
    }
}

//one strategy in a comparison run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyEntry {
    #[serde(default)]
    pub name: Option<String>,
    pub params: StrategyParams,
}

//complete comparison configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    pub strategies: Vec<StrategyEntry>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        ComparisonConfig {
            strategies: vec![
                StrategyEntry {
                    name: None,
                    params: StrategyParams::MaCrossover(MaCrossoverParams::default()),
                },
                StrategyEntry {
                    name: None,
                    params: StrategyParams::Rsi(RsiStrategyParams::default()),
                },
            ],
        }
    }
}

impl ComparisonConfig {
    //load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ComparisonConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
