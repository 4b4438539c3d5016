use crate::data::Series;
use crate::engine::simulator::simulate_trades;
use crate::engine::trade::ClosedTrade;
use crate::metrics::PerformanceMetrics;
use crate::strategy::Strategy;
use serde::Serialize;

//result of a backtest
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    pub strategy_name: String,
    pub parameters: serde_json::Value,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<ClosedTrade>,
}

//runs one strategy over a series
//the strategy's previous trades are discarded first
pub fn run_backtest<S: Strategy + ?Sized>(strategy: &mut S, series: &Series) -> BacktestResult {
    strategy.replace_trades(Vec::new());

    let frame = strategy.generate_signals(series);
    let rules = strategy.simulation_rules();
    let trades = simulate_trades(&frame, &rules);
    let metrics = PerformanceMetrics::from_trades(&trades);

    tracing::info!(
        strategy = strategy.name(),
        symbol = series.symbol(),
        bars = series.len(),
        buys = frame.buy_count(),
        sells = frame.sell_count(),
        trades = metrics.total_trades,
        win_rate = metrics.win_rate,
        total_profit = metrics.total_profit,
        "backtest finished"
    );

    strategy.replace_trades(trades.clone());

    BacktestResult {
        strategy_name: strategy.name().to_string(),
        parameters: strategy.parameters(),
        metrics,
        trades,
    }
}

//main backtest engine, one series shared by every strategy it runs
pub struct BacktestEngine<'a> {
    series: &'a Series,
}

impl<'a> BacktestEngine<'a> {
    pub fn new(series: &'a Series) -> Self {
        BacktestEngine { series }
    }

    //runs the backtest with the given strategy
    pub fn run(&self, strategy: &mut dyn Strategy) -> BacktestResult {
        run_backtest(strategy, self.series)
    }

    //runs every strategy independently, results keep input order
    pub fn run_all(&self, strategies: &mut [Box<dyn Strategy>]) -> Vec<BacktestResult> {
        if self.series.is_empty() {
            tracing::warn!(symbol = self.series.symbol(), "series has no bars, every strategy will report zero trades");
        }

        strategies
            .iter_mut()
            .map(|strategy| self.run(strategy.as_mut()))
            .collect()
    }
}
