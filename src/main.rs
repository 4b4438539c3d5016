use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use stratbench::config::parse_ma_type;
use stratbench::prelude::*;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "stratbench")]
#[command(about = "Backtest and compare trading strategies on OHLCV data", long_about = None)]
struct Cli {
    //log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a single strategy backtest
    Run {
        #[command(flatten)]
        input: DataArgs,

        //strategy type (ma, rsi)
        #[arg(long)]
        strategy: String,

        #[command(flatten)]
        ma: MaArgs,

        #[command(flatten)]
        rsi: RsiArgs,

        #[command(flatten)]
        risk: RiskArgs,

        //output path for trades csv
        #[arg(long)]
        output_trades_csv: Option<PathBuf>,

        //output path for equity curve csv
        #[arg(long)]
        output_equity_csv: Option<PathBuf>,

        //output path for the standard indicator panel as json
        #[arg(long)]
        output_indicators_json: Option<PathBuf>,
    },

    //run several strategies on the same data and compare them
    Compare {
        #[command(flatten)]
        input: DataArgs,

        //json file listing the strategies, defaults to one ma and one rsi strategy
        #[arg(long)]
        config: Option<PathBuf>,

        //print each strategy's trade list as well
        #[arg(long)]
        show_trades: bool,

        //output path for the comparison table as csv
        #[arg(long)]
        output_csv: Option<PathBuf>,

        //output path for the full report as json
        #[arg(long)]
        output_json: Option<PathBuf>,
    },
}

#[derive(Args)]
struct DataArgs {
    //path to csv data file
    #[arg(long)]
    data: PathBuf,

    //symbol to load (rows for other symbols are skipped)
    #[arg(long)]
    symbol: String,
}

#[derive(Args)]
struct MaArgs {
    //fast moving average period
    #[arg(long)]
    fast: Option<usize>,

    //slow moving average period
    #[arg(long)]
    slow: Option<usize>,

    //moving average type (sma, ema)
    #[arg(long)]
    ma_type: Option<String>,

    //suppress crossover entries in overbought/oversold territory
    #[arg(long)]
    use_rsi_filter: bool,
}

#[derive(Args)]
struct RsiArgs {
    //rsi lookback period
    #[arg(long)]
    rsi_period: Option<usize>,

    //rsi overbought level
    #[arg(long)]
    overbought: Option<f64>,

    //rsi oversold level
    #[arg(long)]
    oversold: Option<f64>,

    //rsi level that closes open positions (rsi strategy)
    #[arg(long)]
    exit_level: Option<f64>,

    //only trade in the direction of a long moving average (rsi strategy)
    #[arg(long)]
    use_ma_filter: bool,

    //period of the filter moving average (rsi strategy)
    #[arg(long)]
    ma_period: Option<usize>,

    //allow overlapping same-direction trades (rsi strategy)
    #[arg(long)]
    allow_overlap: bool,
}

#[derive(Args)]
struct RiskArgs {
    //minimum reward to risk ratio for a trade to be taken
    #[arg(long)]
    risk_reward: Option<f64>,

    //stop-loss distance in percent of entry
    #[arg(long)]
    stop_loss: Option<f64>,

    //comma separated take-profit percentages (eg 1.25,2,3)
    #[arg(long)]
    take_profit: Option<String>,

    //place the stop at atr * multiplier instead of a percentage
    #[arg(long)]
    use_atr: bool,

    #[arg(long)]
    atr_period: Option<usize>,

    #[arg(long)]
    atr_multiplier: Option<f64>,

    //long, short or both
    #[arg(long)]
    direction: Option<String>,
}

impl RiskArgs {
    fn apply(&self, risk: &mut RiskParams) -> Result<()> {
        if let Some(v) = self.risk_reward {
            risk.risk_reward_ratio = v;
        }
        if let Some(v) = self.stop_loss {
            risk.stop_loss_pips = v;
        }
        if let Some(raw) = &self.take_profit {
            risk.set_take_profit_str(raw);
        }
        if self.use_atr {
            risk.use_atr_for_sl = true;
        }
        if let Some(v) = self.atr_period {
            risk.atr_period = v;
        }
        if let Some(v) = self.atr_multiplier {
            risk.atr_multiplier = v;
        }
        if let Some(raw) = &self.direction {
            risk.trade_direction = raw.parse::<DirectionFilter>()?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    //setup logging
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run {
            input,
            strategy,
            ma,
            rsi,
            risk,
            output_trades_csv,
            output_equity_csv,
            output_indicators_json,
        } => {
            let entry = build_entry(&strategy, &ma, &rsi, &risk)?;
            let outputs = RunOutputs {
                trades_csv: output_trades_csv,
                equity_csv: output_equity_csv,
                indicators_json: output_indicators_json,
            };
            run_single(&input, &entry, &outputs)?;
        }
        Commands::Compare {
            input,
            config,
            show_trades,
            output_csv,
            output_json,
        } => {
            let config = match config {
                Some(path) => ComparisonConfig::from_json_file(&path)
                    .with_context(|| format!("Failed to load comparison config from {:?}", path))?,
                None => ComparisonConfig::default(),
            };
            run_compare(
                &input,
                &config,
                show_trades,
                output_csv.as_deref(),
                output_json.as_deref(),
            )?;
        }
    }

    Ok(())
}

//builds a strategy entry from defaults overlaid with command line flags
fn build_entry(strategy: &str, ma: &MaArgs, rsi: &RsiArgs, risk: &RiskArgs) -> Result<StrategyEntry> {
    let params = match strategy.parse::<StrategyType>()? {
        StrategyType::MaCrossover => {
            let mut p = MaCrossoverParams::default();
            if let Some(v) = ma.fast {
                p.fast_ma_period = v;
            }
            if let Some(v) = ma.slow {
                p.slow_ma_period = v;
            }
            if let Some(raw) = &ma.ma_type {
                p.ma_type = parse_ma_type(raw)?;
            }
            p.use_rsi_filter = ma.use_rsi_filter;
            if let Some(v) = rsi.rsi_period {
                p.rsi_period = v;
            }
            if let Some(v) = rsi.overbought {
                p.rsi_overbought = v;
            }
            if let Some(v) = rsi.oversold {
                p.rsi_oversold = v;
            }
            risk.apply(&mut p.risk)?;

            if p.fast_ma_period >= p.slow_ma_period {
                tracing::warn!(
                    fast = p.fast_ma_period,
                    slow = p.slow_ma_period,
                    "fast period is not shorter than slow period"
                );
            }
            StrategyParams::MaCrossover(p)
        }
        StrategyType::Rsi => {
            let mut p = RsiStrategyParams::default();
            if let Some(v) = rsi.rsi_period {
                p.rsi_period = v;
            }
            if let Some(v) = rsi.overbought {
                p.rsi_overbought = v;
            }
            if let Some(v) = rsi.oversold {
                p.rsi_oversold = v;
            }
            if let Some(v) = rsi.exit_level {
                p.exit_rsi_level = v;
            }
            p.use_ma_filter = rsi.use_ma_filter;
            if let Some(v) = rsi.ma_period {
                p.ma_period = v;
            }
            if let Some(raw) = &ma.ma_type {
                p.ma_type = parse_ma_type(raw)?;
            }
            p.wait_for_exit_before_new_entry = !rsi.allow_overlap;
            risk.apply(&mut p.risk)?;
            StrategyParams::Rsi(p)
        }
    };

    Ok(StrategyEntry { name: None, params })
}

fn load_series(input: &DataArgs) -> Result<Series> {
    let series = load_csv(&input.data, &input.symbol)
        .with_context(|| format!("Failed to load data from {:?}", input.data))?;

    if series.is_empty() {
        anyhow::bail!("No data found for symbol {}", input.symbol);
    }

    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        info!(
            symbol = series.symbol(),
            bars = series.len(),
            from = %first.timestamp,
            to = %last.timestamp,
            "loaded series"
        );
    }

    Ok(series)
}

struct RunOutputs {
    trades_csv: Option<PathBuf>,
    equity_csv: Option<PathBuf>,
    indicators_json: Option<PathBuf>,
}

fn run_single(input: &DataArgs, entry: &StrategyEntry, outputs: &RunOutputs) -> Result<()> {
    let series = load_series(input)?;
    let mut strategy = from_entry(entry);

    println!("Strategy: {}", strategy.name());
    println!("Bars: {} ({})\n", series.len(), series.symbol());

    let result = strategy.backtest(&series);

    println!("Backtest Results");
    println!("================\n");
    result.metrics.pretty_print_table();

    let table = TradeTable::new(&result.strategy_name, &result.trades);
    println!("\nTrades");
    table.pretty_print_table();

    //save outputs if requested
    if let Some(path) = &outputs.trades_csv {
        let file = create_file(path)?;
        table
            .write_csv(file)
            .with_context(|| format!("Failed to write trades to {:?}", path))?;
        println!("\nTrades saved to {:?}", path);
    }

    if let Some(path) = &outputs.equity_csv {
        let file = create_file(path)?;
        write_equity_csv(&equity_curve(&result.trades), file)
            .with_context(|| format!("Failed to write equity curve to {:?}", path))?;
        println!("Equity curve saved to {:?}", path);
    }

    if let Some(path) = &outputs.indicators_json {
        let file = create_file(path)?;
        serde_json::to_writer(file, &IndicatorPanel::standard(&series))
            .with_context(|| format!("Failed to write indicators to {:?}", path))?;
        println!("Indicators saved to {:?}", path);
    }

    Ok(())
}

fn run_compare(
    input: &DataArgs,
    config: &ComparisonConfig,
    show_trades: bool,
    output_csv: Option<&Path>,
    output_json: Option<&Path>,
) -> Result<()> {
    if config.strategies.is_empty() {
        anyhow::bail!("Comparison config lists no strategies");
    }

    let series = load_series(input)?;
    let mut strategies: Vec<Box<dyn Strategy>> = config.strategies.iter().map(from_entry).collect();

    let engine = BacktestEngine::new(&series);
    let results = engine.run_all(&mut strategies);
    let report = ComparisonReport::from_results(&results);

    println!("Strategy Comparison ({}, {} bars)", series.symbol(), series.len());
    println!("==============================\n");
    report.pretty_print_table();

    if let Some(best) = report.best_by_profit() {
        println!("\nBest total profit: {} ({:.2}%)", best.strategy, best.total_profit);
    }

    if show_trades {
        for result in &results {
            println!("\n{}", result.strategy_name);
            TradeTable::new(&result.strategy_name, &result.trades).pretty_print_table();
        }
    }

    if let Some(path) = output_csv {
        let file = create_file(path)?;
        report
            .write_csv(file)
            .with_context(|| format!("Failed to write comparison to {:?}", path))?;
        println!("\nComparison saved to {:?}", path);
    }

    if let Some(path) = output_json {
        let file = create_file(path)?;
        serde_json::to_writer_pretty(file, &ComparisonOutput { report: &report, results: &results })
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        println!("Report saved to {:?}", path);
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct ComparisonOutput<'a> {
    report: &'a ComparisonReport,
    results: &'a [BacktestResult],
}

fn create_file(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("Failed to create {:?}", path))
}
