use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::io::Write;
use stratbench::config::parse_take_profit_levels;
use stratbench::engine::simulate_trades;
use stratbench::prelude::*;
use stratbench::report::Tone;
use stratbench::strategy::signals::{IndicatorColumns, SignalFrame};

fn series_from_closes(symbol: &str, closes: &[f64], spread: f64) -> Series {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(start + Duration::days(i as i64), c, c + spread, c - spread, c, 1_000).unwrap())
        .collect();
    Series::new(symbol, bars).unwrap()
}

//slow decline to 96.1, jump to 100 at bar 30, then +0.5 a bar
fn breakout_closes() -> Vec<f64> {
    (0..100)
        .map(|i| {
            if i < 30 {
                99.0 - i as f64 * 0.1
            } else {
                100.0 + 0.5 * (i - 30) as f64
            }
        })
        .collect()
}

#[test]
fn breakout_crossover_hits_first_target() {
    //written to csv and loaded back to run the full pipeline
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("breakout.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "date,open,high,low,close,volume,symbol").unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for (i, c) in breakout_closes().into_iter().enumerate() {
        let day = start + Duration::days(i as i64);
        writeln!(file, "{},{},{},{},{},500,TEST", day.format("%Y-%m-%d"), c, c + 0.5, c - 0.5, c).unwrap();
        writeln!(file, "{},1,1,1,1,500,OTHER", day.format("%Y-%m-%d")).unwrap();
    }
    drop(file);

    let series = load_csv(&path, "TEST").unwrap();
    assert_eq!(series.len(), 100);

    let mut params = MaCrossoverParams {
        fast_ma_period: 2,
        slow_ma_period: 5,
        ..MaCrossoverParams::default()
    };
    params.risk.trade_direction = DirectionFilter::Long;
    params.risk.stop_loss_pips = 2.0;
    params.risk.take_profit_pips = parse_take_profit_levels("2.5, 4, 6").unwrap();
    params.risk.risk_reward_ratio = 1.25;

    let mut strategy = MovingAverageCrossover::new(params);
    let result = strategy.backtest(&series);

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.entry.entry_index, 30);
    assert_eq!(trade.entry_price(), 100.0);
    assert_eq!(trade.stop_loss(), 98.0);
    assert_eq!(trade.take_profit(), &[102.5, 104.0, 106.0]);
    assert_eq!(trade.calculate_risk_reward(), 1.25);
    assert_eq!(trade.exit_index, 34);
    assert_eq!(trade.exit_price, 102.5);
    assert_eq!(trade.exit_reason, ExitReason::TakeProfit(1));
    assert_eq!(trade.status, TradeStatus::ClosedProfit);
    assert_eq!(trade.profit_percentage, 2.5);

    assert_eq!(result.metrics.winning_trades, 1);
    assert!(result.metrics.profit_factor.is_infinite());
    assert_eq!(strategy.trades().len(), 1);
}

#[test]
fn same_breakout_rejected_under_default_gate() {
    let series = series_from_closes("TEST", &breakout_closes(), 0.5);
    let mut params = MaCrossoverParams {
        fast_ma_period: 2,
        slow_ma_period: 5,
        ..MaCrossoverParams::default()
    };
    params.risk.stop_loss_pips = 2.0;
    params.risk.take_profit_pips = vec![2.5, 4.0, 6.0];

    //1.25 is under the default minimum of 2.5
    let result = MovingAverageCrossover::new(params).backtest(&series);
    assert!(result.trades.is_empty());
    assert_eq!(result.metrics, PerformanceMetrics::default());
}

#[test]
fn monotonic_rise_closes_at_take_profit() {
    let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
    let series = series_from_closes("UP", &closes, 0.5);
    let mut frame = SignalFrame::new(&series, IndicatorColumns::default());
    frame.signals[0].buy = true;

    let mut risk = RiskParams::default();
    risk.stop_loss_pips = 1.0;
    risk.take_profit_pips = vec![2.0];
    risk.risk_reward_ratio = 2.0;

    let trades = simulate_trades(&frame, &SimulationRules::from_risk(&risk));
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].exit_reason, ExitReason::TakeProfit(1));
    assert_eq!(trades[0].exit_price, 102.0);
    assert_eq!(trades[0].status, TradeStatus::ClosedProfit);
}

#[test]
fn flat_series_produces_no_trades() {
    let series = series_from_closes("FLAT", &[42.0; 80], 0.25);
    let engine = BacktestEngine::new(&series);
    let mut strategies: Vec<Box<dyn Strategy>> = vec![
        Box::new(MovingAverageCrossover::new(MaCrossoverParams::default())),
        Box::new(RsiStrategy::new(RsiStrategyParams::default())),
    ];

    for result in engine.run_all(&mut strategies) {
        assert!(result.trades.is_empty(), "{} traded a flat series", result.strategy_name);
        assert_eq!(result.metrics.total_trades, 0);
    }
}

#[test]
fn profit_round_trip() {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let open = |direction: TradeDirection| OpenTrade {
        symbol: "RT".to_string(),
        direction,
        entry_price: 100.0,
        entry_time: at,
        entry_index: 0,
        stop_loss: if direction == TradeDirection::Buy { 95.0 } else { 105.0 },
        take_profit: vec![if direction == TradeDirection::Buy { 120.0 } else { 80.0 }],
    };

    let long = open(TradeDirection::Buy).close(110.0, at + Duration::days(1), 1, ExitReason::EndOfBacktest);
    assert_eq!(long.profit_pips, 10.0);
    assert_eq!(long.profit_percentage, 10.0);
    assert_eq!(long.status, TradeStatus::ClosedProfit);

    let short = open(TradeDirection::Sell).close(90.0, at + Duration::days(1), 1, ExitReason::EndOfBacktest);
    assert_eq!(short.profit_pips, 10.0);
    assert_eq!(short.profit_percentage, 10.0);
    assert_eq!(short.status, TradeStatus::ClosedProfit);
}

#[test]
fn rsi_trades_respect_wait_for_exit() {
    let closes: Vec<f64> = (0..300)
        .map(|i| 100.0 + (i as f64 * 0.21).sin() * 4.0 + (i as f64 * 0.05).cos() * 2.0)
        .collect();
    let series = series_from_closes("WAVE", &closes, 0.3);

    let mut params = RsiStrategyParams {
        rsi_period: 5,
        ..RsiStrategyParams::default()
    };
    params.risk.risk_reward_ratio = 1.0;
    let result = RsiStrategy::new(params).backtest(&series);

    for direction in [TradeDirection::Buy, TradeDirection::Sell] {
        let same: Vec<&ClosedTrade> = result.trades.iter().filter(|t| t.direction() == direction).collect();
        for pair in same.windows(2) {
            assert!(pair[1].entry.entry_index >= pair[0].exit_index);
        }
    }
    for trade in &result.trades {
        assert!(trade.exit_index > trade.entry.entry_index);
        assert!(trade.calculate_risk_reward() >= 1.0);
    }
}

#[test]
fn comparison_keys_rows_by_strategy_name() {
    let series = series_from_closes("CMP", &breakout_closes(), 0.5);
    let config = ComparisonConfig::default();
    let mut strategies: Vec<Box<dyn Strategy>> = config.strategies.iter().map(from_entry).collect();

    let results = BacktestEngine::new(&series).run_all(&mut strategies);
    let report = ComparisonReport::from_results(&results);

    let names: Vec<&str> = report.rows.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["MA Crossover (SMA 9/21)", "RSI Strategy (RSI 14)"]);
    assert_eq!(report.total_profit.points.len(), 2);
    for (point, result) in report.total_profit.points.iter().zip(&results) {
        let expected = if result.metrics.total_profit >= 0.0 { Tone::Positive } else { Tone::Negative };
        assert_eq!(point.tone, expected);
    }

    let mut csv = Vec::new();
    report.write_csv(&mut csv).unwrap();
    assert_eq!(String::from_utf8(csv).unwrap().lines().count(), 3);
}

#[test]
fn trade_table_and_equity_curve_from_result() {
    let series = series_from_closes("TBL", &breakout_closes(), 0.5);
    let mut params = MaCrossoverParams {
        fast_ma_period: 2,
        slow_ma_period: 5,
        ..MaCrossoverParams::default()
    };
    params.risk.stop_loss_pips = 2.0;
    params.risk.take_profit_pips = vec![2.5];
    params.risk.risk_reward_ratio = 1.25;
    let result = MovingAverageCrossover::new(params).backtest(&series);

    let table = TradeTable::new(&result.strategy_name, &result.trades);
    assert_eq!(table.len(), result.trades.len());

    let curve = equity_curve(&result.trades);
    assert_eq!(curve.len(), result.trades.len());
    if let Some(last) = curve.last() {
        assert!((last.cumulative_profit - result.metrics.total_profit).abs() < 1e-9);
    }
}
