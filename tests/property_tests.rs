//property tests for trade construction, indicators and aggregation

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use stratbench::config::RiskParams;
use stratbench::data::{Bar, Series};
use stratbench::engine::{admit_trade, simulate_trades, ExitReason, SimulationRules, TradeDirection};
use stratbench::indicators::{rsi, sma};
use stratbench::metrics::PerformanceMetrics;
use stratbench::strategy::signals::{IndicatorColumns, SignalFrame};

fn series_from_closes(closes: &[f64]) -> Series {
    let start = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new_unchecked(start + Duration::hours(i as i64), c, c * 1.004, c * 0.996, c, 1))
        .collect();
    Series::new("PROP", bars).unwrap()
}

fn arb_price() -> impl Strategy<Value = f64> {
    (10.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_pct() -> impl Strategy<Value = f64> {
    (0.1..10.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_direction() -> impl Strategy<Value = TradeDirection> {
    prop_oneof![Just(TradeDirection::Buy), Just(TradeDirection::Sell)]
}

fn arb_walk() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-2.0..2.0_f64, 2..120).prop_map(|steps| {
        let mut price = 100.0;
        steps
            .into_iter()
            .map(|step| {
                price = (price + step).max(1.0);
                price
            })
            .collect()
    })
}

fn rules(stop_pct: f64, targets: Vec<f64>, min_rr: f64) -> SimulationRules {
    let risk = RiskParams {
        stop_loss_pips: stop_pct,
        take_profit_pips: targets,
        risk_reward_ratio: min_rr,
        ..RiskParams::default()
    };
    SimulationRules::from_risk(&risk)
}

proptest! {
    //buy: sl < entry < tp1 < tp2 ..., sell mirrored
    #[test]
    fn admitted_levels_are_ordered(
        entry in arb_price(),
        stop_pct in arb_pct(),
        targets in prop::collection::vec(arb_pct(), 1..5),
        direction in arb_direction(),
    ) {
        let series = series_from_closes(&[entry, entry]);
        let frame = SignalFrame::new(&series, IndicatorColumns::default());

        if let Some(trade) = admit_trade(&frame, 0, direction, &rules(stop_pct, targets, 0.0), None) {
            let sign = direction.sign();
            prop_assert!((trade.entry_price - trade.stop_loss) * sign > 0.0);
            prop_assert!((trade.take_profit[0] - trade.entry_price) * sign > 0.0);
            for pair in trade.take_profit.windows(2) {
                prop_assert!((pair[1] - pair[0]) * sign > 0.0);
            }
        }
    }

    #[test]
    fn admission_respects_minimum_ratio(
        entry in arb_price(),
        stop_pct in arb_pct(),
        targets in prop::collection::vec(arb_pct(), 1..5),
        min_rr in 0.5..5.0_f64,
        direction in arb_direction(),
    ) {
        let series = series_from_closes(&[entry, entry]);
        let frame = SignalFrame::new(&series, IndicatorColumns::default());

        let nearest = targets.iter().copied().fold(f64::INFINITY, f64::min);
        match admit_trade(&frame, 0, direction, &rules(stop_pct, targets, min_rr), None) {
            Some(trade) => {
                prop_assert!(trade.calculate_risk_reward() >= min_rr);
            }
            //rejected only when the nearest target really is too close
            None => {
                prop_assert!(nearest / stop_pct < min_rr + 1e-6);
            }
        }
    }

    #[test]
    fn rsi_stays_in_range(closes in arb_walk(), period in 1usize..30) {
        let values = rsi(&closes, period);
        prop_assert_eq!(values.len(), closes.len());
        prop_assert_eq!(values[0], 50.0);
        for v in values {
            prop_assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn sma_stays_inside_its_window(closes in arb_walk(), period in 1usize..30) {
        let values = sma(&closes, period);
        for (i, v) in values.iter().enumerate() {
            let window = &closes[(i + 1).saturating_sub(period)..=i];
            let lo = window.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(*v >= lo - 1e-9 && *v <= hi + 1e-9);
        }
    }

    //every simulated trade closes after its entry, at a level or a close
    #[test]
    fn simulated_trades_close_consistently(
        closes in arb_walk(),
        entries in prop::collection::vec(any::<bool>(), 120),
        stop_pct in arb_pct(),
        target in arb_pct(),
    ) {
        let series = series_from_closes(&closes);
        let mut frame = SignalFrame::new(&series, IndicatorColumns::default());
        for (i, flag) in entries.iter().take(closes.len()).enumerate() {
            frame.signals[i].buy = *flag;
            frame.signals[i].sell = !*flag;
        }

        let trades = simulate_trades(&frame, &rules(stop_pct, vec![target], 0.0));
        for trade in &trades {
            prop_assert!(trade.exit_index > trade.entry.entry_index);
            prop_assert!(trade.exit_index < closes.len());
            match trade.exit_reason {
                ExitReason::StopLoss => {
                    prop_assert_eq!(trade.exit_price, trade.stop_loss());
                }
                ExitReason::TakeProfit(level) => {
                    prop_assert_eq!(trade.exit_price, trade.take_profit()[level - 1]);
                }
                _ => {
                    prop_assert_eq!(trade.exit_price, closes[trade.exit_index]);
                }
            }
        }

        let metrics = PerformanceMetrics::from_trades(&trades);
        prop_assert_eq!(metrics.total_trades, trades.len());
        prop_assert_eq!(metrics.winning_trades + metrics.losing_trades, metrics.closed_trades);
        prop_assert!(metrics.max_drawdown >= 0.0);
        prop_assert!((0.0..=1.0).contains(&metrics.win_rate));
    }
}
