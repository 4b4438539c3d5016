use crate::engine::trade::ClosedTrade;
use prettytable::{Cell, Row, Table};
use serde::Serialize;
use statrs::statistics::Statistics;

//summary metrics for a backtest, all profits in percent of entry price
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub total_trades: usize,
    pub closed_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub total_profit: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub profit_factor: f64,
    pub avg_profit: f64,
    pub avg_loss: f64,
    pub expectancy: f64,
    pub max_drawdown: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
}

impl PerformanceMetrics {
    pub fn from_trades(trades: &[ClosedTrade]) -> Self {
        if trades.is_empty() {
            return PerformanceMetrics::default();
        }

        //every ClosedTrade has an exit, so all of them count as closed
        let closed: Vec<&ClosedTrade> = trades.iter().collect();

        let wins: Vec<f64> = closed
            .iter()
            .filter(|t| t.is_win())
            .map(|t| t.profit_percentage)
            .collect();
        let losses: Vec<f64> = closed
            .iter()
            .filter(|t| t.is_loss())
            .map(|t| t.profit_percentage)
            .collect();

        let win_rate = if closed.is_empty() {
            0.0
        } else {
            wins.len() as f64 / closed.len() as f64
        };

        let gross_profit: f64 = wins.iter().sum();
        let gross_loss: f64 = losses.iter().sum::<f64>().abs();

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_profit = if wins.is_empty() { 0.0 } else { wins.iter().mean() };
        let avg_loss = if losses.is_empty() {
            0.0
        } else {
            losses.iter().mean().abs()
        };

        let expectancy = win_rate * avg_profit - (1.0 - win_rate) * avg_loss;

        PerformanceMetrics {
            total_trades: trades.len(),
            closed_trades: closed.len(),
            winning_trades: wins.len(),
            losing_trades: losses.len(),
            win_rate,
            total_profit: closed.iter().map(|t| t.profit_percentage).sum(),
            gross_profit,
            gross_loss,
            profit_factor,
            avg_profit,
            avg_loss,
            expectancy,
            max_drawdown: max_drawdown(trades),
            largest_win: wins.iter().copied().fold(0.0, f64::max),
            largest_loss: losses.iter().copied().fold(0.0, f64::min),
        }
    }

    pub fn win_rate_pct(&self) -> f64 {
        self.win_rate * 100.0
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        self.to_table().printstd();
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        let rows = [
            ("Total Trades", self.total_trades.to_string()),
            ("Winning Trades", self.winning_trades.to_string()),
            ("Losing Trades", self.losing_trades.to_string()),
            ("Win Rate", format!("{:.2}%", self.win_rate_pct())),
            ("Total Profit", format!("{:.2}%", self.total_profit)),
            ("Gross Profit", format!("{:.2}%", self.gross_profit)),
            ("Gross Loss", format!("{:.2}%", self.gross_loss)),
            ("Profit Factor", format_ratio(self.profit_factor)),
            ("Avg Win", format!("{:.2}%", self.avg_profit)),
            ("Avg Loss", format!("{:.2}%", self.avg_loss)),
            ("Expectancy", format!("{:.3}%", self.expectancy)),
            ("Max Drawdown", format!("{:.2}%", self.max_drawdown)),
            ("Largest Win", format!("{:.2}%", self.largest_win)),
            ("Largest Loss", format!("{:.2}%", self.largest_loss)),
        ];

        for (label, value) in rows {
            table.add_row(Row::new(vec![Cell::new(label), Cell::new(&value)]));
        }

        table
    }
}

pub(crate) fn format_ratio(value: f64) -> String {
    if value.is_infinite() {
        "inf".to_string()
    } else {
        format!("{:.3}", value)
    }
}

//replays trades in entry order on a balance starting at 0
//returns the largest fall from a running peak
fn max_drawdown(trades: &[ClosedTrade]) -> f64 {
    let mut ordered: Vec<&ClosedTrade> = trades.iter().collect();
    ordered.sort_by_key(|t| t.entry_time());

    let mut balance = 0.0;
    let mut peak = 0.0_f64;
    let mut worst = 0.0_f64;

    for trade in ordered {
        balance += trade.profit_percentage;
        peak = peak.max(balance);
        worst = worst.max(peak - balance);
    }

    worst
}
