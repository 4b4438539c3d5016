use crate::engine::backtest::BacktestResult;
use crate::metrics::summary::format_ratio;
use indexmap::IndexMap;
use prettytable::{Cell, Row, Table};
use serde::Serialize;

//colour hint for a bar in a chart panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarPoint {
    pub label: String,
    pub value: f64,
    pub tone: Tone,
}

//one chart panel, one bar per strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub points: Vec<BarPoint>,
}

impl BarChart {
    fn new(title: &str) -> Self {
        BarChart {
            title: title.to_string(),
            points: Vec::new(),
        }
    }

    fn push(&mut self, label: &str, value: f64, tone: Tone) {
        self.points.push(BarPoint {
            label: label.to_string(),
            value,
            tone,
        });
    }
}

//headline numbers of one strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub strategy: String,
    pub total_trades: usize,
    pub win_rate_pct: f64,
    pub total_profit: f64,
    pub profit_factor: f64,
    pub max_drawdown: f64,
    pub avg_profit: f64,
    pub avg_loss: f64,
    pub expectancy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub rows: IndexMap<String, ComparisonRow>,
    pub total_profit: BarChart,
    pub win_rate: BarChart,
    pub profit_factor: BarChart,
    pub max_drawdown: BarChart,
}

impl ComparisonReport {
    pub fn from_results(results: &[BacktestResult]) -> Self {
        let mut report = ComparisonReport {
            rows: IndexMap::with_capacity(results.len()),
            total_profit: BarChart::new("Total Profit (%)"),
            win_rate: BarChart::new("Win Rate (%)"),
            profit_factor: BarChart::new("Profit Factor"),
            max_drawdown: BarChart::new("Max Drawdown (%)"),
        };

        for result in results {
            let name = result.strategy_name.as_str();
            let m = &result.metrics;

            if report.rows.contains_key(name) {
                tracing::warn!(strategy = name, "duplicate strategy name, later result replaces the earlier one");
            }

            report.rows.insert(
                name.to_string(),
                ComparisonRow {
                    strategy: name.to_string(),
                    total_trades: m.total_trades,
                    win_rate_pct: m.win_rate_pct(),
                    total_profit: m.total_profit,
                    profit_factor: m.profit_factor,
                    max_drawdown: m.max_drawdown,
                    avg_profit: m.avg_profit,
                    avg_loss: m.avg_loss,
                    expectancy: m.expectancy,
                },
            );

            let profit_tone = if m.total_profit >= 0.0 { Tone::Positive } else { Tone::Negative };
            let factor_tone = if m.profit_factor >= 1.0 { Tone::Positive } else { Tone::Negative };

            report.total_profit.push(name, m.total_profit, profit_tone);
            report.win_rate.push(name, m.win_rate_pct(), Tone::Neutral);
            report.profit_factor.push(name, m.profit_factor, factor_tone);
            report.max_drawdown.push(name, m.max_drawdown, Tone::Negative);
        }

        report
    }

    pub fn charts(&self) -> [&BarChart; 4] {
        [&self.total_profit, &self.win_rate, &self.profit_factor, &self.max_drawdown]
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    //best total profit, first one wins ties
    pub fn best_by_profit(&self) -> Option<&ComparisonRow> {
        self.rows
            .values()
            .fold(None, |best: Option<&ComparisonRow>, row| match best {
                Some(b) if b.total_profit >= row.total_profit => Some(b),
                _ => Some(row),
            })
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(Row::new(
            [
                "Strategy",
                "Trades",
                "Win Rate",
                "Total Profit",
                "Profit Factor",
                "Max Drawdown",
                "Expectancy",
            ]
            .iter()
            .map(|h| Cell::new(h))
            .collect(),
        ));

        for row in self.rows.values() {
            table.add_row(Row::new(vec![
                Cell::new(&row.strategy),
                Cell::new(&row.total_trades.to_string()),
                Cell::new(&format!("{:.2}%", row.win_rate_pct)),
                Cell::new(&format!("{:.2}%", row.total_profit)),
                Cell::new(&format_ratio(row.profit_factor)),
                Cell::new(&format!("{:.2}%", row.max_drawdown)),
                Cell::new(&format!("{:.3}%", row.expectancy)),
            ]));
        }

        table
    }

    pub fn pretty_print_table(&self) {
        self.to_table().printstd();
    }

    //one csv record per strategy, in input order
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in self.rows.values() {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
