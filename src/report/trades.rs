use crate::engine::trade::ClosedTrade;
use chrono::{DateTime, Utc};
use prettytable::{Cell, Row, Table};
use serde::Serialize;

//flattened trade for display and export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub number: usize,
    pub symbol: String,
    pub direction: String,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub profit_pips: f64,
    pub profit_percentage: f64,
    pub risk_reward: f64,
    pub status: String,
    pub exit_reason: String,
}

impl TradeRecord {
    fn from_trade(number: usize, trade: &ClosedTrade) -> Self {
        TradeRecord {
            number,
            symbol: trade.entry.symbol.clone(),
            direction: trade.direction().to_string(),
            entry_time: trade.entry_time(),
            entry_price: trade.entry_price(),
            stop_loss: trade.stop_loss(),
            //first target, the one the gate was judged on
            take_profit: trade.take_profit().first().copied().unwrap_or(f64::NAN),
            exit_time: trade.exit_time,
            exit_price: trade.exit_price,
            profit_pips: trade.profit_pips,
            profit_percentage: trade.profit_percentage,
            risk_reward: trade.calculate_risk_reward(),
            status: trade.status.to_string(),
            exit_reason: trade.exit_reason.to_string(),
        }
    }
}

//trade list of one strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeTable {
    pub strategy: String,
    pub records: Vec<TradeRecord>,
}

impl TradeTable {
    pub fn new(strategy: impl Into<String>, trades: &[ClosedTrade]) -> Self {
        TradeTable {
            strategy: strategy.into(),
            records: trades
                .iter()
                .enumerate()
                .map(|(i, t)| TradeRecord::from_trade(i + 1, t))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("#"),
            Cell::new("Type"),
            Cell::new("Entry"),
            Cell::new("Stop"),
            Cell::new("Target"),
            Cell::new("Exit"),
            Cell::new("Profit %"),
            Cell::new("Status"),
            Cell::new("Reason"),
        ]));

        for r in &self.records {
            table.add_row(Row::new(vec![
                Cell::new(&r.number.to_string()),
                Cell::new(&r.direction),
                Cell::new(&format!("{:.4}", r.entry_price)),
                Cell::new(&format!("{:.4}", r.stop_loss)),
                Cell::new(&format!("{:.4}", r.take_profit)),
                Cell::new(&format!("{:.4}", r.exit_price)),
                Cell::new(&format!("{:.2}%", r.profit_percentage)),
                Cell::new(&r.status),
                Cell::new(&r.exit_reason),
            ]));
        }

        table
    }

    pub fn pretty_print_table(&self) {
        if self.is_empty() {
            println!("{}: no trades", self.strategy);
            return;
        }
        self.to_table().printstd();
    }

    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for record in &self.records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::trade::{ExitReason, OpenTrade, TradeDirection};
    use chrono::{Duration, TimeZone};

    fn sell_stopped_out() -> ClosedTrade {
        let entry_time = Utc.with_ymd_and_hms(2024, 6, 3, 9, 30, 0).unwrap();
        let open = OpenTrade {
            symbol: "EUR/USD".to_string(),
            direction: TradeDirection::Sell,
            entry_price: 100.0,
            entry_time,
            entry_index: 10,
            stop_loss: 101.0,
            take_profit: vec![97.0, 95.0],
        };
        open.close(101.0, entry_time + Duration::minutes(15), 13, ExitReason::StopLoss)
    }

    #[test]
    fn records_are_numbered_from_one() {
        let table = TradeTable::new("RSI", &[sell_stopped_out(), sell_stopped_out()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].number, 1);
        assert_eq!(table.records[1].number, 2);

        let r = &table.records[0];
        assert_eq!(r.direction, "SELL");
        assert_eq!(r.take_profit, 97.0);
        assert_eq!(r.exit_reason, "Stop-Loss");
        assert_eq!(r.profit_percentage, -1.0);
        assert_eq!(r.risk_reward, 3.0);
    }

    #[test]
    fn csv_export_has_one_line_per_trade() {
        let table = TradeTable::new("RSI", &[sell_stopped_out()]);
        let mut buffer = Vec::new();
        table.write_csv(&mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("number,symbol,direction,entry_time"));
        assert!(lines[1].contains("EUR/USD,SELL"));
    }
}
