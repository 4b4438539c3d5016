use crate::engine::trade::ClosedTrade;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//a point in the equity curve, values in cumulative percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub cumulative_profit: f64,
    pub drawdown: f64,
}

//cumulative profit after each trade, ordered by exit time
pub fn equity_curve(trades: &[ClosedTrade]) -> Vec<EquityPoint> {
    let mut ordered: Vec<&ClosedTrade> = trades.iter().collect();
    ordered.sort_by_key(|t| (t.exit_time, t.entry_time()));

    let mut curve = Vec::with_capacity(ordered.len());
    let mut cumulative = 0.0;
    let mut peak = 0.0_f64;

    for trade in ordered {
        cumulative += trade.profit_percentage;
        peak = peak.max(cumulative);

        curve.push(EquityPoint {
            timestamp: trade.exit_time,
            cumulative_profit: cumulative,
            drawdown: peak - cumulative,
        });
    }

    curve
}

//writes the curve as csv
pub fn write_equity_csv<W: std::io::Write>(curve: &[EquityPoint], writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for point in curve {
        wtr.serialize(point)?;
    }
    wtr.flush()?;
    Ok(())
}
