pub mod comparison;
pub mod trades;

pub use comparison::{BarChart, BarPoint, ComparisonReport, ComparisonRow, Tone};
pub use trades::{TradeRecord, TradeTable};
