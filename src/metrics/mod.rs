pub mod summary;
pub mod timeseries;

pub use summary::PerformanceMetrics;
pub use timeseries::{equity_curve, write_equity_csv, EquityPoint};
