/// Rolling history and window aggregation
pub mod engine;
pub mod history;

pub use engine::{AggregatedMetric, AggregationEngine};
pub use history::HistoryBuffer;
