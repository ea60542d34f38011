//! Domain types for EdgeLab

pub mod bar;
pub mod indices;
pub mod series;
pub mod trade;

pub use bar::{Bar, BarError};
pub use indices::SignalIndices;
pub use series::OhlcvSeries;
pub use trade::{ExitReason, TradeRecord};
