pub mod lifecycle;

pub use lifecycle::{PositionLifecycleManager, TradingMode};
