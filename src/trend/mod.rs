pub mod aligner;
pub mod classifier;
pub mod market_state;

pub use aligner::MultiTimeframeAligner;
pub use classifier::{majority, EmaPeriods, TrendClassifier};
pub use market_state::{enhance, summarize};
