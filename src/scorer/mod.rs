pub mod market_scorer;

pub use market_scorer::{evaluate_row, ScoreParams};
