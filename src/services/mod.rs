pub mod context;
pub mod exploration;
pub mod ranking;
pub mod scoring;

pub use context::ScoringContext;
pub use ranking::FeedRanker;
pub use scoring::PostScorer;
