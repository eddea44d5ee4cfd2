//! Feed ranking engine for SayItLoud.
//!
//! Given a materialized set of candidate posts and a viewer's scoring
//! context, produces one ordered, paginated feed page. Pinned posts are an
//! editorial override that always sort ahead of organic content; regular
//! posts are ordered by a multi-factor relevance score (personalized mode),
//! a popular/fresh interleave (discovery mode), or creation time (recent
//! mode).
//!
//! The engine performs no I/O and holds no cross-request state: the calling
//! feed endpoint fetches candidates and the viewer profile, invokes
//! [`FeedRanker::rank`], and republishes the resulting [`FeedPage`].

pub mod config;
pub mod models;
pub mod services;

pub use config::{Config, ConfigError, InterleaveConfig, ScoringWeights};
pub use models::{FeedMode, FeedPage, Post, ScoreBreakdown, ScoredPost, ViewerProfile};
pub use services::{FeedRanker, PostScorer, ScoringContext};
