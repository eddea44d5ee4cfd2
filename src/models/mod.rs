use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Post snapshot as supplied by the post store.
///
/// Read-only to the ranking engine: likes, comments, pin flags and the AI
/// analysis are all owned and mutated by their respective collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Liker identities; uniqueness is enforced by the store.
    #[serde(default)]
    pub likes: Vec<Uuid>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Attached asynchronously after creation; absent until then.
    #[serde(default)]
    pub ai_analysis: Option<AiAnalysis>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub pinned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Total engagement: likes + comments.
    pub fn engagement(&self) -> usize {
        self.likes.len() + self.comments.len()
    }

    /// Age in hours at `now`, clamped at zero for clock-skewed timestamps.
    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        ((now - self.created_at).num_milliseconds() as f64 / 3_600_000.0).max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// AI content analysis attached to a post after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiAnalysis {
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub emotions: Vec<EmotionScore>,
    #[serde(default)]
    pub toxicity: Toxicity,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub fact_check: FactCheckVerdict,
    #[serde(default)]
    pub fact_check_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionScore {
    pub emotion: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Toxicity {
    #[serde(default)]
    pub detected: bool,
    /// Per-label model scores (e.g. "insult", "threat").
    #[serde(default)]
    pub details: HashMap<String, f64>,
}

/// Sentiment label from the analysis model. `Error` is written by the
/// analysis pipeline when the model call fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Mixed,
    #[default]
    Unknown,
    Error,
}

/// Fact-check framing verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactCheckVerdict {
    #[serde(rename = "support")]
    Support,
    #[serde(rename = "neutral")]
    Neutral,
    #[serde(rename = "oppose")]
    Oppose,
    #[default]
    Unknown,
}

/// Viewer record as supplied by the viewer/preference store.
///
/// `preferences` is a free-form JSON blob holding the viewer's liked-category
/// and liked-topic counters; context construction tolerates any shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerProfile {
    pub id: Uuid,
    #[serde(default)]
    pub following: Vec<Uuid>,
    #[serde(default)]
    pub preferences: serde_json::Value,
}

/// Feed ordering mode, selected by the endpoint's `sort` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// Personalized home feed: relevance score descending.
    #[default]
    Home,
    /// Discovery feed: popular/fresh interleave for cold-start exposure.
    Discover,
    /// Reverse-chronological; scoring is bypassed.
    Recent,
}

impl FeedMode {
    /// Parse the `sort` query value. Unknown or missing values fall back to
    /// the personalized home feed.
    pub fn parse(sort: Option<&str>) -> Self {
        match sort {
            Some("recent") => FeedMode::Recent,
            Some("discover") => FeedMode::Discover,
            _ => FeedMode::Home,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedMode::Home => "home",
            FeedMode::Discover => "discover",
            FeedMode::Recent => "recent",
        }
    }
}

/// A post paired with its computed relevance score. Transient; never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPost {
    pub post: Post,
    pub score: f64,
    /// Per-factor decomposition; `None` in recent mode where scoring is
    /// bypassed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

/// Additive decomposition of a relevance score.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreBreakdown {
    pub engagement: f64,
    pub social: f64,
    pub quality: f64,
    pub recency: f64,
    pub discovery: f64,
    pub personalization: f64,
    pub total: f64,
}

/// One ordered page of feed results.
#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub posts: Vec<ScoredPost>,
    pub total: usize,
    pub page: u32,
    pub limit: usize,
    pub has_more: bool,
}
