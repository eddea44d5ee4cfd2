use serde::Deserialize;
use thiserror::Error;

/// Candidate window the feed endpoint queries the post store with. The
/// engine itself never filters by age; this constant only keeps the caller's
/// store query and the ranking policy in agreement.
pub const CANDIDATE_WINDOW_HOURS: i64 = 168;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment parse error: {0}")]
    Env(#[from] envy::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Engine configuration: the scoring weight table plus the discovery
/// interleave policy.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub weights: ScoringWeights,
    pub interleave: InterleaveConfig,
}

impl Config {
    /// Load from the environment with `RANKING_WEIGHT_*` and
    /// `RANKING_INTERLEAVE_*` overrides; unset variables keep the reference
    /// policy defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Config {
            weights: envy::prefixed("RANKING_WEIGHT_").from_env()?,
            interleave: envy::prefixed("RANKING_INTERLEAVE_").from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.weights;
        if w.recency_decay_hours <= 0.0 {
            return Err(ConfigError::Invalid(
                "recency_decay_hours must be positive".to_string(),
            ));
        }
        if w.new_post_age_hours < 0.0 {
            return Err(ConfigError::Invalid(
                "new_post_age_hours must not be negative".to_string(),
            ));
        }
        if w.category_match_cap < 0.0 || w.topic_match_cap < 0.0 {
            return Err(ConfigError::Invalid(
                "personalization caps must not be negative".to_string(),
            ));
        }
        if w.random_diversity < 0.0 {
            return Err(ConfigError::Invalid(
                "random_diversity must not be negative".to_string(),
            ));
        }
        let i = &self.interleave;
        if i.popular_batch == 0 || i.fresh_batch == 0 {
            return Err(ConfigError::Invalid(
                "interleave batch sizes must be at least 1".to_string(),
            ));
        }
        if i.fresh_age_hours <= 0.0 {
            return Err(ConfigError::Invalid(
                "fresh_age_hours must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scoring weight table. Defaults are the reference policy; every knob is
/// overridable through `RANKING_WEIGHT_*` so tuning never needs a call-site
/// change.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    // Engagement signals
    pub like: f64,
    pub comment: f64,
    /// Multiplier applied to the (capped) engagement rate once it crosses
    /// the virality threshold.
    pub virality_bonus: f64,
    pub virality_rate_threshold: f64,
    pub virality_rate_cap: f64,

    // Social signals
    pub followed_author: f64,
    pub own_post: f64,

    // Content quality (from AI analysis)
    pub fact_supported: f64,
    pub fact_opposed: f64,
    pub toxic_penalty: f64,
    pub positive_sentiment: f64,

    // Time factors
    pub recency_max: f64,
    pub recency_decay_hours: f64,
    pub new_post_boost: f64,
    pub new_post_age_hours: f64,

    // Discovery / diversity
    pub low_engagement_boost: f64,
    pub low_engagement_threshold: usize,
    pub random_diversity: f64,

    // Personalization
    pub category_match: f64,
    pub category_match_cap: f64,
    pub topic_match: f64,
    /// Cap per matching topic; there is no cap across topics.
    pub topic_match_cap: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            like: 2.0,
            comment: 5.0,
            virality_bonus: 15.0,
            virality_rate_threshold: 2.0,
            virality_rate_cap: 10.0,
            followed_author: 50.0,
            own_post: 30.0,
            fact_supported: 10.0,
            fact_opposed: -15.0,
            toxic_penalty: -100.0,
            positive_sentiment: 3.0,
            recency_max: 20.0,
            recency_decay_hours: 72.0,
            new_post_boost: 15.0,
            new_post_age_hours: 2.0,
            low_engagement_boost: 25.0,
            low_engagement_threshold: 5,
            random_diversity: 10.0,
            category_match: 8.0,
            category_match_cap: 50.0,
            topic_match: 4.0,
            topic_match_cap: 20.0,
        }
    }
}

/// Discovery-mode interleave policy. Earlier iterations of the feed shipped
/// 1:1 and 3:3 ratios; both remain reachable through these knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InterleaveConfig {
    /// Posts emitted from the popular pool per round.
    pub popular_batch: usize,
    /// Posts emitted from the fresh pool per round.
    pub fresh_batch: usize,
    /// A post is "fresh" only while younger than this.
    pub fresh_age_hours: f64,
    /// ...and while total engagement stays below this.
    pub fresh_engagement_threshold: usize,
}

impl Default for InterleaveConfig {
    fn default() -> Self {
        Self {
            popular_batch: 3,
            fresh_batch: 1,
            fresh_age_hours: 24.0,
            fresh_engagement_threshold: 5,
        }
    }
}
