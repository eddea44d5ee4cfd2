//! Relevance scoring.
//!
//! Maps one post plus the viewer's context to a real-valued score built from
//! six additive sub-scores: engagement, social graph, AI content quality,
//! recency, discovery and personalization. Every function here is total:
//! missing engagement arrays count as empty and a missing AI analysis zeroes
//! the quality and personalization contributions.
//!
//! The scorer is constructed per request with the scoring instant and a
//! random source, so a whole candidate set scores against one "now" and
//! tests can pin both.

use chrono::{DateTime, Utc};
use rand::Rng;

use super::context::ScoringContext;
use crate::config::ScoringWeights;
use crate::models::{FactCheckVerdict, Post, ScoreBreakdown, Sentiment};

pub struct PostScorer<'a, R: Rng> {
    weights: &'a ScoringWeights,
    now: DateTime<Utc>,
    rng: R,
}

impl<'a, R: Rng> PostScorer<'a, R> {
    pub fn new(weights: &'a ScoringWeights, now: DateTime<Utc>, rng: R) -> Self {
        Self { weights, now, rng }
    }

    /// Score a single post. Pure in `(post, context, now)` apart from the
    /// bounded diversity jitter.
    pub fn score(&mut self, post: &Post, context: &ScoringContext) -> ScoreBreakdown {
        let engagement = self.engagement_score(post);
        let social = self.social_score(post, context);
        let quality = self.quality_score(post);
        let recency = self.recency_score(post);
        let discovery = self.discovery_score(post);
        let personalization = self.personalization_score(post, context);

        ScoreBreakdown {
            engagement,
            social,
            quality,
            recency,
            discovery,
            personalization,
            total: engagement + social + quality + recency + discovery + personalization,
        }
    }

    /// Raw engagement plus a virality bonus once engagement-per-hour crosses
    /// the threshold. The rate divisor is clamped at one hour so brand-new
    /// posts cannot manufacture an infinite rate.
    fn engagement_score(&self, post: &Post) -> f64 {
        let weights = self.weights;
        let likes = post.like_count() as f64;
        let comments = post.comment_count() as f64;

        let mut score = likes * weights.like + comments * weights.comment;

        let age_hours = post.age_hours(self.now).max(1.0);
        let engagement_rate = (likes + comments) / age_hours;
        if engagement_rate > weights.virality_rate_threshold {
            score += weights.virality_bonus * engagement_rate.min(weights.virality_rate_cap);
        }

        score
    }

    /// Followed-author and own-post boosts are independent and may stack.
    fn social_score(&self, post: &Post, context: &ScoringContext) -> f64 {
        let weights = self.weights;
        let mut score = 0.0;

        if context.followed.contains(&post.author_id) {
            score += weights.followed_author;
        }
        if post.author_id == context.viewer_id {
            score += weights.own_post;
        }

        score
    }

    fn quality_score(&self, post: &Post) -> f64 {
        let Some(analysis) = &post.ai_analysis else {
            return 0.0;
        };
        let weights = self.weights;
        let mut score = 0.0;

        match analysis.fact_check {
            FactCheckVerdict::Support => score += weights.fact_supported,
            FactCheckVerdict::Oppose => score += weights.fact_opposed,
            FactCheckVerdict::Neutral | FactCheckVerdict::Unknown => {}
        }

        if analysis.toxicity.detected {
            score += weights.toxic_penalty;
        }

        if analysis.sentiment == Sentiment::Positive {
            score += weights.positive_sentiment;
        }

        score
    }

    /// Linear decay to zero over the decay window, with a flat extra boost
    /// while the post is younger than the new-post window.
    fn recency_score(&self, post: &Post) -> f64 {
        let weights = self.weights;
        let age_hours = post.age_hours(self.now);

        let decayed =
            (weights.recency_max * (1.0 - age_hours / weights.recency_decay_hours)).max(0.0);

        if age_hours < weights.new_post_age_hours {
            decayed + weights.new_post_boost
        } else {
            decayed
        }
    }

    /// Exposure boost for under-engaged posts, plus uniform jitter in
    /// `[0, random_diversity)` so equal-scored posts do not always land in
    /// the same order.
    fn discovery_score(&mut self, post: &Post) -> f64 {
        let weights = self.weights;
        let mut score = 0.0;

        if post.engagement() < weights.low_engagement_threshold {
            score += weights.low_engagement_boost;
        }

        score + self.rng.gen::<f64>() * weights.random_diversity
    }

    /// Category and topic affinity from the viewer's historical likes. The
    /// category bonus is capped once; topic bonuses are capped per topic
    /// with no cap across topics.
    fn personalization_score(&self, post: &Post, context: &ScoringContext) -> f64 {
        let Some(analysis) = &post.ai_analysis else {
            return 0.0;
        };
        let weights = self.weights;
        let mut score = 0.0;

        if let Some(&count) = context.liked_categories.get(&analysis.category) {
            score += (f64::from(count) * weights.category_match).min(weights.category_match_cap);
        }

        for topic in &analysis.topics {
            if let Some(&count) = context.liked_topics.get(topic) {
                score += (f64::from(count) * weights.topic_match).min(weights.topic_match_cap);
            }
        }

        score
    }
}
