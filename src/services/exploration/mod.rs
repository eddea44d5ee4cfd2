//! Discovery-feed interleaving.
//!
//! A purely score-sorted feed starves new content: a post with no engagement
//! history can never out-score established posts, so it never gets the
//! impressions it would need to build one. The discovery feed works around
//! this cold-start loop by splitting regular posts into a "popular" pool
//! (score order) and a "fresh" pool (newest first) and emitting fixed-size
//! batches from each in turn until both drain.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::InterleaveConfig;
use crate::models::ScoredPost;

/// Order regular posts for the discovery feed.
///
/// Fresh means: total engagement below the threshold AND younger than the
/// fresh-age window. Everything else is popular. Once one pool runs out the
/// other drains in its own sort order.
pub fn interleave(
    posts: Vec<ScoredPost>,
    config: &InterleaveConfig,
    now: DateTime<Utc>,
) -> Vec<ScoredPost> {
    let (mut fresh, mut popular): (Vec<ScoredPost>, Vec<ScoredPost>) = posts
        .into_iter()
        .partition(|scored| is_fresh(scored, config, now));

    popular.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.post.created_at.cmp(&a.post.created_at))
    });
    fresh.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));

    debug!(
        popular = popular.len(),
        fresh = fresh.len(),
        popular_batch = config.popular_batch,
        fresh_batch = config.fresh_batch,
        "Interleaving discovery feed"
    );

    let mut ordered = Vec::with_capacity(popular.len() + fresh.len());
    let mut popular = popular.into_iter();
    let mut fresh = fresh.into_iter();

    loop {
        let mut emitted = false;
        for _ in 0..config.popular_batch {
            match popular.next() {
                Some(scored) => {
                    ordered.push(scored);
                    emitted = true;
                }
                None => break,
            }
        }
        for _ in 0..config.fresh_batch {
            match fresh.next() {
                Some(scored) => {
                    ordered.push(scored);
                    emitted = true;
                }
                None => break,
            }
        }
        if !emitted {
            break;
        }
    }

    ordered
}

fn is_fresh(scored: &ScoredPost, config: &InterleaveConfig, now: DateTime<Utc>) -> bool {
    scored.post.engagement() < config.fresh_engagement_threshold
        && scored.post.age_hours(now) < config.fresh_age_hours
}
