//! Feed ordering and pagination.
//!
//! One ordered page per request: score every candidate, partition pinned
//! posts out (an editorial override that organic score can never outrank),
//! order the remainder according to the feed mode, then paginate the
//! concatenated sequence.
//!
//! No error paths: ranking is a total function of its inputs and must never
//! block feed delivery. Upstream fetch failures are the calling endpoint's
//! problem.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::debug;

use super::context::ScoringContext;
use super::exploration;
use super::scoring::PostScorer;
use crate::config::Config;
use crate::models::{FeedMode, FeedPage, Post, ScoredPost};

pub struct FeedRanker {
    config: Config,
}

impl Default for FeedRanker {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl FeedRanker {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Rank candidates against the current wall clock with a thread-local
    /// random source.
    pub fn rank(
        &self,
        posts: Vec<Post>,
        context: &ScoringContext,
        mode: FeedMode,
        page: u32,
        limit: usize,
    ) -> FeedPage {
        self.rank_at(posts, context, mode, page, limit, Utc::now(), rand::thread_rng())
    }

    /// Deterministic entry point: the caller supplies the scoring instant
    /// and the random source for the diversity jitter.
    pub fn rank_at<R: Rng>(
        &self,
        posts: Vec<Post>,
        context: &ScoringContext,
        mode: FeedMode,
        page: u32,
        limit: usize,
        now: DateTime<Utc>,
        rng: R,
    ) -> FeedPage {
        debug!(
            viewer_id = %context.viewer_id,
            candidates = posts.len(),
            mode = mode.as_str(),
            page,
            limit,
            "Ranking feed candidates"
        );

        let scored: Vec<ScoredPost> = match mode {
            // Recent mode bypasses scoring entirely.
            FeedMode::Recent => posts
                .into_iter()
                .map(|post| ScoredPost {
                    post,
                    score: 0.0,
                    breakdown: None,
                })
                .collect(),
            FeedMode::Home | FeedMode::Discover => {
                let mut scorer = PostScorer::new(&self.config.weights, now, rng);
                posts
                    .into_iter()
                    .map(|post| {
                        let breakdown = scorer.score(&post, context);
                        ScoredPost {
                            post,
                            score: breakdown.total,
                            breakdown: Some(breakdown),
                        }
                    })
                    .collect()
            }
        };

        let (mut pinned, regular): (Vec<ScoredPost>, Vec<ScoredPost>) =
            scored.into_iter().partition(|scored| scored.post.is_pinned);

        // Most recently pinned first; score is irrelevant to pinned order.
        // A pinned post without a timestamp sorts as the epoch.
        pinned.sort_by(|a, b| pin_time(b).cmp(&pin_time(a)));

        let ordered_regular = match mode {
            FeedMode::Home => sort_by_score(regular),
            FeedMode::Discover => exploration::interleave(regular, &self.config.interleave, now),
            FeedMode::Recent => sort_by_created(regular),
        };

        let mut ordered = pinned;
        ordered.extend(ordered_regular);

        paginate(ordered, page, limit)
    }
}

fn pin_time(scored: &ScoredPost) -> DateTime<Utc> {
    scored.post.pinned_at.unwrap_or(DateTime::UNIX_EPOCH)
}

/// Score descending; ties broken by creation time descending. NaN scores
/// compare equal rather than poisoning the order.
fn sort_by_score(mut posts: Vec<ScoredPost>) -> Vec<ScoredPost> {
    posts.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.post.created_at.cmp(&a.post.created_at))
    });
    posts
}

fn sort_by_created(mut posts: Vec<ScoredPost>) -> Vec<ScoredPost> {
    posts.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
    posts
}

/// 1-based page over the full ordered sequence. `page = 0` is treated as the
/// first page.
fn paginate(posts: Vec<ScoredPost>, page: u32, limit: usize) -> FeedPage {
    let total = posts.len();
    let page = page.max(1);
    let offset = (page as usize - 1).saturating_mul(limit);

    let posts: Vec<ScoredPost> = posts.into_iter().skip(offset).take(limit).collect();
    let has_more = offset + posts.len() < total;

    FeedPage {
        posts,
        total,
        page,
        limit,
        has_more,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AiAnalysis, Toxicity};
    use chrono::Duration;
    use rand::rngs::mock::StepRng;
    use uuid::Uuid;

    fn zero_rng() -> StepRng {
        StepRng::new(0, 0)
    }

    fn create_test_post(now: DateTime<Utc>, age_hours: i64) -> Post {
        let created_at = now - Duration::hours(age_hours);
        Post {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            content: "post".to_string(),
            image: None,
            likes: vec![],
            comments: vec![],
            ai_analysis: None,
            is_pinned: false,
            pinned_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn pinned(mut post: Post, pinned_at: Option<DateTime<Utc>>) -> Post {
        post.is_pinned = true;
        post.pinned_at = pinned_at;
        post
    }

    #[test]
    fn test_pinned_posts_sort_first() {
        let ranker = FeedRanker::default();
        let now = Utc::now();
        let context = ScoringContext::empty(Uuid::new_v4());

        // A heavily engaged regular post against a stale pinned one.
        let mut hot = create_test_post(now, 1);
        hot.likes = (0..100).map(|_| Uuid::new_v4()).collect();
        let stale_pinned = pinned(create_test_post(now, 300), Some(now - Duration::days(10)));
        let pinned_id = stale_pinned.id;

        let feed = ranker.rank_at(
            vec![hot, stale_pinned],
            &context,
            FeedMode::Home,
            1,
            10,
            now,
            zero_rng(),
        );

        assert_eq!(feed.posts[0].post.id, pinned_id);
    }

    #[test]
    fn test_pinned_ordered_by_pin_time_desc() {
        let ranker = FeedRanker::default();
        let now = Utc::now();
        let context = ScoringContext::empty(Uuid::new_v4());

        let first = pinned(create_test_post(now, 50), Some(now - Duration::hours(5)));
        let second = pinned(create_test_post(now, 50), Some(now - Duration::hours(1)));
        let unstamped = pinned(create_test_post(now, 50), None);
        let (first_id, second_id, unstamped_id) = (first.id, second.id, unstamped.id);

        let feed = ranker.rank_at(
            vec![unstamped, first, second],
            &context,
            FeedMode::Home,
            1,
            10,
            now,
            zero_rng(),
        );

        assert_eq!(feed.posts[0].post.id, second_id);
        assert_eq!(feed.posts[1].post.id, first_id);
        // Missing pinned_at sorts as the epoch, i.e. last among pinned.
        assert_eq!(feed.posts[2].post.id, unstamped_id);
    }

    #[test]
    fn test_toxic_post_ranks_below_clean_twin() {
        let ranker = FeedRanker::default();
        let now = Utc::now();
        let context = ScoringContext::empty(Uuid::new_v4());

        let clean = create_test_post(now, 10);
        let mut toxic = create_test_post(now, 10);
        toxic.created_at = clean.created_at;
        toxic.ai_analysis = Some(AiAnalysis {
            toxicity: Toxicity {
                detected: true,
                details: std::collections::HashMap::new(),
            },
            ..Default::default()
        });
        let toxic_id = toxic.id;

        let feed = ranker.rank_at(
            vec![toxic, clean],
            &context,
            FeedMode::Home,
            1,
            10,
            now,
            zero_rng(),
        );

        assert_eq!(feed.posts[1].post.id, toxic_id);
        assert!(feed.posts[1].score < feed.posts[0].score);
    }

    #[test]
    fn test_home_ties_break_by_recency() {
        let ranker = FeedRanker::default();
        let now = Utc::now();
        let context = ScoringContext::empty(Uuid::new_v4());

        // Both past the decay window with zero engagement: identical scores
        // once the jitter is pinned, so creation time decides.
        let older = create_test_post(now, 90);
        let newer = create_test_post(now, 80);
        let newer_id = newer.id;

        let feed = ranker.rank_at(
            vec![older, newer],
            &context,
            FeedMode::Home,
            1,
            10,
            now,
            zero_rng(),
        );

        assert_eq!(feed.posts[0].score, feed.posts[1].score);
        assert_eq!(feed.posts[0].post.id, newer_id);
    }

    #[test]
    fn test_recent_mode_bypasses_scoring() {
        let ranker = FeedRanker::default();
        let now = Utc::now();
        let context = ScoringContext::empty(Uuid::new_v4());

        let mut engaged = create_test_post(now, 2);
        engaged.likes = (0..50).map(|_| Uuid::new_v4()).collect();
        let fresh = create_test_post(now, 0);
        let fresh_id = fresh.id;

        let feed = ranker.rank_at(
            vec![engaged, fresh],
            &context,
            FeedMode::Recent,
            1,
            10,
            now,
            zero_rng(),
        );

        assert_eq!(feed.posts[0].post.id, fresh_id);
        for scored in &feed.posts {
            assert_eq!(scored.score, 0.0);
            assert!(scored.breakdown.is_none());
        }
    }

    #[test]
    fn test_pagination_invariant() {
        let ranker = FeedRanker::default();
        let now = Utc::now();
        let context = ScoringContext::empty(Uuid::new_v4());

        let posts: Vec<Post> = (0..23).map(|i| create_test_post(now, i)).collect();

        for (page, limit) in [(1u32, 10usize), (2, 10), (3, 10), (4, 10), (1, 23), (5, 5)] {
            let feed = ranker.rank_at(
                posts.clone(),
                &context,
                FeedMode::Home,
                page,
                limit,
                now,
                zero_rng(),
            );

            let offset = (page as usize - 1) * limit;
            let expected_len = limit.min(23usize.saturating_sub(offset));
            assert_eq!(feed.posts.len(), expected_len, "page={page} limit={limit}");
            assert_eq!(feed.total, 23);
            assert_eq!(feed.has_more, offset + feed.posts.len() < 23);
        }
    }

    #[test]
    fn test_page_zero_is_first_page() {
        let ranker = FeedRanker::default();
        let now = Utc::now();
        let context = ScoringContext::empty(Uuid::new_v4());

        let posts: Vec<Post> = (0..5).map(|i| create_test_post(now, i)).collect();
        let feed = ranker.rank_at(posts, &context, FeedMode::Home, 0, 3, now, zero_rng());

        assert_eq!(feed.page, 1);
        assert_eq!(feed.posts.len(), 3);
        assert!(feed.has_more);
    }

    #[test]
    fn test_zero_limit_returns_empty_page() {
        let ranker = FeedRanker::default();
        let now = Utc::now();
        let context = ScoringContext::empty(Uuid::new_v4());

        let posts: Vec<Post> = (0..5).map(|i| create_test_post(now, i)).collect();
        let feed = ranker.rank_at(posts, &context, FeedMode::Home, 1, 0, now, zero_rng());

        assert!(feed.posts.is_empty());
        assert_eq!(feed.total, 5);
        assert!(feed.has_more);
    }

    #[test]
    fn test_empty_candidates() {
        let ranker = FeedRanker::default();
        let context = ScoringContext::empty(Uuid::new_v4());

        let feed = ranker.rank(vec![], &context, FeedMode::Home, 1, 10);

        assert!(feed.posts.is_empty());
        assert_eq!(feed.total, 0);
        assert!(!feed.has_more);
    }
}
