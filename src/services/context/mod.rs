//! Scoring context construction.
//!
//! The context is rebuilt per request from the viewer's stored record and
//! never persisted. Construction is deliberately lenient: the preference
//! counters live in a free-form JSON blob, and a malformed blob must degrade
//! to empty maps rather than fail the request, since ranking must never
//! block feed delivery.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use uuid::Uuid;

use crate::models::ViewerProfile;

/// Per-request bundle of viewer identity, social graph and preference
/// counters. Only ever read by the scorer.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    pub viewer_id: Uuid,
    pub followed: HashSet<Uuid>,
    /// Category label → historical like count.
    pub liked_categories: HashMap<String, u32>,
    /// Topic → historical like count.
    pub liked_topics: HashMap<String, u32>,
}

impl ScoringContext {
    /// Context with no social graph and no preferences; every contribution
    /// that depends on them scores zero.
    pub fn empty(viewer_id: Uuid) -> Self {
        Self {
            viewer_id,
            followed: HashSet::new(),
            liked_categories: HashMap::new(),
            liked_topics: HashMap::new(),
        }
    }

    /// Build from the viewer-store record.
    pub fn from_profile(profile: &ViewerProfile) -> Self {
        Self {
            viewer_id: profile.id,
            followed: profile.following.iter().copied().collect(),
            liked_categories: counter_map(profile.preferences.get("likedCategories")),
            liked_topics: counter_map(profile.preferences.get("likedTopics")),
        }
    }
}

/// Extract a string→count map from an untrusted JSON value. Anything that is
/// not an object, and any entry whose value is not a non-negative integer,
/// is dropped silently.
fn counter_map(value: Option<&Value>) -> HashMap<String, u32> {
    let Some(Value::Object(entries)) = value else {
        return HashMap::new();
    };
    entries
        .iter()
        .filter_map(|(key, count)| {
            count
                .as_u64()
                .map(|n| (key.clone(), n.min(u64::from(u32::MAX)) as u32))
        })
        .collect()
}
