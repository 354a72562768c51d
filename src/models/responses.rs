use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::{CompatibilityResult, Match, MatchStatus, Swipe};

/// Response for the discovery endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverResponse {
    pub candidates: Vec<CompatibilityResult>,
    pub total_results: usize,
    /// Views left in the current window; None for premium users
    pub remaining_views: Option<u32>,
    pub quota_resets_at: Option<DateTime<Utc>>,
}

/// Response for a recorded swipe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeResponse {
    pub swipe: Swipe,
    #[serde(rename = "match")]
    pub matched: Option<Match>,
    pub is_match: bool,
}

/// Match as seen by one participant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    #[serde(flatten)]
    pub record: Match,
    pub other_user_id: String,
    pub status: MatchStatus,
    pub is_active: bool,
}

impl MatchView {
    pub fn for_user(record: Match, user_id: &str, now: DateTime<Utc>) -> Self {
        let other_user_id = record
            .other_participant(user_id)
            .unwrap_or_default()
            .to_string();
        let status = record.status(now);
        let is_active = record.is_active(now);
        Self {
            record,
            other_user_id,
            status,
            is_active,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_match_view_for_user() {
        let now = Utc::now();
        let m = Match::new("alice", "bob", now, Duration::hours(72));
        let view = MatchView::for_user(m, "bob", now);

        assert_eq!(view.other_user_id, "alice");
        assert_eq!(view.status, MatchStatus::Active);
        assert!(view.is_active);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "active");
        assert!(json.get("expiresAt").is_some());
    }
}
