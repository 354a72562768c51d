use chrono::{DateTime, Duration, Utc};

use crate::error::{LumeError, Result};
use crate::models::UserProfile;

/// Sliding-window daily swipe quota for free-tier users
///
/// The window restarts lazily: the first check after `window` has elapsed
/// since `quota_window_start` zeroes the counter. There is no calendar-day
/// reset and no background job.
#[derive(Debug, Clone, Copy)]
pub struct QuotaPolicy {
    pub free_daily_limit: u32,
    pub window: Duration,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            free_daily_limit: 15,
            window: Duration::hours(24),
        }
    }
}

impl QuotaPolicy {
    pub fn new(free_daily_limit: u32, window: Duration) -> Self {
        Self {
            free_daily_limit,
            window,
        }
    }

    /// Limit for this user, `None` when unlimited
    pub fn limit_for(&self, profile: &UserProfile) -> Option<u32> {
        if profile.is_premium {
            None
        } else {
            Some(self.free_daily_limit)
        }
    }

    /// Whether the window has strictly elapsed at `now`
    pub fn window_elapsed(&self, profile: &UserProfile, now: DateTime<Utc>) -> bool {
        now - profile.quota_window_start > self.window
    }

    /// Restart the window if it elapsed; returns true when the profile changed
    pub fn refresh(&self, profile: &mut UserProfile, now: DateTime<Utc>) -> bool {
        if self.window_elapsed(profile, now) {
            profile.daily_swipes_used = 0;
            profile.quota_window_start = now;
            true
        } else {
            false
        }
    }

    pub fn resets_at(&self, profile: &UserProfile) -> DateTime<Utc> {
        profile.quota_window_start + self.window
    }

    pub fn remaining(&self, profile: &UserProfile) -> Option<u32> {
        self.limit_for(profile)
            .map(|limit| limit.saturating_sub(profile.daily_swipes_used))
    }

    /// Fail with `QuotaExceeded` when a refreshed profile has no views left
    pub fn check(&self, profile: &UserProfile) -> Result<()> {
        match self.limit_for(profile) {
            Some(limit) if profile.daily_swipes_used >= limit => Err(LumeError::QuotaExceeded {
                resets_at: self.resets_at(profile),
            }),
            _ => Ok(()),
        }
    }

    /// Count one swipe against the window
    pub fn consume(&self, profile: &mut UserProfile, now: DateTime<Utc>) {
        self.refresh(profile, now);
        profile.daily_swipes_used = profile.daily_swipes_used.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LookingFor, MeetReadiness};

    fn profile_with_usage(used: u32, window_start: DateTime<Utc>) -> UserProfile {
        UserProfile {
            id: "u".to_string(),
            name: "U".to_string(),
            age: 30,
            gender: "man".to_string(),
            sexual_orientation: None,
            interested_in_genders: Default::default(),
            location: None,
            age_range_min: 25,
            age_range_max: 35,
            max_distance: 50,
            deal_breakers: Default::default(),
            looking_for: LookingFor::Casual,
            lifestyle: Default::default(),
            values: Default::default(),
            meet_readiness: MeetReadiness::Flexible,
            interests: Default::default(),
            is_premium: false,
            daily_swipes_used: used,
            quota_window_start: window_start,
            created_at: window_start,
        }
    }

    #[test]
    fn test_resets_just_after_window() {
        let policy = QuotaPolicy::default();
        let now = Utc::now();
        let mut profile = profile_with_usage(15, now - Duration::hours(24) - Duration::seconds(1));

        assert!(policy.refresh(&mut profile, now));
        assert_eq!(profile.daily_swipes_used, 0);
        assert_eq!(profile.quota_window_start, now);
    }

    #[test]
    fn test_no_reset_inside_window() {
        let policy = QuotaPolicy::default();
        let now = Utc::now();
        let start = now - Duration::hours(23) - Duration::minutes(59) - Duration::seconds(59);
        let mut profile = profile_with_usage(15, start);

        assert!(!policy.refresh(&mut profile, now));
        assert_eq!(profile.daily_swipes_used, 15);
    }

    #[test]
    fn test_check_at_limit() {
        let policy = QuotaPolicy::default();
        let start = Utc::now();
        let profile = profile_with_usage(15, start);

        match policy.check(&profile) {
            Err(LumeError::QuotaExceeded { resets_at }) => {
                assert_eq!(resets_at, start + Duration::hours(24));
            }
            other => panic!("expected QuotaExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_premium_unlimited() {
        let policy = QuotaPolicy::default();
        let mut profile = profile_with_usage(1000, Utc::now());
        profile.is_premium = true;

        assert!(policy.check(&profile).is_ok());
        assert_eq!(policy.remaining(&profile), None);
    }

    #[test]
    fn test_consume_increments() {
        let policy = QuotaPolicy::default();
        let now = Utc::now();
        let mut profile = profile_with_usage(3, now);
        policy.consume(&mut profile, now);
        assert_eq!(profile.daily_swipes_used, 4);
        assert_eq!(policy.remaining(&profile), Some(11));
    }
}
