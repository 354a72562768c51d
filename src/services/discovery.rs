use std::sync::Arc;
use std::time::Instant;

use crate::clock::Clock;
use crate::core::{Matcher, QuotaPolicy, RankingOptions};
use crate::error::{LumeError, Result};
use crate::models::{DiscoverResponse, MeetReadiness, UserProfile};
use crate::services::safety::SafetyProvider;
use crate::services::store::{ProfileStore, SwipeStore};

/// Per-request discovery switches
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryOptions {
    pub use_compatibility: bool,
    pub respect_quota: bool,
    /// Readiness override; ignored unless the requester is premium
    pub meet_readiness: Option<MeetReadiness>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            use_compatibility: true,
            respect_quota: true,
            meet_readiness: None,
        }
    }
}

/// Builds the ranked candidate page a user sees
pub struct DiscoveryService {
    profiles: Arc<dyn ProfileStore>,
    swipes: Arc<dyn SwipeStore>,
    safety: Arc<dyn SafetyProvider>,
    matcher: Matcher,
    quota: QuotaPolicy,
    clock: Arc<dyn Clock>,
}

impl DiscoveryService {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        swipes: Arc<dyn SwipeStore>,
        safety: Arc<dyn SafetyProvider>,
        matcher: Matcher,
        quota: QuotaPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            profiles,
            swipes,
            safety,
            matcher,
            quota,
            clock,
        }
    }

    /// Discover candidates for `requester_id`
    ///
    /// Discovery never consumes quota; only swipes do. It does persist a
    /// lazy window reset so the stored counter reflects what was checked.
    pub async fn discover(
        &self,
        requester_id: &str,
        options: DiscoveryOptions,
    ) -> Result<DiscoverResponse> {
        let start = Instant::now();

        let mut requester = self
            .profiles
            .get_profile(requester_id)
            .await?
            .ok_or_else(|| LumeError::NotFound(format!("user {}", requester_id)))?;

        if options.respect_quota {
            requester = self.refresh_quota(requester).await?;
            self.quota.check(&requester)?;
        }

        let mut exclude_ids = self.swipes.swiped_ids(requester_id).await?;
        exclude_ids.extend(self.safety.exclusions_for(requester_id).await?);
        exclude_ids.insert(requester_id.to_string());

        let candidates = self.profiles.list_profiles().await?;

        let result = self.matcher.rank(
            &requester,
            candidates,
            &exclude_ids,
            RankingOptions {
                use_compatibility: options.use_compatibility,
                meet_readiness: options.meet_readiness,
            },
        );

        tracing::info!(
            "Discovery for {}: {} profiles, {} eligible, {} returned in {:?}",
            requester_id,
            result.total_candidates,
            result.eligible_candidates,
            result.candidates.len(),
            start.elapsed()
        );

        let (remaining_views, quota_resets_at) = match self.quota.remaining(&requester) {
            Some(remaining) => (Some(remaining), Some(self.quota.resets_at(&requester))),
            None => (None, None),
        };

        Ok(DiscoverResponse {
            total_results: result.candidates.len(),
            candidates: result.candidates,
            remaining_views,
            quota_resets_at,
        })
    }

    async fn refresh_quota(&self, requester: UserProfile) -> Result<UserProfile> {
        let now = self.clock.now();
        if !self.quota.window_elapsed(&requester, now) {
            return Ok(requester);
        }

        let quota = self.quota;
        let refreshed = self
            .profiles
            .update_profile(
                &requester.id,
                Box::new(move |profile: &mut UserProfile| {
                    quota.refresh(profile, now);
                    Ok(())
                }),
            )
            .await?
            .ok_or_else(|| LumeError::NotFound(format!("user {}", requester.id)))?;

        tracing::debug!("Quota window restarted for {}", refreshed.id);
        Ok(refreshed)
    }
}
