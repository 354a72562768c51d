use std::sync::Arc;

use crate::clock::Clock;
use crate::core::QuotaPolicy;
use crate::error::{LumeError, Result};
use crate::models::{Match, MeetupPreference, Swipe, UserProfile};
use crate::services::lifecycle::MatchLifecycle;
use crate::services::store::{ProfileStore, SwipeStore};

/// One swipe decision as submitted by the swiper
#[derive(Debug, Clone)]
pub struct SwipeInput {
    pub swiped_id: String,
    pub is_like: bool,
    pub is_super_like: bool,
    pub meetup_preference: Option<MeetupPreference>,
}

/// Outcome of a recorded swipe
#[derive(Debug, Clone)]
pub struct SwipeOutcome {
    pub swipe: Swipe,
    /// Present when this swipe completed a mutual like
    pub matched: Option<Match>,
}

/// Records swipes, counts them against the quota and detects mutual likes
pub struct SwipeRecorder {
    profiles: Arc<dyn ProfileStore>,
    swipes: Arc<dyn SwipeStore>,
    lifecycle: Arc<MatchLifecycle>,
    quota: QuotaPolicy,
    clock: Arc<dyn Clock>,
}

impl SwipeRecorder {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        swipes: Arc<dyn SwipeStore>,
        lifecycle: Arc<MatchLifecycle>,
        quota: QuotaPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            profiles,
            swipes,
            lifecycle,
            quota,
            clock,
        }
    }

    /// Record `swiper_id`'s decision on `input.swiped_id`
    ///
    /// A second swipe on the same target is `Conflict`; callers may treat it
    /// as "already swiped". The swipe is stored before the quota counter
    /// moves, so a losing concurrent duplicate never consumes a view.
    pub async fn record_swipe(&self, swiper_id: &str, input: SwipeInput) -> Result<SwipeOutcome> {
        if swiper_id == input.swiped_id {
            return Err(LumeError::Validation("users cannot swipe on themselves".into()));
        }

        if self.profiles.get_profile(swiper_id).await?.is_none() {
            return Err(LumeError::NotFound(format!("user {}", swiper_id)));
        }
        if self.profiles.get_profile(&input.swiped_id).await?.is_none() {
            return Err(LumeError::NotFound(format!("user {}", input.swiped_id)));
        }

        let now = self.clock.now();
        let swipe = Swipe {
            swiper_id: swiper_id.to_string(),
            swiped_id: input.swiped_id,
            // A super like is always a like
            is_like: input.is_like || input.is_super_like,
            is_super_like: input.is_super_like,
            meetup_preference: input.meetup_preference,
            created_at: now,
        };

        let swipe = self.swipes.insert_swipe(swipe).await?;

        let quota = self.quota;
        self.profiles
            .update_profile(
                swiper_id,
                Box::new(move |profile: &mut UserProfile| {
                    quota.consume(profile, now);
                    Ok(())
                }),
            )
            .await?
            .ok_or_else(|| LumeError::NotFound(format!("user {}", swiper_id)))?;

        tracing::debug!(
            "Recorded swipe {} -> {} (like: {}, super: {})",
            swipe.swiper_id,
            swipe.swiped_id,
            swipe.is_like,
            swipe.is_super_like
        );

        let matched = if swipe.is_like {
            self.check_reciprocal(&swipe).await?
        } else {
            None
        };

        Ok(SwipeOutcome { swipe, matched })
    }

    async fn check_reciprocal(&self, swipe: &Swipe) -> Result<Option<Match>> {
        let reciprocal = self
            .swipes
            .get_swipe(&swipe.swiped_id, &swipe.swiper_id)
            .await?;

        match reciprocal {
            Some(other) if other.is_like => {
                let created = self
                    .lifecycle
                    .create_match(&swipe.swiper_id, &swipe.swiped_id)
                    .await?;
                Ok(Some(created))
            }
            _ => Ok(None),
        }
    }
}
