use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::clock::Clock;
use crate::error::{LumeError, Result};
use crate::models::{Match, MatchCreatedEvent, MatchView};
use crate::services::notifications::MatchNotifier;
use crate::services::store::{MatchMutation, MatchStore, ProfileStore};

/// Time windows applied to matches
#[derive(Debug, Clone, Copy)]
pub struct LifecyclePolicy {
    /// Lifetime of a fresh match
    pub ttl: Duration,
    /// One-time extension granted to premium users
    pub extension: Duration,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(72),
            extension: Duration::hours(24),
        }
    }
}

/// Owns every mutation of a match record
///
/// Each transition is a single atomic store update; the guard checks run
/// inside the update so two participants racing on the same match see a
/// consistent record.
pub struct MatchLifecycle {
    profiles: Arc<dyn ProfileStore>,
    matches: Arc<dyn MatchStore>,
    notifier: Arc<dyn MatchNotifier>,
    clock: Arc<dyn Clock>,
    policy: LifecyclePolicy,
}

impl MatchLifecycle {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        matches: Arc<dyn MatchStore>,
        notifier: Arc<dyn MatchNotifier>,
        clock: Arc<dyn Clock>,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            profiles,
            matches,
            notifier,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    /// Create the match for a pair, or return the one that already exists
    ///
    /// The match-created event fires only for the call that created it.
    pub async fn create_match(&self, user_a: &str, user_b: &str) -> Result<Match> {
        let candidate = Match::new(user_a, user_b, self.clock.now(), self.policy.ttl);
        let (stored, created) = self.matches.insert_match_if_absent(candidate).await?;

        if created {
            tracing::info!(
                "Match {} created between {} and {}, expires at {}",
                stored.id,
                stored.user1_id,
                stored.user2_id,
                stored.expires_at
            );
            self.notifier.match_created(MatchCreatedEvent::from(&stored));
        } else {
            tracing::debug!("Match {} already exists for {} and {}", stored.id, user_a, user_b);
        }

        Ok(stored)
    }

    /// Push expiry out by the extension window, once per match, premium only
    pub async fn extend_match(&self, match_id: &str, user_id: &str) -> Result<Match> {
        let is_premium = self.authorize(match_id, user_id).await?;
        let now = self.clock.now();
        let extension = self.policy.extension;

        let updated = self
            .apply(
                match_id,
                Box::new(move |m: &mut Match| {
                    if m.is_extended {
                        return Err(LumeError::Conflict("match was already extended".into()));
                    }
                    if !is_premium {
                        return Err(LumeError::PremiumRequired(
                            "extending a match requires premium".into(),
                        ));
                    }
                    if m.is_expired(now) {
                        return Err(LumeError::Conflict("match has expired".into()));
                    }
                    m.expires_at += extension;
                    m.is_extended = true;
                    Ok(())
                }),
            )
            .await?;

        tracing::info!("Match {} extended by {} until {}", match_id, user_id, updated.expires_at);
        Ok(updated)
    }

    /// Pause the expiry countdown; repeat calls are a no-op
    pub async fn freeze_match(&self, match_id: &str, user_id: &str) -> Result<Match> {
        let is_premium = self.authorize(match_id, user_id).await?;
        let now = self.clock.now();

        let updated = self
            .apply(
                match_id,
                Box::new(move |m: &mut Match| {
                    if !is_premium {
                        return Err(LumeError::PremiumRequired(
                            "freezing a match requires premium".into(),
                        ));
                    }
                    if m.is_frozen {
                        return Ok(());
                    }
                    if m.is_expired(now) {
                        return Err(LumeError::Conflict("match has expired".into()));
                    }
                    m.is_frozen = true;
                    m.frozen_at = Some(now);
                    Ok(())
                }),
            )
            .await?;

        tracing::info!("Match {} frozen by {}", match_id, user_id);
        Ok(updated)
    }

    /// Resume the countdown, crediting the time spent frozen
    pub async fn unfreeze_match(&self, match_id: &str, user_id: &str) -> Result<Match> {
        let is_premium = self.authorize(match_id, user_id).await?;
        let now = self.clock.now();

        let updated = self
            .apply(
                match_id,
                Box::new(move |m: &mut Match| {
                    if !is_premium {
                        return Err(LumeError::PremiumRequired(
                            "unfreezing a match requires premium".into(),
                        ));
                    }
                    if !m.is_frozen {
                        return Ok(());
                    }
                    if let Some(frozen_at) = m.frozen_at {
                        let paused = now - frozen_at;
                        if paused > Duration::zero() {
                            m.expires_at += paused;
                        }
                    }
                    m.is_frozen = false;
                    m.frozen_at = None;
                    Ok(())
                }),
            )
            .await?;

        tracing::info!(
            "Match {} unfrozen by {}, expires at {}",
            match_id,
            user_id,
            updated.expires_at
        );
        Ok(updated)
    }

    /// Record an agreed meetup; the time must not be in the past
    pub async fn confirm_meetup(
        &self,
        match_id: &str,
        user_id: &str,
        time: DateTime<Utc>,
        location: String,
    ) -> Result<Match> {
        self.authorize(match_id, user_id).await?;
        let now = self.clock.now();

        if time < now {
            return Err(LumeError::Validation("meetup time must not be in the past".into()));
        }
        if location.trim().is_empty() {
            return Err(LumeError::Validation("meetup location is required".into()));
        }

        let updated = self
            .apply(
                match_id,
                Box::new(move |m: &mut Match| {
                    if m.is_expired(now) {
                        return Err(LumeError::Conflict("match has expired".into()));
                    }
                    m.meetup_confirmed = true;
                    m.meetup_time = Some(time);
                    m.meetup_location = Some(location);
                    Ok(())
                }),
            )
            .await?;

        tracing::info!("Meetup confirmed for match {} by {}", match_id, user_id);
        Ok(updated)
    }

    /// Flag that the pair met in person; participants only
    pub async fn mark_met_in_person(&self, match_id: &str, user_id: &str) -> Result<Match> {
        self.authorize(match_id, user_id).await?;

        let updated = self
            .apply(
                match_id,
                Box::new(|m: &mut Match| {
                    m.has_met_in_person = true;
                    Ok(())
                }),
            )
            .await?;

        tracing::info!("Match {} marked as met in person by {}", match_id, user_id);
        Ok(updated)
    }

    /// All matches involving `user_id`, newest first, with derived status
    pub async fn matches_for_user(&self, user_id: &str) -> Result<Vec<MatchView>> {
        if self.profiles.get_profile(user_id).await?.is_none() {
            return Err(LumeError::NotFound(format!("user {}", user_id)));
        }

        let now = self.clock.now();
        let mut matches = self.matches.matches_for_user(user_id).await?;
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(matches
            .into_iter()
            .map(|m| MatchView::for_user(m, user_id, now))
            .collect())
    }

    /// Whether the match is still in the deciding pool right now
    pub fn is_active(&self, m: &Match) -> bool {
        m.is_active(self.clock.now())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Check the match exists and `user_id` takes part in it; returns the actor's premium flag
    async fn authorize(&self, match_id: &str, user_id: &str) -> Result<bool> {
        let record = self
            .matches
            .get_match(match_id)
            .await?
            .ok_or_else(|| LumeError::NotFound(format!("match {}", match_id)))?;

        if !record.involves(user_id) {
            tracing::warn!("User {} attempted to act on match {} they are not part of", user_id, match_id);
            return Err(LumeError::Unauthorized(format!(
                "user {} is not a participant in match {}",
                user_id, match_id
            )));
        }

        let actor = self
            .profiles
            .get_profile(user_id)
            .await?
            .ok_or_else(|| LumeError::NotFound(format!("user {}", user_id)))?;

        Ok(actor.is_premium)
    }

    async fn apply(&self, match_id: &str, mutation: MatchMutation) -> Result<Match> {
        self.matches
            .update_match(match_id, mutation)
            .await?
            .ok_or_else(|| LumeError::NotFound(format!("match {}", match_id)))
    }
}
