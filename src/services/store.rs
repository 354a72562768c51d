//! Repository ports for profiles, swipes and matches
//!
//! Every mutation that reads before it writes goes through a single store
//! call so implementations can apply it atomically (a lock in memory, a
//! row lock in Postgres). Callers never hold a record across two calls.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::Result;
use crate::models::{Match, Swipe, UserProfile};

/// In-place profile edit applied under the record's lock
///
/// Returning an error aborts the update and leaves the record untouched.
pub type ProfileMutation = Box<dyn FnOnce(&mut UserProfile) -> Result<()> + Send>;

/// In-place match edit applied under the record's lock
///
/// Returning an error aborts the update and leaves the record untouched.
pub type MatchMutation = Box<dyn FnOnce(&mut Match) -> Result<()> + Send>;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;

    /// Every profile a discovery request may consider
    async fn list_profiles(&self) -> Result<Vec<UserProfile>>;

    /// Insert a new profile; `Conflict` if the id is taken
    async fn insert_profile(&self, profile: UserProfile) -> Result<UserProfile>;

    /// Apply `mutation` atomically; `None` if the profile doesn't exist
    async fn update_profile(
        &self,
        user_id: &str,
        mutation: ProfileMutation,
    ) -> Result<Option<UserProfile>>;
}

#[async_trait]
pub trait SwipeStore: Send + Sync {
    /// Insert unless a swipe for the same (swiper, swiped) pair exists, in which case `Conflict`
    async fn insert_swipe(&self, swipe: Swipe) -> Result<Swipe>;

    async fn get_swipe(&self, swiper_id: &str, swiped_id: &str) -> Result<Option<Swipe>>;

    /// Ids this user has already swiped on
    async fn swiped_ids(&self, swiper_id: &str) -> Result<HashSet<String>>;
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Insert unless the unordered pair already has a match
    ///
    /// Returns the stored match and whether this call created it.
    async fn insert_match_if_absent(&self, new_match: Match) -> Result<(Match, bool)>;

    async fn get_match(&self, match_id: &str) -> Result<Option<Match>>;

    async fn matches_for_user(&self, user_id: &str) -> Result<Vec<Match>>;

    /// Apply `mutation` atomically; `None` if the match doesn't exist
    async fn update_match(&self, match_id: &str, mutation: MatchMutation) -> Result<Option<Match>>;
}

/// Health probe for the backing store
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn health_check(&self) -> Result<bool>;
}

/// Full storage backend
pub trait Store: ProfileStore + SwipeStore + MatchStore + StoreHealth {}

impl<T> Store for T where T: ProfileStore + SwipeStore + MatchStore + StoreHealth {}
