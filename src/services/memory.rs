use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::error::{LumeError, Result};
use crate::models::{ordered_pair, Match, Swipe, UserProfile};
use crate::services::store::{
    MatchMutation, MatchStore, ProfileMutation, ProfileStore, StoreHealth, SwipeStore,
};

/// In-memory store
///
/// Each collection sits behind its own lock; mutations run while the write
/// guard is held, which makes check-then-write sequences atomic.
#[derive(Default)]
pub struct MemoryStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
    swipes: RwLock<HashMap<(String, String), Swipe>>,
    matches: RwLock<MatchTable>,
}

#[derive(Default)]
struct MatchTable {
    by_id: HashMap<String, Match>,
    by_pair: HashMap<(String, String), String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store built from a fixed set of profiles
    pub async fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Result<Self> {
        let store = Self::new();
        for profile in profiles {
            store.insert_profile(profile).await?;
        }
        Ok(store)
    }

    pub async fn swipe_count(&self) -> usize {
        self.swipes.read().await.len()
    }

    pub async fn match_count(&self) -> usize {
        self.matches.read().await.by_id.len()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfile>> {
        Ok(self.profiles.read().await.values().cloned().collect())
    }

    async fn insert_profile(&self, profile: UserProfile) -> Result<UserProfile> {
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&profile.id) {
            return Err(LumeError::Conflict(format!("profile {} already exists", profile.id)));
        }
        profiles.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    async fn update_profile(
        &self,
        user_id: &str,
        mutation: ProfileMutation,
    ) -> Result<Option<UserProfile>> {
        let mut profiles = self.profiles.write().await;
        let Some(current) = profiles.get_mut(user_id) else {
            return Ok(None);
        };

        let mut draft = current.clone();
        mutation(&mut draft)?;
        *current = draft.clone();
        Ok(Some(draft))
    }
}

#[async_trait]
impl SwipeStore for MemoryStore {
    async fn insert_swipe(&self, swipe: Swipe) -> Result<Swipe> {
        let key = (swipe.swiper_id.clone(), swipe.swiped_id.clone());
        let mut swipes = self.swipes.write().await;
        if swipes.contains_key(&key) {
            return Err(LumeError::Conflict(format!(
                "{} already swiped on {}",
                swipe.swiper_id, swipe.swiped_id
            )));
        }
        swipes.insert(key, swipe.clone());
        Ok(swipe)
    }

    async fn get_swipe(&self, swiper_id: &str, swiped_id: &str) -> Result<Option<Swipe>> {
        let key = (swiper_id.to_string(), swiped_id.to_string());
        Ok(self.swipes.read().await.get(&key).cloned())
    }

    async fn swiped_ids(&self, swiper_id: &str) -> Result<HashSet<String>> {
        Ok(self
            .swipes
            .read()
            .await
            .keys()
            .filter(|(swiper, _)| swiper == swiper_id)
            .map(|(_, swiped)| swiped.clone())
            .collect())
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn insert_match_if_absent(&self, new_match: Match) -> Result<(Match, bool)> {
        let pair = ordered_pair(&new_match.user1_id, &new_match.user2_id);
        let mut table = self.matches.write().await;

        if let Some(existing) = table.by_pair.get(&pair).and_then(|id| table.by_id.get(id)) {
            return Ok((existing.clone(), false));
        }

        table.by_pair.insert(pair, new_match.id.clone());
        table.by_id.insert(new_match.id.clone(), new_match.clone());
        Ok((new_match, true))
    }

    async fn get_match(&self, match_id: &str) -> Result<Option<Match>> {
        Ok(self.matches.read().await.by_id.get(match_id).cloned())
    }

    async fn matches_for_user(&self, user_id: &str) -> Result<Vec<Match>> {
        Ok(self
            .matches
            .read()
            .await
            .by_id
            .values()
            .filter(|m| m.involves(user_id))
            .cloned()
            .collect())
    }

    async fn update_match(&self, match_id: &str, mutation: MatchMutation) -> Result<Option<Match>> {
        let mut table = self.matches.write().await;
        let Some(current) = table.by_id.get_mut(match_id) else {
            return Ok(None);
        };

        // Mutate a copy so a rejected transition leaves the record untouched
        let mut draft = current.clone();
        mutation(&mut draft)?;
        *current = draft.clone();
        Ok(Some(draft))
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
