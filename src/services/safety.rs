use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::{LumeError, Result};
use crate::services::cache::{CacheKey, CacheManager};

/// Kind of safety relation between two users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Ghost,
    Block,
}

/// Directional relation: `actor_id` ghosted or blocked `target_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyRelation {
    pub actor_id: String,
    pub target_id: String,
    pub kind: RelationKind,
}

impl SafetyRelation {
    /// The user on the other side of this relation from `user_id`, if involved
    pub fn counterpart(&self, user_id: &str) -> Option<&str> {
        if self.actor_id == user_id {
            Some(&self.target_id)
        } else if self.target_id == user_id {
            Some(&self.actor_id)
        } else {
            None
        }
    }
}

/// Exclusions are symmetric: either direction hides the pair from each other
pub fn exclusions_from(relations: &[SafetyRelation], user_id: &str) -> HashSet<String> {
    relations
        .iter()
        .filter_map(|relation| relation.counterpart(user_id))
        .map(str::to_string)
        .collect()
}

/// Source of ghost/block exclusions owned by the safety service
#[async_trait]
pub trait SafetyProvider: Send + Sync {
    /// Users that must never be shown to `user_id`, in either direction
    async fn exclusions_for(&self, user_id: &str) -> Result<HashSet<String>>;
}

/// In-process relation list, for tests and single-node deployments
#[derive(Default)]
pub struct StaticSafety {
    relations: RwLock<Vec<SafetyRelation>>,
}

impl StaticSafety {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relations(relations: Vec<SafetyRelation>) -> Self {
        Self {
            relations: RwLock::new(relations),
        }
    }

    pub async fn record(&self, actor_id: &str, target_id: &str, kind: RelationKind) {
        self.relations.write().await.push(SafetyRelation {
            actor_id: actor_id.to_string(),
            target_id: target_id.to_string(),
            kind,
        });
    }
}

#[async_trait]
impl SafetyProvider for StaticSafety {
    async fn exclusions_for(&self, user_id: &str) -> Result<HashSet<String>> {
        Ok(exclusions_from(&self.relations.read().await, user_id))
    }
}

#[derive(Debug, Deserialize)]
struct RelationsResponse {
    #[serde(default)]
    relations: Vec<SafetyRelation>,
}

/// HTTP client for the safety service
///
/// Fetches `GET {base_url}/users/{id}/relations` and caches the resulting
/// exclusion set. Cache failures degrade to a direct fetch.
pub struct HttpSafetyClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
    cache: Option<Arc<CacheManager>>,
}

impl HttpSafetyClient {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        timeout: Duration,
        cache: Option<Arc<CacheManager>>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            cache,
        })
    }

    async fn fetch_relations(&self, user_id: &str) -> Result<Vec<SafetyRelation>> {
        let url = format!(
            "{}/users/{}/relations",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(user_id)
        );

        tracing::debug!("Fetching safety relations from: {}", url);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("X-Api-Key", key);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(LumeError::Internal(format!(
                "Safety service returned {} for user {}",
                response.status(),
                user_id
            )));
        }

        let body: RelationsResponse = response.json().await?;
        Ok(body.relations)
    }

    /// Drop the cached exclusions for `user_id`
    pub async fn invalidate(&self, user_id: &str) -> Result<()> {
        if let Some(cache) = &self.cache {
            cache.delete(&CacheKey::exclusions(user_id)).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SafetyProvider for HttpSafetyClient {
    async fn exclusions_for(&self, user_id: &str) -> Result<HashSet<String>> {
        let key = CacheKey::exclusions(user_id);

        if let Some(cache) = &self.cache {
            match cache.get::<Vec<String>>(&key).await {
                Ok(Some(ids)) => return Ok(ids.into_iter().collect()),
                Ok(None) => {}
                Err(e) => tracing::warn!("Failed to read exclusion cache for {}: {}", user_id, e),
            }
        }

        let relations = self.fetch_relations(user_id).await?;
        let exclusions = exclusions_from(&relations, user_id);

        if let Some(cache) = &self.cache {
            let ids: Vec<&String> = exclusions.iter().collect();
            if let Err(e) = cache.set(&key, &ids).await {
                tracing::warn!("Failed to cache exclusions for {}: {}", user_id, e);
            }
        }

        tracing::debug!("User {} has {} safety exclusions", user_id, exclusions.len());
        Ok(exclusions)
    }
}
