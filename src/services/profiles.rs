use std::str::FromStr;
use std::sync::Arc;
use validator::Validate;

use crate::clock::Clock;
use crate::error::{LumeError, Result};
use crate::models::{
    CreateProfileRequest, LookingFor, MeetReadiness, UpdatePreferencesRequest, UserProfile,
};
use crate::services::store::ProfileStore;

/// Profile registration and preference updates
pub struct ProfileService {
    profiles: Arc<dyn ProfileStore>,
    clock: Arc<dyn Clock>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileStore>, clock: Arc<dyn Clock>) -> Self {
        Self { profiles, clock }
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile> {
        self.profiles
            .get_profile(user_id)
            .await?
            .ok_or_else(|| LumeError::NotFound(format!("user {}", user_id)))
    }

    /// Create a profile at registration; `Conflict` if the id exists
    ///
    /// New profiles are always free tier. Premium is granted through
    /// [`ProfileService::set_premium`].
    pub async fn create_profile(&self, request: CreateProfileRequest) -> Result<UserProfile> {
        request.validate()?;

        let looking_for = parse_field::<LookingFor>(&request.looking_for)?;
        let meet_readiness = match request.meet_readiness.as_deref() {
            Some(raw) => parse_field::<MeetReadiness>(raw)?,
            None => MeetReadiness::default(),
        };

        let now = self.clock.now();
        let profile = UserProfile {
            id: request.id,
            name: request.name,
            age: request.age,
            gender: request.gender,
            sexual_orientation: request.sexual_orientation,
            interested_in_genders: request.interested_in_genders,
            location: request.location,
            age_range_min: request.age_range_min,
            age_range_max: request.age_range_max,
            max_distance: request.max_distance,
            deal_breakers: request.deal_breakers,
            looking_for,
            lifestyle: request.lifestyle,
            values: request.values,
            meet_readiness,
            interests: request.interests,
            is_premium: false,
            daily_swipes_used: 0,
            quota_window_start: now,
            created_at: now,
        };

        let created = self.profiles.insert_profile(profile).await?;
        tracing::info!("Created profile {}", created.id);
        Ok(created)
    }

    /// Apply a partial preference update
    ///
    /// The age-range order is checked against the merged result under the
    /// record's lock, so sending only one bound still cannot invert the
    /// stored range, even with concurrent updates.
    pub async fn update_preferences(
        &self,
        user_id: &str,
        request: UpdatePreferencesRequest,
    ) -> Result<UserProfile> {
        request.validate()?;

        let looking_for = request
            .looking_for
            .as_deref()
            .map(parse_field::<LookingFor>)
            .transpose()?;
        let meet_readiness = request
            .meet_readiness
            .as_deref()
            .map(parse_field::<MeetReadiness>)
            .transpose()?;

        let updated = self
            .profiles
            .update_profile(
                user_id,
                Box::new(move |profile: &mut UserProfile| {
                    let merged_min = request.age_range_min.unwrap_or(profile.age_range_min);
                    let merged_max = request.age_range_max.unwrap_or(profile.age_range_max);
                    if merged_min > merged_max {
                        return Err(LumeError::Validation(format!(
                            "ageRangeMin ({}) must not exceed ageRangeMax ({})",
                            merged_min, merged_max
                        )));
                    }

                    if let Some(genders) = request.interested_in_genders {
                        profile.interested_in_genders = genders;
                    }
                    if let Some(orientation) = request.sexual_orientation {
                        profile.sexual_orientation = Some(orientation);
                    }
                    if let Some(location) = request.location {
                        profile.location = Some(location);
                    }
                    if let Some(min) = request.age_range_min {
                        profile.age_range_min = min;
                    }
                    if let Some(max) = request.age_range_max {
                        profile.age_range_max = max;
                    }
                    if let Some(distance) = request.max_distance {
                        profile.max_distance = distance;
                    }
                    if let Some(deal_breakers) = request.deal_breakers {
                        profile.deal_breakers = deal_breakers;
                    }
                    if let Some(goal) = looking_for {
                        profile.looking_for = goal;
                    }
                    if let Some(lifestyle) = request.lifestyle {
                        profile.lifestyle = lifestyle;
                    }
                    if let Some(values) = request.values {
                        profile.values = values;
                    }
                    if let Some(readiness) = meet_readiness {
                        profile.meet_readiness = readiness;
                    }
                    if let Some(interests) = request.interests {
                        profile.interests = interests;
                    }
                    Ok(())
                }),
            )
            .await?
            .ok_or_else(|| LumeError::NotFound(format!("user {}", user_id)))?;

        tracing::info!("Updated preferences for {}", user_id);
        Ok(updated)
    }
}

impl ProfileService {
    /// Billing hook: record the user's subscription state
    ///
    /// Not reachable from the public API.
    pub async fn set_premium(&self, user_id: &str, is_premium: bool) -> Result<UserProfile> {
        let updated = self
            .profiles
            .update_profile(
                user_id,
                Box::new(move |profile: &mut UserProfile| {
                    profile.is_premium = is_premium;
                    Ok(())
                }),
            )
            .await?
            .ok_or_else(|| LumeError::NotFound(format!("user {}", user_id)))?;

        tracing::info!("Premium for {} set to {}", user_id, is_premium);
        Ok(updated)
    }
}

fn parse_field<T>(raw: &str) -> Result<T>
where
    T: FromStr<Err = String>,
{
    raw.parse::<T>().map_err(LumeError::Validation)
}
