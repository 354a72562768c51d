use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::{Validate, ValidationError};

use crate::models::domain::Coordinate;

/// Registration hand-off creating a profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_new_profile"))]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, max = 128))]
    pub id: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 18, max = 120))]
    pub age: u8,
    #[validate(length(min = 1))]
    pub gender: String,
    #[serde(default)]
    pub sexual_orientation: Option<String>,
    #[validate(length(min = 1))]
    pub interested_in_genders: BTreeSet<String>,
    #[serde(default)]
    pub location: Option<Coordinate>,
    #[validate(range(min = 18, max = 120))]
    pub age_range_min: u8,
    #[validate(range(min = 18, max = 120))]
    pub age_range_max: u8,
    #[validate(range(min = 1, max = 500))]
    pub max_distance: u16,
    #[serde(default)]
    pub deal_breakers: BTreeSet<String>,
    pub looking_for: String,
    #[serde(default)]
    pub lifestyle: BTreeSet<String>,
    #[serde(default)]
    pub values: BTreeSet<String>,
    #[serde(default)]
    pub meet_readiness: Option<String>,
    #[serde(default)]
    pub interests: BTreeSet<String>,
}

fn validate_new_profile(req: &CreateProfileRequest) -> Result<(), ValidationError> {
    check_age_range(Some(req.age_range_min), Some(req.age_range_max))?;
    check_location(req.location.as_ref())
}

/// Partial preference update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_preferences"))]
pub struct UpdatePreferencesRequest {
    #[serde(default)]
    pub interested_in_genders: Option<BTreeSet<String>>,
    #[serde(default)]
    pub sexual_orientation: Option<String>,
    #[serde(default)]
    pub location: Option<Coordinate>,
    #[serde(default)]
    #[validate(range(min = 18, max = 120))]
    pub age_range_min: Option<u8>,
    #[serde(default)]
    #[validate(range(min = 18, max = 120))]
    pub age_range_max: Option<u8>,
    #[serde(default)]
    #[validate(range(min = 1, max = 500))]
    pub max_distance: Option<u16>,
    #[serde(default)]
    pub deal_breakers: Option<BTreeSet<String>>,
    #[serde(default)]
    pub looking_for: Option<String>,
    #[serde(default)]
    pub lifestyle: Option<BTreeSet<String>>,
    #[serde(default)]
    pub values: Option<BTreeSet<String>>,
    #[serde(default)]
    pub meet_readiness: Option<String>,
    #[serde(default)]
    pub interests: Option<BTreeSet<String>>,
}

fn validate_preferences(req: &UpdatePreferencesRequest) -> Result<(), ValidationError> {
    if matches!(&req.interested_in_genders, Some(genders) if genders.is_empty()) {
        return Err(ValidationError::new("interested_in_genders_empty"));
    }
    check_age_range(req.age_range_min, req.age_range_max)?;
    check_location(req.location.as_ref())
}

fn check_age_range(min: Option<u8>, max: Option<u8>) -> Result<(), ValidationError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(ValidationError::new("age_range_inverted")),
        _ => Ok(()),
    }
}

fn check_location(location: Option<&Coordinate>) -> Result<(), ValidationError> {
    match location {
        Some(c) if !(-90.0..=90.0).contains(&c.latitude) || !(-180.0..=180.0).contains(&c.longitude) => {
            Err(ValidationError::new("coordinate_out_of_range"))
        }
        _ => Ok(()),
    }
}

/// Query string for the discovery endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverQuery {
    #[serde(default = "default_true")]
    pub use_compatibility: bool,
    #[serde(default)]
    pub meet_readiness: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Request to record a swipe
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordSwipeRequest {
    #[validate(length(min = 1))]
    pub swiped_id: String,
    pub is_like: bool,
    #[serde(default)]
    pub is_super_like: bool,
    #[serde(default)]
    pub meetup_preference: Option<String>,
}

/// Request to confirm an in-person meetup
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmMeetupRequest {
    pub time: DateTime<Utc>,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
}
