use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Relationship goal a user is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookingFor {
    Relationship,
    Casual,
    Friendship,
}

impl LookingFor {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookingFor::Relationship => "relationship",
            LookingFor::Casual => "casual",
            LookingFor::Friendship => "friendship",
        }
    }
}

impl FromStr for LookingFor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relationship" => Ok(LookingFor::Relationship),
            "casual" => Ok(LookingFor::Casual),
            "friendship" => Ok(LookingFor::Friendship),
            other => Err(format!("unknown relationship goal '{}'", other)),
        }
    }
}

/// How soon a user wants to move from match to an in-person meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetReadiness {
    #[serde(rename = "within_48h")]
    Within48h,
    ThisWeekend,
    AfterCoffeeChat,
    Flexible,
}

impl MeetReadiness {
    pub const ALL: [MeetReadiness; 4] = [
        MeetReadiness::Within48h,
        MeetReadiness::ThisWeekend,
        MeetReadiness::AfterCoffeeChat,
        MeetReadiness::Flexible,
    ];

    /// Urgency rank, higher is more urgent
    pub fn urgency(&self) -> u8 {
        match self {
            MeetReadiness::Within48h => 4,
            MeetReadiness::ThisWeekend => 3,
            MeetReadiness::AfterCoffeeChat => 2,
            MeetReadiness::Flexible => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MeetReadiness::Within48h => "within_48h",
            MeetReadiness::ThisWeekend => "this_weekend",
            MeetReadiness::AfterCoffeeChat => "after_coffee_chat",
            MeetReadiness::Flexible => "flexible",
        }
    }

    /// Human-readable label used in alignment reasons
    pub fn label(&self) -> &'static str {
        match self {
            MeetReadiness::Within48h => "meeting within 48 hours",
            MeetReadiness::ThisWeekend => "meeting this weekend",
            MeetReadiness::AfterCoffeeChat => "a coffee chat first",
            MeetReadiness::Flexible => "a flexible timeline",
        }
    }
}

impl FromStr for MeetReadiness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "within_48h" => Ok(MeetReadiness::Within48h),
            "this_weekend" => Ok(MeetReadiness::ThisWeekend),
            "after_coffee_chat" => Ok(MeetReadiness::AfterCoffeeChat),
            "flexible" => Ok(MeetReadiness::Flexible),
            other => Err(format!("unknown meet readiness '{}'", other)),
        }
    }
}

impl Default for MeetReadiness {
    fn default() -> Self {
        MeetReadiness::Flexible
    }
}

/// Meetup preference attached to a swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetupPreference {
    Coffee,
    Drinks,
    Dinner,
    Activity,
    VideoCall,
}

impl MeetupPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetupPreference::Coffee => "coffee",
            MeetupPreference::Drinks => "drinks",
            MeetupPreference::Dinner => "dinner",
            MeetupPreference::Activity => "activity",
            MeetupPreference::VideoCall => "video_call",
        }
    }
}

impl FromStr for MeetupPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coffee" => Ok(MeetupPreference::Coffee),
            "drinks" => Ok(MeetupPreference::Drinks),
            "dinner" => Ok(MeetupPreference::Dinner),
            "activity" => Ok(MeetupPreference::Activity),
            "video_call" => Ok(MeetupPreference::VideoCall),
            other => Err(format!("unknown meetup preference '{}'", other)),
        }
    }
}

/// Matching-relevant state of one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub age: u8,
    pub gender: String,
    #[serde(default)]
    pub sexual_orientation: Option<String>,
    #[serde(default)]
    pub interested_in_genders: BTreeSet<String>,
    #[serde(default)]
    pub location: Option<Coordinate>,
    pub age_range_min: u8,
    pub age_range_max: u8,
    /// Maximum distance in kilometers
    pub max_distance: u16,
    #[serde(default)]
    pub deal_breakers: BTreeSet<String>,
    pub looking_for: LookingFor,
    #[serde(default)]
    pub lifestyle: BTreeSet<String>,
    #[serde(default)]
    pub values: BTreeSet<String>,
    #[serde(default)]
    pub meet_readiness: MeetReadiness,
    #[serde(default)]
    pub interests: BTreeSet<String>,
    #[serde(default)]
    pub is_premium: bool,
    /// Swipes spent in the current quota window
    #[serde(default)]
    pub daily_swipes_used: u32,
    /// Start of the current sliding quota window
    pub quota_window_start: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Whether `age` falls within this user's preferred range
    pub fn accepts_age(&self, age: u8) -> bool {
        age >= self.age_range_min && age <= self.age_range_max
    }

    /// Whether this user is open to being shown to someone of `gender`
    pub fn interested_in(&self, gender: &str) -> bool {
        self.interested_in_genders.contains(gender)
    }
}

/// Immutable record of one swipe decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swipe {
    pub swiper_id: String,
    pub swiped_id: String,
    pub is_like: bool,
    pub is_super_like: bool,
    #[serde(default)]
    pub meetup_preference: Option<MeetupPreference>,
    pub created_at: DateTime<Utc>,
}

/// Derived lifecycle state of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Active,
    Frozen,
    Expired,
    MeetupConfirmed,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::Active => "active",
            MatchStatus::Frozen => "frozen",
            MatchStatus::Expired => "expired",
            MatchStatus::MeetupConfirmed => "meetup_confirmed",
        };
        f.write_str(s)
    }
}

/// Mutual-like pairing with a time-bounded window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub user1_id: String,
    pub user2_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_extended: bool,
    pub is_frozen: bool,
    /// When the current freeze began
    #[serde(default)]
    pub frozen_at: Option<DateTime<Utc>>,
    pub meetup_confirmed: bool,
    #[serde(default)]
    pub meetup_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub meetup_location: Option<String>,
    pub has_met_in_person: bool,
}

impl Match {
    /// Build a fresh match; participants are stored in lexical order
    pub fn new(user_a: &str, user_b: &str, now: DateTime<Utc>, ttl: Duration) -> Self {
        let (user1_id, user2_id) = ordered_pair(user_a, user_b);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user1_id,
            user2_id,
            created_at: now,
            expires_at: now + ttl,
            is_extended: false,
            is_frozen: false,
            frozen_at: None,
            meetup_confirmed: false,
            meetup_time: None,
            meetup_location: None,
            has_met_in_person: false,
        }
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }

    pub fn other_participant(&self, user_id: &str) -> Option<&str> {
        if self.user1_id == user_id {
            Some(&self.user2_id)
        } else if self.user2_id == user_id {
            Some(&self.user1_id)
        } else {
            None
        }
    }

    /// Expired means the window lapsed while not frozen
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        !self.is_frozen && now >= self.expires_at
    }

    /// Still in the "deciding" pool: frozen or unexpired, and no meetup confirmed yet
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        (self.is_frozen || self.expires_at > now) && !self.meetup_confirmed
    }

    pub fn status(&self, now: DateTime<Utc>) -> MatchStatus {
        if self.meetup_confirmed {
            MatchStatus::MeetupConfirmed
        } else if self.is_frozen {
            MatchStatus::Frozen
        } else if self.is_expired(now) {
            MatchStatus::Expired
        } else {
            MatchStatus::Active
        }
    }
}

/// Canonical storage order for an unordered user pair
pub fn ordered_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Candidate annotated with compatibility, distance and timeline alignment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResult {
    pub profile: UserProfile,
    /// Display score clamped to 0..=100
    pub compatibility_score: u8,
    /// Unclamped sum used for ordering
    #[serde(skip)]
    pub raw_score: i32,
    /// False when a hard rule (age, distance, deal-breaker) rejected the pairing
    #[serde(skip)]
    pub viable: bool,
    pub compatibility_reasons: Vec<String>,
    /// Kilometers, or the unknown-distance sentinel
    pub distance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_alignment: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_reason: Option<String>,
}

impl CompatibilityResult {
    /// Whether the pairing survived every hard rule
    pub fn is_viable(&self) -> bool {
        self.viable
    }
}

/// Point weights for compatibility scoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub age_fit: i32,
    pub distance_cap: i32,
    pub goals_exact: i32,
    pub goals_cross: i32,
    pub interest_points: i32,
    pub interest_cap: i32,
    pub lifestyle_points: i32,
    pub lifestyle_cap: i32,
    pub values_points: i32,
    pub values_cap: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            age_fit: 25,
            distance_cap: 20,
            goals_exact: 15,
            goals_cross: 8,
            interest_points: 4,
            interest_cap: 20,
            lifestyle_points: 5,
            lifestyle_cap: 15,
            values_points: 5,
            values_cap: 15,
        }
    }
}

/// Event emitted to the notification collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCreatedEvent {
    pub match_id: String,
    pub user1_id: String,
    pub user2_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Match> for MatchCreatedEvent {
    fn from(m: &Match) -> Self {
        Self {
            match_id: m.id.clone(),
            user1_id: m.user1_id.clone(),
            user2_id: m.user2_id.clone(),
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_match(now: DateTime<Utc>) -> Match {
        Match::new("bob", "alice", now, Duration::hours(72))
    }

    #[test]
    fn test_match_orders_participants() {
        let m = fresh_match(Utc::now());
        assert_eq!(m.user1_id, "alice");
        assert_eq!(m.user2_id, "bob");
        assert_eq!(m.other_participant("alice"), Some("bob"));
        assert_eq!(m.other_participant("carol"), None);
    }

    #[test]
    fn test_frozen_match_never_expires() {
        let now = Utc::now();
        let mut m = fresh_match(now);
        m.is_frozen = true;

        let far_future = now + Duration::days(365);
        assert!(m.is_active(far_future));
        assert!(!m.is_expired(far_future));
        assert_eq!(m.status(far_future), MatchStatus::Frozen);
    }

    #[test]
    fn test_confirmed_meetup_leaves_active_pool() {
        let now = Utc::now();
        let mut m = fresh_match(now);
        m.meetup_confirmed = true;
        assert!(!m.is_active(now));
        assert_eq!(m.status(now), MatchStatus::MeetupConfirmed);
    }

    #[test]
    fn test_readiness_parse() {
        for readiness in MeetReadiness::ALL {
            assert_eq!(readiness.as_str().parse::<MeetReadiness>(), Ok(readiness));
        }
        assert!("tomorrow".parse::<MeetReadiness>().is_err());
    }
}
