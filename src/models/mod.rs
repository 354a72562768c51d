// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ordered_pair, CompatibilityResult, Coordinate, LookingFor, Match, MatchCreatedEvent,
    MatchStatus, MeetReadiness, MeetupPreference, ScoringWeights, Swipe, UserProfile,
};
pub use requests::{
    ConfirmMeetupRequest, CreateProfileRequest, DiscoverQuery, RecordSwipeRequest,
    UpdatePreferencesRequest,
};
pub use responses::{DiscoverResponse, HealthResponse, MatchView, SwipeResponse};
