//! Lume Match - discovery and match lifecycle service for the Lume dating app
//!
//! Ranks candidate profiles for a requester (eligibility, compatibility,
//! timeline alignment, daily quota), records swipes, and owns the
//! time-bounded match lifecycle that follows a mutual like.

pub mod clock;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use crate::core::{calculate_compatibility, haversine_distance, Matcher, QuotaPolicy, RankingOptions};
pub use error::{LumeError, Result};
pub use models::{CompatibilityResult, Match, ScoringWeights, Swipe, UserProfile};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let distance = haversine_distance(40.7128, -74.0060, 40.7128, -74.0060);
        assert!(distance < 0.001);
        assert_eq!(Matcher::default().page_size(), crate::core::DEFAULT_PAGE_SIZE);
    }
}
