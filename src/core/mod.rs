// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod quota;
pub mod scoring;
pub mod timeline;

pub use distance::{distance_between, haversine_distance, UNKNOWN_DISTANCE_KM};
pub use filters::{filter_eligible, genders_compatible, is_eligible};
pub use matcher::{MatchResult, Matcher, RankingOptions, DEFAULT_PAGE_SIZE};
pub use quota::QuotaPolicy;
pub use scoring::{calculate_compatibility, score_candidate};
pub use timeline::{align, TimelineAlignment};
