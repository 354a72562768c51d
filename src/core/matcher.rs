use std::cmp::Ordering;
use std::collections::HashSet;

use crate::core::{
    distance::distance_between,
    filters::filter_eligible,
    scoring::score_candidate,
    timeline::align,
};
use crate::models::{CompatibilityResult, MeetReadiness, ScoringWeights, UserProfile};

/// Default number of candidates returned per discovery call
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Per-request ranking switches
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingOptions {
    /// Score with the compatibility rules; otherwise rank by distance only
    pub use_compatibility: bool,
    /// Readiness the requester wants to match on (premium only)
    pub meet_readiness: Option<MeetReadiness>,
}

/// Result of the ranking pipeline
#[derive(Debug)]
pub struct MatchResult {
    pub candidates: Vec<CompatibilityResult>,
    pub total_candidates: usize,
    pub eligible_candidates: usize,
}

/// Ranking pipeline behind discovery
///
/// # Pipeline Stages
/// 1. Eligibility filter (self, exclusions, mutual gender interest)
/// 2. Compatibility scoring, or plain distance ranking in basic mode
/// 3. Timeline alignment annotation for premium requesters
/// 4. Sorting and page truncation
///
/// Pure and synchronous; the discovery service feeds it candidates.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    page_size: usize,
}

impl Matcher {
    pub fn new(weights: ScoringWeights, page_size: usize) -> Self {
        Self { weights, page_size }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default(), DEFAULT_PAGE_SIZE)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Rank `candidates` for `requester`
    ///
    /// Ordering:
    /// - compatibility mode: raw score desc, then timeline alignment desc, then distance asc
    /// - basic mode: distance asc, then timeline alignment desc
    ///
    /// Timeline alignment only participates when the requester is premium
    /// and supplied a readiness, and it never outranks the primary key.
    pub fn rank(
        &self,
        requester: &UserProfile,
        candidates: Vec<UserProfile>,
        exclude_ids: &HashSet<String>,
        options: RankingOptions,
    ) -> MatchResult {
        let total_candidates = candidates.len();

        let eligible = filter_eligible(requester, candidates, exclude_ids);
        let eligible_candidates = eligible.len();

        let mut results: Vec<CompatibilityResult> = if options.use_compatibility {
            eligible
                .into_iter()
                .map(|candidate| score_candidate(requester, candidate, &self.weights))
                .filter(CompatibilityResult::is_viable)
                .collect()
        } else {
            let max_distance = requester.max_distance as f64;
            eligible
                .into_iter()
                .filter_map(|candidate| {
                    let distance =
                        distance_between(requester.location.as_ref(), candidate.location.as_ref());
                    (distance <= max_distance).then(|| basic_result(candidate, distance))
                })
                .collect()
        };

        if let Some(readiness) = options.meet_readiness.filter(|_| requester.is_premium) {
            for result in results.iter_mut() {
                let alignment = align(readiness, result.profile.meet_readiness);
                result.timeline_alignment = Some(alignment.score);
                result.timeline_reason = Some(alignment.reason);
            }
        }

        if options.use_compatibility {
            results.sort_by(|a, b| {
                b.raw_score
                    .cmp(&a.raw_score)
                    .then_with(|| compare_timeline(a, b))
                    .then_with(|| compare_distance(a, b))
            });
        } else {
            results.sort_by(|a, b| compare_distance(a, b).then_with(|| compare_timeline(a, b)));
        }

        results.truncate(self.page_size);

        MatchResult {
            candidates: results,
            total_candidates,
            eligible_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

fn basic_result(profile: UserProfile, distance: f64) -> CompatibilityResult {
    CompatibilityResult {
        profile,
        compatibility_score: 0,
        raw_score: 0,
        viable: true,
        compatibility_reasons: Vec::new(),
        distance,
        timeline_alignment: None,
        timeline_reason: None,
    }
}

#[inline]
fn compare_distance(a: &CompatibilityResult, b: &CompatibilityResult) -> Ordering {
    a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal)
}

/// Higher alignment first; unannotated results compare equal
#[inline]
fn compare_timeline(a: &CompatibilityResult, b: &CompatibilityResult) -> Ordering {
    b.timeline_alignment.cmp(&a.timeline_alignment)
}
