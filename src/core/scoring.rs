use std::collections::BTreeSet;

use crate::core::distance::distance_between;
use crate::models::{CompatibilityResult, LookingFor, ScoringWeights, UserProfile};

/// Upper bound of the displayed score
pub const MAX_DISPLAY_SCORE: i32 = 100;

pub const REASON_AGE_MISMATCH: &str = "Age preferences don't match";
pub const REASON_TOO_FAR: &str = "Too far away";
pub const REASON_DEAL_BREAKER: &str = "Deal breaker present";

/// Score how well `b` fits `a`, returning `b` annotated
///
/// Rules are evaluated in a fixed order and each contributing rule appends one
/// reason, so the reason list doubles as an explanation for the UI:
///
/// 1. age fit (mutual, hard)
/// 2. distance (hard cut at the smaller max distance, then a proximity bonus)
/// 3. deal-breakers (symmetric, hard)
/// 4. relationship goals
/// 5. shared interests
/// 6. shared lifestyle
/// 7. shared values
///
/// A hard failure returns a non-viable result with score 0 and a single reason.
pub fn calculate_compatibility(
    a: &UserProfile,
    b: &UserProfile,
    weights: &ScoringWeights,
) -> CompatibilityResult {
    score_candidate(a, b.clone(), weights)
}

/// Same as [`calculate_compatibility`] but takes the candidate by value
pub fn score_candidate(
    a: &UserProfile,
    b: UserProfile,
    weights: &ScoringWeights,
) -> CompatibilityResult {
    let distance = distance_between(a.location.as_ref(), b.location.as_ref());

    let mut raw_score = 0;
    let mut reasons = Vec::new();

    // Rule 1: age fit
    if !(a.accepts_age(b.age) && b.accepts_age(a.age)) {
        return non_viable(b, distance, REASON_AGE_MISMATCH);
    }
    raw_score += weights.age_fit;
    reasons.push("Ages fit both preferences".to_string());

    // Rule 2: distance
    let limit = a.max_distance.min(b.max_distance) as f64;
    if distance > limit {
        return non_viable(b, distance, REASON_TOO_FAR);
    }
    let proximity = distance_bonus(distance, weights.distance_cap);
    if proximity > 0 {
        raw_score += proximity;
        reasons.push(format!("{:.1} km away", distance));
    }

    // Rule 3: deal-breakers
    if has_deal_breaker(a, &b) || has_deal_breaker(&b, a) {
        return non_viable(b, distance, REASON_DEAL_BREAKER);
    }

    // Rule 4: relationship goals
    let goals = goal_points(a.looking_for, b.looking_for, weights);
    if goals > 0 {
        raw_score += goals;
        if a.looking_for == b.looking_for {
            reasons.push(format!("Both looking for {}", a.looking_for.as_str()));
        } else {
            reasons.push("Compatible relationship goals".to_string());
        }
    }

    // Rules 5-7: shared tokens
    let sections = [
        ("interest", &a.interests, &b.interests, weights.interest_points, weights.interest_cap),
        ("lifestyle", &a.lifestyle, &b.lifestyle, weights.lifestyle_points, weights.lifestyle_cap),
        ("value", &a.values, &b.values, weights.values_points, weights.values_cap),
    ];
    for (label, mine, theirs, per_item, cap) in sections {
        let shared = shared_tokens(mine, theirs);
        if shared.is_empty() {
            continue;
        }
        raw_score += (shared.len() as i32 * per_item).min(cap);
        reasons.push(shared_reason(label, &shared));
    }

    CompatibilityResult {
        profile: b,
        compatibility_score: clamp_display(raw_score),
        raw_score,
        viable: true,
        compatibility_reasons: reasons,
        distance,
        timeline_alignment: None,
        timeline_reason: None,
    }
}

/// Proximity bonus, linear from `cap` at 0 km down to 0 at `cap` km
#[inline]
fn distance_bonus(distance_km: f64, cap: i32) -> i32 {
    let bonus = (cap as f64 - distance_km).max(0.0).round() as i32;
    bonus.min(cap)
}

/// Whether any of `holder`'s deal-breakers shows up in `other`'s traits
fn has_deal_breaker(holder: &UserProfile, other: &UserProfile) -> bool {
    holder.deal_breakers.iter().any(|trait_token| {
        other.lifestyle.contains(trait_token)
            || other.values.contains(trait_token)
            || other.interests.contains(trait_token)
    })
}

#[inline]
fn goal_points(a: LookingFor, b: LookingFor, weights: &ScoringWeights) -> i32 {
    use LookingFor::*;
    match (a, b) {
        _ if a == b => weights.goals_exact,
        (Casual, Friendship) | (Friendship, Casual) => weights.goals_cross,
        _ => 0,
    }
}

fn shared_tokens<'a>(a: &'a BTreeSet<String>, b: &'a BTreeSet<String>) -> Vec<&'a str> {
    a.intersection(b).map(String::as_str).collect()
}

fn shared_reason(label: &str, shared: &[&str]) -> String {
    let plural = if shared.len() == 1 { "" } else { "s" };
    format!("{} shared {}{}: {}", shared.len(), label, plural, shared.join(", "))
}

#[inline]
fn clamp_display(raw_score: i32) -> u8 {
    raw_score.clamp(0, MAX_DISPLAY_SCORE) as u8
}

fn non_viable(b: UserProfile, distance: f64, reason: &str) -> CompatibilityResult {
    CompatibilityResult {
        profile: b,
        compatibility_score: 0,
        raw_score: 0,
        viable: false,
        compatibility_reasons: vec![reason.to_string()],
        distance,
        timeline_alignment: None,
        timeline_reason: None,
    }
}
