use std::collections::HashSet;

use crate::models::UserProfile;

/// Mutual gender compatibility
///
/// Each side must be interested in the other's gender. Symmetric by construction.
#[inline]
pub fn genders_compatible(a: &UserProfile, b: &UserProfile) -> bool {
    a.interested_in(&b.gender) && b.interested_in(&a.gender)
}

/// Hard pass/fail eligibility of `candidate` for `requester`
///
/// `exclude_ids` holds already-swiped ids and ghost/block relations from
/// the safety collaborator.
#[inline]
pub fn is_eligible(
    requester: &UserProfile,
    candidate: &UserProfile,
    exclude_ids: &HashSet<String>,
) -> bool {
    if candidate.id == requester.id {
        return false;
    }

    if exclude_ids.contains(&candidate.id) {
        return false;
    }

    genders_compatible(requester, candidate)
}

/// Keep only the candidates that pass every hard constraint
pub fn filter_eligible(
    requester: &UserProfile,
    candidates: Vec<UserProfile>,
    exclude_ids: &HashSet<String>,
) -> Vec<UserProfile> {
    candidates
        .into_iter()
        .filter(|candidate| is_eligible(requester, candidate, exclude_ids))
        .collect()
}
