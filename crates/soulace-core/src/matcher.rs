//! Candidate selection for mood matching and nearest-age listener matching.
//!
//! Both matchers are single-pass scans over a candidate list that storage has
//! already narrowed down. The first candidate wins ties, so result order is
//! whatever order the caller supplies.

use crate::mood::{MoodGroup, MoodPreference, MoodSet};

const SAME_GROUP_BONUS: u32 = 5;
const EXACT_SET_BONUS: u32 = 3;
const OPPOSITE_GROUP_BONUS: u32 = 10;

/// Anything that carries a mood set can be mood-matched.
pub trait MoodCandidate {
    fn moods(&self) -> &MoodSet;
}

/// Anything with an (optional) age can be age-matched.
pub trait AgeCandidate {
    fn age(&self) -> Option<u32>;
}

/// Winning candidate plus the score that selected it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodMatch<'a, T> {
    pub candidate: &'a T,
    pub score: u32,
}

/// Score a single candidate against the requester.
#[allow(clippy::cast_possible_truncation)]
pub fn mood_score(requester: &MoodSet, preference: MoodPreference, candidate: &MoodSet) -> u32 {
    let requester_group = requester.group();
    let candidate_group = candidate.group();
    match preference {
        MoodPreference::Similar => {
            let overlap = requester.overlap(candidate);
            let mut score = overlap as u32;
            if requester_group == candidate_group {
                score += SAME_GROUP_BONUS;
            }
            if requester.len() == candidate.len() && overlap == requester.len() {
                score += EXACT_SET_BONUS;
            }
            score
        }
        MoodPreference::Different => {
            let mut score = requester.difference_count(candidate) as u32;
            if requester_group.is_opposite_of(candidate_group) {
                score += OPPOSITE_GROUP_BONUS;
            }
            score
        }
    }
}

/// Pick the highest-scoring candidate in the requester's target groups.
///
/// Returns `None` when no candidate is eligible or every eligible candidate
/// scores zero.
pub fn best_mood_match<'a, T: MoodCandidate>(
    requester: &MoodSet,
    preference: MoodPreference,
    candidates: &'a [T],
) -> Option<MoodMatch<'a, T>> {
    let targets: Vec<MoodGroup> = requester.group().targets(preference);
    let mut best: Option<MoodMatch<'a, T>> = None;

    for candidate in candidates {
        if !targets.contains(&candidate.moods().group()) {
            continue;
        }
        let score = mood_score(requester, preference, candidate.moods());
        if score == 0 {
            continue;
        }
        if best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(MoodMatch { candidate, score });
        }
    }

    best
}

/// Pick the candidate whose age is closest to `target_age`.
pub fn nearest_age<T: AgeCandidate>(target_age: u32, candidates: &[T]) -> Option<&T> {
    let mut best: Option<(&T, u32)> = None;

    for candidate in candidates {
        let Some(age) = candidate.age() else {
            continue;
        };
        let diff = age.abs_diff(target_age);
        if best.is_none_or(|(_, d)| diff < d) {
            best = Some((candidate, diff));
        }
    }

    best.map(|(candidate, _)| candidate)
}
