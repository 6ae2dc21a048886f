//! Search result name matching.
//!
//! Scores candidate result names against the queried company name and
//! either auto-accepts the best match or signals that the operator has to
//! disambiguate. The matcher never prompts or blocks itself; ambiguity is
//! reported back to the caller.

use tracing::debug;

/// One entry in the search results listing: display name plus the page it
/// links to. Ephemeral; discarded once a match is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCandidate {
    pub name: String,
    pub url: String,
}

/// A candidate annotated with its similarity score, in results order.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: SearchCandidate,
    pub score: f64,
}

/// Outcome of resolving search results against a query.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    /// Top score met the threshold; accepted without interaction.
    Matched(ScoredCandidate),
    /// Results exist but none scored high enough to accept automatically.
    /// Candidates are returned in results order for the caller to present.
    Ambiguous(Vec<ScoredCandidate>),
    /// The listing was empty.
    NoResults,
}

/// Similarity ratio between two strings in [0, 1], case-insensitive.
///
/// Computed as 2*LCS(a, b) / (|a| + |b|) over characters: identical strings
/// score 1.0, disjoint strings score 0, and the measure is symmetric.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let lcs = longest_common_subsequence(&a, &b);
    2.0 * lcs as f64 / (a.len() + b.len()) as f64
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            curr[j] = if a[i - 1] == b[j - 1] {
                prev[j - 1] + 1
            } else {
                prev[j].max(curr[j - 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Resolve an ordered candidate list against the queried name.
///
/// The candidate with the strictly highest score wins; equal scores keep
/// the earlier candidate, so the caller's results-ranking order matters.
pub fn resolve(candidates: &[SearchCandidate], query: &str, threshold: f64) -> MatchOutcome {
    if candidates.is_empty() {
        return MatchOutcome::NoResults;
    }

    let scored: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|candidate| ScoredCandidate {
            candidate: candidate.clone(),
            score: similarity(query, &candidate.name),
        })
        .collect();

    let mut best = &scored[0];
    for entry in &scored[1..] {
        if entry.score > best.score {
            best = entry;
        }
    }

    debug!(
        "Best match for '{}': '{}' (score {:.2})",
        query, best.candidate.name, best.score
    );

    if best.score >= threshold {
        MatchOutcome::Matched(best.clone())
    } else {
        MatchOutcome::Ambiguous(scored)
    }
}
