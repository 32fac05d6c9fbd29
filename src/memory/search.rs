//! Ranking engine — blends raw similarity with temporal signals.
//!
//! Candidates arrive similarity-ordered from the vector index; each gets a
//! freshness score (exponential decay by age), a popularity score
//! (saturating in visit count), and a final linear blend. The sort is
//! stable, so candidates with equal final scores keep their similarity
//! order.

use chrono::{DateTime, Utc};

use crate::config::RankingConfig;
use crate::memory::types::{ChunkRecord, Hit};

/// Visit count at which popularity reaches ~63% of saturation.
const POPULARITY_SCALE: f64 = 3.0;

// ── Scoring primitives ────────────────────────────────────────────────────────

/// Age of `timestamp` in days, clamped to >= 0.
///
/// Fallback policy: a malformed or unparsable timestamp is treated as age 0
/// (maximally fresh) rather than failing the search.
pub(crate) fn age_days(timestamp: &str, now: DateTime<Utc>) -> f64 {
    let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) else {
        return 0.0;
    };
    let secs = (now - parsed.with_timezone(&Utc)).num_seconds() as f64;
    (secs / 86_400.0).max(0.0)
}

/// Exponential decay in `(0, 1]`: 1.0 at age 0, 0.5 at one half-life.
pub(crate) fn freshness(age_days: f64, half_life_days: f64) -> f64 {
    (-std::f64::consts::LN_2 * age_days / half_life_days).exp()
}

/// Saturating popularity in `[0, 1)`: 0 at zero visits, approaching 1 as
/// visits grow.
pub(crate) fn popularity(visits: u32) -> f64 {
    1.0 - (-f64::from(visits) / POPULARITY_SCALE).exp()
}

/// Final blended score for one candidate.
pub(crate) fn final_score(similarity: f64, record: &ChunkRecord, config: &RankingConfig, now: DateTime<Utc>) -> f64 {
    let fresh = freshness(age_days(&record.timestamp, now), config.half_life_days);
    let pop = popularity(record.visits);
    let hybrid = config.freshness_weight * fresh + config.popularity_weight * pop;
    config.similarity_weight * similarity + config.temporal_weight * hybrid
}

// ── Candidate ranking ─────────────────────────────────────────────────────────

/// Re-rank similarity-ordered candidates by blended score and truncate.
///
/// `candidates` are `(ledger row, raw similarity)` pairs in descending
/// similarity order; out-of-range rows are skipped. The sort is stable:
/// equal final scores keep the similarity order.
pub(crate) fn rank(
    candidates: &[(usize, f32)],
    ledger: &[ChunkRecord],
    config: &RankingConfig,
    now: DateTime<Utc>,
    top_k: usize,
) -> Vec<Hit> {
    let mut hits: Vec<Hit> = candidates
        .iter()
        .filter_map(|&(row, similarity)| {
            let record = ledger.get(row)?;
            Some(Hit {
                url: record.url.clone(),
                title: record.title.clone(),
                snippet: record.snippet.clone(),
                chunk_id: record.chunk_id.clone(),
                score: final_score(f64::from(similarity), record, config, now),
                timestamp: record.timestamp.clone(),
            })
        })
        .collect();

    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(top_k);
    hits
}
