use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Upper bound on stored versions per document.
pub const MAX_VERSIONS_PER_DOCUMENT: usize = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VersionKey {
    pub id: Uuid,
    pub seq: i64,
    pub created_at: DateTime<Utc>,
}

/// How many entries must go before one more version is admitted.
pub fn evictions_needed(count: usize, cap: usize) -> usize {
    (count + 1).saturating_sub(cap)
}

/// Picks the versions to evict so that one more fits under `cap`: oldest
/// by creation time first, lowest sequence number on ties. A log that is
/// already over the cap is trimmed back in one go.
pub fn select_evictions(keys: &[VersionKey], cap: usize) -> Vec<Uuid> {
    let needed = evictions_needed(keys.len(), cap);
    if needed == 0 {
        return Vec::new();
    }
    let mut ordered = keys.to_vec();
    ordered.sort_by_key(|key| (key.created_at, key.seq));
    ordered.into_iter().take(needed).map(|key| key.id).collect()
}

/// Next sequence number for a document: one past the highest stored number,
/// but never at or below one already handed out.
pub fn next_seq(max_existing: Option<i64>, last_assigned: i64) -> i64 {
    max_existing.unwrap_or(0).max(last_assigned) + 1
}

/// Creation time for a new entry. Taken once the document's log is locked,
/// and never earlier than the newest entry already in it, so creation order
/// matches sequence order.
pub fn next_created_at(
    latest: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    latest.map_or(now, |latest| latest.max(now))
}
