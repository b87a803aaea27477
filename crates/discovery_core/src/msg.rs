use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The content source produced a snapshot; candidates are already resolved.
    SnapshotObserved {
        candidates: Vec<crate::ResolvedCandidate>,
        observed_at: DateTime<Utc>,
    },
}
