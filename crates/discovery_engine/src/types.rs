use std::fmt;

use discovery_core::{Item, SessionState};

pub type JobId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// The source is closed or stopped responding.
    Unavailable,
    InvalidLocation,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Decode,
    Network,
}

impl fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceErrorKind::Unavailable => write!(f, "content source unavailable"),
            SourceErrorKind::InvalidLocation => write!(f, "invalid location"),
            SourceErrorKind::HttpStatus(code) => write!(f, "http status {code}"),
            SourceErrorKind::Timeout => write!(f, "timeout"),
            SourceErrorKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            SourceErrorKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            SourceErrorKind::Decode => write!(f, "decode error"),
            SourceErrorKind::Network => write!(f, "network error"),
        }
    }
}

/// Any failure of the content source. Always surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SourceError {
    pub kind: SourceErrorKind,
    pub message: String,
}

impl SourceError {
    pub fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOutcome {
    pub items: Vec<Item>,
    pub final_state: SessionState,
    pub iterations: u32,
}

/// A session that ended on a content-source error. `partial` holds every item
/// accumulated before the failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "discovery failed after {iterations} iterations with {} partial items: {error}",
    .partial.len()
)]
pub struct DiscoveryFailure {
    #[source]
    pub error: SourceError,
    pub partial: Vec<Item>,
    pub iterations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeSummary {
    pub written: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub job_id: JobId,
    pub iteration: u32,
    pub accumulated: usize,
    pub new_items: usize,
    pub stall_counter: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub final_state: SessionState,
    pub discovered: usize,
    pub merge: MergeSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFailureKind {
    Config,
    ContentSource,
    Persistence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub kind: JobFailureKind,
    pub message: String,
    /// Set when partial items of a failed discovery were still merged.
    pub partial_merge: Option<MergeSummary>,
    /// Set when those partial items could not be stored.
    pub partial_merge_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
    SessionStarted {
        job_id: JobId,
        query: String,
    },
    Progress(SessionProgress),
    Completed {
        job_id: JobId,
        result: Result<JobOutcome, JobFailure>,
    },
}
