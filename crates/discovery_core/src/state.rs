use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::view_model::SessionView;
use crate::{DiscoveryConfig, Item, ResolvedCandidate};

/// Identities already recorded in a persisted store.
pub type KnownIdentities = HashSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    #[default]
    Running,
    /// The target count was reached.
    Satisfied,
    /// Too many consecutive reveals produced nothing new.
    Stalled,
    /// The iteration ceiling was hit.
    Exhausted,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionState::Running)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Running => "RUNNING",
            SessionState::Satisfied => "SATISFIED",
            SessionState::Stalled => "STALLED",
            SessionState::Exhausted => "EXHAUSTED",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SessionLimits {
    min_count: Option<usize>,
    max_count: Option<usize>,
    stall_limit: u32,
    iteration_ceiling: u32,
}

/// One discovery run for one query. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySession<'k> {
    query: String,
    limits: SessionLimits,
    known: &'k KnownIdentities,
    seen: HashSet<String>,
    accumulated: Vec<Item>,
    last_new_items: usize,
    stall_counter: u32,
    iteration: u32,
    state: SessionState,
}

impl<'k> DiscoverySession<'k> {
    pub fn new(
        query: impl Into<String>,
        config: &DiscoveryConfig,
        known: &'k KnownIdentities,
    ) -> Self {
        Self {
            query: query.into(),
            limits: SessionLimits {
                min_count: config.min_count,
                max_count: config.max_count,
                stall_limit: config.stall_limit.max(1),
                iteration_ceiling: config.iteration_ceiling.max(1),
            },
            known,
            seen: HashSet::new(),
            accumulated: Vec::new(),
            last_new_items: 0,
            stall_counter: 0,
            iteration: 0,
            state: SessionState::Running,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn items(&self) -> &[Item] {
        &self.accumulated
    }

    pub fn into_items(self) -> Vec<Item> {
        self.accumulated
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn stall_counter(&self) -> u32 {
        self.stall_counter
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            query: self.query.clone(),
            state: self.state,
            iteration: self.iteration,
            accumulated: self.accumulated.len(),
            new_items: self.last_new_items,
            stall_counter: self.stall_counter,
        }
    }

    /// Keeps candidates unseen this session and unknown to the store.
    /// Returns how many were new.
    pub(crate) fn absorb(
        &mut self,
        candidates: Vec<ResolvedCandidate>,
        observed_at: DateTime<Utc>,
    ) -> usize {
        self.iteration += 1;
        let mut new_items = 0;
        for candidate in candidates {
            if self.known.contains(&candidate.identity) {
                continue;
            }
            if !self.seen.insert(candidate.identity.clone()) {
                continue;
            }
            self.accumulated.push(Item {
                source_url: candidate.url,
                owner: candidate.owner,
                identity: candidate.identity,
                discovery_query: self.query.clone(),
                discovered_at: observed_at,
            });
            new_items += 1;
        }
        self.last_new_items = new_items;
        new_items
    }

    /// Stop conditions in precedence order: max, min (with max), stall, ceiling.
    pub(crate) fn evaluate_stop(&mut self, new_items: usize) -> Option<SessionState> {
        let limits = self.limits;
        let count = self.accumulated.len();

        if let Some(max) = limits.max_count {
            if count >= max {
                self.accumulated.truncate(max);
                return Some(self.finish(SessionState::Satisfied));
            }
            if let Some(min) = limits.min_count {
                if count >= min {
                    return Some(self.finish(SessionState::Satisfied));
                }
            }
        }

        if new_items == 0 {
            self.stall_counter += 1;
            if self.stall_counter >= limits.stall_limit {
                return Some(self.finish(SessionState::Stalled));
            }
        } else {
            self.stall_counter = 0;
        }

        if self.iteration >= limits.iteration_ceiling {
            return Some(self.finish(SessionState::Exhausted));
        }
        None
    }

    fn finish(&mut self, state: SessionState) -> SessionState {
        self.state = state;
        state
    }
}
