//! Discovery core: pure extraction, identity resolution and the pagination state machine.
mod config;
mod effect;
mod extract;
mod item;
mod msg;
mod query;
mod resolve;
mod state;
mod update;
mod view_model;

pub use config::{ConfigError, DiscoveryConfig, FeedEndpoints, LinkShapes};
pub use effect::Effect;
pub use extract::{CandidateRule, Extractor};
pub use item::{Item, OWNER_SHORT_URL, OWNER_UNKNOWN};
pub use msg::Msg;
pub use query::{DiscoveryQuery, QueryError};
pub use resolve::{CandidateScanner, ResolvedCandidate, Resolver};
pub use state::{DiscoverySession, KnownIdentities, SessionState};
pub use update::update;
pub use view_model::SessionView;
