//! Discovery engine: content sources, the discovery loop and the accumulation store.
mod accumulate;
mod decode;
mod discover;
mod engine;
mod fetch;
mod filename;
mod http_source;
mod lock;
mod persist;
mod progress;
mod source;
mod store;
mod types;

pub use accumulate::{accumulate, AccumulationStore};
pub use decode::decode_page;
pub use discover::{system_clock, Clock, Discoverer};
pub use engine::{DiscoveryHandle, DiscoveryJob, SourceFactory};
pub use fetch::{FetchSettings, FetchedPage, Fetcher, ReqwestFetcher};
pub use filename::store_filename;
pub use http_source::HttpFeedSource;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use progress::{ChannelProgressSink, NullProgressSink, ProgressSink};
pub use source::{ContentSource, SourceGuard};
pub use store::{CsvStore, PersistedStore, StoreStats};
pub use types::{
    DiscoveryEvent, DiscoveryFailure, DiscoveryOutcome, JobFailure, JobFailureKind, JobId,
    JobOutcome, MergeSummary, SessionProgress, SourceError, SourceErrorKind,
};
