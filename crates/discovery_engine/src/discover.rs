use std::sync::Arc;

use chrono::{DateTime, Utc};
use discovery_core::{
    update, CandidateScanner, ConfigError, DiscoveryConfig, DiscoveryQuery, DiscoverySession,
    Effect, KnownIdentities, Msg,
};
use engine_logging::{engine_error, engine_info};

use crate::{
    ContentSource, DiscoveryEvent, DiscoveryFailure, DiscoveryOutcome, JobId, NullProgressSink,
    ProgressSink, SessionProgress, SourceError, SourceErrorKind, SourceGuard,
};

/// Source of `discovered_at` timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Drives the pagination state machine against a content source.
pub struct Discoverer {
    config: DiscoveryConfig,
    scanner: CandidateScanner,
    clock: Clock,
}

impl Discoverer {
    pub fn new(config: DiscoveryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let scanner = CandidateScanner::new(&config.link_shapes)?;
        Ok(Self {
            config,
            scanner,
            clock: system_clock(),
        })
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn discover<S: ContentSource + ?Sized>(
        &self,
        source: &mut S,
        query: &DiscoveryQuery,
        known: &KnownIdentities,
    ) -> Result<DiscoveryOutcome, DiscoveryFailure> {
        self.discover_with_progress(source, query, known, 0, &NullProgressSink)
    }

    /// Runs one session to a terminal state. The source is released on return,
    /// whether the session finished or failed.
    pub fn discover_with_progress<S: ContentSource + ?Sized>(
        &self,
        source: &mut S,
        query: &DiscoveryQuery,
        known: &KnownIdentities,
        job_id: JobId,
        sink: &dyn ProgressSink,
    ) -> Result<DiscoveryOutcome, DiscoveryFailure> {
        let label = query.label();
        let mut source = SourceGuard::new(source);
        let mut session = DiscoverySession::new(label.clone(), &self.config, known);
        let settle = self.config.settle_delay();

        let location = match query.location(&self.config.endpoints) {
            Ok(location) => location,
            Err(err) => {
                let error = SourceError::new(SourceErrorKind::InvalidLocation, err.to_string());
                return Err(fail(session, error));
            }
        };

        engine_info!("query={label:?} starting at {location}");
        sink.emit(DiscoveryEvent::SessionStarted {
            job_id,
            query: label.clone(),
        });
        if let Err(error) = source.navigate(location.as_str()) {
            return Err(fail(session, error));
        }
        source.settle(settle);

        loop {
            if !source.is_alive() {
                let error = SourceError::unavailable("content source stopped responding");
                return Err(fail(session, error));
            }
            let snapshot = match source.current_snapshot() {
                Ok(snapshot) => snapshot,
                Err(error) => return Err(fail(session, error)),
            };
            let candidates = self.scanner.scan(&snapshot);
            let (next, effects) = update(
                session,
                Msg::SnapshotObserved {
                    candidates,
                    observed_at: (self.clock)(),
                },
            );
            session = next;
            let view = session.view();
            sink.emit(DiscoveryEvent::Progress(SessionProgress {
                job_id,
                iteration: view.iteration,
                accumulated: view.accumulated,
                new_items: view.new_items,
                stall_counter: view.stall_counter,
            }));

            for effect in effects {
                match effect {
                    Effect::RevealMore => {
                        if let Err(error) = source.reveal_more() {
                            return Err(fail(session, error));
                        }
                        source.settle(settle);
                    }
                    Effect::Finished { state } => {
                        let iterations = session.iteration();
                        return Ok(DiscoveryOutcome {
                            items: session.into_items(),
                            final_state: state,
                            iterations,
                        });
                    }
                }
            }
        }
    }
}

fn fail(session: DiscoverySession<'_>, error: SourceError) -> DiscoveryFailure {
    engine_error!(
        "query={:?} content source failed after {} iterations: {error}",
        session.query(),
        session.iteration()
    );
    let iterations = session.iteration();
    DiscoveryFailure {
        error,
        partial: session.into_items(),
        iterations,
    }
}
