use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use discovery_core::{DiscoveryConfig, DiscoveryQuery};
use engine_logging::{engine_error, engine_info, engine_warn};

use crate::{
    system_clock, AccumulationStore, ChannelProgressSink, Clock, ContentSource, CsvStore,
    Discoverer, DiscoveryEvent, JobFailure, JobFailureKind, JobId, JobOutcome, ProgressSink,
    SourceError,
};

/// Opens the content source a job will own. Runs on the job's thread.
pub type SourceFactory =
    Box<dyn FnOnce() -> Result<Box<dyn ContentSource + Send>, SourceError> + Send>;

pub struct DiscoveryJob {
    pub job_id: JobId,
    pub query: DiscoveryQuery,
    pub config: DiscoveryConfig,
    pub store_path: PathBuf,
    pub source: SourceFactory,
}

/// Runs each submitted job on its own thread and reports events over a channel.
pub struct DiscoveryHandle {
    event_tx: mpsc::Sender<DiscoveryEvent>,
    event_rx: mpsc::Receiver<DiscoveryEvent>,
    clock: Clock,
    workers: Vec<thread::JoinHandle<()>>,
}

impl DiscoveryHandle {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            event_tx,
            event_rx,
            clock: system_clock(),
            workers: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn submit(&mut self, job: DiscoveryJob) {
        let event_tx = self.event_tx.clone();
        let clock = self.clock.clone();
        let worker = thread::spawn(move || {
            let job_id = job.job_id;
            let sink = ChannelProgressSink::new(event_tx);
            let result = run_job(job, clock, &sink);
            sink.emit(DiscoveryEvent::Completed { job_id, result });
        });
        self.workers.push(worker);
    }

    pub fn try_recv(&self) -> Option<DiscoveryEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<DiscoveryEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Waits for every submitted job, then returns the events not yet received.
    pub fn join(self) -> Vec<DiscoveryEvent> {
        for worker in self.workers {
            if worker.join().is_err() {
                engine_warn!("discovery worker panicked");
            }
        }
        self.event_rx.try_iter().collect()
    }
}

impl Default for DiscoveryHandle {
    fn default() -> Self {
        Self::new()
    }
}

fn run_job(
    job: DiscoveryJob,
    clock: Clock,
    sink: &dyn ProgressSink,
) -> Result<JobOutcome, JobFailure> {
    let DiscoveryJob {
        job_id,
        query,
        config,
        store_path,
        source,
    } = job;

    let discoverer = Discoverer::new(config)
        .map_err(|err| failure(JobFailureKind::Config, err.to_string()))?
        .with_clock(clock);
    let mut accumulation = AccumulationStore::load(CsvStore::new(store_path))
        .map_err(|err| failure(JobFailureKind::Persistence, err.to_string()))?;
    let mut source =
        source().map_err(|err| failure(JobFailureKind::ContentSource, err.to_string()))?;

    let discovered = discoverer.discover_with_progress(
        source.as_mut(),
        &query,
        accumulation.known(),
        job_id,
        sink,
    );

    match discovered {
        Ok(outcome) => {
            let merge = accumulation
                .merge(&outcome.items)
                .map_err(|err| failure(JobFailureKind::Persistence, err.to_string()))?;
            engine_info!(
                "job {job_id} {} finished {}: {} written, {} duplicates",
                query.label(),
                outcome.final_state,
                merge.written,
                merge.duplicates
            );
            Ok(JobOutcome {
                final_state: outcome.final_state,
                discovered: outcome.items.len(),
                merge,
            })
        }
        Err(discovery_failure) => {
            let (partial_merge, partial_merge_error) =
                match accumulation.merge(&discovery_failure.partial) {
                    Ok(merge) => (Some(merge), None),
                    Err(err) => {
                        engine_error!("job {job_id} could not keep partial items: {err}");
                        (None, Some(err.to_string()))
                    }
                };
            Err(JobFailure {
                kind: JobFailureKind::ContentSource,
                message: discovery_failure.to_string(),
                partial_merge,
                partial_merge_error,
            })
        }
    }
}

fn failure(kind: JobFailureKind, message: String) -> JobFailure {
    JobFailure {
        kind,
        message,
        partial_merge: None,
        partial_merge_error: None,
    }
}
