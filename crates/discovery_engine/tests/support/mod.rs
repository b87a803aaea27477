#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use discovery_engine::{ContentSource, SourceError};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub fn feed_html(ids: &[u32]) -> String {
    let links: String = ids
        .iter()
        .map(|id| format!(r#"<a href="/@creator/video/{id}">clip {id}</a>"#))
        .collect();
    format!("<html><body>{links}</body></html>")
}

#[derive(Debug, Default)]
pub struct Counters {
    pub navigations: AtomicUsize,
    pub reveals: AtomicUsize,
    pub settles: AtomicUsize,
    pub releases: AtomicUsize,
}

impl Counters {
    pub fn reveals(&self) -> usize {
        self.reveals.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

/// Plays back one snapshot per reveal, repeating the last one once the script runs out.
pub struct ScriptedSource {
    snapshots: Vec<String>,
    position: usize,
    fail_on_reveal: Option<usize>,
    before_reveal: Option<Box<dyn FnMut() + Send>>,
    alive: bool,
    pub locations: Vec<String>,
    pub counters: Arc<Counters>,
}

impl ScriptedSource {
    pub fn new(snapshots: Vec<String>) -> Self {
        Self {
            snapshots,
            position: 0,
            fail_on_reveal: None,
            before_reveal: None,
            alive: true,
            locations: Vec::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn from_ids(pages: &[&[u32]]) -> Self {
        Self::new(pages.iter().map(|ids| feed_html(ids)).collect())
    }

    /// The n-th reveal (1-based) fails and leaves the source dead.
    pub fn failing_on_reveal(mut self, n: usize) -> Self {
        self.fail_on_reveal = Some(n);
        self
    }

    /// Runs `hook` at the start of every reveal.
    pub fn before_reveal(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.before_reveal = Some(Box::new(hook));
        self
    }
}

impl ContentSource for ScriptedSource {
    fn navigate(&mut self, location: &str) -> Result<(), SourceError> {
        self.counters.navigations.fetch_add(1, Ordering::SeqCst);
        self.locations.push(location.to_string());
        self.position = 0;
        Ok(())
    }

    fn reveal_more(&mut self) -> Result<(), SourceError> {
        if let Some(hook) = self.before_reveal.as_mut() {
            hook();
        }
        let count = self.counters.reveals.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_reveal == Some(count) {
            self.alive = false;
            return Err(SourceError::unavailable("scripted failure"));
        }
        if self.position + 1 < self.snapshots.len() {
            self.position += 1;
        }
        Ok(())
    }

    fn current_snapshot(&mut self) -> Result<String, SourceError> {
        Ok(self.snapshots.get(self.position).cloned().unwrap_or_default())
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn settle(&mut self, _delay: Duration) {
        self.counters.settles.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&mut self) {
        self.counters.releases.fetch_add(1, Ordering::SeqCst);
    }
}
