use std::ops::{Deref, DerefMut};
use std::thread;
use std::time::Duration;

use engine_logging::engine_debug;

use crate::SourceError;

/// Something that renders a progressively revealed feed.
///
/// A session has exclusive use of its source for its whole lifetime.
pub trait ContentSource {
    fn navigate(&mut self, location: &str) -> Result<(), SourceError>;

    /// Trigger the scroll / "load more" action.
    fn reveal_more(&mut self) -> Result<(), SourceError>;

    fn current_snapshot(&mut self) -> Result<String, SourceError>;

    fn is_alive(&self) -> bool;

    /// Wait for revealed content to take effect.
    fn settle(&mut self, delay: Duration) {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    /// Release held resources. Must be idempotent.
    fn release(&mut self) {}
}

/// Releases the wrapped source when dropped, on every exit path.
pub struct SourceGuard<'a, S: ContentSource + ?Sized> {
    source: &'a mut S,
}

impl<'a, S: ContentSource + ?Sized> SourceGuard<'a, S> {
    pub fn new(source: &'a mut S) -> Self {
        Self { source }
    }
}

impl<S: ContentSource + ?Sized> Deref for SourceGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.source
    }
}

impl<S: ContentSource + ?Sized> DerefMut for SourceGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.source
    }
}

impl<S: ContentSource + ?Sized> Drop for SourceGuard<'_, S> {
    fn drop(&mut self) {
        engine_debug!("releasing content source");
        self.source.release();
    }
}
