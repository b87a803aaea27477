use std::sync::mpsc;

use crate::DiscoveryEvent;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: DiscoveryEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<DiscoveryEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<DiscoveryEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: DiscoveryEvent) {
        // The receiver may have gone away; progress is best effort.
        let _ = self.tx.send(event);
    }
}

/// Discards every event.
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: DiscoveryEvent) {}
}
