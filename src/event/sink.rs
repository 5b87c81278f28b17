//! Event sinks: where fired bindings send their records.

use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use super::record::EventRecord;

/// Receives normalized event records. Delivery is fire-and-forget.
pub trait EventSink: Send + Sync {
    fn send(&self, record: EventRecord);
}

impl EventSink for UnboundedSender<EventRecord> {
    fn send(&self, record: EventRecord) {
        if let Err(err) = UnboundedSender::send(self, record) {
            warn!(kind = %err.0.kind, "event record dropped: receiver closed");
        }
    }
}

/// A sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn send(&self, _record: EventRecord) {}
}
