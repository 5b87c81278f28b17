//! Event binding manager: scoped delegated listeners and normalized records.

pub mod binding;
pub mod record;
pub mod sink;

pub use binding::{delegate, AppEventRegistry, EventBindings, ViewScope};
pub use record::{EventMeta, EventPayload, EventRecord, TargetInfo};
pub use sink::{EventSink, NullSink};
