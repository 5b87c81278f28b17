//! Command dispatch: applying `RenderApp` and `RenderView` to the document.

pub mod command;
pub mod dispatcher;

pub use command::{AppRender, Command, Tree, ViewRender};
pub use dispatcher::{Dispatcher, RenderState};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, warn};

use crate::markup::MarkupError;

/// Errors from decoding or executing a command.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("malformed markup in {scope}: {source}")]
    MalformedMarkup {
        scope: String,
        #[source]
        source: MarkupError,
    },
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("{command} command without `{field}`")]
    MissingPayload {
        command: &'static str,
        field: &'static str,
    },
    #[error("command decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A `RenderView` arrived for an application that is not the active one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("view {view_id} of app {app_id} ignored (active: {active:?})")]
pub struct ViewNotActive {
    pub view_id: String,
    pub app_id: String,
    pub active: Option<String>,
}

/// Outcome of a command that decoded and parsed cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Rendered,
    Ignored(ViewNotActive),
}

/// Where views send their render commands.
pub trait CommandSink: Send + Sync {
    fn submit(&self, command: Command);
}

impl CommandSink for Dispatcher {
    fn submit(&self, command: Command) {
        let name = command.name();
        if let Err(err) = self.dispatch(command) {
            error!(command = name, %err, "command failed");
        }
    }
}

impl CommandSink for UnboundedSender<Command> {
    fn submit(&self, command: Command) {
        if let Err(err) = self.send(command) {
            warn!(command = err.0.name(), "command dropped: receiver closed");
        }
    }
}
