//! Commands from the platform bridge, and their JSON form.
//!
//! ```json
//! {"Command":"RenderView","View":{"ViewID":"v1","AppID":"app","Tree":{"Markup":"<div uid=\"v1\"></div>","Events":[]}}}
//! ```

use serde::{Deserialize, Serialize};

use super::DispatchError;
use crate::vdom::EventBinding;

/// Markup plus the event descriptors that belong to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    #[serde(rename = "Markup", default)]
    pub markup: String,
    #[serde(rename = "Events", default)]
    pub events: Vec<EventBinding>,
}

impl Tree {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            events: Vec::new(),
        }
    }

    pub fn with_event(mut self, binding: EventBinding) -> Self {
        self.events.push(binding);
        self
    }
}

/// One view's rendered output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRender {
    #[serde(rename = "ViewID")]
    pub view_id: String,
    #[serde(rename = "AppID", default)]
    pub app_id: String,
    #[serde(rename = "Tree", default)]
    pub tree: Tree,
}

impl ViewRender {
    pub fn new(view_id: impl Into<String>, app_id: impl Into<String>, tree: Tree) -> Self {
        Self {
            view_id: view_id.into(),
            app_id: app_id.into(),
            tree,
        }
    }
}

/// A full application render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRender {
    #[serde(rename = "AppID")]
    pub app_id: String,
    #[serde(rename = "HeadResources", default)]
    pub head_resources: Vec<Tree>,
    #[serde(rename = "Head", default)]
    pub head: Vec<ViewRender>,
    #[serde(rename = "Body", default)]
    pub body: Vec<ViewRender>,
    #[serde(rename = "BodyResources", default)]
    pub body_resources: Vec<Tree>,
}

impl AppRender {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            ..Self::default()
        }
    }

    pub fn with_head_resource(mut self, tree: Tree) -> Self {
        self.head_resources.push(tree);
        self
    }

    pub fn with_head_view(mut self, view: ViewRender) -> Self {
        self.head.push(view);
        self
    }

    pub fn with_body_view(mut self, view: ViewRender) -> Self {
        self.body.push(view);
        self
    }

    pub fn with_body_resource(mut self, tree: Tree) -> Self {
        self.body_resources.push(tree);
        self
    }
}

/// A render command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "Command")]
pub enum Command {
    RenderApp {
        #[serde(rename = "App")]
        app: AppRender,
    },
    RenderView {
        #[serde(rename = "View")]
        view: ViewRender,
    },
}

/// Wire shape before the command name is checked.
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "Command")]
    command: String,
    #[serde(rename = "App")]
    app: Option<AppRender>,
    #[serde(rename = "View")]
    view: Option<ViewRender>,
}

impl Command {
    pub fn render_app(app: AppRender) -> Self {
        Self::RenderApp { app }
    }

    pub fn render_view(view: ViewRender) -> Self {
        Self::RenderView { view }
    }

    /// The wire name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RenderApp { .. } => "RenderApp",
            Self::RenderView { .. } => "RenderView",
        }
    }

    /// Decode a command from JSON.
    ///
    /// An unrecognized `Command` value yields
    /// [`DispatchError::UnknownCommand`].
    pub fn from_json(input: &str) -> Result<Self, DispatchError> {
        let envelope: Envelope = serde_json::from_str(input)?;
        match envelope.command.as_str() {
            "RenderApp" => envelope
                .app
                .map(Self::render_app)
                .ok_or(DispatchError::MissingPayload {
                    command: "RenderApp",
                    field: "App",
                }),
            "RenderView" => envelope
                .view
                .map(Self::render_view)
                .ok_or(DispatchError::MissingPayload {
                    command: "RenderView",
                    field: "View",
                }),
            _ => Err(DispatchError::UnknownCommand(envelope.command)),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
