//! The view state machine.
//!
//! A [`View`] owns one or more renderers and a [`Visibility`]. Every state
//! change is announced on the [`Bus`]: first a [`ViewUpdate`] (re-render),
//! then a [`ViewState`] (mirror in synced views). Once mounted, each update
//! addressed to the view becomes a `RenderView` command on its sink.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::trace;
use ulid::Ulid;

use super::visibility::Visibility;
use crate::bus::{Bus, PathMatched, Subscription, ViewState, ViewUpdate};
use crate::config::EngineConfig;
use crate::dispatch::{Command, CommandSink, Tree, ViewRender};
use crate::dom::node::{ATTR_HASH, ATTR_UID};
use crate::markup::vnode_to_html;
use crate::vdom::VNode;

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

/// Produces the markup of a view.
pub trait Render: Send + Sync {
    fn render(&self) -> VNode;
}

impl<F> Render for F
where
    F: Fn() -> VNode + Send + Sync,
{
    fn render(&self) -> VNode {
        self()
    }
}

impl Render for VNode {
    fn render(&self) -> VNode {
        self.clone()
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

struct Mount {
    app_id: String,
    sink: Arc<dyn CommandSink>,
}

#[derive(Default)]
struct State {
    visibility: Visibility,
    params: HashMap<String, String>,
    remainder: String,
    live: Option<VNode>,
    mount: Option<Mount>,
}

struct Inner {
    uuid: String,
    uid: String,
    bus: Bus,
    config: EngineConfig,
    renderers: Vec<Arc<dyn Render>>,
    state: RwLock<State>,
    /// Set while this view is announcing an update, so bound cycles stop.
    propagating: AtomicBool,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl Inner {
    fn addressed(&self, id: &str) -> bool {
        id == self.uuid || id == self.uid
    }

    fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner))
    }

    fn keep(&self, subscription: Subscription) {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(subscription);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let subscriptions = std::mem::take(
            self.subscriptions
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for subscription in subscriptions {
            self.bus.unsubscribe(subscription);
        }
    }
}

/// Random lower-case token taken from the random half of a ULID.
fn random_uid(len: usize) -> String {
    let ulid = Ulid::new().to_string().to_ascii_lowercase();
    let len = len.clamp(1, ulid.len());
    ulid[ulid.len() - len..].to_owned()
}

/// Content hash of the serialized tree: the first 16 hex digits of its
/// BLAKE3 digest, identical across processes and toolchains.
fn fingerprint(node: &VNode) -> String {
    let digest = blake3::hash(vnode_to_html(node).as_bytes());
    digest.to_hex().as_str()[..16].to_owned()
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`View`].
pub struct ViewBuilder {
    bus: Bus,
    uid: Option<String>,
    config: EngineConfig,
    renderers: Vec<Arc<dyn Render>>,
    visibility: Visibility,
}

impl ViewBuilder {
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_renderer(mut self, renderer: impl Render + 'static) -> Self {
        self.renderers.push(Arc::new(renderer));
        self
    }

    /// Start hidden instead of shown.
    pub fn hidden(mut self) -> Self {
        self.visibility = Visibility::Hidden;
        self
    }

    pub fn build(self) -> View {
        let uid = self
            .uid
            .unwrap_or_else(|| random_uid(self.config.uid_length));
        let inner = Arc::new(Inner {
            uuid: Ulid::new().to_string(),
            uid,
            bus: self.bus,
            config: self.config,
            renderers: self.renderers,
            state: RwLock::new(State {
                visibility: self.visibility,
                ..State::default()
            }),
            propagating: AtomicBool::new(false),
            subscriptions: Mutex::new(Vec::new()),
        });
        let view = View { inner };
        view.listen();
        view
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Shared handle to one view.
#[derive(Clone)]
pub struct View {
    inner: Arc<Inner>,
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("uuid", &self.inner.uuid)
            .field("uid", &self.inner.uid)
            .field("visibility", &self.visibility())
            .field("renderers", &self.inner.renderers.len())
            .finish_non_exhaustive()
    }
}

impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for View {}

impl View {
    pub fn builder(bus: &Bus) -> ViewBuilder {
        ViewBuilder {
            bus: bus.clone(),
            uid: None,
            config: EngineConfig::default(),
            renderers: Vec::new(),
            visibility: Visibility::Shown,
        }
    }

    /// A shown view with one renderer and a random uid.
    pub fn new(bus: &Bus, renderer: impl Render + 'static) -> Self {
        Self::builder(bus).with_renderer(renderer).build()
    }

    pub fn uuid(&self) -> &str {
        &self.inner.uuid
    }

    pub fn uid(&self) -> &str {
        &self.inner.uid
    }

    pub fn bus(&self) -> &Bus {
        &self.inner.bus
    }

    pub fn visibility(&self) -> Visibility {
        self.inner.read(|s| s.visibility)
    }

    /// Parameters of the last route match.
    pub fn params(&self) -> HashMap<String, String> {
        self.inner.read(|s| s.params.clone())
    }

    /// Path remainder of the last route match.
    pub fn remainder(&self) -> String {
        self.inner.read(|s| s.remainder.clone())
    }

    /// The output of the last [`render`](Self::render), if any.
    pub fn live(&self) -> Option<VNode> {
        self.inner.read(|s| s.live.clone())
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.read(|s| s.mount.is_some())
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// Run the renderers and decorate the result.
    ///
    /// Several renderers (or a renderer returning a fragment) are wrapped in
    /// the configured wrapper element. The root gets the view's visibility,
    /// the view's uid and, unless the renderer set one, a content hash.
    pub fn render(&self) -> VNode {
        let inner = &self.inner;
        let mut outputs: Vec<VNode> = inner.renderers.iter().map(|r| r.render()).collect();
        let mut root = match outputs.pop() {
            Some(only) if outputs.is_empty() && only.is_element() => only,
            last => {
                outputs.extend(last);
                let children = outputs.into_iter().flat_map(|node| {
                    if node.is_fragment() {
                        node.children
                    } else {
                        vec![node]
                    }
                });
                VNode::element(inner.config.wrapper_tag.as_str()).with_children(children)
            }
        };

        self.visibility().decorate(&mut root);
        root.set_attr(ATTR_UID, inner.uid.as_str());
        if root.hash().is_none() {
            let hash = fingerprint(&root);
            root.set_attr(ATTR_HASH, hash);
        }
        inner.write(|s| s.live = Some(root.clone()));
        root
    }

    pub fn render_html(&self) -> String {
        vnode_to_html(&self.render())
    }

    /// Render into a command payload.
    pub fn tree(&self) -> Tree {
        let root = self.render();
        Tree {
            markup: vnode_to_html(&root),
            events: root.collect_events(),
        }
    }

    /// Render into a `RenderView` body for `app_id`.
    pub fn view_render(&self, app_id: &str) -> ViewRender {
        ViewRender::new(self.uuid(), app_id, self.tree())
    }

    // ── State transitions ────────────────────────────────────────────

    pub fn show(&self) {
        self.transition(Visibility::Shown);
    }

    pub fn hide(&self) {
        self.transition(Visibility::Hidden);
    }

    fn transition(&self, to: Visibility) {
        self.inner.write(|s| s.visibility = to);
        trace!(view = %self.inner.uid, %to, "transition");
        self.update();
        self.inner.bus.publish(ViewState {
            id: self.inner.uuid.clone(),
            on: to.is_shown(),
        });
    }

    /// Announce that this view needs rendering again.
    ///
    /// A view already announcing does not announce again, so views bound to
    /// each other settle after one update each.
    pub fn update(&self) {
        if self.inner.propagating.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.bus.publish(ViewUpdate {
            id: self.inner.uuid.clone(),
        });
        self.inner.propagating.store(false, Ordering::SeqCst);
    }

    // ── Wiring ───────────────────────────────────────────────────────

    /// Re-announce every update of `other` as an update of this view.
    pub fn bind(&self, other: &View) {
        let weak = Arc::downgrade(&self.inner);
        let source = Arc::downgrade(&other.inner);
        let sub = self.inner.bus.subscribe(move |m: &ViewUpdate| {
            let (Some(inner), Some(source)) = (weak.upgrade(), source.upgrade()) else {
                return;
            };
            if source.addressed(&m.id) {
                View { inner }.update();
            }
        });
        self.inner.keep(sub);
    }

    /// Tie this view and `other` together both ways: each re-announces the
    /// other's updates and mirrors its shown/hidden state.
    pub fn sync(&self, other: &View) {
        self.bind(other);
        other.bind(self);
        self.mirror(other);
        other.mirror(self);
    }

    /// Follow `other`'s shown/hidden state. A view already in the announced
    /// state does not transition again, so mirrored pairs settle.
    fn mirror(&self, other: &View) {
        let weak = Arc::downgrade(&self.inner);
        let source = Arc::downgrade(&other.inner);
        let sub = self.inner.bus.subscribe(move |m: &ViewState| {
            let (Some(inner), Some(source)) = (weak.upgrade(), source.upgrade()) else {
                return;
            };
            if !source.addressed(&m.id) {
                return;
            }
            let view = View { inner };
            let to = Visibility::from(m.on);
            if view.visibility() != to {
                view.transition(to);
            }
        });
        self.inner.keep(sub);
    }

    /// Send a `RenderView` to `sink` for every update from now on.
    pub fn mount(&self, app_id: impl Into<String>, sink: Arc<dyn CommandSink>) {
        let app_id = app_id.into();
        trace!(view = %self.inner.uid, app = %app_id, "mount");
        self.inner.write(|s| s.mount = Some(Mount { app_id, sink }));
    }

    pub fn unmount(&self) {
        self.inner.write(|s| s.mount = None);
    }

    fn listen(&self) {
        let weak = Arc::downgrade(&self.inner);
        let sub = self.inner.bus.subscribe(move |m: &ViewUpdate| {
            let Some(inner) = weak.upgrade() else { return };
            if inner.addressed(&m.id) {
                View { inner }.emit();
            }
        });
        self.inner.keep(sub);

        let weak = Arc::downgrade(&self.inner);
        let sub = self.inner.bus.subscribe(move |m: &PathMatched| {
            let Some(inner) = weak.upgrade() else { return };
            if !inner.addressed(&m.id) {
                return;
            }
            inner.write(|s| {
                s.params = m.params.clone();
                s.remainder = m.remainder.clone();
            });
            View { inner }.show();
        });
        self.inner.keep(sub);
    }

    /// Submit a `RenderView` if mounted.
    fn emit(&self) {
        let target = self
            .inner
            .read(|s| s.mount.as_ref().map(|m| (m.app_id.clone(), Arc::clone(&m.sink))));
        if let Some((app_id, sink)) = target {
            sink.submit(Command::render_view(self.view_render(&app_id)));
        }
    }
}
