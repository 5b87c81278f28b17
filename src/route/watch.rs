//! Route watching: show the views whose patterns match the current location.
//!
//! Each attached view keeps an ordered, deduplicated list of patterns. On
//! every [`LocationChanged`] the first matching pattern of each view wins and
//! a [`PathMatched`] is published for it; views with no match are hidden.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, trace};

use super::location::Location;
use super::pattern::{PathMatcher, PathPattern, PatternError};
use crate::bus::{Bus, LocationChanged, PathMatched, Subscription};
use crate::view::{View, Visibility};

struct Watch {
    view: View,
    patterns: Vec<Arc<dyn PathMatcher>>,
}

struct Inner {
    bus: Bus,
    hash_routing: bool,
    watches: RwLock<Vec<Watch>>,
    matchers: RwLock<HashMap<String, Arc<dyn PathMatcher>>>,
    current: RwLock<Option<Location>>,
    subscription: Mutex<Option<Subscription>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let slot = self
            .subscription
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(subscription) = slot.take() {
            self.bus.unsubscribe(subscription);
        }
    }
}

/// Shared route watcher bound to one bus.
#[derive(Clone)]
pub struct RouteWatcher {
    inner: Arc<Inner>,
}

impl fmt::Debug for RouteWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteWatcher")
            .field("hash_routing", &self.inner.hash_routing)
            .field("views", &self.watched_views())
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

impl RouteWatcher {
    /// A watcher that routes on the location path.
    pub fn new(bus: &Bus) -> Self {
        Self::build(bus, false)
    }

    /// A watcher that routes on the hash fragment.
    pub fn hash_routed(bus: &Bus) -> Self {
        Self::build(bus, true)
    }

    fn build(bus: &Bus, hash_routing: bool) -> Self {
        let inner = Arc::new(Inner {
            bus: bus.clone(),
            hash_routing,
            watches: RwLock::new(Vec::new()),
            matchers: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            subscription: Mutex::new(None),
        });
        let weak = Arc::downgrade(&inner);
        let sub = bus.subscribe(move |m: &LocationChanged| {
            if let Some(inner) = weak.upgrade() {
                RouteWatcher { inner }.on_location(&m.0);
            }
        });
        *inner
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(sub);
        Self { inner }
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Watch `pattern` for `view`.
    ///
    /// Returns `Ok(false)` if the view already watches this pattern. The
    /// first pattern attached for a view is evaluated at once against the
    /// current location, if there is one.
    pub fn attach(&self, view: &View, pattern: &str) -> Result<bool, PatternError> {
        let matcher = self.matcher(pattern)?;
        Ok(self.attach_matcher(view, matcher))
    }

    /// Watch a custom matcher for `view`. Deduplicated by
    /// [`PathMatcher::pattern`].
    pub fn attach_matcher(&self, view: &View, matcher: Arc<dyn PathMatcher>) -> bool {
        let first = {
            let mut watches = self
                .inner
                .watches
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            match watches.iter_mut().find(|w| w.view == *view) {
                Some(watch) => {
                    if watch.patterns.iter().any(|p| p.pattern() == matcher.pattern()) {
                        return false;
                    }
                    watch.patterns.push(matcher);
                    false
                }
                None => {
                    watches.push(Watch {
                        view: view.clone(),
                        patterns: vec![matcher],
                    });
                    true
                }
            }
        };
        if first {
            if let Some(location) = self.current() {
                let patterns = self.patterns_of(view);
                self.evaluate(view, &patterns, &location);
            }
        }
        true
    }

    /// Stop watching every pattern of `view`.
    pub fn detach(&self, view: &View) -> bool {
        let mut watches = self
            .inner
            .watches
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = watches.len();
        watches.retain(|w| w.view != *view);
        before != watches.len()
    }

    /// Parsed patterns are shared between views.
    fn matcher(&self, pattern: &str) -> Result<Arc<dyn PathMatcher>, PatternError> {
        let key = pattern.trim();
        if let Some(found) = self
            .inner
            .matchers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Ok(Arc::clone(found));
        }
        let parsed: Arc<dyn PathMatcher> = Arc::new(PathPattern::parse(key)?);
        let mut matchers = self
            .inner
            .matchers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(
            matchers.entry(key.to_owned()).or_insert(parsed),
        ))
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Publish `location` as the new current location.
    pub fn follow(&self, location: Location) {
        self.inner.bus.publish(LocationChanged(location));
    }

    /// Parse `url` the way this watcher routes and follow it.
    pub fn navigate(&self, url: &str) {
        let location = if self.inner.hash_routing {
            Location::parse_hash(url)
        } else {
            Location::parse(url)
        };
        self.follow(location);
    }

    pub fn current(&self) -> Option<Location> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Patterns watched by `view`, in attach order.
    pub fn watched_patterns(&self, view: &View) -> Vec<String> {
        self.patterns_of(view)
            .iter()
            .map(|p| p.pattern().to_owned())
            .collect()
    }

    fn watched_views(&self) -> usize {
        self.inner
            .watches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn patterns_of(&self, view: &View) -> Vec<Arc<dyn PathMatcher>> {
        self.inner
            .watches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|w| w.view == *view)
            .map(|w| w.patterns.clone())
            .unwrap_or_default()
    }

    // ── Evaluation ───────────────────────────────────────────────────

    fn on_location(&self, location: &Location) {
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(location.clone());

        // Handlers may attach while we publish; evaluate a snapshot.
        let snapshot: Vec<(View, Vec<Arc<dyn PathMatcher>>)> = self
            .inner
            .watches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|w| (w.view.clone(), w.patterns.clone()))
            .collect();
        debug!(target_path = %location.target, views = snapshot.len(), "location changed");
        for (view, patterns) in &snapshot {
            self.evaluate(view, patterns, location);
        }
    }

    fn evaluate(&self, view: &View, patterns: &[Arc<dyn PathMatcher>], location: &Location) {
        for matcher in patterns {
            if let Some(found) = matcher.validate(&location.target) {
                trace!(view = view.uid(), pattern = matcher.pattern(), "matched");
                let mut params = location.params.clone();
                params.extend(found.params);
                self.inner.bus.publish(PathMatched {
                    id: view.uuid().to_owned(),
                    params,
                    remainder: found.remainder,
                    location: location.clone(),
                });
                return;
            }
        }
        if view.visibility() != Visibility::Hidden {
            trace!(view = view.uid(), "no match");
            view.hide();
        }
    }
}
