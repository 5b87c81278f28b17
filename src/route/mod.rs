//! Routing: locations, path patterns, and the watcher that shows or hides
//! views as the location changes.

pub mod location;
pub mod pattern;
pub mod watch;

pub use location::Location;
pub use pattern::{PathMatch, PathMatcher, PathPattern, PatternError};
pub use watch::RouteWatcher;
