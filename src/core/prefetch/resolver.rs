//! Router contract consumed by the prefetcher.

use std::fmt;
use std::rc::Rc;

use crate::core::error::PrefetchError;

/// Starts loading whatever a route needs. Errors are reported as text.
pub type Loader = Rc<dyn Fn() -> Result<(), String>>;

/// One matched route and its lazily loaded parts.
#[derive(Clone, Default)]
pub struct RouteRecord {
    pub name: String,
    /// Main view loader.
    pub component: Option<Loader>,
    /// Named view loaders.
    pub components: Vec<(String, Loader)>,
}

impl RouteRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_component(mut self, loader: Loader) -> Self {
        self.component = Some(loader);
        self
    }

    pub fn with_named(mut self, name: impl Into<String>, loader: Loader) -> Self {
        self.components.push((name.into(), loader));
        self
    }

    /// Every loader on this record, labelled for diagnostics.
    pub fn loaders(&self) -> impl Iterator<Item = (&str, &Loader)> {
        self.component
            .iter()
            .map(|loader| ("default", loader))
            .chain(
                self.components
                    .iter()
                    .map(|(name, loader)| (name.as_str(), loader)),
            )
    }
}

impl fmt::Debug for RouteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRecord")
            .field("name", &self.name)
            .field("loaders", &self.loaders().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}

/// Result of matching a path against the route table.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub matched: Vec<RouteRecord>,
}

/// Client-side route matching.
pub trait RouteResolver {
    /// Match `path` (which may carry a query and fragment).
    fn resolve(&self, path: &str) -> Result<Resolved, PrefetchError>;
}
