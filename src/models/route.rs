//! Path-based routing and the site's route table.
//!
//! URL format: `/`, `/about`, `/blog`, `/blog/{slug}`, `/contact`.
//! Anything else is [`AppRoute::NotFound`].

use std::rc::Rc;

use crate::core::error::PrefetchError;
use crate::core::prefetch::{Loader, Resolved, RouteRecord, RouteResolver};
use crate::utils::dom;

/// Application routes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppRoute {
    Home,
    About,
    /// Post index.
    Blog,
    Post {
        slug: String,
    },
    Contact,
    NotFound {
        path: String,
    },
}

impl AppRoute {
    /// Parse a path (query and fragment are ignored).
    pub fn from_path(path: &str) -> Self {
        let clean = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = clean.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["about"] => Self::About,
            ["blog"] => Self::Blog,
            ["blog", slug] => Self::Post {
                slug: slug.to_string(),
            },
            ["contact"] => Self::Contact,
            _ => Self::NotFound {
                path: clean.to_string(),
            },
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::About => "/about".to_string(),
            Self::Blog => "/blog".to_string(),
            Self::Post { slug } => format!("/blog/{}", slug),
            Self::Contact => "/contact".to_string(),
            Self::NotFound { path } => path.clone(),
        }
    }

    /// Route name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::About => "about",
            Self::Blog => "blog",
            Self::Post { .. } => "post",
            Self::Contact => "contact",
            Self::NotFound { .. } => "not-found",
        }
    }

    /// Backend data each view of this route renders, as `(view, api path)`.
    pub fn api_paths(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Home | Self::Blog => vec![("default", "/posts".to_string())],
            Self::About => vec![("default", "/pages/about".to_string())],
            Self::Post { slug } => vec![
                ("default", format!("/posts/{}", slug)),
                ("sidebar", "/posts".to_string()),
            ],
            Self::Contact | Self::NotFound { .. } => Vec::new(),
        }
    }

    /// Get current route from the browser URL.
    pub fn current() -> Self {
        Self::from_path(&dom::pathname())
    }
}

/// Route table for prefetching.
///
/// Each view's loader warms the API cache for the data that view renders.
pub struct SiteRoutes {
    warm: Rc<dyn Fn(&str) -> Result<(), String>>,
}

impl SiteRoutes {
    pub fn new(warm: impl Fn(&str) -> Result<(), String> + 'static) -> Self {
        Self {
            warm: Rc::new(warm),
        }
    }

    fn loader(&self, api_path: String) -> Loader {
        let warm = self.warm.clone();
        Rc::new(move || warm(&api_path))
    }
}

impl RouteResolver for SiteRoutes {
    fn resolve(&self, path: &str) -> Result<Resolved, PrefetchError> {
        if !path.starts_with('/') {
            return Err(PrefetchError::Resolve(format!("not an absolute path: {}", path)));
        }

        let route = AppRoute::from_path(path);
        if matches!(route, AppRoute::NotFound { .. }) {
            return Ok(Resolved::default());
        }

        let mut record = RouteRecord::new(route.name());
        for (view, api_path) in route.api_paths() {
            let loader = self.loader(api_path);
            record = if view == "default" {
                record.with_component(loader)
            } else {
                record.with_named(view, loader)
            };
        }

        Ok(Resolved {
            matched: vec![record],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_route_parsing() {
        assert_eq!(AppRoute::from_path(""), AppRoute::Home);
        assert_eq!(AppRoute::from_path("/"), AppRoute::Home);
        assert_eq!(AppRoute::from_path("/about/"), AppRoute::About);
        assert_eq!(AppRoute::from_path("/about?x=1#y"), AppRoute::About);
        assert_eq!(AppRoute::from_path("/blog"), AppRoute::Blog);
        assert_eq!(
            AppRoute::from_path("/blog/hello-world"),
            AppRoute::Post {
                slug: "hello-world".to_string(),
            }
        );
        assert_eq!(
            AppRoute::from_path("/blog/a/b"),
            AppRoute::NotFound {
                path: "/blog/a/b".to_string(),
            }
        );
    }

    #[test]
    fn test_route_to_path() {
        for path in ["/", "/about", "/blog", "/blog/zk-notes", "/contact"] {
            assert_eq!(AppRoute::from_path(path).to_path(), path);
        }
    }

    #[test]
    fn test_resolve_post_has_two_loaders() {
        let warmed = Rc::new(RefCell::new(Vec::new()));
        let sink = warmed.clone();
        let routes = SiteRoutes::new(move |path: &str| {
            sink.borrow_mut().push(path.to_string());
            Ok(())
        });

        let resolved = routes.resolve("/blog/hello#comments").unwrap();
        assert_eq!(resolved.matched.len(), 1);
        let record = &resolved.matched[0];
        assert_eq!(record.name, "post");

        for (_, loader) in record.loaders() {
            loader().unwrap();
        }
        assert_eq!(*warmed.borrow(), vec!["/posts/hello", "/posts"]);
    }

    #[test]
    fn test_resolve_contact_has_no_loaders() {
        let routes = SiteRoutes::new(|_: &str| Ok(()));
        let resolved = routes.resolve("/contact").unwrap();
        assert_eq!(resolved.matched[0].loaders().count(), 0);
    }

    #[test]
    fn test_resolve_unknown_and_invalid() {
        let routes = SiteRoutes::new(|_: &str| Ok(()));
        assert!(routes.resolve("/nope/nope/nope").unwrap().matched.is_empty());
        assert!(matches!(
            routes.resolve("relative"),
            Err(PrefetchError::Resolve(_))
        ));
    }
}
