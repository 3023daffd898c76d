//! Per-link prefetch state machine.
//!
//! Each registered link moves `unobserved -> observed -> prefetched`, or
//! `unobserved -> ignored` when its href is not eligible. Visibility, intent
//! and the no-observer fallback all funnel into [`LinkPrefetcher::schedule`];
//! the first trigger wins and the actual work runs through the
//! [`DeferStrategy`](super::DeferStrategy).

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use leptos::logging;

use super::href::{PageLocation, normalise_href};
use super::resolver::RouteResolver;
use super::strategy::{Cleanup, LinkElement, Strategies};
use super::{ElementId, LinkStatus};
use crate::core::error::PrefetchError;

struct LinkPrefetchState<E> {
    element: E,
    /// Normalized path, `None` when ineligible.
    href: Option<String>,
    status: LinkStatus,
    /// Distinguishes registrations of the same id across href changes.
    generation: u64,
    scheduled: bool,
    cleanup: Cleanup,
}

struct Registry<E> {
    links: HashMap<ElementId, LinkPrefetchState<E>>,
    prefetched: HashSet<String>,
    next_id: ElementId,
    next_generation: u64,
}

struct Shared<E> {
    registry: RefCell<Registry<E>>,
    strategies: Strategies<E>,
    resolver: Box<dyn RouteResolver>,
    location: Box<dyn Fn() -> PageLocation>,
    verbose: bool,
}

/// Page-wide prefetch service.
///
/// Owns the element registry and the set of routes already prefetched in
/// this session. Cloning is cheap and shares the same state.
pub struct LinkPrefetcher<E> {
    shared: Rc<Shared<E>>,
}

impl<E> Clone for LinkPrefetcher<E> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

enum Scheduled {
    /// Another element already prefetched this path.
    AlreadyDone,
    Pending(String),
}

impl<E: LinkElement> LinkPrefetcher<E> {
    pub fn new(
        strategies: Strategies<E>,
        resolver: impl RouteResolver + 'static,
        location: impl Fn() -> PageLocation + 'static,
        verbose: bool,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                registry: RefCell::new(Registry {
                    links: HashMap::new(),
                    prefetched: HashSet::new(),
                    next_id: 0,
                    next_generation: 0,
                }),
                strategies,
                resolver: Box::new(resolver),
                location: Box::new(location),
                verbose,
            }),
        }
    }

    /// Allocate a stable identifier for a new element.
    pub fn next_id(&self) -> ElementId {
        let mut registry = self.shared.registry.borrow_mut();
        registry.next_id += 1;
        registry.next_id
    }

    /// Register an element and its href. Replaces any previous registration of `id`.
    pub fn mount(&self, id: ElementId, element: E, href: &str) {
        self.teardown(id);
        let normalized = normalise_href(href, &(self.shared.location)());
        self.register(id, element, normalized);
    }

    /// React to an href change. Unchanged hrefs do nothing.
    pub fn update(&self, id: ElementId, href: &str) {
        let normalized = normalise_href(href, &(self.shared.location)());

        let changed = {
            let registry = self.shared.registry.borrow();
            registry
                .links
                .get(&id)
                .is_some_and(|state| state.href != normalized)
        };
        if !changed {
            return;
        }

        if let Some(element) = self.teardown(id) {
            self.register(id, element, normalized);
        }
    }

    /// Release everything registered for `id` and clear its marker.
    pub fn unmount(&self, id: ElementId) {
        if let Some(element) = self.teardown(id) {
            element.set_marker(None);
        }
    }

    pub fn status(&self, id: ElementId) -> Option<LinkStatus> {
        self.shared
            .registry
            .borrow()
            .links
            .get(&id)
            .map(|state| state.status)
    }

    pub fn is_prefetched(&self, path: &str) -> bool {
        self.shared.registry.borrow().prefetched.contains(path)
    }

    /// Number of registered elements.
    pub fn len(&self) -> usize {
        self.shared.registry.borrow().links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tear down every link and forget all prefetched routes.
    pub fn reset(&self) {
        let links: Vec<_> = {
            let mut registry = self.shared.registry.borrow_mut();
            registry.prefetched.clear();
            registry.links.drain().map(|(_, state)| state).collect()
        };

        for state in links {
            state.cleanup.run();
            state.element.set_marker(None);
        }
    }

    fn register(&self, id: ElementId, element: E, href: Option<String>) {
        let generation = {
            let mut registry = self.shared.registry.borrow_mut();
            registry.next_generation += 1;
            let generation = registry.next_generation;
            registry.links.insert(
                id,
                LinkPrefetchState {
                    element: element.clone(),
                    href: href.clone(),
                    status: LinkStatus::Unobserved,
                    generation,
                    scheduled: false,
                    cleanup: Cleanup::default(),
                },
            );
            generation
        };

        let Some(path) = href else {
            self.set_status(id, generation, LinkStatus::Ignored);
            return;
        };

        if self.shared.verbose {
            logging::log!("[prefetch] observing {}", path);
        }
        self.set_status(id, generation, LinkStatus::Observed);

        let trigger = self.trigger(id, generation);
        let mut cleanup = element.listen_intent(trigger.clone());
        cleanup.extend(self.shared.strategies.visibility.watch(&element, trigger));
        self.attach_cleanup(id, generation, cleanup);
    }

    /// Remove the state for `id`, run its cleanup and hand back the element.
    fn teardown(&self, id: ElementId) -> Option<E> {
        let state = self.shared.registry.borrow_mut().links.remove(&id)?;
        state.cleanup.run();
        Some(state.element)
    }

    fn trigger(&self, id: ElementId, generation: u64) -> Rc<dyn Fn()> {
        let weak = Rc::downgrade(&self.shared);
        Rc::new(move || {
            if let Some(prefetcher) = Self::upgrade(&weak) {
                prefetcher.schedule(id, generation);
            }
        })
    }

    fn upgrade(weak: &Weak<Shared<E>>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    /// First trigger for a registration: queue the prefetch. Later ones are no-ops.
    fn schedule(&self, id: ElementId, generation: u64) {
        let scheduled = {
            let mut registry = self.shared.registry.borrow_mut();
            let Registry {
                links, prefetched, ..
            } = &mut *registry;

            let Some(state) = links.get_mut(&id) else {
                return;
            };
            if state.generation != generation
                || state.scheduled
                || state.status != LinkStatus::Observed
            {
                return;
            }
            let Some(path) = state.href.clone() else {
                return;
            };
            state.scheduled = true;

            if prefetched.contains(&path) {
                Scheduled::AlreadyDone
            } else {
                Scheduled::Pending(path)
            }
        };

        match scheduled {
            Scheduled::AlreadyDone => {
                self.set_status(id, generation, LinkStatus::Prefetched);
            }
            Scheduled::Pending(path) => {
                if self.shared.verbose {
                    logging::log!("[prefetch] scheduling {}", path);
                }
                let weak = Rc::downgrade(&self.shared);
                let cancel = self.shared.strategies.defer.defer(Box::new(move || {
                    if let Some(prefetcher) = Self::upgrade(&weak) {
                        prefetcher.run(id, generation, &path);
                    }
                }));
                self.attach_cleanup(id, generation, cancel);
            }
        }
    }

    /// Deferred work for one registration.
    fn run(&self, id: ElementId, generation: u64, path: &str) {
        if !self.is_current(id, generation) {
            return;
        }

        if !self.is_prefetched(path) {
            self.prefetch_route(path);
            self.shared
                .registry
                .borrow_mut()
                .prefetched
                .insert(path.to_string());
        }

        self.set_status(id, generation, LinkStatus::Prefetched);
    }

    /// Resolve `path` and start every loader it matches. Never fails.
    fn prefetch_route(&self, path: &str) {
        let resolved = match self.shared.resolver.resolve(path) {
            Ok(resolved) => resolved,
            Err(e) => {
                logging::warn!("[prefetch] {}: {}", path, e);
                return;
            }
        };

        let mut started = 0usize;
        for record in &resolved.matched {
            for (name, loader) in record.loaders() {
                started += 1;
                if let Err(message) = loader() {
                    let err = PrefetchError::Load {
                        component: format!("{}/{}", record.name, name),
                        message,
                    };
                    logging::warn!("[prefetch] {}: {}", path, err);
                }
            }
        }

        if self.shared.verbose {
            logging::log!("[prefetch] {} -> {} loader(s)", path, started);
        }
    }

    fn is_current(&self, id: ElementId, generation: u64) -> bool {
        self.shared
            .registry
            .borrow()
            .links
            .get(&id)
            .is_some_and(|state| state.generation == generation)
    }

    fn set_status(&self, id: ElementId, generation: u64, status: LinkStatus) {
        let element = {
            let mut registry = self.shared.registry.borrow_mut();
            match registry.links.get_mut(&id) {
                Some(state) if state.generation == generation => {
                    state.status = status;
                    state.element.clone()
                }
                _ => return,
            }
        };
        element.set_marker(Some(status));
    }

    /// Hand `cleanup` to the registration, or run it now if that registration is gone.
    fn attach_cleanup(&self, id: ElementId, generation: u64, cleanup: Cleanup) {
        let orphan = {
            let mut registry = self.shared.registry.borrow_mut();
            match registry.links.get_mut(&id) {
                Some(state) if state.generation == generation => {
                    state.cleanup.extend(cleanup);
                    None
                }
                _ => Some(cleanup),
            }
        };

        if let Some(cleanup) = orphan {
            cleanup.run();
        }
    }
}
