//! Platform seams for the prefetcher.
//!
//! Capability probing happens once, when [`Strategies`] are built; the
//! prefetcher never branches on platform support per call.

use std::rc::Rc;

use super::LinkStatus;

/// Deferred release of observers, listeners and pending tasks.
///
/// Releases on drop as well, so browser callbacks never outlive their closures.
#[derive(Default)]
pub struct Cleanup(Vec<Box<dyn FnOnce()>>);

impl Cleanup {
    pub fn from_fn(f: impl FnOnce() + 'static) -> Self {
        Self(vec![Box::new(f)])
    }

    pub fn push(&mut self, f: impl FnOnce() + 'static) {
        self.0.push(Box::new(f));
    }

    pub fn extend(&mut self, mut other: Cleanup) {
        self.0.append(&mut other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Run every release step, most recent first.
    pub fn run(mut self) {
        self.release();
    }

    fn release(&mut self) {
        for f in std::mem::take(&mut self.0).into_iter().rev() {
            f();
        }
    }
}

impl Drop for Cleanup {
    fn drop(&mut self) {
        self.release();
    }
}

/// An anchor the prefetcher can decorate.
pub trait LinkElement: Clone + 'static {
    /// Set (or clear, with `None`) the diagnostic status marker.
    fn set_marker(&self, status: Option<LinkStatus>);

    /// Call `on_intent` on hover, focus or touch. Each listener fires once.
    fn listen_intent(&self, on_intent: Rc<dyn Fn()>) -> Cleanup;
}

/// Runs prefetch work when the main thread can spare it.
pub trait DeferStrategy {
    /// Run `task` later. The returned cleanup cancels it if it has not run yet.
    fn defer(&self, task: Box<dyn FnOnce()>) -> Cleanup;
}

/// Reports when an element is about to enter the viewport.
pub trait VisibilityStrategy<E> {
    /// Call `on_visible` once the element is near the viewport, then stop watching.
    fn watch(&self, element: &E, on_visible: Rc<dyn Fn()>) -> Cleanup;
}

/// Used when visibility cannot be observed: every link counts as visible on mount.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateVisibility;

impl<E> VisibilityStrategy<E> for ImmediateVisibility {
    fn watch(&self, _element: &E, on_visible: Rc<dyn Fn()>) -> Cleanup {
        on_visible();
        Cleanup::default()
    }
}

/// The platform strategies a prefetcher runs with.
pub struct Strategies<E> {
    pub defer: Box<dyn DeferStrategy>,
    pub visibility: Box<dyn VisibilityStrategy<E>>,
}

impl<E> Strategies<E> {
    pub fn new(
        defer: impl DeferStrategy + 'static,
        visibility: impl VisibilityStrategy<E> + 'static,
    ) -> Self {
        Self {
            defer: Box::new(defer),
            visibility: Box::new(visibility),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_cleanup_runs_in_reverse_order() {
        let order = Rc::new(RefCell::new(Vec::new()));

        let mut cleanup = Cleanup::default();
        assert!(cleanup.is_empty());
        for i in 0..3 {
            let order = order.clone();
            cleanup.push(move || order.borrow_mut().push(i));
        }
        let order_tail = order.clone();
        let mut tail = Cleanup::from_fn(move || order_tail.borrow_mut().push(9));
        tail.extend(cleanup);

        tail.run();
        assert_eq!(*order.borrow(), vec![2, 1, 0, 9]);
    }

    #[test]
    fn test_cleanup_releases_on_drop_once() {
        let runs = Rc::new(RefCell::new(0));
        let counter = runs.clone();

        let cleanup = Cleanup::from_fn(move || *counter.borrow_mut() += 1);
        drop(cleanup);
        assert_eq!(*runs.borrow(), 1);

        let counter = runs.clone();
        Cleanup::from_fn(move || *counter.borrow_mut() += 1).run();
        assert_eq!(*runs.borrow(), 2);
    }

    #[test]
    fn test_immediate_visibility_fires_on_watch() {
        let fired = Rc::new(RefCell::new(0));
        let counter = fired.clone();

        let cleanup = ImmediateVisibility.watch(&(), Rc::new(move || *counter.borrow_mut() += 1));
        assert_eq!(*fired.borrow(), 1);
        assert!(cleanup.is_empty());
    }
}
