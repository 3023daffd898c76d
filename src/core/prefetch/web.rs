//! Browser implementations of the prefetch seams.
//!
//! [`Strategies::probe`] checks once for `requestIdleCallback` and
//! `IntersectionObserver` and picks the fallbacks when they are missing.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use js_sys::Array;
use leptos::logging;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{
    AddEventListenerOptions, HtmlElement, IdleRequestOptions, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit,
};

use super::strategy::{Cleanup, DeferStrategy, ImmediateVisibility, LinkElement, Strategies, VisibilityStrategy};
use super::LinkStatus;
use crate::config::prefetch::{IDLE_TIMEOUT_MS, MARKER_ATTRIBUTE, ROOT_MARGIN, TIMER_FALLBACK_MS};
use crate::utils::dom;

/// Events that signal the user is about to follow a link.
const INTENT_EVENTS: [&str; 3] = ["pointerenter", "focus", "touchstart"];

// =============================================================================
// Anchor
// =============================================================================

/// A rendered `<a>` element.
#[derive(Debug, Clone)]
pub struct AnchorLink(HtmlElement);

impl AnchorLink {
    pub fn new(element: HtmlElement) -> Self {
        Self(element)
    }

    pub fn element(&self) -> &HtmlElement {
        &self.0
    }
}

impl LinkElement for AnchorLink {
    fn set_marker(&self, status: Option<LinkStatus>) {
        let _ = match status {
            Some(status) => self.0.set_attribute(MARKER_ATTRIBUTE, status.as_str()),
            None => self.0.remove_attribute(MARKER_ATTRIBUTE),
        };
    }

    fn listen_intent(&self, on_intent: Rc<dyn Fn()>) -> Cleanup {
        let callback = Closure::<dyn FnMut()>::new(move || on_intent());

        let options = AddEventListenerOptions::new();
        options.set_once(true);
        options.set_passive(true);

        for event in INTENT_EVENTS {
            let _ = self
                .0
                .add_event_listener_with_callback_and_add_event_listener_options(
                    event,
                    callback.as_ref().unchecked_ref(),
                    &options,
                );
        }

        let element = self.0.clone();
        Cleanup::from_fn(move || {
            for event in INTENT_EVENTS {
                let _ = element
                    .remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
            }
            drop(callback);
        })
    }
}

// =============================================================================
// Deferral
// =============================================================================

/// `requestIdleCallback` bounded by [`IDLE_TIMEOUT_MS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleDefer;

impl DeferStrategy for IdleDefer {
    fn defer(&self, task: Box<dyn FnOnce()>) -> Cleanup {
        let Some(window) = dom::window() else {
            return TimerDefer.defer(task);
        };

        let slot = Rc::new(RefCell::new(Some(task)));
        let pending = slot.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            let task = pending.borrow_mut().take();
            if let Some(task) = task {
                task();
            }
        });

        let options = IdleRequestOptions::new();
        options.set_timeout(IDLE_TIMEOUT_MS);

        match window.request_idle_callback_with_options(callback.as_ref().unchecked_ref(), &options) {
            Ok(handle) => Cleanup::from_fn(move || {
                window.cancel_idle_callback(handle);
                drop(callback);
            }),
            Err(_) => match slot.borrow_mut().take() {
                Some(task) => TimerDefer.defer(task),
                None => Cleanup::default(),
            },
        }
    }
}

/// Fixed [`TIMER_FALLBACK_MS`] timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerDefer;

impl DeferStrategy for TimerDefer {
    fn defer(&self, task: Box<dyn FnOnce()>) -> Cleanup {
        let timeout = Timeout::new(TIMER_FALLBACK_MS, task);
        // Dropping a pending Timeout clears it
        Cleanup::from_fn(move || drop(timeout))
    }
}

// =============================================================================
// Visibility
// =============================================================================

/// One `IntersectionObserver` per link, widened by [`ROOT_MARGIN`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IntersectionVisibility;

impl VisibilityStrategy<AnchorLink> for IntersectionVisibility {
    fn watch(&self, element: &AnchorLink, on_visible: Rc<dyn Fn()>) -> Cleanup {
        let fire = on_visible.clone();
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, observer: IntersectionObserver| {
                let visible = entries.iter().any(|entry| {
                    entry
                        .unchecked_into::<IntersectionObserverEntry>()
                        .is_intersecting()
                });
                if visible {
                    observer.disconnect();
                    on_visible();
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_root_margin(ROOT_MARGIN);

        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => {
                observer.observe(element.element());
                Cleanup::from_fn(move || {
                    observer.disconnect();
                    drop(callback);
                })
            }
            Err(e) => {
                logging::warn!("[prefetch] IntersectionObserver failed: {:?}", e);
                ImmediateVisibility.watch(element, fire)
            }
        }
    }
}

impl Strategies<AnchorLink> {
    /// Pick strategies for the running browser.
    pub fn probe() -> Self {
        let defer: Box<dyn DeferStrategy> = if dom::has_global("requestIdleCallback") {
            Box::new(IdleDefer)
        } else {
            Box::new(TimerDefer)
        };

        let visibility: Box<dyn VisibilityStrategy<AnchorLink>> =
            if dom::has_global("IntersectionObserver") {
                Box::new(IntersectionVisibility)
            } else {
                Box::new(ImmediateVisibility)
            };

        Self { defer, visibility }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use crate::core::error::PrefetchError;
    use crate::core::prefetch::{LinkPrefetcher, PageLocation, Resolved, RouteResolver};
    use gloo_timers::future::TimeoutFuture;
    use std::cell::Cell;
    use wasm_bindgen_test::*;
    use web_sys::Event;

    wasm_bindgen_test_configure!(run_in_browser);

    /// Fresh `<a>` attached to the document body.
    fn anchor(href: &str) -> AnchorLink {
        let document = dom::window().unwrap().document().unwrap();
        let element: HtmlElement = document.create_element("a").unwrap().unchecked_into();
        element.set_attribute("href", href).unwrap();
        element.set_text_content(Some(href));
        document.body().unwrap().append_child(&element).unwrap();
        AnchorLink::new(element)
    }

    fn counter() -> (Rc<Cell<usize>>, Rc<dyn Fn()>) {
        let count = Rc::new(Cell::new(0));
        let bump = count.clone();
        let callback: Rc<dyn Fn()> = Rc::new(move || bump.set(bump.get() + 1));
        (count, callback)
    }

    fn flag_task(flag: &Rc<Cell<bool>>) -> Box<dyn FnOnce()> {
        let flag = flag.clone();
        Box::new(move || flag.set(true))
    }

    fn dispatch(link: &AnchorLink, event: &str) {
        let event = Event::new(event).unwrap();
        link.element().dispatch_event(&event).unwrap();
    }

    #[wasm_bindgen_test]
    async fn timer_defer_runs_after_delay() {
        let ran = Rc::new(Cell::new(false));
        let _pending = TimerDefer.defer(flag_task(&ran));

        assert!(!ran.get());
        TimeoutFuture::new(TIMER_FALLBACK_MS + 80).await;
        assert!(ran.get());
    }

    #[wasm_bindgen_test]
    async fn timer_defer_cleanup_cancels() {
        let ran = Rc::new(Cell::new(false));
        TimerDefer.defer(flag_task(&ran)).run();

        TimeoutFuture::new(TIMER_FALLBACK_MS + 80).await;
        assert!(!ran.get());
    }

    #[wasm_bindgen_test]
    async fn idle_defer_runs_within_timeout() {
        let ran = Rc::new(Cell::new(false));
        let _pending = IdleDefer.defer(flag_task(&ran));

        TimeoutFuture::new(IDLE_TIMEOUT_MS + 200).await;
        assert!(ran.get());
    }

    #[wasm_bindgen_test]
    async fn idle_defer_cleanup_cancels() {
        let ran = Rc::new(Cell::new(false));
        IdleDefer.defer(flag_task(&ran)).run();

        TimeoutFuture::new(IDLE_TIMEOUT_MS + 200).await;
        assert!(!ran.get());
    }

    #[wasm_bindgen_test]
    fn anchor_marker_is_set_and_removed() {
        let link = anchor("/about");

        link.set_marker(Some(LinkStatus::Observed));
        assert_eq!(
            link.element().get_attribute(MARKER_ATTRIBUTE).as_deref(),
            Some("observed")
        );
        link.set_marker(Some(LinkStatus::Prefetched));
        assert_eq!(
            link.element().get_attribute(MARKER_ATTRIBUTE).as_deref(),
            Some("prefetched")
        );

        link.set_marker(None);
        assert!(!link.element().has_attribute(MARKER_ATTRIBUTE));
    }

    #[wasm_bindgen_test]
    fn anchor_intent_listeners_fire_once_per_event() {
        let link = anchor("/blog");
        let (count, on_intent) = counter();
        let _listeners = link.listen_intent(on_intent);

        dispatch(&link, "pointerenter");
        dispatch(&link, "pointerenter");
        assert_eq!(count.get(), 1);

        dispatch(&link, "focus");
        assert_eq!(count.get(), 2);
    }

    #[wasm_bindgen_test]
    fn anchor_intent_cleanup_removes_listeners() {
        let link = anchor("/blog");
        let (count, on_intent) = counter();
        link.listen_intent(on_intent).run();

        for event in INTENT_EVENTS {
            dispatch(&link, event);
        }
        assert_eq!(count.get(), 0);
    }

    #[wasm_bindgen_test]
    async fn intersection_fires_for_visible_link() {
        let link = anchor("/about");
        let (count, on_visible) = counter();
        let _observer = IntersectionVisibility.watch(&link, on_visible);

        TimeoutFuture::new(100).await;
        assert_eq!(count.get(), 1);
    }

    #[wasm_bindgen_test]
    async fn intersection_cleanup_disconnects() {
        let link = anchor("/about");
        let (count, on_visible) = counter();
        IntersectionVisibility.watch(&link, on_visible).run();

        TimeoutFuture::new(100).await;
        assert_eq!(count.get(), 0);
    }

    /// Counts resolve calls; routes have no loaders.
    #[derive(Clone, Default)]
    struct CountingResolver(Rc<Cell<usize>>);

    impl RouteResolver for CountingResolver {
        fn resolve(&self, _path: &str) -> Result<Resolved, PrefetchError> {
            self.0.set(self.0.get() + 1);
            Ok(Resolved::default())
        }
    }

    fn probed_prefetcher(resolver: CountingResolver) -> LinkPrefetcher<AnchorLink> {
        LinkPrefetcher::new(Strategies::probe(), resolver, PageLocation::current, false)
    }

    #[wasm_bindgen_test]
    async fn probed_strategies_prefetch_visible_link() {
        let resolver = CountingResolver::default();
        let prefetcher = probed_prefetcher(resolver.clone());
        let link = anchor("/about");

        let id = prefetcher.next_id();
        prefetcher.mount(id, link.clone(), "/about");
        assert_eq!(prefetcher.status(id), Some(LinkStatus::Observed));

        TimeoutFuture::new(IDLE_TIMEOUT_MS + 300).await;
        assert_eq!(resolver.0.get(), 1);
        assert_eq!(prefetcher.status(id), Some(LinkStatus::Prefetched));
        assert_eq!(
            link.element().get_attribute(MARKER_ATTRIBUTE).as_deref(),
            Some("prefetched")
        );
    }

    #[wasm_bindgen_test]
    async fn unmount_cancels_pending_prefetch() {
        let resolver = CountingResolver::default();
        let prefetcher = probed_prefetcher(resolver.clone());
        let link = anchor("/contact");

        let id = prefetcher.next_id();
        prefetcher.mount(id, link.clone(), "/contact");
        dispatch(&link, "pointerenter");
        prefetcher.unmount(id);

        TimeoutFuture::new(IDLE_TIMEOUT_MS + 300).await;
        assert_eq!(resolver.0.get(), 0);
        assert!(!prefetcher.is_prefetched("/contact"));
        assert!(!link.element().has_attribute(MARKER_ATTRIBUTE));
    }
}
