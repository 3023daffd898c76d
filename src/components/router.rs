//! Application router component.
//!
//! Path-based routing on top of the History API. The current route lives in
//! a signal provided as [`RouteContext`]; `popstate` keeps it in sync with
//! the browser's back/forward buttons.

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;

use crate::components::layout::Layout;
use crate::components::pages::{AboutPage, BlogPage, ContactPage, HomePage, NotFoundPage, PostPage};
use crate::models::AppRoute;
use crate::utils::dom;

/// Current route, shared with links that navigate client-side.
#[derive(Clone, Copy)]
pub struct RouteContext(pub RwSignal<AppRoute>);

impl RouteContext {
    /// Navigate to a same-origin path without reloading.
    pub fn navigate(&self, path: &str) {
        dom::push_url(path);
        dom::scroll_to_top();
        self.0.set(AppRoute::from_path(path));
    }
}

/// Main application router.
#[component]
pub fn AppRouter() -> impl IntoView {
    let route = RwSignal::new(AppRoute::current());
    provide_context(RouteContext(route));

    // Set up popstate listener (runs once on mount)
    let closure = Closure::wrap(Box::new(move || {
        route.set(AppRoute::current());
    }) as Box<dyn Fn()>);

    if let Some(window) = dom::window() {
        let _ = window.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
    }

    // Keep the closure alive for the lifetime of the app
    closure.forget();

    view! {
        <Layout>
            {move || match route.get() {
                AppRoute::Home => view! { <HomePage /> }.into_any(),
                AppRoute::About => view! { <AboutPage /> }.into_any(),
                AppRoute::Blog => view! { <BlogPage /> }.into_any(),
                AppRoute::Post { slug } => view! { <PostPage slug=slug /> }.into_any(),
                AppRoute::Contact => view! { <ContactPage /> }.into_any(),
                AppRoute::NotFound { path } => view! { <NotFoundPage path=path /> }.into_any(),
            }}
        </Layout>
    }
}
