//! Root application module.
//!
//! Contains the main App component and the AppContext through which the
//! API client and the link prefetcher are shared with every component.

use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::components::AppRouter;
use crate::core::api::{ApiClientOptions, FetchTransport, LocalStorageStore, SiteApi};
use crate::core::error::debug_error;
use crate::core::prefetch::web::AnchorLink;
use crate::core::prefetch::{LinkPrefetcher, PageLocation, Strategies};
use crate::models::SiteRoutes;

// ============================================================================
// AppContext
// ============================================================================

/// Application-wide context.
///
/// Created once at bootstrap and provided at the root of the component tree.
/// Both services are single-threaded, so they live in local arena storage.
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Backend client with the persistent GET cache.
    pub api: StoredValue<Rc<SiteApi>, LocalStorage>,

    /// Page-wide lazy link prefetcher.
    pub prefetcher: StoredValue<LinkPrefetcher<AnchorLink>, LocalStorage>,
}

impl AppContext {
    /// Build the services from compile-time configuration and probe the browser.
    pub fn new() -> Self {
        let api = Rc::new(SiteApi::new(
            ApiClientOptions::from_config(),
            FetchTransport,
            LocalStorageStore,
        ));
        let verbose = api.is_dev();

        let warm_api = api.clone();
        let routes = SiteRoutes::new(move |path: &str| {
            let api = warm_api.clone();
            let path = path.to_string();
            spawn_local(async move {
                if let Err(e) = api.get::<serde_json::Value>(&path).await {
                    debug_error(&e);
                }
            });
            Ok(())
        });

        let prefetcher = LinkPrefetcher::new(
            Strategies::probe(),
            routes,
            PageLocation::current,
            verbose,
        );

        Self {
            api: StoredValue::new_local(api),
            prefetcher: StoredValue::new_local(prefetcher),
        }
    }

    /// Shared handle to the API client.
    pub fn api(&self) -> Rc<SiteApi> {
        self.api.get_value()
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Root application component with error boundary.
///
/// This component:
/// - Creates and provides the global AppContext
/// - Wraps the app in an ErrorBoundary for graceful error handling
/// - Renders the router
#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new();
    provide_context(ctx);
    on_cleanup(move || ctx.prefetcher.with_value(|p| p.reset()));

    view! {
        <ErrorBoundary
            fallback=|errors| view! {
                <main class="fatal">
                    <h1>"Something went wrong"</h1>
                    <p>"An unexpected error occurred. Please try reloading the page."</p>
                    <ul>
                        {move || errors.get()
                            .into_iter()
                            .map(|(_, e)| view! { <li>{e.to_string()}</li> })
                            .collect::<Vec<_>>()
                        }
                    </ul>
                    <button on:click=move |_| {
                        if let Some(window) = web_sys::window() {
                            let _ = window.location().reload();
                        }
                    }>
                        "Reload Page"
                    </button>
                </main>
            }
        >
            <AppRouter />
        </ErrorBoundary>
    }
}
