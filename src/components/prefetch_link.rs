//! Anchor that prefetches its target route.
//!
//! Registers the rendered `<a>` with the page's
//! [`LinkPrefetcher`](crate::core::prefetch::LinkPrefetcher): mount after the
//! first render, update when `href` changes, unmount on cleanup.

use leptos::ev::MouseEvent;
use leptos::prelude::*;

use crate::app::AppContext;
use crate::components::router::RouteContext;
use crate::core::prefetch::web::AnchorLink;
use crate::core::prefetch::{PageLocation, normalise_href};

/// `<a>` with lazy prefetching and client-side navigation for same-origin targets.
#[component]
pub fn PrefetchLink(
    #[prop(into)] href: Signal<String>,
    #[prop(optional)] class: &'static str,
    children: Children,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let route_ctx = use_context::<RouteContext>().expect("RouteContext must be provided");

    let node_ref = NodeRef::<leptos::html::A>::new();
    let id = ctx.prefetcher.with_value(|p| p.next_id());

    // Returns whether the element is registered
    Effect::new(move |registered: Option<bool>| {
        let href = href.get();
        let Some(anchor) = node_ref.get() else {
            return false;
        };

        ctx.prefetcher.with_value(|p| {
            if registered == Some(true) {
                p.update(id, &href);
            } else {
                p.mount(id, AnchorLink::new(anchor.into()), &href);
            }
        });
        true
    });

    on_cleanup(move || ctx.prefetcher.with_value(|p| p.unmount(id)));

    let on_click = move |ev: MouseEvent| {
        // Leave modified clicks (new tab, download, ...) to the browser
        if ev.default_prevented()
            || ev.button() != 0
            || ev.meta_key()
            || ev.ctrl_key()
            || ev.shift_key()
            || ev.alt_key()
        {
            return;
        }

        if let Some(path) = normalise_href(&href.get_untracked(), &PageLocation::current()) {
            ev.prevent_default();
            route_ctx.navigate(&path);
        }
    };

    view! {
        <a node_ref=node_ref href=move || href.get() class=class on:click=on_click>
            {children()}
        </a>
    }
}
