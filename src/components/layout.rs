//! Site chrome: header navigation and footer.

use leptos::prelude::*;

use crate::components::PrefetchLink;
use crate::config::APP_NAME;

/// Page frame shared by every route.
#[component]
pub fn Layout(children: Children) -> impl IntoView {
    view! {
        <header class="site-header">
            <PrefetchLink href="/" class="brand">{APP_NAME}</PrefetchLink>
            <nav aria-label="Main">
                <PrefetchLink href="/blog">"Blog"</PrefetchLink>
                <PrefetchLink href="/about">"About"</PrefetchLink>
                <PrefetchLink href="/contact">"Contact"</PrefetchLink>
            </nav>
        </header>

        <main class="site-main">{children()}</main>

        <footer class="site-footer">
            <PrefetchLink href="mailto:hello@folio.dev">"hello@folio.dev"</PrefetchLink>
            <PrefetchLink href="#top">"Back to top"</PrefetchLink>
        </footer>
    }
}
