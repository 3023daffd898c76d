//! Route views.
//!
//! Data is loaded through the shared API client; markdown bodies are
//! rendered with [`markdown_to_html`] before being injected.

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use serde::de::DeserializeOwned;
use wasm_bindgen_futures::spawn_local;

use crate::app::AppContext;
use crate::components::PrefetchLink;
use crate::config::{APP_TAGLINE, HOME_POST_LIMIT};
use crate::core::api::create_nonce;
use crate::core::error::{debug_error, parse_error};
use crate::models::{ContactReceipt, ContactRequest, Page, Post, PostSummary};
use crate::utils::markdown_to_html;

/// Loaded value, or a readable error.
type Loaded<T> = Option<Result<T, String>>;

/// GET `path()` whenever it changes and expose the outcome as a signal.
fn use_api_get<T>(path: impl Fn() -> String + 'static) -> ReadSignal<Loaded<T>>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let (state, set_state) = signal::<Loaded<T>>(None);

    Effect::new(move |_| {
        let path = path();
        let api = ctx.api();
        set_state.set(None);

        spawn_local(async move {
            let result = match api.get::<T>(&path).await {
                Ok(value) => Ok(value),
                Err(e) => {
                    if api.is_dev() {
                        debug_error(&e);
                    }
                    parse_error(e)
                }
            };
            set_state.set(Some(result));
        });
    });

    state
}

#[component]
fn Loading() -> impl IntoView {
    view! { <p class="loading">"Loading…"</p> }
}

#[component]
fn LoadError(message: String) -> impl IntoView {
    view! { <p class="error" role="alert">{message}</p> }
}

#[component]
fn PostList(posts: Vec<PostSummary>) -> impl IntoView {
    view! {
        <ul class="post-list">
            {posts
                .into_iter()
                .map(|post| {
                    let href = format!("/blog/{}", post.slug);
                    view! {
                        <li>
                            <PrefetchLink href=href>{post.title}</PrefetchLink>
                            <time>{post.published}</time>
                            <p>{post.summary}</p>
                        </li>
                    }
                })
                .collect::<Vec<_>>()}
        </ul>
    }
}

#[component]
pub fn HomePage() -> impl IntoView {
    let posts = use_api_get::<Vec<PostSummary>>(|| "/posts".to_string());

    view! {
        <section class="hero">
            <p>{APP_TAGLINE}</p>
        </section>
        <section>
            <h2>"Latest writing"</h2>
            {move || match posts.get() {
                None => view! { <Loading /> }.into_any(),
                Some(Ok(list)) => {
                    let latest = list.into_iter().take(HOME_POST_LIMIT).collect::<Vec<_>>();
                    view! { <PostList posts=latest /> }.into_any()
                }
                Some(Err(message)) => view! { <LoadError message=message /> }.into_any(),
            }}
            <PrefetchLink href="/blog">"All posts →"</PrefetchLink>
        </section>
    }
}

#[component]
pub fn BlogPage() -> impl IntoView {
    let posts = use_api_get::<Vec<PostSummary>>(|| "/posts".to_string());

    view! {
        <h1>"Blog"</h1>
        {move || match posts.get() {
            None => view! { <Loading /> }.into_any(),
            Some(Ok(list)) if list.is_empty() => view! { <p>"Nothing here yet."</p> }.into_any(),
            Some(Ok(list)) => view! { <PostList posts=list /> }.into_any(),
            Some(Err(message)) => view! { <LoadError message=message /> }.into_any(),
        }}
    }
}

#[component]
pub fn PostPage(slug: String) -> impl IntoView {
    let path = format!("/posts/{}", slug);
    let post = use_api_get::<Post>(move || path.clone());

    view! {
        {move || match post.get() {
            None => view! { <Loading /> }.into_any(),
            Some(Ok(post)) => {
                let html = markdown_to_html(&post.body);
                view! {
                    <article class="post">
                        <h1>{post.title}</h1>
                        <time>{post.published}</time>
                        <ul class="tags">
                            {post.tags.into_iter().map(|tag| view! { <li>{tag}</li> }).collect::<Vec<_>>()}
                        </ul>
                        <div class="markdown" inner_html=html></div>
                    </article>
                }
                .into_any()
            }
            Some(Err(message)) => view! { <LoadError message=message /> }.into_any(),
        }}
        <PrefetchLink href="/blog">"← Back to all posts"</PrefetchLink>
    }
}

#[component]
pub fn AboutPage() -> impl IntoView {
    let page = use_api_get::<Page>(|| "/pages/about".to_string());

    view! {
        {move || match page.get() {
            None => view! { <Loading /> }.into_any(),
            Some(Ok(page)) => {
                let html = markdown_to_html(&page.body);
                view! {
                    <h1>{page.title}</h1>
                    <div class="markdown" inner_html=html></div>
                }
                .into_any()
            }
            Some(Err(message)) => view! { <LoadError message=message /> }.into_any(),
        }}
    }
}

/// Submission state of the contact form.
#[derive(Debug, Clone, PartialEq)]
enum SendState {
    Idle,
    Sending,
    Sent(String),
    Failed(String),
}

#[component]
pub fn ContactPage() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let message = RwSignal::new(String::new());
    let state = RwSignal::new(SendState::Idle);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if state.get_untracked() == SendState::Sending {
            return;
        }

        let nonce = match create_nonce() {
            Ok(nonce) => nonce,
            Err(e) => {
                state.set(SendState::Failed(e.to_string()));
                return;
            }
        };
        let request = ContactRequest {
            name: name.get_untracked(),
            email: email.get_untracked(),
            message: message.get_untracked(),
            nonce,
        };
        if let Err(reason) = request.validate() {
            state.set(SendState::Failed(reason.to_string()));
            return;
        }

        let api = ctx.api();
        state.set(SendState::Sending);
        spawn_local(async move {
            match api.post::<_, ContactReceipt>("/contact", &request).await {
                Ok(receipt) => {
                    message.set(String::new());
                    state.set(SendState::Sent(receipt.id));
                }
                Err(e) => {
                    debug_error(&e);
                    let reason = parse_error::<()>(e).err().unwrap_or_default();
                    state.set(SendState::Failed(reason));
                }
            }
        });
    };

    view! {
        <h1>"Contact"</h1>
        <form class="contact" on:submit=on_submit>
            <label>
                "Name"
                <input
                    type="text"
                    prop:value=move || name.get()
                    on:input=move |ev| name.set(event_target_value(&ev))
                />
            </label>
            <label>
                "Email"
                <input
                    type="email"
                    prop:value=move || email.get()
                    on:input=move |ev| email.set(event_target_value(&ev))
                />
            </label>
            <label>
                "Message"
                <textarea
                    prop:value=move || message.get()
                    on:input=move |ev| message.set(event_target_value(&ev))
                ></textarea>
            </label>
            <button type="submit" disabled=move || state.get() == SendState::Sending>
                "Send"
            </button>
        </form>
        {move || match state.get() {
            SendState::Idle | SendState::Sending => ().into_any(),
            SendState::Sent(id) => view! {
                <p class="notice">{format!("Thanks! Your message was received (ref {}).", id)}</p>
            }
            .into_any(),
            SendState::Failed(reason) => view! { <LoadError message=reason /> }.into_any(),
        }}
    }
}

#[component]
pub fn NotFoundPage(path: String) -> impl IntoView {
    view! {
        <h1>"Not found"</h1>
        <p>{format!("Nothing lives at {}.", path)}</p>
        <PrefetchLink href="/">"Go home"</PrefetchLink>
    }
}
