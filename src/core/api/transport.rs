//! HTTP transport for the API client.
//!
//! [`Transport`] is the seam between the client and the network. The browser
//! implementation [`FetchTransport`] uses the Fetch API raced against a timeout.

use js_sys::{Array, Promise};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response, Window};

use crate::config::FETCH_TIMEOUT_MS;
use crate::core::error::TransportError;

/// HTTP method used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Outgoing request, fully assembled by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response as seen by the client: status, validator and raw body text.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub etag: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_modified(&self) -> bool {
        self.status == 304
    }
}

/// Sends one request and returns whatever the server answered.
///
/// Any HTTP status is a successful send; only failures to get a response
/// at all (DNS, refused connection, timeout) are errors.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

// =============================================================================
// Fetch Transport
// =============================================================================

/// Browser transport built on `window.fetch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let window = web_sys::window().ok_or(TransportError::NoWindow)?;

        let headers = Headers::new().map_err(|_| TransportError::RequestCreationFailed)?;
        for (name, value) in &request.headers {
            headers
                .set(name, value)
                .map_err(|_| TransportError::RequestCreationFailed)?;
        }

        let opts = RequestInit::new();
        opts.set_method(request.method.as_str());
        opts.set_mode(RequestMode::Cors);
        opts.set_headers(&headers);
        if let Some(body) = &request.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let js_request = Request::new_with_str_and_init(&request.url, &opts)
            .map_err(|_| TransportError::RequestCreationFailed)?;

        let resp = fetch_within(&window, &js_request, FETCH_TIMEOUT_MS).await?;
        read_response(resp).await
    }
}

/// Fetch `request`, giving up after `timeout_ms`.
///
/// The timer promise resolves to `undefined`, which no fetch can settle to.
async fn fetch_within(
    window: &Window,
    request: &Request,
    timeout_ms: i32,
) -> Result<Response, TransportError> {
    let timer = Promise::new(&mut |resolve, _| {
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, timeout_ms);
    });
    let contenders = Array::of2(&window.fetch_with_request(request), &timer);

    let settled = JsFuture::from(Promise::race(&contenders))
        .await
        .map_err(|e| TransportError::Network(e.as_string().unwrap_or_else(|| format!("{:?}", e))))?;

    if settled.is_undefined() {
        return Err(TransportError::Timeout);
    }
    settled
        .dyn_into::<Response>()
        .map_err(|_| TransportError::ResponseReadFailed)
}

/// Status, `ETag` and body text of a settled response.
async fn read_response(resp: Response) -> Result<HttpResponse, TransportError> {
    let etag = resp.headers().get("ETag").ok().flatten();

    let text_promise = resp.text().map_err(|_| TransportError::ResponseReadFailed)?;
    let text = JsFuture::from(text_promise)
        .await
        .map_err(|_| TransportError::ResponseReadFailed)?;

    Ok(HttpResponse {
        status: resp.status(),
        etag,
        body: text.as_string().unwrap_or_default(),
    })
}
