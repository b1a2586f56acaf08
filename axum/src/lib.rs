//! Axum integration for the LoginLlama client.
//!
//! This crate provides:
//! - [`AxumRequestView`]: a snapshot of an axum request implementing the
//!   client's request-view capability set
//! - [`context_capture_layer`]: a tower layer that captures every inbound
//!   request into a [`ContextStore`] before the inner service runs
//!
//! # Example
//!
//! ```ignore
//! use axum::{routing::post, Router};
//! use loginllama_axum::context_capture_layer;
//! use loginllama_client::LoginLlama;
//!
//! let client = LoginLlama::from_env()?;
//! let app = Router::new()
//!     .route("/login", post(login))
//!     .layer(context_capture_layer(client.context_store().clone()));
//! // Handlers can now call `client.check(email, CheckOptions::new())`
//! // and have IP/user agent auto-detected from the captured context.
//! ```
//!
//! # Concurrency
//!
//! A store shared across concurrent requests is last-write-wins: a check
//! call may observe another in-flight request's context. When handlers run
//! concurrently, prefer passing the request explicitly per call:
//!
//! ```ignore
//! let view = AxumRequestView::from_request(&request).into_view();
//! client.check(email, CheckOptions::new().with_request(view)).await?;
//! ```

use axum::extract::connect_info::ConnectInfo;
use axum::http::HeaderMap;
use loginllama_client::{ContextStore, Framework, FrameworkRequest, RequestView};
use std::net::SocketAddr;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Snapshot of an axum request: headers plus the connection's peer
/// address, when `ConnectInfo` is available.
#[derive(Clone, Debug)]
pub struct AxumRequestView {
    headers: HeaderMap,
    peer_addr: Option<SocketAddr>,
}

impl AxumRequestView {
    /// Snapshot `request`'s headers and peer address.
    ///
    /// The peer address comes from the [`ConnectInfo`] extension and is
    /// present only when the app was served with
    /// `into_make_service_with_connect_info`.
    #[must_use]
    pub fn from_request<B>(request: &axum::http::Request<B>) -> Self {
        Self {
            headers: request.headers().clone(),
            peer_addr: request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0),
        }
    }

    /// Wrap the snapshot in a [`RequestView`].
    #[must_use]
    pub fn into_view(self) -> RequestView {
        RequestView::Framework(Arc::new(self))
    }
}

impl FrameworkRequest for AxumRequestView {
    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string)
    }

    fn remote_addr(&self) -> Option<String> {
        self.peer_addr.map(|addr| addr.ip().to_string())
    }

    fn framework(&self) -> Framework {
        Framework::Axum
    }
}

/// Create a layer that captures every inbound request into `store`.
///
/// The capture runs before the inner service, so handlers (and anything
/// they call) observe the current request's context. Intended to be
/// installed once on the router, with the store taken from
/// `LoginLlama::context_store`.
#[must_use]
pub fn context_capture_layer(store: ContextStore) -> ContextCaptureLayer {
    ContextCaptureLayer { store }
}

/// Layer for request-context capture.
#[derive(Clone, Debug)]
pub struct ContextCaptureLayer {
    store: ContextStore,
}

impl<S> Layer<S> for ContextCaptureLayer {
    type Service = ContextCaptureService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ContextCaptureService {
            inner,
            store: self.store.clone(),
        }
    }
}

/// Middleware service for request-context capture.
#[derive(Clone, Debug)]
pub struct ContextCaptureService<S> {
    inner: S,
    store: ContextStore,
}

impl<S, B> Service<axum::http::Request<B>> for ContextCaptureService<S>
where
    S: Service<axum::http::Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: axum::http::Request<B>) -> Self::Future {
        let view = AxumRequestView::from_request(&request).into_view();
        self.store.set(view);
        tracing::trace!("captured request context for login checks");
        self.inner.call(request)
    }
}
