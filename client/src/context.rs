//! Captured request context and the single-slot store.
//!
//! A middleware hook captures each inbound request into a [`ContextStore`]
//! so that later check calls in the same logical request can reuse the
//! resolved IP and user agent without re-supplying the request.

use crate::ip;
use crate::request::{Framework, RequestView};
use std::sync::{Arc, PoisonError, RwLock};

/// The `{ip, user agent, framework}` tuple captured from one inbound
/// request.
///
/// Immutable once constructed; superseded by the next capture.
#[derive(Clone, Debug)]
pub struct RequestContext {
    /// Best-guess client IP, if one could be resolved.
    pub ip_address: Option<String>,
    /// Client user agent, if reported.
    pub user_agent: Option<String>,
    /// Framework that produced the view.
    pub framework: Framework,
    /// The view this context was extracted from.
    pub view: RequestView,
}

impl RequestContext {
    /// Extract a context from a request view.
    ///
    /// IP resolution runs the proxy-header chain; the user agent comes from
    /// the view's user-agent accessor. Empty strings count as absent.
    #[must_use]
    pub fn extract(view: RequestView) -> Self {
        let ip_address = ip::resolve(&view);
        let user_agent = view.user_agent().filter(|ua| !ua.is_empty());
        let framework = view.framework();
        tracing::debug!(
            framework = %framework,
            ip_resolved = ip_address.is_some(),
            user_agent_resolved = user_agent.is_some(),
            "captured request context"
        );
        Self {
            ip_address,
            user_agent,
            framework,
            view,
        }
    }
}

/// Single-slot store for the most recently captured request context.
///
/// The store is a cheaply cloneable handle; every clone shares the same
/// slot. It assumes at most one active logical request per handle: when
/// concurrent requests share one store, captures race last-write-wins and
/// a check call may read another request's context. Callers in concurrent
/// environments should pass the request explicitly per call instead of
/// relying on the store.
#[derive(Clone, Debug, Default)]
pub struct ContextStore {
    slot: Arc<RwLock<Option<RequestContext>>>,
}

impl ContextStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture `view`, replacing any previously stored context.
    ///
    /// Framework, IP, and user agent are re-extracted on every call.
    pub fn set(&self, view: RequestView) {
        let context = RequestContext::extract(view);
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(context);
    }

    /// The current context, if one has been captured.
    #[must_use]
    pub fn get(&self) -> Option<RequestContext> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the stored context.
    pub fn clear(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }
}

/// Cloneable handle that captures inbound requests into a [`ContextStore`].
///
/// Returned by `LoginLlama::middleware`; framework glue calls
/// [`ContextCapture::capture`] once per inbound request, before any check
/// call in that request's lifetime.
#[derive(Clone, Debug)]
pub struct ContextCapture {
    store: ContextStore,
}

impl ContextCapture {
    /// Create a capture handle over `store`.
    #[must_use]
    pub const fn new(store: ContextStore) -> Self {
        Self { store }
    }

    /// Capture `view`, replacing any stored context.
    pub fn capture(&self, view: RequestView) {
        self.store.set(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn server_view(entries: &[(&str, &str)]) -> RequestView {
        RequestView::ServerMap(
            entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_extract_resolves_ip_and_user_agent() {
        let context = RequestContext::extract(server_view(&[
            ("HTTP_X_FORWARDED_FOR", "203.0.113.9"),
            ("HTTP_USER_AGENT", "Mozilla/5.0"),
            ("REMOTE_ADDR", "10.0.0.1"),
        ]));

        assert_eq!(context.ip_address, Some("203.0.113.9".to_string()));
        assert_eq!(context.user_agent, Some("Mozilla/5.0".to_string()));
        assert_eq!(context.framework, Framework::Raw);
    }

    #[test]
    fn test_extract_treats_empty_user_agent_as_absent() {
        let context = RequestContext::extract(server_view(&[("HTTP_USER_AGENT", "")]));
        assert_eq!(context.user_agent, None);
    }

    #[test]
    fn test_store_set_then_get_round_trips() {
        let store = ContextStore::new();
        assert!(store.get().is_none());

        store.set(server_view(&[("REMOTE_ADDR", "192.0.2.1")]));
        let context = store.get().map(|c| c.ip_address);
        assert_eq!(context, Some(Some("192.0.2.1".to_string())));
    }

    #[test]
    fn test_store_last_write_wins() {
        let store = ContextStore::new();
        store.set(server_view(&[("REMOTE_ADDR", "192.0.2.1")]));
        store.set(server_view(&[("REMOTE_ADDR", "198.51.100.2")]));

        let context = store.get().map(|c| c.ip_address);
        assert_eq!(context, Some(Some("198.51.100.2".to_string())));
    }

    #[test]
    fn test_store_clear_empties_slot() {
        let store = ContextStore::new();
        store.set(server_view(&[("REMOTE_ADDR", "192.0.2.1")]));
        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_clones_share_the_slot() {
        let store = ContextStore::new();
        let capture = ContextCapture::new(store.clone());
        capture.capture(server_view(&[("REMOTE_ADDR", "192.0.2.1")]));

        assert!(store.get().is_some());
    }
}
