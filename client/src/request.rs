//! Request views supplied by callers.
//!
//! The client never owns the inbound HTTP request; callers hand it a
//! [`RequestView`] describing however their environment represents one.
//! The view is resolved once at the integration boundary: framework
//! adapters implement [`FrameworkRequest`] and declare which [`Framework`]
//! they integrate with, while CGI-style server metadata is passed as a
//! plain key-value map.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Web framework that produced a request view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Framework {
    /// An axum request, captured by the `loginllama-axum` adapter.
    Axum,
    /// An actix-web request, captured by a caller-supplied adapter.
    ActixWeb,
    /// A raw CGI-style server-metadata map.
    Raw,
    /// Origin unknown: no view, or an adapter that declares no framework.
    Unknown,
}

impl Framework {
    /// Stable lowercase name for logging and serialization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Axum => "axum",
            Self::ActixWeb => "actix-web",
            Self::Raw => "raw",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability interface implemented by framework adapters.
///
/// Adapters are expected to be cheap snapshots of the live request (headers
/// plus peer address), not handles into the framework's request lifecycle.
pub trait FrameworkRequest: Send + Sync {
    /// Look up a header by its canonical name, e.g. `X-Forwarded-For`.
    fn header(&self, name: &str) -> Option<String>;

    /// Transport-layer peer address of the connection, if known.
    fn remote_addr(&self) -> Option<String>;

    /// Framework this adapter integrates with.
    fn framework(&self) -> Framework {
        Framework::Unknown
    }

    /// User agent reported by the client.
    fn user_agent(&self) -> Option<String> {
        self.header("User-Agent")
    }
}

/// A read-only view over however the caller represents an inbound request.
///
/// Cloning is cheap: the map variant clones its entries, the framework
/// variant clones an [`Arc`].
#[derive(Clone)]
pub enum RequestView {
    /// Raw server metadata in CGI form: headers under uppercased
    /// `HTTP_*` keys, the peer address under `REMOTE_ADDR`.
    ServerMap(HashMap<String, String>),
    /// A live framework request behind the [`FrameworkRequest`] capability
    /// set.
    Framework(Arc<dyn FrameworkRequest>),
}

impl RequestView {
    /// Header lookup across view shapes.
    ///
    /// Map views use the CGI key form: uppercased, dashes replaced with
    /// underscores, prefixed with `HTTP_`. `X-Forwarded-For` is looked up
    /// as `HTTP_X_FORWARDED_FOR`.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<String> {
        match self {
            Self::ServerMap(map) => {
                let key = format!("HTTP_{}", name.to_uppercase().replace('-', "_"));
                map.get(&key).cloned()
            }
            Self::Framework(request) => request.header(name),
        }
    }

    /// Direct connection peer address.
    #[must_use]
    pub fn remote_addr(&self) -> Option<String> {
        match self {
            Self::ServerMap(map) => map.get("REMOTE_ADDR").cloned(),
            Self::Framework(request) => request.remote_addr(),
        }
    }

    /// User agent reported by the client.
    #[must_use]
    pub fn user_agent(&self) -> Option<String> {
        match self {
            Self::ServerMap(map) => map.get("HTTP_USER_AGENT").cloned(),
            Self::Framework(request) => request.user_agent(),
        }
    }

    /// Framework tag declared by the view.
    #[must_use]
    pub fn framework(&self) -> Framework {
        match self {
            Self::ServerMap(_) => Framework::Raw,
            Self::Framework(request) => request.framework(),
        }
    }
}

impl fmt::Debug for RequestView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerMap(map) => f.debug_tuple("ServerMap").field(map).finish(),
            Self::Framework(request) => f
                .debug_tuple("Framework")
                .field(&request.framework())
                .finish(),
        }
    }
}

impl From<HashMap<String, String>> for RequestView {
    fn from(map: HashMap<String, String>) -> Self {
        Self::ServerMap(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_map(entries: &[(&str, &str)]) -> RequestView {
        RequestView::ServerMap(
            entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    struct FakeRequest;

    impl FrameworkRequest for FakeRequest {
        fn header(&self, name: &str) -> Option<String> {
            (name == "X-Real-IP").then(|| "203.0.113.7".to_string())
        }

        fn remote_addr(&self) -> Option<String> {
            Some("10.1.2.3".to_string())
        }

        fn framework(&self) -> Framework {
            Framework::ActixWeb
        }
    }

    #[test]
    fn test_server_map_header_uses_cgi_key_form() {
        let view = server_map(&[("HTTP_X_FORWARDED_FOR", "203.0.113.9")]);
        assert_eq!(
            view.header("X-Forwarded-For"),
            Some("203.0.113.9".to_string())
        );
        assert_eq!(view.header("CF-Connecting-IP"), None);
    }

    #[test]
    fn test_server_map_remote_addr_and_user_agent() {
        let view = server_map(&[
            ("REMOTE_ADDR", "192.0.2.1"),
            ("HTTP_USER_AGENT", "Mozilla/5.0"),
        ]);
        assert_eq!(view.remote_addr(), Some("192.0.2.1".to_string()));
        assert_eq!(view.user_agent(), Some("Mozilla/5.0".to_string()));
        assert_eq!(view.framework(), Framework::Raw);
    }

    #[test]
    fn test_framework_view_delegates_to_adapter() {
        let view = RequestView::Framework(Arc::new(FakeRequest));
        assert_eq!(view.header("X-Real-IP"), Some("203.0.113.7".to_string()));
        assert_eq!(view.header("X-Forwarded-For"), None);
        assert_eq!(view.remote_addr(), Some("10.1.2.3".to_string()));
        assert_eq!(view.framework(), Framework::ActixWeb);
    }

    #[test]
    fn test_default_user_agent_routes_through_header() {
        struct UaRequest;
        impl FrameworkRequest for UaRequest {
            fn header(&self, name: &str) -> Option<String> {
                (name == "User-Agent").then(|| "TestAgent/1.0".to_string())
            }
            fn remote_addr(&self) -> Option<String> {
                None
            }
        }

        let view = RequestView::Framework(Arc::new(UaRequest));
        assert_eq!(view.user_agent(), Some("TestAgent/1.0".to_string()));
        assert_eq!(view.framework(), Framework::Unknown);
    }
}
