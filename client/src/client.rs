//! The LoginLlama client.

use crate::context::{ContextCapture, ContextStore};
use crate::error::{LoginLlamaError, Result};
use crate::ip;
use crate::request::RequestView;
use crate::response::{CheckResponse, normalize};
use crate::transport::{HttpTransport, Transport};
use crate::types::AuthenticationOutcome;
use serde::Serialize;

/// Environment variable consulted by [`LoginLlama::from_env`].
pub const API_KEY_ENV: &str = "LOGINLLAMA_API_KEY";

/// Path of the login check operation.
const CHECK_PATH: &str = "/login/check";

/// Per-call overrides and additional context for a login check.
///
/// Every field is optional; anything left unset is auto-detected where the
/// resolution chain allows it.
#[derive(Clone, Debug, Default)]
pub struct CheckOptions {
    /// Override the auto-detected IP address.
    pub ip_address: Option<String>,
    /// Override the auto-detected user agent.
    pub user_agent: Option<String>,
    /// The user's email address.
    pub email_address: Option<String>,
    /// Country name or ISO code.
    pub geo_country: Option<String>,
    /// City name.
    pub geo_city: Option<String>,
    /// The user's local time of day, `HH:mm`.
    pub user_time_of_day: Option<String>,
    /// Outcome of the caller's own credential check.
    pub authentication_outcome: Option<AuthenticationOutcome>,
    /// Request view to extract missing values from.
    pub request: Option<RequestView>,
}

impl CheckOptions {
    /// Empty options: every value auto-detected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: override the IP address.
    #[must_use]
    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    /// Builder: override the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builder: set the user's email address.
    #[must_use]
    pub fn with_email_address(mut self, email_address: impl Into<String>) -> Self {
        self.email_address = Some(email_address.into());
        self
    }

    /// Builder: set the geo country hint.
    #[must_use]
    pub fn with_geo_country(mut self, geo_country: impl Into<String>) -> Self {
        self.geo_country = Some(geo_country.into());
        self
    }

    /// Builder: set the geo city hint.
    #[must_use]
    pub fn with_geo_city(mut self, geo_city: impl Into<String>) -> Self {
        self.geo_city = Some(geo_city.into());
        self
    }

    /// Builder: set the user's local time of day (`HH:mm`).
    #[must_use]
    pub fn with_user_time_of_day(mut self, user_time_of_day: impl Into<String>) -> Self {
        self.user_time_of_day = Some(user_time_of_day.into());
        self
    }

    /// Builder: set the authentication outcome.
    #[must_use]
    pub const fn with_authentication_outcome(mut self, outcome: AuthenticationOutcome) -> Self {
        self.authentication_outcome = Some(outcome);
        self
    }

    /// Builder: supply a request view for auto-detection.
    #[must_use]
    pub fn with_request(mut self, request: RequestView) -> Self {
        self.request = Some(request);
        self
    }
}

/// Outbound payload of `POST /login/check`.
#[derive(Debug, Serialize)]
struct CheckRequest {
    ip_address: String,
    user_agent: String,
    identity_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geo_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geo_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_time_of_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authentication_outcome: Option<AuthenticationOutcome>,
}

/// LoginLlama client for detecting suspicious login attempts.
///
/// IP address and user agent are resolved per check from, in order:
/// explicit overrides in the options, the options' request view, the
/// context store fed by [`LoginLlama::middleware`], and finally the
/// configured fallback view.
///
/// # Example
///
/// ```no_run
/// use loginllama_client::{CheckOptions, LoginLlama};
///
/// # async fn run() -> loginllama_client::Result<()> {
/// let client = LoginLlama::from_env()?;
/// let result = client
///     .check(
///         "user@example.com",
///         CheckOptions::new()
///             .with_ip_address("203.0.113.9")
///             .with_user_agent("Mozilla/5.0"),
///     )
///     .await?;
/// println!("{result:?}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LoginLlama<T = HttpTransport> {
    transport: T,
    store: ContextStore,
    fallback_view: Option<RequestView>,
}

impl LoginLlama<HttpTransport> {
    /// Create a client with an explicit API key against the hosted
    /// endpoint.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self::with_transport(HttpTransport::new(api_key))
    }

    /// Create a client with the API key from the `LOGINLLAMA_API_KEY`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`LoginLlamaError::MissingApiKey`] if the variable is unset
    /// or empty.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or(LoginLlamaError::MissingApiKey)?;
        Ok(Self::new(api_key))
    }
}

impl<T: Transport> LoginLlama<T> {
    /// Create a client over a custom transport.
    #[must_use]
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            store: ContextStore::new(),
            fallback_view: None,
        }
    }

    /// Builder: configure the ambient fallback view, consulted when no
    /// other source resolves an IP or user agent.
    #[must_use]
    pub fn with_fallback_view(mut self, view: RequestView) -> Self {
        self.fallback_view = Some(view);
        self
    }

    /// The context store shared with [`LoginLlama::middleware`].
    #[must_use]
    pub const fn context_store(&self) -> &ContextStore {
        &self.store
    }

    /// Check a login attempt for suspicious activity.
    ///
    /// # Errors
    ///
    /// Validation errors ([`LoginLlamaError::MissingIdentityKey`],
    /// [`LoginLlamaError::MissingIpAddress`],
    /// [`LoginLlamaError::MissingUserAgent`]) are returned before any
    /// network call; transport errors surface unmodified.
    pub async fn check(&self, identity_key: &str, options: CheckOptions) -> Result<CheckResponse> {
        if identity_key.is_empty() {
            return Err(LoginLlamaError::MissingIdentityKey);
        }

        let (ip_address, user_agent) = self.resolve_signals(&options);
        let ip_address = ip_address.ok_or(LoginLlamaError::MissingIpAddress)?;
        let user_agent = user_agent.ok_or(LoginLlamaError::MissingUserAgent)?;

        let payload = CheckRequest {
            ip_address,
            user_agent,
            identity_key: identity_key.to_string(),
            email_address: options.email_address,
            geo_country: options.geo_country,
            geo_city: options.geo_city,
            user_time_of_day: options.user_time_of_day,
            authentication_outcome: options.authentication_outcome,
        };
        let body = serde_json::to_value(&payload)
            .map_err(|e| LoginLlamaError::RequestFailed(e.to_string()))?;

        tracing::debug!(path = CHECK_PATH, "submitting login check");
        let raw = self.transport.post(CHECK_PATH, &body).await?;
        Ok(normalize(raw))
    }

    /// Report a successful authentication.
    ///
    /// Forces the authentication outcome to
    /// [`AuthenticationOutcome::Success`], overriding any caller-supplied
    /// value, then delegates to [`LoginLlama::check`].
    ///
    /// # Errors
    ///
    /// Same as [`LoginLlama::check`].
    pub async fn report_success(
        &self,
        identity_key: &str,
        options: CheckOptions,
    ) -> Result<CheckResponse> {
        self.check(
            identity_key,
            options.with_authentication_outcome(AuthenticationOutcome::Success),
        )
        .await
    }

    /// Report a failed authentication attempt.
    ///
    /// Forces the authentication outcome to
    /// [`AuthenticationOutcome::Failed`]; failed attempts help the service
    /// detect brute force and credential stuffing.
    ///
    /// # Errors
    ///
    /// Same as [`LoginLlama::check`].
    pub async fn report_failure(
        &self,
        identity_key: &str,
        options: CheckOptions,
    ) -> Result<CheckResponse> {
        self.check(
            identity_key,
            options.with_authentication_outcome(AuthenticationOutcome::Failed),
        )
        .await
    }

    /// Handle for capturing request context ahead of check calls.
    ///
    /// Framework glue calls [`ContextCapture::capture`] once per inbound
    /// request; later checks in that request's lifetime then auto-detect
    /// IP and user agent from the stored context.
    #[must_use]
    pub fn middleware(&self) -> ContextCapture {
        ContextCapture::new(self.store.clone())
    }

    /// Legacy flat-parameter entry point.
    ///
    /// # Errors
    ///
    /// Same as [`LoginLlama::check`].
    #[deprecated(note = "use `check` with `CheckOptions`")]
    pub async fn check_login(
        &self,
        ip_address: &str,
        user_agent: &str,
        identity_key: &str,
    ) -> Result<CheckResponse> {
        self.check(
            identity_key,
            CheckOptions::new()
                .with_ip_address(ip_address)
                .with_user_agent(user_agent),
        )
        .await
    }

    /// Resolution chain for IP and user agent, each tracked independently:
    /// explicit override, then the options' request view, then the stored
    /// context, then the fallback view. Empty strings count as absent.
    fn resolve_signals(&self, options: &CheckOptions) -> (Option<String>, Option<String>) {
        let mut ip = options.ip_address.clone().filter(|v| !v.is_empty());
        let mut user_agent = options.user_agent.clone().filter(|v| !v.is_empty());

        if let Some(view) = &options.request {
            if ip.is_none() {
                ip = ip::resolve(view);
            }
            if user_agent.is_none() {
                user_agent = view.user_agent().filter(|v| !v.is_empty());
            }
        }

        if ip.is_none() || user_agent.is_none() {
            if let Some(context) = self.store.get() {
                if ip.is_none() {
                    ip = context.ip_address;
                }
                if user_agent.is_none() {
                    user_agent = context.user_agent;
                }
            }
        }

        if let Some(view) = &self.fallback_view {
            if ip.is_none() {
                ip = ip::resolve(view);
            }
            if user_agent.is_none() {
                user_agent = view.user_agent().filter(|v| !v.is_empty());
            }
        }

        tracing::debug!(
            ip_resolved = ip.is_some(),
            user_agent_resolved = user_agent.is_some(),
            "resolved request signals"
        );
        (ip, user_agent)
    }
}
