//! # LoginLlama API Client
//!
//! Rust client library for the LoginLlama login risk assessment API:
//! check login attempts for suspicious activity, report authentication
//! outcomes, and capture request context through framework middleware.
//!
//! ## Example
//!
//! ```no_run
//! use loginllama_client::{CheckOptions, LoginLlama};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create client from LOGINLLAMA_API_KEY environment variable
//!     let client = LoginLlama::from_env()?;
//!
//!     // Check a login attempt with explicit context
//!     let response = client
//!         .check(
//!             "user@example.com",
//!             CheckOptions::new()
//!                 .with_ip_address("203.0.113.9")
//!                 .with_user_agent("Mozilla/5.0"),
//!         )
//!         .await?;
//!
//!     println!("Response: {response:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - Automatic IP/user-agent detection across explicit overrides, request
//!   views, middleware-captured context, and a configurable fallback
//! - Public/private IP classification over proxy and CDN headers
//! - Normalization of both upstream wire formats (legacy flat JSON and
//!   JSON:API documents) into one stable result shape
//! - Pluggable transport with a recording mock for tests

pub mod client;
pub mod context;
pub mod error;
pub mod ip;
pub mod mocks;
pub mod request;
pub mod response;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{API_KEY_ENV, CheckOptions, LoginLlama};
pub use context::{ContextCapture, ContextStore, RequestContext};
pub use error::{LoginLlamaError, Result};
pub use request::{Framework, FrameworkRequest, RequestView};
pub use response::{CheckResponse, CheckResult, CheckStatus, normalize};
pub use transport::{API_ENDPOINT, HttpTransport, Transport};
pub use types::{AuthenticationOutcome, risk_codes};
