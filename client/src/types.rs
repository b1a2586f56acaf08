//! Wire-level constants shared with the LoginLlama service.

use serde::{Deserialize, Serialize};

/// Risk codes the service attaches to a login check result.
///
/// The set is open-ended; results carry codes as plain strings and new
/// codes may appear without a client update. These constants cover the
/// codes the service documents today.
pub mod risk_codes {
    /// No suspicious signal detected.
    pub const LOGIN_VALID: &str = "login_valid";
    /// The IP address looks suspicious.
    pub const IP_ADDRESS_SUSPICIOUS: &str = "ip_address_suspicious";
    /// The device fingerprint looks suspicious.
    pub const DEVICE_FINGERPRINT_SUSPICIOUS: &str = "device_fingerprint_suspicious";
    /// The location fingerprint looks suspicious.
    pub const LOCATION_FINGERPRINT_SUSPICIOUS: &str = "location_fingerprint_suspicious";
    /// The behavioral fingerprint looks suspicious.
    pub const BEHAVIORAL_FINGERPRINT_SUSPICIOUS: &str = "behavioral_fingerprint_suspicious";
    /// The IP is a known Tor exit node.
    pub const KNOWN_TOR_EXIT_NODE: &str = "known_tor_exit_node";
    /// The IP is a known proxy.
    pub const KNOWN_PROXY: &str = "known_proxy";
    /// The IP is a known VPN endpoint.
    pub const KNOWN_VPN: &str = "known_vpn";
    /// The IP belongs to a known botnet.
    pub const KNOWN_BOTNET: &str = "known_botnet";
    /// The user agent is a known bot.
    pub const KNOWN_BOT: &str = "known_bot";
    /// First login from this IP address.
    pub const IP_ADDRESS_NOT_USED_BEFORE: &str = "ip_address_not_used_before";
    /// First login from this device fingerprint.
    pub const DEVICE_FINGERPRINT_NOT_USED_BEFORE: &str = "device_fingerprint_not_used_before";
    /// The service's model flagged the attempt as suspicious.
    pub const AI_DETECTED_SUSPICIOUS: &str = "ai_detected_suspicious";
}

/// Outcome of the caller's own credential check, reported alongside the
/// login attempt.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthenticationOutcome {
    /// Credentials were valid.
    Success,
    /// Credentials were invalid (wrong password, MFA failed, etc.).
    Failed,
    /// Pre-auth check; outcome not yet known.
    Pending,
}

impl AuthenticationOutcome {
    /// Wire value for this outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Pending => "pending",
        }
    }
}
