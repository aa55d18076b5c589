//! Identity token configuration.

use serde::{Deserialize, Serialize};

/// Settings for validating bearer tokens issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for HMAC-SHA256 token signatures.
    pub jwt_secret: String,
    /// Expected `iss` claim. Tokens from other issuers are rejected.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// Clock skew tolerated when checking `exp`, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

fn default_issuer() -> String {
    "flor-de-lima-identity".to_string()
}

fn default_leeway() -> u64 {
    30
}
