use serde::{Deserialize, Serialize};

const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;
const DEFAULT_BODY_LIMIT_BYTES: usize = 16 * 1024 * 1024;

/// `modules.api_ingress` section of the application config.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiIngressConfig {
    /// Listen address; the server derives it from `server.host`/`server.port` when unset.
    pub bind_addr: Option<String>,
    /// Serve `/openapi.json` and `/docs`.
    pub enable_docs: bool,
    /// Allow any origin, method and header.
    pub cors_enabled: bool,
    pub request_timeout_sec: u64,
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: None,
            enable_docs: false,
            cors_enabled: true,
            request_timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}
