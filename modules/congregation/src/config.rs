use serde::{Deserialize, Serialize};

/// `modules.congregation` section of the application config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CongregationConfig {
    /// Page size used when a list request carries no `limit`.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Upper bound applied to any requested `limit`.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl Default for CongregationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_page_size() -> u64 {
    100
}

fn default_max_page_size() -> u64 {
    1000
}
