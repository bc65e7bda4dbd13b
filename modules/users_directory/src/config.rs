use serde::{Deserialize, Serialize};

/// Configuration for the users_directory module (`modules.users_directory`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UsersDirectoryConfig {
    /// Lifetime of the cached full user list.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Upper bound for name, surname and username lengths.
    #[serde(default = "default_max_field_length")]
    pub max_field_length: usize,
    #[serde(default)]
    pub token: TokenConfig,
}

/// Bearer token handling for the search route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    /// HS256 secret. When absent, tokens are decoded without signature checks.
    #[serde(default)]
    pub verify_secret: Option<String>,
}

impl Default for UsersDirectoryConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            max_field_length: default_max_field_length(),
            token: TokenConfig::default(),
        }
    }
}

fn default_cache_ttl_secs() -> u64 {
    600
}

fn default_max_field_length() -> usize {
    100
}
