use serde::{Deserialize, Serialize};

/// Hosted service endpoint used when no base url is configured.
const DEFAULT_URL: &str = "https://app.breakwater.io";

/// Client identifier sent with every request.
const USER_AGENT: &str = "breakwater/0.1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Credentials {
    pub api_token: String,
    pub user_name: String,
    #[serde(default)]
    pub base_url: String,
}

impl Credentials {
    pub fn new(api_token: &str, user_name: &str, base_url: &str) -> Self {
        Self {
            api_token: api_token.to_string(),
            user_name: user_name.to_string(),
            base_url: base_url.to_string(),
        }
    }

    /// Service url, falling back to the hosted default when blank.
    pub fn url(&self) -> &str {
        if self.base_url.is_empty() {
            DEFAULT_URL
        } else {
            &self.base_url
        }
    }

    pub fn user_agent(&self) -> &'static str {
        USER_AGENT
    }
}
