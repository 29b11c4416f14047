//! Client settings read from the environment.
//!
//! `CARSPA_BASE_URL` points the client at a server and `CARSPA_USER_AGENT`
//! overrides the user agent. A `.env` file in the working directory is
//! loaded first when present. Unset or blank values fall back to the local
//! mock server defaults.

use std::env;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Read `CARSPA_BASE_URL` and `CARSPA_USER_AGENT`, loading a `.env` file
    /// first when one exists.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self {
            base_url: env::var("CARSPA_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            user_agent: env::var("CARSPA_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn default_user_agent() -> String {
    format!("carspa-core/{}", env!("CARGO_PKG_VERSION"))
}
