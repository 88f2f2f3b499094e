//! Runtime configuration.

use serde::Deserialize;

/// Environment variable consulted by [`Config::from_env`].
pub const BLOCK_CONNECTION_VAR: &str = "HOOKSHOT_BLOCK_CONNECTION";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Refuse to reach the network when no expectation matches. Test suites
    /// turn this on so an unstubbed request fails loudly instead of leaving
    /// the machine.
    pub block_connection: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            block_connection: std::env::var(BLOCK_CONNECTION_VAR)
                .map(|value| is_truthy(&value))
                .unwrap_or(false),
        }
    }

    pub fn blocking() -> Self {
        Self {
            block_connection: true,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
