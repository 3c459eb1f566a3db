//! Client configuration read from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `CLOSEBOOK_TINVEST_TOKEN` | none | API token, required for live requests |
//! | `CLOSEBOOK_TINVEST_TARGET` | `prod` | `prod` or `sandbox` gateway |
//! | `CLOSEBOOK_TIMEOUT_MS` | `10000` | Per-request timeout |

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::ValidationError;

pub const TOKEN_ENV: &str = "CLOSEBOOK_TINVEST_TOKEN";
pub const TARGET_ENV: &str = "CLOSEBOOK_TINVEST_TARGET";
pub const TIMEOUT_ENV: &str = "CLOSEBOOK_TIMEOUT_MS";

/// API gateway the adapter talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    Prod,
    Sandbox,
}

impl Target {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prod => "prod",
            Self::Sandbox => "sandbox",
        }
    }

    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Prod => "https://invest-public-api.tinkoff.ru/rest",
            Self::Sandbox => "https://sandbox-invest-public-api.tinkoff.ru/rest",
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Ok(Self::Prod),
            "sandbox" => Ok(Self::Sandbox),
            other => Err(ValidationError::InvalidTarget {
                value: other.to_owned(),
            }),
        }
    }
}

/// Connection settings for the T-Invest adapter.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub token: Option<String>,
    pub target: Target,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token: None,
            target: Target::Prod,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = Self {
            token: read(TOKEN_ENV).map(|value| value.trim().to_owned()),
            ..Self::default()
        };
        if let Some(target) = read(TARGET_ENV) {
            config.target = target.parse()?;
        }
        if let Some(timeout) = read(TIMEOUT_ENV) {
            let timeout_ms = timeout
                .trim()
                .parse::<u64>()
                .map_err(|_| ValidationError::InvalidTimeout { value: timeout.clone() })?;
            config = config.with_timeout_ms(timeout_ms)?;
        }
        Ok(config)
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, ValidationError> {
        if timeout_ms == 0 {
            return Err(ValidationError::ZeroTimeout);
        }
        self.timeout_ms = timeout_ms;
        Ok(self)
    }

    pub fn require_token(&self) -> Result<&str, ValidationError> {
        self.token.as_deref().ok_or(ValidationError::MissingToken)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("target", &self.target)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_prod_without_token() {
        let config = ClientConfig::from_lookup(lookup(&[])).expect("must build");
        assert_eq!(config.target, Target::Prod);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(matches!(
            config.require_token(),
            Err(ValidationError::MissingToken)
        ));
    }

    #[test]
    fn reads_token_target_and_timeout() {
        let config = ClientConfig::from_lookup(lookup(&[
            (TOKEN_ENV, " t.secret "),
            (TARGET_ENV, "Sandbox"),
            (TIMEOUT_ENV, "2500"),
        ]))
        .expect("must build");

        assert_eq!(config.require_token().expect("token"), "t.secret");
        assert_eq!(config.target, Target::Sandbox);
        assert_eq!(config.timeout_ms, 2500);
    }

    #[test]
    fn rejects_unknown_target_and_zero_timeout() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(TARGET_ENV, "staging")])),
            Err(ValidationError::InvalidTarget { .. })
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(TIMEOUT_ENV, "0")])),
            Err(ValidationError::ZeroTimeout)
        ));
    }

    #[test]
    fn debug_output_masks_token() {
        let config = ClientConfig {
            token: Some(String::from("t.secret")),
            ..ClientConfig::default()
        };
        assert!(!format!("{config:?}").contains("t.secret"));
    }
}
