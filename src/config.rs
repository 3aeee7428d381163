//! SDK settings loaded from the environment
//!
//! `SdkSettings::from_env` reads a `.env` file first (via `dotenvy`) and then
//! the process environment. Tests use [`SdkSettings::from_lookup`] so they
//! never touch global state.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const LOG_FILTER_VAR: &str = "PAYMENT_SDK_LOG";
pub const ANALYTICS_VAR: &str = "PAYMENT_SDK_ANALYTICS";
pub const ENVIRONMENT_VAR: &str = "PAYMENT_SDK_ENVIRONMENT";
pub const LOG_SOURCE_VAR: &str = "PAYMENT_SDK_LOG_SOURCE";

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{var} must be a boolean, got '{value}'")]
    InvalidBool { var: &'static str, value: String },

    #[error("{var} must be one of sandbox, staging, production, got '{value}'")]
    InvalidEnvironment { var: &'static str, value: String },
}

/// Backend environment the SDK talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "dev" | "development" => Ok(Self::Sandbox),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(()),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sandbox => write!(f, "sandbox"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for the error core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkSettings {
    /// `EnvFilter` directive for the tracing subscriber
    pub log_filter: String,
    /// Whether the analytics handler is registered at start-up
    pub analytics_enabled: bool,
    pub environment: Environment,
    /// Include file and line in log records
    pub log_source_location: bool,
}

impl Default for SdkSettings {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            analytics_enabled: true,
            environment: Environment::default(),
            log_source_location: true,
        }
    }
}

impl SdkSettings {
    /// Load settings from `.env` and the process environment
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let log_filter = lookup(LOG_FILTER_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.log_filter);
        let analytics_enabled = match lookup(ANALYTICS_VAR) {
            Some(value) => parse_bool(ANALYTICS_VAR, &value)?,
            None => defaults.analytics_enabled,
        };
        let log_source_location = match lookup(LOG_SOURCE_VAR) {
            Some(value) => parse_bool(LOG_SOURCE_VAR, &value)?,
            None => defaults.log_source_location,
        };
        let environment = match lookup(ENVIRONMENT_VAR) {
            Some(value) => value
                .parse::<Environment>()
                .map_err(|_| SettingsError::InvalidEnvironment {
                    var: ENVIRONMENT_VAR,
                    value,
                })?,
            None => defaults.environment,
        };

        Ok(Self {
            log_filter,
            analytics_enabled,
            environment,
            log_source_location,
        })
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = SdkSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, SdkSettings::default());
    }

    #[test]
    fn test_overrides() {
        let settings = SdkSettings::from_lookup(lookup(&[
            (LOG_FILTER_VAR, "payment_diagnostics_lib=debug"),
            (ANALYTICS_VAR, "off"),
            (ENVIRONMENT_VAR, "Production"),
            (LOG_SOURCE_VAR, "0"),
        ]))
        .unwrap();

        assert_eq!(settings.log_filter, "payment_diagnostics_lib=debug");
        assert!(!settings.analytics_enabled);
        assert_eq!(settings.environment, Environment::Production);
        assert!(!settings.log_source_location);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = SdkSettings::from_lookup(lookup(&[(ANALYTICS_VAR, "maybe")])).unwrap_err();
        assert_eq!(
            err,
            SettingsError::InvalidBool {
                var: ANALYTICS_VAR,
                value: "maybe".into()
            }
        );

        let err = SdkSettings::from_lookup(lookup(&[(ENVIRONMENT_VAR, "moon")])).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidEnvironment { .. }));
    }
}
