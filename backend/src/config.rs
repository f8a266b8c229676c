//! Configuration.
//!
//! [`ExpandOptions`] is the only knob the core takes and is passed explicitly
//! to every entry point. [`Settings`] is the host-side view, loaded from the
//! environment (and `.env`) by the CLI and the server.

use chrono_tz::Tz;
use std::env;

use crate::error::ConfigError;

/// Zone used when the course info carries no timezone.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

/// Highest `end_week` accepted by validation.
pub const DEFAULT_MAX_WEEK: u32 = 10;

/// Default Anthropic model for syllabus extraction.
pub const DEFAULT_AI_MODEL: &str = "claude-sonnet-4-20250514";

/// Options threaded through validation and expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Fallback zone for courses without an explicit `timezone`.
    pub default_timezone: Tz,
    /// Upper bound on `end_week`. Terms longer than this many weeks cannot
    /// be described by a single rule.
    pub max_week: u32,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            default_timezone: DEFAULT_TIMEZONE,
            max_week: DEFAULT_MAX_WEEK,
        }
    }
}

impl ExpandOptions {
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.default_timezone = tz;
        self
    }

    pub fn with_max_week(mut self, max_week: u32) -> Self {
        self.max_week = max_week;
        self
    }
}

/// Host configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub expand: ExpandOptions,
    pub anthropic_api_key: Option<String>,
    pub ai_model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            expand: ExpandOptions::default(),
            anthropic_api_key: None,
            ai_model: DEFAULT_AI_MODEL.to_string(),
        }
    }
}

impl Settings {
    /// Load from the process environment, reading `.env` first if present.
    ///
    /// | Variable              | Default                 |
    /// |-----------------------|-------------------------|
    /// | `SYLLABUS_DEFAULT_TZ` | `America/Los_Angeles`   |
    /// | `SYLLABUS_MAX_WEEK`   | `10`                    |
    /// | `SYLLABUS_AI_MODEL`   | [`DEFAULT_AI_MODEL`]    |
    /// | `ANTHROPIC_API_KEY`   | unset (extraction off)  |
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(value) = get("SYLLABUS_DEFAULT_TZ") {
            settings.expand.default_timezone = parse_timezone("SYLLABUS_DEFAULT_TZ", &value)?;
        }

        if let Some(value) = get("SYLLABUS_MAX_WEEK") {
            let max_week: u32 = value.trim().parse().map_err(|e| ConfigError::InvalidValue {
                var: "SYLLABUS_MAX_WEEK",
                message: format!("{}: {}", value, e),
            })?;
            if max_week == 0 {
                return Err(ConfigError::InvalidValue {
                    var: "SYLLABUS_MAX_WEEK",
                    message: "must be at least 1".to_string(),
                });
            }
            settings.expand.max_week = max_week;
        }

        if let Some(model) = get("SYLLABUS_AI_MODEL") {
            settings.ai_model = model;
        }

        settings.anthropic_api_key = get("ANTHROPIC_API_KEY");

        Ok(settings)
    }
}

/// Parse an IANA zone name for a config variable.
pub fn parse_timezone(var: &'static str, value: &str) -> Result<Tz, ConfigError> {
    value
        .trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::UnknownTimezone {
            var,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.expand.default_timezone, chrono_tz::America::Los_Angeles);
        assert_eq!(settings.expand.max_week, 10);
        assert_eq!(settings.ai_model, DEFAULT_AI_MODEL);
        assert!(settings.anthropic_api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("SYLLABUS_DEFAULT_TZ", "America/New_York"),
            ("SYLLABUS_MAX_WEEK", "16"),
            ("ANTHROPIC_API_KEY", "sk-test"),
        ]))
        .unwrap();
        assert_eq!(settings.expand.default_timezone, chrono_tz::America::New_York);
        assert_eq!(settings.expand.max_week, 16);
        assert_eq!(settings.anthropic_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let settings = Settings::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "  ")])).unwrap();
        assert!(settings.anthropic_api_key.is_none());
    }

    #[test]
    fn test_bad_values() {
        let err = Settings::from_lookup(lookup(&[("SYLLABUS_DEFAULT_TZ", "Mars/Olympus")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTimezone { .. }));

        let err = Settings::from_lookup(lookup(&[("SYLLABUS_MAX_WEEK", "ten")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = Settings::from_lookup(lookup(&[("SYLLABUS_MAX_WEEK", "0")])).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_builder() {
        let opts = ExpandOptions::default()
            .with_timezone(chrono_tz::UTC)
            .with_max_week(12);
        assert_eq!(opts.default_timezone, chrono_tz::UTC);
        assert_eq!(opts.max_week, 12);
    }
}
