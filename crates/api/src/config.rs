use carpool_core::{EngineConfig, PreferenceCaps};
use chrono::NaiveTime;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const PREFIX: &str = "CARPOOL__";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has invalid value `{value}`")]
    Invalid { key: String, value: String },
}

/// Process settings, read from `CARPOOL__SECTION__KEY` variables.
#[derive(Clone, Debug)]
pub struct Settings {
    pub port: u16,
    pub engine: EngineConfig,
    pub fixture: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| get(&format!("{PREFIX}{key}"));

        let defaults = EngineConfig::default();
        let mut engine = defaults.clone();
        engine.caps = PreferenceCaps {
            preferable: parse(&read, "CAPS__PREFERABLE")?.unwrap_or(defaults.caps.preferable),
            less_preferable: parse(&read, "CAPS__LESS_PREFERABLE")?
                .unwrap_or(defaults.caps.less_preferable),
            unavailable: parse(&read, "CAPS__UNAVAILABLE")?.unwrap_or(defaults.caps.unavailable),
        };
        if let Some(days) = parse(&read, "DEADLINE__DAYS_BEFORE")? {
            engine.deadline.days_before = days;
        }
        if let Some(raw) = read("DEADLINE__CUTOFF") {
            engine.deadline.cutoff = NaiveTime::parse_from_str(raw.trim(), types::hhmm::FORMAT)
                .map_err(|_| invalid("DEADLINE__CUTOFF", &raw))?;
        }
        if let Some(weeks) = parse(&read, "LOAD__WINDOW_WEEKS")? {
            engine.load_window_weeks = weeks;
        }
        if let Some(flag) = parse(&read, "NEUTRAL__FALLBACK_ANY_ELIGIBLE")? {
            engine.neutral_fallback_any_eligible = flag;
        }

        Ok(Self {
            port: parse(&read, "SERVER__PORT")?.unwrap_or(8080),
            engine,
            fixture: read("FIXTURE").filter(|p| !p.trim().is_empty()).map(PathBuf::from),
        })
    }
}

fn parse<T: FromStr>(
    read: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match read(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, &raw)),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key: format!("{PREFIX}{key}"),
        value: value.to_string(),
    }
}
