use serde::{Deserialize, Serialize};
use types::PreferenceLevel;

use crate::calendar::DeadlinePolicy;

/// Per-week submission caps. The preferable and less-preferable caps also
/// bound how many slots a driver receives through the matching pass.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PreferenceCaps {
    pub preferable: u32,
    pub less_preferable: u32,
    pub unavailable: u32,
}

impl Default for PreferenceCaps {
    fn default() -> Self {
        Self {
            preferable: 3,
            less_preferable: 2,
            unavailable: 2,
        }
    }
}

impl PreferenceCaps {
    pub fn limit(&self, level: PreferenceLevel) -> u32 {
        match level {
            PreferenceLevel::Preferable => self.preferable,
            PreferenceLevel::LessPreferable => self.less_preferable,
            PreferenceLevel::Unavailable => self.unavailable,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub caps: PreferenceCaps,
    pub deadline: DeadlinePolicy,
    /// Trailing window, in completed weeks, used for historical load.
    pub load_window_weeks: u32,
    /// When no neutral driver exists for a slot, let pass 4 fall back to any
    /// eligible driver. When off, such slots go to the historical pass.
    pub neutral_fallback_any_eligible: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            caps: PreferenceCaps::default(),
            deadline: DeadlinePolicy::default(),
            load_window_weeks: 4,
            neutral_fallback_any_eligible: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"deadline":{"daysBefore":2},"loadWindowWeeks":8}"#)
                .expect("config parses");
        assert_eq!(cfg.deadline.days_before, 2);
        assert_eq!(cfg.deadline.cutoff, DeadlinePolicy::default().cutoff);
        assert_eq!(cfg.load_window_weeks, 8);
        assert_eq!(cfg.caps, PreferenceCaps::default());
        assert!(cfg.neutral_fallback_any_eligible);
    }
}
