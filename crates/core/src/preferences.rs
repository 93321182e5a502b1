use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use types::{PreferenceInput, PreferenceLevel};

use crate::calendar::{parse_week_start, DeadlinePolicy};
use crate::config::PreferenceCaps;
use crate::error::ValidationError;

/// A preference set that passed every submission rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcceptedPreferences {
    pub week_start: NaiveDate,
    pub entries: Vec<PreferenceInput>,
}

/// Submission rules for one driver's weekly preference set. Stateless; the
/// caller supplies the current time.
#[derive(Clone, Debug, Default)]
pub struct PreferenceValidator {
    caps: PreferenceCaps,
    deadline: DeadlinePolicy,
}

impl PreferenceValidator {
    pub fn new(caps: PreferenceCaps, deadline: DeadlinePolicy) -> Self {
        Self { caps, deadline }
    }

    pub fn validate(
        &self,
        week_start: &str,
        preferences: &[PreferenceInput],
        now: NaiveDateTime,
    ) -> Result<AcceptedPreferences, ValidationError> {
        let week_start = parse_week_start(week_start)?;

        if preferences.is_empty() {
            return Err(ValidationError::EmptyPreferences);
        }

        let mut seen = HashSet::new();
        for p in preferences {
            if !seen.insert(&p.template_slot_id) {
                return Err(ValidationError::DuplicateSlot(p.template_slot_id.clone()));
            }
        }

        for level in [
            PreferenceLevel::Preferable,
            PreferenceLevel::LessPreferable,
            PreferenceLevel::Unavailable,
        ] {
            let limit = self.caps.limit(level);
            let count = preferences
                .iter()
                .filter(|p| p.preference_level == level)
                .count();
            if count > limit as usize {
                return Err(ValidationError::CapExceeded { level, limit });
            }
        }

        if !self.deadline.is_open(week_start, now) {
            return Err(ValidationError::DeadlinePassed {
                deadline: self.deadline.deadline_for(week_start),
            });
        }

        Ok(AcceptedPreferences {
            week_start,
            entries: preferences.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use types::SlotId;

    const WEEK: &str = "2026-11-02";

    fn pref(slot: &str, level: PreferenceLevel) -> PreferenceInput {
        PreferenceInput {
            template_slot_id: SlotId::from(slot),
            preference_level: level,
        }
    }

    fn deadline() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 28)
            .and_then(|d| d.and_hms_opt(17, 0, 0))
            .expect("valid deadline")
    }

    fn early() -> NaiveDateTime {
        deadline() - Duration::days(3)
    }

    #[test]
    fn accepts_set_within_caps() {
        let prefs = vec![
            pref("a", PreferenceLevel::Preferable),
            pref("b", PreferenceLevel::Preferable),
            pref("c", PreferenceLevel::Preferable),
            pref("d", PreferenceLevel::LessPreferable),
            pref("e", PreferenceLevel::LessPreferable),
            pref("f", PreferenceLevel::Unavailable),
            pref("g", PreferenceLevel::Unavailable),
        ];
        let accepted = PreferenceValidator::default()
            .validate(WEEK, &prefs, early())
            .expect("within caps");
        assert_eq!(accepted.entries.len(), 7);
        assert_eq!(accepted.week_start.to_string(), WEEK);
    }

    #[test]
    fn rejects_fourth_preferable() {
        let prefs: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|s| pref(s, PreferenceLevel::Preferable))
            .collect();
        assert_eq!(
            PreferenceValidator::default().validate(WEEK, &prefs, early()),
            Err(ValidationError::CapExceeded {
                level: PreferenceLevel::Preferable,
                limit: 3
            })
        );
    }

    #[test]
    fn rejects_third_less_preferable_and_unavailable() {
        let validator = PreferenceValidator::default();
        let less: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|s| pref(s, PreferenceLevel::LessPreferable))
            .collect();
        assert!(matches!(
            validator.validate(WEEK, &less, early()),
            Err(ValidationError::CapExceeded { limit: 2, .. })
        ));
        let unavailable: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|s| pref(s, PreferenceLevel::Unavailable))
            .collect();
        assert_eq!(
            validator.validate(WEEK, &unavailable, early()),
            Err(ValidationError::CapExceeded {
                level: PreferenceLevel::Unavailable,
                limit: 2
            })
        );
    }

    #[test]
    fn rejects_duplicates_and_empty_sets() {
        let validator = PreferenceValidator::default();
        assert_eq!(
            validator.validate(WEEK, &[], early()),
            Err(ValidationError::EmptyPreferences)
        );
        let dup = vec![
            pref("a", PreferenceLevel::Preferable),
            pref("a", PreferenceLevel::Unavailable),
        ];
        assert_eq!(
            validator.validate(WEEK, &dup, early()),
            Err(ValidationError::DuplicateSlot(SlotId::from("a")))
        );
    }

    #[test]
    fn rejects_non_monday_week() {
        let prefs = vec![pref("a", PreferenceLevel::Preferable)];
        assert!(matches!(
            PreferenceValidator::default().validate("2026-11-03", &prefs, early()),
            Err(ValidationError::NotMonday(_))
        ));
    }

    #[test]
    fn rejects_one_minute_after_deadline() {
        let prefs = vec![pref("a", PreferenceLevel::Preferable)];
        assert_eq!(
            PreferenceValidator::default().validate(
                WEEK,
                &prefs,
                deadline() + Duration::minutes(1)
            ),
            Err(ValidationError::DeadlinePassed {
                deadline: deadline()
            })
        );
    }

    #[test]
    fn closes_exactly_at_deadline() {
        let prefs = vec![pref("a", PreferenceLevel::Preferable)];
        let err = PreferenceValidator::default()
            .validate(WEEK, &prefs, deadline())
            .unwrap_err();
        assert_eq!(err, ValidationError::DeadlinePassed { deadline: deadline() });
    }

    #[test]
    fn accepts_one_minute_before_deadline() {
        let prefs = vec![pref("a", PreferenceLevel::Preferable)];
        assert!(PreferenceValidator::default()
            .validate(WEEK, &prefs, deadline() - Duration::minutes(1))
            .is_ok());
    }

    #[test]
    fn custom_caps_apply() {
        let validator = PreferenceValidator::new(
            PreferenceCaps {
                preferable: 1,
                ..PreferenceCaps::default()
            },
            DeadlinePolicy::default(),
        );
        let prefs = vec![
            pref("a", PreferenceLevel::Preferable),
            pref("b", PreferenceLevel::Preferable),
        ];
        assert!(matches!(
            validator.validate(WEEK, &prefs, early()),
            Err(ValidationError::CapExceeded { limit: 1, .. })
        ));
    }
}
