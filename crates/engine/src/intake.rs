use carpool_core::{
    Clock, EngineConfig, IntakeError, PreferenceStore, PreferenceValidator, SlotCatalog,
    ValidationError,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use types::{GroupId, PreferenceSubmission, SlotId, WeeklyPreference};

/// Accepts a driver's weekly preference set and hands it to the store.
pub struct PreferenceIntake {
    validator: PreferenceValidator,
    slots: Arc<dyn SlotCatalog>,
    store: Arc<dyn PreferenceStore>,
    clock: Arc<dyn Clock>,
}

impl PreferenceIntake {
    pub fn new(
        config: &EngineConfig,
        slots: Arc<dyn SlotCatalog>,
        store: Arc<dyn PreferenceStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            validator: PreferenceValidator::new(config.caps, config.deadline.clone()),
            slots,
            store,
            clock,
        }
    }

    pub async fn submit(
        &self,
        group: &GroupId,
        submission: PreferenceSubmission,
    ) -> Result<Vec<WeeklyPreference>, IntakeError> {
        let now = self.clock.now();
        let accepted = self.validator.validate(
            &submission.week_start_date,
            &submission.preferences,
            now,
        )?;

        let known: HashSet<SlotId> = self
            .slots
            .template_slots(group)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();
        if let Some(p) = accepted
            .entries
            .iter()
            .find(|p| !known.contains(&p.template_slot_id))
        {
            return Err(ValidationError::UnknownSlot(p.template_slot_id.clone()).into());
        }

        let records: Vec<WeeklyPreference> = accepted
            .entries
            .into_iter()
            .map(|p| WeeklyPreference {
                driver_id: submission.driver_id.clone(),
                week_start_date: accepted.week_start,
                template_slot_id: p.template_slot_id,
                preference_level: p.preference_level,
                submitted_at: now,
            })
            .collect();

        self.store
            .replace_submission(
                group,
                &submission.driver_id,
                accepted.week_start,
                records.clone(),
            )
            .await?;
        info!(
            %group,
            driver = %submission.driver_id,
            week = %accepted.week_start,
            count = records.len(),
            "preferences accepted"
        );
        Ok(records)
    }
}
