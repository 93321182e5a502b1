use carpool_core::{
    parse_week_start, validate_catalog, AssignmentStore, Clock, DriverRoster, EngineConfig,
    EngineError, LoadHistoryProvider, PreferenceSource, SlotCatalog,
};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use types::{
    Assignment, AssignmentId, AssignmentStatus, DriverId, DriverLoadSnapshot, GenerateRequest,
    GenerateSummary, GroupId, SlotId, WeeklyPreference,
};

use crate::locks::WeekLocks;
use crate::plan::{plan_week, PassReport, PlanInput};

/// The data sources and sinks a scheduling run talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub slots: Arc<dyn SlotCatalog>,
    pub roster: Arc<dyn DriverRoster>,
    pub preferences: Arc<dyn PreferenceSource>,
    pub history: Arc<dyn LoadHistoryProvider>,
    pub assignments: Arc<dyn AssignmentStore>,
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Wires every port to one backend that implements them all.
    pub fn shared<B>(backend: Arc<B>, clock: Arc<dyn Clock>) -> Self
    where
        B: SlotCatalog + DriverRoster + PreferenceSource + LoadHistoryProvider + AssignmentStore,
    {
        Self {
            slots: backend.clone(),
            roster: backend.clone(),
            preferences: backend.clone(),
            history: backend.clone(),
            assignments: backend,
            clock,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateOutcome {
    pub group: GroupId,
    pub week: NaiveDate,
    pub assignments: Vec<Assignment>,
    pub unassigned_slot_ids: Vec<SlotId>,
    pub passes: Vec<PassReport>,
    /// Historical load each driver entered the week with.
    pub loads: Vec<DriverLoadSnapshot>,
    pub trace: Vec<String>,
}

impl GenerateOutcome {
    pub fn summary(&self) -> GenerateSummary {
        let slots: BTreeSet<&SlotId> = self
            .assignments
            .iter()
            .map(|a| &a.template_slot_id)
            .collect();
        GenerateSummary {
            assignments_created: self.assignments.len(),
            slots_assigned: slots.len(),
            unassigned_slots: self.unassigned_slot_ids.clone(),
            algorithm_steps: self.trace.clone(),
        }
    }
}

pub struct SchedulingEngine {
    config: EngineConfig,
    deps: Collaborators,
    locks: WeekLocks,
}

impl SchedulingEngine {
    pub fn new(config: EngineConfig, deps: Collaborators) -> Self {
        Self {
            config,
            deps,
            locks: WeekLocks::default(),
        }
    }

    /// Computes and stores the assignments for one group's week.
    ///
    /// Nothing is written unless the whole run succeeds. Runs for the same
    /// `(group, week)` are serialized; other weeks proceed in parallel.
    pub async fn generate(
        &self,
        group: &GroupId,
        week_start: &str,
        force_regenerate: bool,
    ) -> Result<GenerateOutcome, EngineError> {
        let week = parse_week_start(week_start)?;
        let _guard = self.locks.acquire(group, week).await;
        info!(%group, %week, force_regenerate, "generating weekly assignments");

        let mut trace = Vec::new();

        let existing = self.deps.assignments.week(group, week).await?;
        if !existing.is_empty() {
            if !force_regenerate {
                warn!(%group, %week, existing = existing.len(), "week already scheduled");
                return Err(EngineError::AlreadyScheduled {
                    group: group.clone(),
                    week,
                });
            }
            trace.push(format!(
                "replacing {} existing assignment(s) (forceRegenerate)",
                existing.len()
            ));
        }

        let slots = self.deps.slots.template_slots(group).await?;
        validate_catalog(&slots)?;
        let roster = self.deps.roster.drivers(group).await?;
        let preferences: Vec<WeeklyPreference> = self
            .deps
            .preferences
            .preferences(group, week)
            .await?
            .into_iter()
            .filter(|p| p.week_start_date == week)
            .collect();

        let drivers: Vec<DriverId> = roster
            .into_iter()
            .chain(preferences.iter().map(|p| p.driver_id.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let window = self.config.load_window_weeks;
        let mut recent_load = Vec::with_capacity(drivers.len());
        for driver in &drivers {
            let load = self
                .deps
                .history
                .recent_load(group, driver, week, window)
                .await?;
            recent_load.push(DriverLoadSnapshot {
                driver_id: driver.clone(),
                recent_assignments: load,
            });
        }
        debug!(%group, %week, ?recent_load, "historical load snapshot");

        trace.push(format!(
            "week {week}: {} slot(s), {} driver(s), {} preference(s), {window}-week load window",
            slots.len(),
            drivers.len(),
            preferences.len()
        ));

        let plan = plan_week(
            &PlanInput {
                slots: &slots,
                drivers: &drivers,
                preferences: &preferences,
                recent_load: &recent_load,
            },
            &self.config,
        );

        let created_at = self.deps.clock.now();
        let assignments: Vec<Assignment> = plan
            .assignments
            .iter()
            .map(|a| Assignment {
                id: AssignmentId::for_slot(group, week, &a.slot),
                week_start_date: week,
                template_slot_id: a.slot.clone(),
                driver_id: a.driver.clone(),
                assignment_method: a.method,
                status: AssignmentStatus::Assigned,
                created_at,
            })
            .collect();

        self.deps
            .assignments
            .replace_week(group, week, assignments.clone())
            .await?;

        trace.extend(plan.trace);
        trace.push(format!(
            "result: {} slot(s) assigned, {} unassigned",
            assignments.len(),
            plan.unassigned.len()
        ));

        if !plan.unassigned.is_empty() {
            warn!(%group, %week, unassigned = ?plan.unassigned, "slots left without a driver");
        }
        info!(
            %group,
            %week,
            assigned = assignments.len(),
            unassigned = plan.unassigned.len(),
            "weekly assignments stored"
        );

        Ok(GenerateOutcome {
            group: group.clone(),
            week,
            assignments,
            unassigned_slot_ids: plan.unassigned,
            passes: plan.passes,
            loads: recent_load,
            trace,
        })
    }

    pub async fn handle(
        &self,
        group: &GroupId,
        request: &GenerateRequest,
    ) -> Result<GenerateSummary, EngineError> {
        let outcome = self
            .generate(group, &request.week_start_date, request.force_regenerate)
            .await?;
        Ok(outcome.summary())
    }

    /// Stored assignments for a week, empty if it was never scheduled.
    pub async fn week(
        &self,
        group: &GroupId,
        week_start: &str,
    ) -> Result<Vec<Assignment>, EngineError> {
        let week = parse_week_start(week_start)?;
        Ok(self.deps.assignments.week(group, week).await?)
    }
}
