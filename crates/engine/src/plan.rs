//! The five-pass weekly assignment planner.
//!
//! Pure and synchronous: given a snapshot of slots, drivers, preferences and
//! historical load it always produces the same plan. Slots are visited in
//! `(dayOfWeek, startTime, id)` order in every pass, and per-driver tallies
//! are updated after each assignment so later slots and passes see them.

use carpool_core::EngineConfig;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use types::{
    AssignmentMethod, DriverId, DriverLoadSnapshot, PreferenceLevel, SlotId, TemplateSlot,
    WeeklyPreference,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pass {
    Exclusion,
    Preferable,
    LessPreferable,
    Neutral,
    HistoricalTiebreak,
}

impl Pass {
    pub const ALL: [Pass; 5] = [
        Pass::Exclusion,
        Pass::Preferable,
        Pass::LessPreferable,
        Pass::Neutral,
        Pass::HistoricalTiebreak,
    ];

    fn number(self) -> u8 {
        match self {
            Pass::Exclusion => 1,
            Pass::Preferable => 2,
            Pass::LessPreferable => 3,
            Pass::Neutral => 4,
            Pass::HistoricalTiebreak => 5,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Pass::Exclusion => "exclusion",
            Pass::Preferable => "preferable",
            Pass::LessPreferable => "less-preferable",
            Pass::Neutral => "neutral fill",
            Pass::HistoricalTiebreak => "historical tie-break",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pass {} ({})", self.number(), self.name())
    }
}

/// Everything the planner reads. `drivers` is the roster; anyone who
/// submitted a preference is added to it.
#[derive(Clone, Copy, Debug)]
pub struct PlanInput<'a> {
    pub slots: &'a [TemplateSlot],
    pub drivers: &'a [DriverId],
    pub preferences: &'a [WeeklyPreference],
    /// Drivers missing here count as zero recent load.
    pub recent_load: &'a [DriverLoadSnapshot],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedAssignment {
    pub slot: SlotId,
    pub driver: DriverId,
    pub method: AssignmentMethod,
    pub pass: Pass,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassReport {
    pub pass: Pass,
    pub assigned: Vec<SlotId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeekPlan {
    /// In slot processing order.
    pub assignments: Vec<PlannedAssignment>,
    pub unassigned: Vec<SlotId>,
    pub passes: Vec<PassReport>,
    pub trace: Vec<String>,
}

impl WeekPlan {
    /// Slots assigned once passes up to and including `pass` have run.
    pub fn covered_after(&self, pass: Pass) -> BTreeSet<&SlotId> {
        self.passes
            .iter()
            .filter(|r| r.pass <= pass)
            .flat_map(|r| r.assigned.iter())
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Tally {
    total: u32,
    preferable: u32,
    less_preferable: u32,
}

struct Planner<'a> {
    order: Vec<&'a TemplateSlot>,
    /// Effective preference level per slot index.
    levels: Vec<HashMap<&'a DriverId, PreferenceLevel>>,
    eligible: Vec<Vec<&'a DriverId>>,
    loads: HashMap<&'a DriverId, u32>,
    tallies: BTreeMap<&'a DriverId, Tally>,
    chosen: Vec<Option<(&'a DriverId, AssignmentMethod, Pass)>>,
    trace: Vec<String>,
}

pub fn plan_week(input: &PlanInput<'_>, config: &EngineConfig) -> WeekPlan {
    let mut planner = Planner::new(input);

    let mut passes = Vec::with_capacity(Pass::ALL.len());
    passes.push(PassReport {
        pass: Pass::Exclusion,
        assigned: Vec::new(),
    });
    passes.push(planner.level_pass(
        Pass::Preferable,
        PreferenceLevel::Preferable,
        AssignmentMethod::Preferable,
        config.caps.preferable,
    ));
    passes.push(planner.level_pass(
        Pass::LessPreferable,
        PreferenceLevel::LessPreferable,
        AssignmentMethod::LessPreferable,
        config.caps.less_preferable,
    ));
    passes.push(planner.neutral_pass(config.neutral_fallback_any_eligible));
    passes.push(planner.historical_pass());

    planner.finish(passes)
}

impl<'a> Planner<'a> {
    fn new(input: &PlanInput<'a>) -> Self {
        let mut order: Vec<&'a TemplateSlot> = input.slots.iter().collect();
        order.sort_by(|a, b| a.order_key().cmp(&b.order_key()));

        let index: HashMap<&SlotId, usize> =
            order.iter().enumerate().map(|(i, s)| (&s.id, i)).collect();

        // Later submissions supersede earlier ones for the same slot.
        let mut latest: HashMap<(usize, &'a DriverId), &'a WeeklyPreference> = HashMap::new();
        let mut ignored = 0usize;
        for p in input.preferences {
            let Some(&i) = index.get(&p.template_slot_id) else {
                ignored += 1;
                continue;
            };
            latest
                .entry((i, &p.driver_id))
                .and_modify(|cur| {
                    if (p.submitted_at, p.preference_level) > (cur.submitted_at, cur.preference_level)
                    {
                        *cur = p;
                    }
                })
                .or_insert(p);
        }

        let mut levels: Vec<HashMap<&'a DriverId, PreferenceLevel>> =
            vec![HashMap::new(); order.len()];
        for (&(i, driver), p) in &latest {
            levels[i].insert(driver, p.preference_level);
        }

        let drivers: BTreeSet<&'a DriverId> = input
            .drivers
            .iter()
            .chain(latest.keys().map(|(_, d)| *d))
            .collect();

        let mut trace = Vec::new();
        if ignored > 0 {
            trace.push(format!(
                "ignored {ignored} preference(s) for slots outside the template"
            ));
        }

        // Pass 1: a driver who marked a slot unavailable never sees it again.
        let mut marks = 0usize;
        let mut blocked = 0usize;
        let eligible: Vec<Vec<&'a DriverId>> = levels
            .iter()
            .map(|slot_levels| {
                let set: Vec<&'a DriverId> = drivers
                    .iter()
                    .copied()
                    .filter(|d| slot_levels.get(*d) != Some(&PreferenceLevel::Unavailable))
                    .collect();
                marks += drivers.len() - set.len();
                if set.is_empty() {
                    blocked += 1;
                }
                set
            })
            .collect();
        trace.push(format!(
            "{}: {} slot(s), {} driver(s), {} unavailable mark(s), {} slot(s) without eligible drivers",
            Pass::Exclusion,
            order.len(),
            drivers.len(),
            marks,
            blocked
        ));

        let tallies = drivers.iter().map(|d| (*d, Tally::default())).collect();
        let chosen = vec![None; order.len()];

        Self {
            order,
            levels,
            eligible,
            loads: input
                .recent_load
                .iter()
                .map(|l| (&l.driver_id, l.recent_assignments))
                .collect(),
            tallies,
            chosen,
            trace,
        }
    }

    fn level(&self, i: usize, driver: &DriverId) -> Option<PreferenceLevel> {
        self.levels[i].get(driver).copied()
    }

    fn load(&self, driver: &DriverId) -> u32 {
        self.loads.get(driver).copied().unwrap_or(0)
    }

    fn tally(&self, driver: &DriverId) -> Tally {
        self.tallies.get(driver).copied().unwrap_or_default()
    }

    /// Fewest assignments this week, then lowest recent load, then id.
    fn balance_key(&self, driver: &'a DriverId) -> (u32, u32, &'a DriverId) {
        (self.tally(driver).total, self.load(driver), driver)
    }

    /// Lowest recent load, then fewest assignments this week, then id.
    fn history_key(&self, driver: &'a DriverId) -> (u32, u32, &'a DriverId) {
        (self.load(driver), self.tally(driver).total, driver)
    }

    fn method_count(&self, driver: &DriverId, method: AssignmentMethod) -> u32 {
        let t = self.tally(driver);
        match method {
            AssignmentMethod::Preferable => t.preferable,
            AssignmentMethod::LessPreferable => t.less_preferable,
            AssignmentMethod::Neutral | AssignmentMethod::HistoricalTiebreak => 0,
        }
    }

    fn assign(&mut self, i: usize, driver: &'a DriverId, method: AssignmentMethod, pass: Pass) {
        let tally = self.tallies.entry(driver).or_default();
        tally.total += 1;
        match method {
            AssignmentMethod::Preferable => tally.preferable += 1,
            AssignmentMethod::LessPreferable => tally.less_preferable += 1,
            AssignmentMethod::Neutral | AssignmentMethod::HistoricalTiebreak => {}
        }
        let total = tally.total;
        self.chosen[i] = Some((driver, method, pass));
        let line = format!(
            "{pass}: slot {} -> {driver} (week total {total}, recent load {})",
            self.order[i].id,
            self.load(driver)
        );
        self.trace.push(line);
    }

    fn open_slots(&self) -> Vec<usize> {
        (0..self.order.len())
            .filter(|&i| self.chosen[i].is_none())
            .collect()
    }

    fn summarize(&mut self, pass: Pass, assigned: &[SlotId]) {
        let remaining = self.chosen.iter().filter(|c| c.is_none()).count();
        self.trace.push(format!(
            "{pass}: {} slot(s) assigned, {remaining} remaining",
            assigned.len()
        ));
    }

    fn level_pass(
        &mut self,
        pass: Pass,
        level: PreferenceLevel,
        method: AssignmentMethod,
        cap: u32,
    ) -> PassReport {
        let mut assigned = Vec::new();
        for i in self.open_slots() {
            let marked: Vec<&'a DriverId> = self.eligible[i]
                .iter()
                .copied()
                .filter(|d| self.level(i, d) == Some(level))
                .collect();
            if marked.is_empty() {
                continue;
            }
            let pick = marked
                .iter()
                .copied()
                .filter(|d| self.method_count(d, method) < cap)
                .min_by_key(|d| self.balance_key(*d));
            match pick {
                Some(driver) => {
                    self.assign(i, driver, method, pass);
                    assigned.push(self.order[i].id.clone());
                }
                None => self.trace.push(format!(
                    "{pass}: slot {} skipped, {} {level} driver(s) already at cap {cap}",
                    self.order[i].id,
                    marked.len()
                )),
            }
        }
        self.summarize(pass, &assigned);
        PassReport { pass, assigned }
    }

    fn neutral_pass(&mut self, fallback_any_eligible: bool) -> PassReport {
        let pass = Pass::Neutral;
        let mut assigned = Vec::new();
        for i in self.open_slots() {
            let neutral: Vec<&'a DriverId> = self.eligible[i]
                .iter()
                .copied()
                .filter(|d| self.level(i, d).is_none())
                .collect();
            let pool = if !neutral.is_empty() {
                neutral
            } else if fallback_any_eligible && !self.eligible[i].is_empty() {
                self.trace.push(format!(
                    "{pass}: slot {} has no neutral driver, widening to all eligible drivers",
                    self.order[i].id
                ));
                self.eligible[i].clone()
            } else {
                continue;
            };
            if let Some(driver) = pool.iter().copied().min_by_key(|d| self.balance_key(*d)) {
                self.assign(i, driver, AssignmentMethod::Neutral, pass);
                assigned.push(self.order[i].id.clone());
            }
        }
        self.summarize(pass, &assigned);
        PassReport { pass, assigned }
    }

    fn historical_pass(&mut self) -> PassReport {
        let pass = Pass::HistoricalTiebreak;
        let mut assigned = Vec::new();
        for i in self.open_slots() {
            let pick = self.eligible[i]
                .iter()
                .copied()
                .min_by_key(|d| self.history_key(*d));
            match pick {
                Some(driver) => {
                    self.assign(i, driver, AssignmentMethod::HistoricalTiebreak, pass);
                    assigned.push(self.order[i].id.clone());
                }
                None => self.trace.push(format!(
                    "{pass}: slot {} left unassigned, no eligible driver",
                    self.order[i].id
                )),
            }
        }
        self.summarize(pass, &assigned);
        PassReport { pass, assigned }
    }

    fn finish(self, passes: Vec<PassReport>) -> WeekPlan {
        let mut assignments = Vec::new();
        let mut unassigned = Vec::new();
        for (slot, chosen) in self.order.iter().zip(&self.chosen) {
            match chosen {
                Some((driver, method, pass)) => assignments.push(PlannedAssignment {
                    slot: slot.id.clone(),
                    driver: (*driver).clone(),
                    method: *method,
                    pass: *pass,
                }),
                None => unassigned.push(slot.id.clone()),
            }
        }
        let distinct: HashSet<&SlotId> = assignments.iter().map(|a| &a.slot).collect();
        debug_assert_eq!(distinct.len(), assignments.len());
        WeekPlan {
            assignments,
            unassigned,
            passes,
            trace: self.trace,
        }
    }
}
