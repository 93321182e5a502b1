mod fixture;

pub use fixture::{Fixture, FixtureError, GroupFixture};

use async_trait::async_trait;
use carpool_core::calendar::weeks_before;
use carpool_core::{
    AssignmentStore, DataUnavailable, DriverRoster, LoadHistoryProvider, PreferenceSource,
    PreferenceStore, SlotCatalog,
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;
use types::{Assignment, DriverId, GroupId, TemplateSlot, WeeklyPreference};

pub const SLOT_CATALOG: &str = "slot catalog";
pub const DRIVER_ROSTER: &str = "driver roster";
pub const PREFERENCE_STORE: &str = "preference store";
pub const LOAD_HISTORY: &str = "load history";
pub const ASSIGNMENT_STORE: &str = "assignment store";

type WeekKey = (GroupId, NaiveDate);

#[derive(Default)]
struct Tables {
    slots: HashMap<GroupId, Vec<TemplateSlot>>,
    drivers: HashMap<GroupId, BTreeSet<DriverId>>,
    preferences: HashMap<WeekKey, BTreeMap<DriverId, Vec<WeeklyPreference>>>,
    assignments: HashMap<WeekKey, Vec<Assignment>>,
}

/// Process-local backend for every collaborator port. Cheap to clone; all
/// clones share state. Each week's assignments are swapped under a single
/// write lock, so readers see either the old week or the new one.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Tables>>,
    outages: Arc<RwLock<HashSet<&'static str>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_slots(&self, group: &GroupId, slots: Vec<TemplateSlot>) {
        self.inner.write().slots.insert(group.clone(), slots);
    }

    pub fn add_drivers<I>(&self, group: &GroupId, drivers: I)
    where
        I: IntoIterator<Item = DriverId>,
    {
        self.inner
            .write()
            .drivers
            .entry(group.clone())
            .or_default()
            .extend(drivers);
    }

    /// Records past assignments, e.g. for historical load.
    pub fn insert_history(&self, group: &GroupId, assignments: Vec<Assignment>) {
        let mut w = self.inner.write();
        for a in assignments {
            w.assignments
                .entry((group.clone(), a.week_start_date))
                .or_default()
                .push(a);
        }
    }

    /// Simulates a collaborator going down (or coming back).
    pub fn set_unavailable(&self, collaborator: &'static str, down: bool) {
        let mut w = self.outages.write();
        if down {
            w.insert(collaborator);
        } else {
            w.remove(collaborator);
        }
    }

    fn check(&self, collaborator: &'static str) -> Result<(), DataUnavailable> {
        if self.outages.read().contains(collaborator) {
            return Err(DataUnavailable::new(collaborator, "simulated outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl SlotCatalog for InMemoryStore {
    async fn template_slots(&self, group: &GroupId) -> Result<Vec<TemplateSlot>, DataUnavailable> {
        self.check(SLOT_CATALOG)?;
        Ok(self.inner.read().slots.get(group).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl DriverRoster for InMemoryStore {
    async fn drivers(&self, group: &GroupId) -> Result<Vec<DriverId>, DataUnavailable> {
        self.check(DRIVER_ROSTER)?;
        Ok(self
            .inner
            .read()
            .drivers
            .get(group)
            .map(|d| d.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl PreferenceSource for InMemoryStore {
    async fn preferences(
        &self,
        group: &GroupId,
        week: NaiveDate,
    ) -> Result<Vec<WeeklyPreference>, DataUnavailable> {
        self.check(PREFERENCE_STORE)?;
        Ok(self
            .inner
            .read()
            .preferences
            .get(&(group.clone(), week))
            .map(|by_driver| by_driver.values().flatten().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl PreferenceStore for InMemoryStore {
    async fn replace_submission(
        &self,
        group: &GroupId,
        driver: &DriverId,
        week: NaiveDate,
        preferences: Vec<WeeklyPreference>,
    ) -> Result<(), DataUnavailable> {
        self.check(PREFERENCE_STORE)?;
        let mut w = self.inner.write();
        w.preferences
            .entry((group.clone(), week))
            .or_default()
            .insert(driver.clone(), preferences);
        w.drivers
            .entry(group.clone())
            .or_default()
            .insert(driver.clone());
        Ok(())
    }
}

#[async_trait]
impl LoadHistoryProvider for InMemoryStore {
    async fn recent_load(
        &self,
        group: &GroupId,
        driver: &DriverId,
        week: NaiveDate,
        window_weeks: u32,
    ) -> Result<u32, DataUnavailable> {
        self.check(LOAD_HISTORY)?;
        let from = weeks_before(week, window_weeks);
        let r = self.inner.read();
        let count = r
            .assignments
            .iter()
            .filter(|((g, w), _)| g == group && *w >= from && *w < week)
            .flat_map(|(_, list)| list.iter())
            .filter(|a| &a.driver_id == driver)
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}

#[async_trait]
impl AssignmentStore for InMemoryStore {
    async fn week(
        &self,
        group: &GroupId,
        week: NaiveDate,
    ) -> Result<Vec<Assignment>, DataUnavailable> {
        self.check(ASSIGNMENT_STORE)?;
        Ok(self
            .inner
            .read()
            .assignments
            .get(&(group.clone(), week))
            .cloned()
            .unwrap_or_default())
    }

    /// An empty week is removed rather than stored.
    async fn replace_week(
        &self,
        group: &GroupId,
        week: NaiveDate,
        assignments: Vec<Assignment>,
    ) -> Result<(), DataUnavailable> {
        self.check(ASSIGNMENT_STORE)?;
        let key = (group.clone(), week);
        let mut w = self.inner.write();
        let previous = if assignments.is_empty() {
            w.assignments.remove(&key)
        } else {
            w.assignments.insert(key, assignments)
        };
        debug!(
            %group,
            %week,
            replaced = previous.map(|p| p.len()).unwrap_or(0),
            "week replaced"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use types::{AssignmentId, AssignmentMethod, AssignmentStatus, PreferenceLevel, SlotId};

    fn monday(offset_weeks: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 2).unwrap() + chrono::Duration::weeks(offset_weeks)
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn assignment(group: &GroupId, week: NaiveDate, slot: &str, driver: &str) -> Assignment {
        let slot = SlotId::from(slot);
        Assignment {
            id: AssignmentId::for_slot(group, week, &slot),
            week_start_date: week,
            template_slot_id: slot,
            driver_id: DriverId::from(driver),
            assignment_method: AssignmentMethod::Neutral,
            status: AssignmentStatus::Assigned,
            created_at: at(),
        }
    }

    fn pref(driver: &str, slot: &str, level: PreferenceLevel) -> WeeklyPreference {
        WeeklyPreference {
            driver_id: DriverId::from(driver),
            week_start_date: monday(0),
            template_slot_id: SlotId::from(slot),
            preference_level: level,
            submitted_at: at(),
        }
    }

    #[tokio::test]
    async fn replace_week_swaps_whole_week() {
        let store = InMemoryStore::new();
        let g = GroupId::from("g1");
        store
            .replace_week(
                &g,
                monday(0),
                vec![
                    assignment(&g, monday(0), "a", "amy"),
                    assignment(&g, monday(0), "b", "amy"),
                ],
            )
            .await
            .unwrap();
        store
            .replace_week(&g, monday(0), vec![assignment(&g, monday(0), "c", "bob")])
            .await
            .unwrap();

        let week = store.week(&g, monday(0)).await.unwrap();
        assert_eq!(week.len(), 1);
        assert_eq!(week[0].template_slot_id.as_str(), "c");

        store.replace_week(&g, monday(0), Vec::new()).await.unwrap();
        assert!(store.week(&g, monday(0)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resubmission_supersedes_previous_set() {
        let store = InMemoryStore::new();
        let g = GroupId::from("g1");
        let amy = DriverId::from("amy");
        store
            .replace_submission(
                &g,
                &amy,
                monday(0),
                vec![
                    pref("amy", "a", PreferenceLevel::Preferable),
                    pref("amy", "b", PreferenceLevel::Unavailable),
                ],
            )
            .await
            .unwrap();
        store
            .replace_submission(
                &g,
                &amy,
                monday(0),
                vec![pref("amy", "c", PreferenceLevel::LessPreferable)],
            )
            .await
            .unwrap();

        let prefs = store.preferences(&g, monday(0)).await.unwrap();
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].template_slot_id.as_str(), "c");
        assert_eq!(store.drivers(&g).await.unwrap(), vec![amy]);
    }

    #[tokio::test]
    async fn recent_load_counts_only_the_trailing_window() {
        let store = InMemoryStore::new();
        let g = GroupId::from("g1");
        let other = GroupId::from("g2");
        store.insert_history(
            &g,
            vec![
                assignment(&g, monday(-1), "a", "amy"),
                assignment(&g, monday(-1), "b", "amy"),
                assignment(&g, monday(-2), "a", "bob"),
                assignment(&g, monday(-5), "a", "amy"),
                assignment(&g, monday(0), "a", "amy"),
            ],
        );
        store.insert_history(&other, vec![assignment(&other, monday(-1), "a", "amy")]);

        let amy = DriverId::from("amy");
        assert_eq!(store.recent_load(&g, &amy, monday(0), 4).await.unwrap(), 2);
        assert_eq!(store.recent_load(&g, &amy, monday(0), 5).await.unwrap(), 3);
        assert_eq!(
            store
                .recent_load(&g, &DriverId::from("bob"), monday(0), 1)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn outages_surface_as_data_unavailable() {
        let store = InMemoryStore::new();
        let g = GroupId::from("g1");
        store.set_unavailable(SLOT_CATALOG, true);
        let err = store.template_slots(&g).await.unwrap_err();
        assert_eq!(err.collaborator, SLOT_CATALOG);
        store.set_unavailable(SLOT_CATALOG, false);
        assert!(store.template_slots(&g).await.unwrap().is_empty());
    }
}
