//! Collaborator contracts consumed by the engine and intake service.
//!
//! Implementations live outside this crate; every failure is reported as
//! [`DataUnavailable`].

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use types::{Assignment, DriverId, GroupId, TemplateSlot, WeeklyPreference};

use crate::error::DataUnavailable;

#[async_trait]
pub trait SlotCatalog: Send + Sync + 'static {
    async fn template_slots(&self, group: &GroupId) -> Result<Vec<TemplateSlot>, DataUnavailable>;
}

/// Drivers belonging to a group, whether or not they submitted preferences.
#[async_trait]
pub trait DriverRoster: Send + Sync + 'static {
    async fn drivers(&self, group: &GroupId) -> Result<Vec<DriverId>, DataUnavailable>;
}

#[async_trait]
pub trait PreferenceSource: Send + Sync + 'static {
    async fn preferences(
        &self,
        group: &GroupId,
        week: NaiveDate,
    ) -> Result<Vec<WeeklyPreference>, DataUnavailable>;
}

#[async_trait]
pub trait PreferenceStore: Send + Sync + 'static {
    /// Supersedes whatever `driver` previously submitted for `week`.
    async fn replace_submission(
        &self,
        group: &GroupId,
        driver: &DriverId,
        week: NaiveDate,
        preferences: Vec<WeeklyPreference>,
    ) -> Result<(), DataUnavailable>;
}

#[async_trait]
pub trait LoadHistoryProvider: Send + Sync + 'static {
    /// Assignments held by `driver` in the `window_weeks` weeks strictly
    /// before `week`.
    async fn recent_load(
        &self,
        group: &GroupId,
        driver: &DriverId,
        week: NaiveDate,
        window_weeks: u32,
    ) -> Result<u32, DataUnavailable>;
}

#[async_trait]
pub trait AssignmentStore: Send + Sync + 'static {
    async fn week(
        &self,
        group: &GroupId,
        week: NaiveDate,
    ) -> Result<Vec<Assignment>, DataUnavailable>;

    /// Deletes and inserts in one step; readers never observe a partial week.
    /// An empty `assignments` leaves no record, so the week reads as unscheduled.
    async fn replace_week(
        &self,
        group: &GroupId,
        week: NaiveDate,
        assignments: Vec<Assignment>,
    ) -> Result<(), DataUnavailable>;
}

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the service's local time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
