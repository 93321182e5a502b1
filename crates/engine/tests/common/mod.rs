#![allow(dead_code)]

use carpool_core::{EngineConfig, FixedClock, PreferenceStore};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use engine::{Collaborators, PreferenceIntake, SchedulingEngine};
use std::sync::Arc;
use store::InMemoryStore;
use types::{DriverId, GroupId, PreferenceLevel, RouteType, SlotId, TemplateSlot, WeeklyPreference};

pub const WEEK: &str = "2026-11-02";

pub fn week() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, 2).expect("valid date")
}

pub fn group() -> GroupId {
    GroupId::from("maple-elementary")
}

/// Well before the default deadline for [`WEEK`].
pub fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 20)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid timestamp")
}

pub fn slot(id: &str, day: u8, hour: u32, minute: u32) -> TemplateSlot {
    let start = NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time");
    TemplateSlot {
        id: SlotId::from(id),
        day_of_week: day,
        start_time: start,
        end_time: start + chrono::Duration::minutes(30),
        route_type: if hour < 12 {
            RouteType::Dropoff
        } else {
            RouteType::Pickup
        },
        max_passengers: 4,
    }
}

pub fn store_with(slots: Vec<TemplateSlot>, drivers: &[&str]) -> InMemoryStore {
    let store = InMemoryStore::new();
    store.put_slots(&group(), slots);
    store.add_drivers(&group(), drivers.iter().map(|d| DriverId::from(*d)));
    store
}

pub fn engine_at(store: &InMemoryStore, config: EngineConfig, at: NaiveDateTime) -> SchedulingEngine {
    SchedulingEngine::new(
        config,
        Collaborators::shared(Arc::new(store.clone()), Arc::new(FixedClock(at))),
    )
}

pub fn engine(store: &InMemoryStore) -> SchedulingEngine {
    engine_at(store, EngineConfig::default(), now())
}

pub fn intake_at(store: &InMemoryStore, at: NaiveDateTime) -> PreferenceIntake {
    let shared = Arc::new(store.clone());
    PreferenceIntake::new(
        &EngineConfig::default(),
        shared.clone(),
        shared,
        Arc::new(FixedClock(at)),
    )
}

/// Writes preferences straight to the store, bypassing submission caps.
pub async fn mark(store: &InMemoryStore, driver: &str, marks: &[(&str, PreferenceLevel)]) {
    let driver = DriverId::from(driver);
    let prefs = marks
        .iter()
        .map(|(slot, level)| WeeklyPreference {
            driver_id: driver.clone(),
            week_start_date: week(),
            template_slot_id: SlotId::from(*slot),
            preference_level: *level,
            submitted_at: now(),
        })
        .collect();
    store
        .replace_submission(&group(), &driver, week(), prefs)
        .await
        .expect("store accepts preferences");
}
