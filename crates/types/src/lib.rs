use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone,
            Debug,
            Serialize,
            Deserialize,
            ToSchema,
            JsonSchema,
            Eq,
            PartialEq,
            Ord,
            PartialOrd,
            Hash,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}
id_newtype!(GroupId);
id_newtype!(DriverId);
id_newtype!(SlotId);

/// Assignment ids are name-based so that a regenerated week keeps its ids.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash,
)]
#[serde(transparent)]
pub struct AssignmentId(pub uuid::Uuid);

impl AssignmentId {
    pub fn for_slot(group: &GroupId, week: NaiveDate, slot: &SlotId) -> Self {
        let name = format!("{}/{}/{}", group.0, week.format("%Y-%m-%d"), slot.0);
        Self(uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, name.as_bytes()))
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    Dropoff,
    Pickup,
}

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, Ord,
    PartialOrd,
)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceLevel {
    Preferable,
    LessPreferable,
    Unavailable,
}

impl PreferenceLevel {
    pub fn label(self) -> &'static str {
        match self {
            PreferenceLevel::Preferable => "preferable",
            PreferenceLevel::LessPreferable => "less_preferable",
            PreferenceLevel::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for PreferenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMethod {
    Preferable,
    LessPreferable,
    Neutral,
    HistoricalTiebreak,
}

impl AssignmentMethod {
    pub fn label(self) -> &'static str {
        match self {
            AssignmentMethod::Preferable => "preferable",
            AssignmentMethod::LessPreferable => "less_preferable",
            AssignmentMethod::Neutral => "neutral",
            AssignmentMethod::HistoricalTiebreak => "historical_tiebreak",
        }
    }
}

impl fmt::Display for AssignmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    #[default]
    Assigned,
}

/// `HH:MM` wire format for slot times.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&t.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, FORMAT)
            .map_err(|e| D::Error::custom(format!("invalid time `{raw}` (expected HH:MM): {e}")))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSlot {
    pub id: SlotId,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    #[serde(with = "hhmm")]
    #[schemars(with = "String")]
    #[schema(value_type = String)]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schemars(with = "String")]
    #[schema(value_type = String)]
    pub end_time: NaiveTime,
    pub route_type: RouteType,
    pub max_passengers: u32,
}

impl TemplateSlot {
    /// Stable processing order: day, start time, then id.
    pub fn order_key(&self) -> (u8, NaiveTime, &str) {
        (self.day_of_week, self.start_time, self.id.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PreferenceInput {
    pub template_slot_id: SlotId,
    pub preference_level: PreferenceLevel,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPreference {
    pub driver_id: DriverId,
    pub week_start_date: NaiveDate,
    pub template_slot_id: SlotId,
    pub preference_level: PreferenceLevel,
    pub submitted_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: AssignmentId,
    pub week_start_date: NaiveDate,
    pub template_slot_id: SlotId,
    pub driver_id: DriverId,
    pub assignment_method: AssignmentMethod,
    #[serde(default)]
    pub status: AssignmentStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DriverLoadSnapshot {
    pub driver_id: DriverId,
    pub recent_assignments: u32,
}

/// Inbound scheduling request. The week stays a raw string so that format
/// errors surface as validation errors rather than body rejections.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GenerateRequest {
    pub week_start_date: String,
    #[serde(default)]
    pub force_regenerate: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSummary {
    pub assignments_created: usize,
    pub slots_assigned: usize,
    pub unassigned_slots: Vec<SlotId>,
    pub algorithm_steps: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PreferenceSubmission {
    pub driver_id: DriverId,
    pub week_start_date: String,
    pub preferences: Vec<PreferenceInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_times_use_hh_mm() {
        let raw = r#"{"id":"mon-am","dayOfWeek":1,"startTime":"07:45","endTime":"08:15","routeType":"dropoff","maxPassengers":4}"#;
        let slot: TemplateSlot = serde_json::from_str(raw).expect("slot parses");
        assert_eq!(slot.start_time, NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        let back = serde_json::to_string(&slot).expect("slot serializes");
        assert_eq!(back, raw);
    }

    #[test]
    fn unknown_preference_level_is_rejected() {
        let raw = r#"{"templateSlotId":"s1","preferenceLevel":"maybe"}"#;
        assert!(serde_json::from_str::<PreferenceInput>(raw).is_err());
    }

    #[test]
    fn assignment_ids_are_stable_per_slot_and_week() {
        let g = GroupId::from("g1");
        let week = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();
        let a = AssignmentId::for_slot(&g, week, &SlotId::from("s1"));
        let b = AssignmentId::for_slot(&g, week, &SlotId::from("s1"));
        let c = AssignmentId::for_slot(&g, week, &SlotId::from("s2"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
