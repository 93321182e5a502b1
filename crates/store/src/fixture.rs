use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use types::{Assignment, DriverId, GroupId, TemplateSlot};

use crate::InMemoryStore;

/// Seed data for a process-local store, read from JSON at startup.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    #[serde(default)]
    pub groups: Vec<GroupFixture>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFixture {
    pub id: GroupId,
    #[serde(default)]
    pub slots: Vec<TemplateSlot>,
    #[serde(default)]
    pub drivers: Vec<DriverId>,
    #[serde(default)]
    pub history: Vec<Assignment>,
}

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("cannot read fixture {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid fixture {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

impl Fixture {
    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| FixtureError::Parse {
            path: display,
            source,
        })
    }
}

impl InMemoryStore {
    pub fn load_fixture(&self, fixture: Fixture) {
        for g in fixture.groups {
            self.put_slots(&g.id, g.slots);
            self.add_drivers(&g.id, g.drivers);
            self.insert_history(&g.id, g.history);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carpool_core::{DriverRoster, SlotCatalog};

    #[tokio::test]
    async fn fixture_seeds_slots_and_roster() {
        let raw = r#"{
            "groups": [{
                "id": "maple-elementary",
                "slots": [
                    {"id":"mon-am","dayOfWeek":1,"startTime":"07:40","endTime":"08:10","routeType":"dropoff","maxPassengers":4}
                ],
                "drivers": ["amy", "bob"]
            }]
        }"#;
        let fixture: Fixture = serde_json::from_str(raw).expect("fixture parses");
        let store = InMemoryStore::new();
        store.load_fixture(fixture);

        let g = GroupId::from("maple-elementary");
        assert_eq!(store.template_slots(&g).await.unwrap().len(), 1);
        assert_eq!(store.drivers(&g).await.unwrap().len(), 2);
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = Fixture::from_path(Path::new("/nonexistent/fixture.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/fixture.json"));
    }
}
