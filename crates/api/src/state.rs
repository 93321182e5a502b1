use std::sync::Arc;

use carpool_core::{Clock, EngineConfig};
use engine::{Collaborators, PreferenceIntake, SchedulingEngine};
use store::InMemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SchedulingEngine>,
    pub intake: Arc<PreferenceIntake>,
}

impl AppState {
    pub fn new(config: EngineConfig, store: InMemoryStore, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(store);
        let intake = PreferenceIntake::new(&config, store.clone(), store.clone(), clock.clone());
        let engine = SchedulingEngine::new(config, Collaborators::shared(store, clock));
        Self {
            engine: Arc::new(engine),
            intake: Arc::new(intake),
        }
    }
}
