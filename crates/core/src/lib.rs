pub mod calendar;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ports;
pub mod preferences;

pub use calendar::{parse_week_start, DeadlinePolicy};
pub use catalog::validate_catalog;
pub use config::{EngineConfig, PreferenceCaps};
pub use error::{DataUnavailable, EngineError, ErrorKind, IntakeError, ValidationError};
pub use ports::{
    AssignmentStore, Clock, DriverRoster, FixedClock, LoadHistoryProvider, PreferenceSource,
    PreferenceStore, SlotCatalog, SystemClock,
};
pub use preferences::{AcceptedPreferences, PreferenceValidator};

pub use types::{
    Assignment, AssignmentId, AssignmentMethod, AssignmentStatus, DriverId, DriverLoadSnapshot,
    GenerateRequest, GenerateSummary, GroupId, PreferenceInput, PreferenceLevel,
    PreferenceSubmission, RouteType, SlotId, TemplateSlot, WeeklyPreference,
};
