pub mod intake;
mod locks;
pub mod plan;
pub mod scheduler;

pub use intake::PreferenceIntake;
pub use plan::{plan_week, Pass, PassReport, PlanInput, PlannedAssignment, WeekPlan};
pub use scheduler::{Collaborators, GenerateOutcome, SchedulingEngine};
