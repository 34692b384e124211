pub mod candidate;
pub mod composition;
pub mod day_selector;
pub mod error;
pub mod pool;
pub mod sampler;
pub mod scorer;
pub mod state;
pub mod week_planner;

pub use candidate::{Candidate, Signature};
pub use composition::{Composition, CompositionRule, MacroSplit, Slot};
pub use day_selector::{DaySelection, DaySelector, SelectionSettings};
pub use error::PlannerError;
pub use scorer::MacroTargets;
pub use state::WeekState;
pub use week_planner::{DayPlan, MealEntry, Plan, Preset, Totals, WeekPlanner, DAYS_PER_WEEK};
