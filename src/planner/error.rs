use crate::planner::composition::Slot;

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("Unknown preset: {0}. Must be one of fast, balanced, quality, deep")]
    UnknownPreset(String),
    #[error("Invalid macro targets: {0}")]
    InvalidTargets(String),
    #[error("Ingredient catalog is empty")]
    EmptyCatalog,
    #[error("cannot assemble day {day}: no valid {slot} candidates")]
    NoCandidates { day: u8, slot: Slot },
    #[error("cannot assemble day {day}: every combination repeats a meal")]
    NoDistinctCombination { day: u8 },
}
