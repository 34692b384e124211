use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::catalog::{IngredientRecord, PairingSet, Role};
use crate::planner::candidate::Candidate;
use crate::planner::composition::Composition;
use crate::planner::day_selector::{DaySelection, DaySelector, SelectionSettings};
use crate::planner::error::PlannerError;
use crate::planner::pool::normalize_allergens;
use crate::planner::scorer::MacroTargets;
use crate::planner::state::WeekState;

pub const DAYS_PER_WEEK: u8 = 7;
const DEFAULT_ATTEMPTS_FACTOR: usize = 40;

/// Named speed/diversity trade-offs, each a (batch size, top-K) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Fast,
    #[default]
    Balanced,
    Quality,
    Deep,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Fast, Preset::Balanced, Preset::Quality, Preset::Deep];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Fast => "fast",
            Preset::Balanced => "balanced",
            Preset::Quality => "quality",
            Preset::Deep => "deep",
        }
    }

    /// (candidates sampled per slot, candidates kept per slot)
    pub fn batch_and_top_k(&self) -> (usize, usize) {
        match self {
            Preset::Fast => (30, 5),
            Preset::Balanced => (180, 15),
            Preset::Quality => (360, 30),
            Preset::Deep => (720, 50),
        }
    }

    pub fn settings(&self) -> SelectionSettings {
        let (batch_size, top_k) = self.batch_and_top_k();
        SelectionSettings {
            batch_size,
            top_k,
            attempts_factor: DEFAULT_ATTEMPTS_FACTOR,
            max_combinations: None,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Preset::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| PlannerError::UnknownPreset(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroBlock {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub kcal: f64,
}

/// One serialized meal.
#[derive(Debug, Clone, Serialize)]
pub struct MealEntry {
    pub names: Vec<String>,
    pub roles: Vec<Role>,
    pub cuisines: Vec<String>,
    pub macros: MacroBlock,
    pub price: f64,
    pub allergens: Vec<String>,
}

impl From<&Candidate> for MealEntry {
    fn from(c: &Candidate) -> Self {
        Self {
            names: c.names.clone(),
            roles: c.roles.clone(),
            cuisines: c.cuisines.clone(),
            macros: MacroBlock {
                protein: c.macros.protein,
                carbs: c.macros.carbs,
                fat: c.macros.fat,
                kcal: c.macros.kcal,
            },
            price: c.price,
            allergens: c.allergens.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayMeals {
    pub breakfast: MealEntry,
    pub lunch: MealEntry,
    pub dinner: MealEntry,
}

impl DayMeals {
    pub fn iter(&self) -> impl Iterator<Item = &MealEntry> {
        [&self.breakfast, &self.lunch, &self.dinner].into_iter()
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SelectionInfo {
    pub relative_error: f64,
    pub quality: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub kcal: f64,
    pub price: f64,
}

impl Totals {
    pub fn add_meal(&mut self, meal: &MealEntry) {
        self.protein += meal.macros.protein;
        self.carbs += meal.macros.carbs;
        self.fat += meal.macros.fat;
        self.kcal += meal.macros.kcal;
        self.price += meal.price;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayPlan {
    pub day: u8,
    pub meals: DayMeals,
    pub info: SelectionInfo,
    pub totals: Totals,
}

impl DayPlan {
    fn from_selection(day: u8, selection: &DaySelection) -> Self {
        let meals = DayMeals {
            breakfast: MealEntry::from(&selection.breakfast.candidate),
            lunch: MealEntry::from(&selection.lunch.candidate),
            dinner: MealEntry::from(&selection.dinner.candidate),
        };
        let mut totals = Totals::default();
        for meal in meals.iter() {
            totals.add_meal(meal);
        }
        Self {
            day,
            meals,
            info: SelectionInfo {
                relative_error: selection.relative_error,
                quality: selection.quality,
            },
            totals,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanInputs {
    pub daily_protein: f64,
    pub daily_carbs: f64,
    pub daily_fat: f64,
    pub allergens: Vec<String>,
    pub preset: Preset,
}

/// Search effort spent on the whole week.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PlanStats {
    pub candidates_scored: usize,
    pub combinations_evaluated: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub inputs: PlanInputs,
    pub days: Vec<DayPlan>,
    pub weekly_totals: Totals,
    pub stats: PlanStats,
}

impl Plan {
    pub fn average_relative_error(&self) -> f64 {
        if self.days.is_empty() {
            return 0.0;
        }
        self.days.iter().map(|d| d.info.relative_error).sum::<f64>() / self.days.len() as f64
    }
}

fn validate_targets(targets: &MacroTargets) -> Result<(), PlannerError> {
    for (label, value) in [("protein", targets.protein), ("carbs", targets.carbs), ("fat", targets.fat)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(PlannerError::InvalidTargets(format!(
                "{} must be a positive number, got {}",
                label, value
            )));
        }
    }
    Ok(())
}

/// Runs seven sequential day selections over one shared [`WeekState`].
#[derive(Debug, Clone)]
pub struct WeekPlanner {
    preset: Preset,
    settings: SelectionSettings,
    composition: Composition,
}

impl WeekPlanner {
    pub fn new(preset: Preset) -> Self {
        Self { preset, settings: preset.settings(), composition: Composition::default() }
    }

    /// Resolves a preset by name; unknown names fail before any work starts.
    pub fn from_preset_name(name: &str) -> Result<Self, PlannerError> {
        Ok(Self::new(name.parse()?))
    }

    pub fn with_composition(mut self, composition: Composition) -> Self {
        self.composition = composition;
        self
    }

    pub fn with_max_combinations(mut self, max_combinations: Option<usize>) -> Self {
        self.settings.max_combinations = max_combinations;
        self
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn settings(&self) -> SelectionSettings {
        self.settings
    }

    pub fn plan_week<R: Rng + ?Sized>(
        &self,
        catalog: &[IngredientRecord],
        targets: MacroTargets,
        allergens: &[String],
        pairings: &PairingSet,
        rng: &mut R,
    ) -> Result<Plan, PlannerError> {
        validate_targets(&targets)?;
        if catalog.is_empty() {
            return Err(PlannerError::EmptyCatalog);
        }

        let avoid = normalize_allergens(allergens);
        let mut avoid_sorted: Vec<String> = avoid.iter().cloned().collect();
        avoid_sorted.sort();

        info!(
            preset = %self.preset,
            batch_size = self.settings.batch_size,
            top_k = self.settings.top_k,
            catalog = catalog.len(),
            pairings = pairings.len(),
            "planning week"
        );

        let selector = DaySelector::new(catalog, &self.composition, &avoid, targets, self.settings, pairings);
        let mut state = WeekState::new();
        let mut days = Vec::with_capacity(DAYS_PER_WEEK as usize);
        let mut stats = PlanStats::default();
        let mut weekly_totals = Totals::default();

        for day in 1..=DAYS_PER_WEEK {
            let selection = selector.select_day(day, &mut state, rng)?;
            stats.candidates_scored += selection.candidates_scored;
            stats.combinations_evaluated += selection.combinations_evaluated;

            let day_plan = DayPlan::from_selection(day, &selection);
            for meal in day_plan.meals.iter() {
                weekly_totals.add_meal(meal);
            }
            info!(day, relative_error = day_plan.info.relative_error, quality = day_plan.info.quality, "day assembled");
            days.push(day_plan);
        }

        Ok(Plan {
            inputs: PlanInputs {
                daily_protein: targets.protein,
                daily_carbs: targets.carbs,
                daily_fat: targets.fat,
                allergens: avoid_sorted,
                preset: self.preset,
            },
            days,
            weekly_totals,
            stats,
        })
    }
}
