use serde::Serialize;
use std::fmt;

use crate::catalog::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Breakfast,
    Lunch,
    Dinner,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Breakfast, Slot::Lunch, Slot::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Breakfast => "breakfast",
            Slot::Lunch => "lunch",
            Slot::Dinner => "dinner",
        }
    }

    /// Lunch and dinner are expected to carry exactly one dressing.
    pub fn wants_dressing(&self) -> bool {
        matches!(self, Slot::Lunch | Slot::Dinner)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Share of the daily protein/carbs/fat targets assigned to a slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroSplit {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Per-slot composition. Role lists are ordered; sampling walks them in order.
#[derive(Debug, Clone)]
pub struct CompositionRule {
    pub required: Vec<(Role, usize)>,
    pub optional_max: Vec<(Role, usize)>,
    pub min_items: usize,
    pub max_items: usize,
    pub split: MacroSplit,
}

impl CompositionRule {
    pub fn midpoint(&self) -> f64 {
        (self.min_items + self.max_items) as f64 / 2.0
    }

    pub fn contains_count(&self, n: usize) -> bool {
        (self.min_items..=self.max_items).contains(&n)
    }
}

/// Composition rules for all three slots.
#[derive(Debug, Clone)]
pub struct Composition {
    pub breakfast: CompositionRule,
    pub lunch: CompositionRule,
    pub dinner: CompositionRule,
}

impl Composition {
    pub fn rule(&self, slot: Slot) -> &CompositionRule {
        match slot {
            Slot::Breakfast => &self.breakfast,
            Slot::Lunch => &self.lunch,
            Slot::Dinner => &self.dinner,
        }
    }
}

fn main_meal_optional() -> Vec<(Role, usize)> {
    vec![
        (Role::BaseCarb, 1),
        (Role::SecondaryProtein, 1),
        (Role::LeafyGreen, 2),
        (Role::Vegetable, 3),
        (Role::FatSource, 1),
        (Role::Topping, 2),
        (Role::Garnish, 2),
    ]
}

impl Default for Composition {
    fn default() -> Self {
        Self {
            breakfast: CompositionRule {
                required: vec![(Role::BaseProtein, 0), (Role::DressingSauce, 0)],
                optional_max: vec![
                    (Role::BaseCarb, 1),
                    (Role::SecondaryProtein, 1),
                    (Role::LeafyGreen, 1),
                    (Role::Vegetable, 2),
                    (Role::FatSource, 1),
                    (Role::Topping, 2),
                    (Role::Garnish, 2),
                ],
                min_items: 6,
                max_items: 8,
                split: MacroSplit { protein: 0.30, carbs: 0.35, fat: 0.35 },
            },
            lunch: CompositionRule {
                required: vec![(Role::BaseProtein, 1), (Role::DressingSauce, 1)],
                optional_max: main_meal_optional(),
                min_items: 8,
                max_items: 10,
                split: MacroSplit { protein: 0.40, carbs: 0.35, fat: 0.35 },
            },
            dinner: CompositionRule {
                required: vec![(Role::BaseProtein, 1), (Role::DressingSauce, 1)],
                optional_max: main_meal_optional(),
                min_items: 8,
                max_items: 10,
                split: MacroSplit { protein: 0.30, carbs: 0.30, fat: 0.30 },
            },
        }
    }
}

/// Keyword pairs that must never appear together in one meal.
pub const BANNED_KEYWORD_PAIRS: &[(&str, &str)] = &[
    ("whey", "blueberry"),
    ("soba", "blueberry"),
    ("noodle", "blueberry"),
];

/// Case-insensitive substring check across all ingredient names.
pub fn contains_banned_pair<S: AsRef<str>>(names: &[S]) -> bool {
    let lowered: Vec<String> = names.iter().map(|n| n.as_ref().to_lowercase()).collect();
    let mentions = |kw: &str| lowered.iter().any(|n| n.contains(kw));
    BANNED_KEYWORD_PAIRS
        .iter()
        .any(|(a, b)| mentions(a) && mentions(b))
}
