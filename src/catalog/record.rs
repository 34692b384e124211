use serde::{Deserialize, Serialize};
use std::fmt;

/// Cuisine tag that matches every other cuisine.
pub const UNIVERSAL: &str = "universal";

/// Culinary function an ingredient plays inside a meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    BaseProtein,
    SecondaryProtein,
    BaseCarb,
    LeafyGreen,
    Vegetable,
    FatSource,
    DressingSauce,
    Topping,
    Garnish,
    Other,
}

impl Role {
    pub const ALL: [Role; 10] = [
        Role::BaseProtein,
        Role::SecondaryProtein,
        Role::BaseCarb,
        Role::LeafyGreen,
        Role::Vegetable,
        Role::FatSource,
        Role::DressingSauce,
        Role::Topping,
        Role::Garnish,
        Role::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::BaseProtein => "base_protein",
            Role::SecondaryProtein => "secondary_protein",
            Role::BaseCarb => "base_carb",
            Role::LeafyGreen => "leafy_green",
            Role::Vegetable => "vegetable",
            Role::FatSource => "fat_source",
            Role::DressingSauce => "dressing_sauce",
            Role::Topping => "topping",
            Role::Garnish => "garnish",
            Role::Other => "other",
        }
    }

    /// Lenient parse used by the ingestion layer: unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        let wanted = label.trim().to_lowercase();
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == wanted)
            .unwrap_or(Role::Other)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Macro quantities for one serving (or a sum of servings).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Macros {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub sugar: f64,
    pub fiber: f64,
    pub kcal: f64,
}

impl Macros {
    pub fn add(&mut self, other: &Macros) {
        self.protein += other.protein;
        self.carbs += other.carbs;
        self.fat += other.fat;
        self.sugar += other.sugar;
        self.fiber += other.fiber;
        self.kcal += other.kcal;
    }
}

/// A normalized catalog entry. The planner never mutates these.
#[derive(Debug, Clone, Serialize)]
pub struct IngredientRecord {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub category: String,
    pub cuisines: Vec<String>,
    /// Empty means usable in any slot.
    pub meal_slots: Vec<String>,
    pub diet_tags: Vec<String>,
    pub allergens: Vec<String>,
    pub macros: Macros,
    pub price_per_serving: f64,
}

impl IngredientRecord {
    pub fn name_key(&self) -> String {
        self.name.trim().to_lowercase()
    }

    pub fn has_cuisine(&self, cuisine: &str) -> bool {
        self.cuisines.iter().any(|c| c == cuisine)
    }

    /// True when the record is tagged with `cuisine` or with the universal tag.
    pub fn matches_cuisine(&self, cuisine: &str) -> bool {
        self.has_cuisine(cuisine) || self.has_cuisine(UNIVERSAL)
    }
}
