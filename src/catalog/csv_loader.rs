use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;
use tracing::{debug, info};

use crate::catalog::normalize::{parse_list, parse_number};
use crate::catalog::pairings::PairingSet;
use crate::catalog::record::{IngredientRecord, Macros, Role};

const ID_COL: &str = "id";
const NAME_COL: &str = "name";
const ROLE_COL: &str = "role";
const CATEGORY_COL: &str = "category";
const CUISINE_COL: &str = "cuisine";
const MEAL_TYPES_COL: &str = "meal_types";
const DIET_TAGS_COL: &str = "diet_tags";
const ALLERGENS_COL: &str = "allergens";
const PROTEIN_COL: &str = "protein";
const CARBS_COL: &str = "carbs";
const FAT_COL: &str = "fat";
const SUGAR_COL: &str = "sugar";
const FIBER_COL: &str = "fiber";
const KCAL_COL: &str = "kcal";
const PRICE_COL: &str = "price_per_serving";

const PAIR_A_COL: &str = "ingredient_a";
const PAIR_B_COL: &str = "ingredient_b";
const PAIR_SCORE_COL: &str = "pairing_score";

/// Column positions resolved once from the header row. Only `name` is mandatory.
struct Columns {
    id: Option<usize>,
    name: usize,
    role: Option<usize>,
    category: Option<usize>,
    cuisine: Option<usize>,
    meal_types: Option<usize>,
    diet_tags: Option<usize>,
    allergens: Option<usize>,
    protein: Option<usize>,
    carbs: Option<usize>,
    fat: Option<usize>,
    sugar: Option<usize>,
    fiber: Option<usize>,
    kcal: Option<usize>,
    price: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |col: &str| headers.iter().position(|h| h.trim() == col);
        Ok(Self {
            id: find(ID_COL),
            name: find(NAME_COL).ok_or_else(|| anyhow::anyhow!("Column '{}' not found", NAME_COL))?,
            role: find(ROLE_COL),
            category: find(CATEGORY_COL),
            cuisine: find(CUISINE_COL),
            meal_types: find(MEAL_TYPES_COL),
            diet_tags: find(DIET_TAGS_COL),
            allergens: find(ALLERGENS_COL),
            protein: find(PROTEIN_COL),
            carbs: find(CARBS_COL),
            fat: find(FAT_COL),
            sugar: find(SUGAR_COL),
            fiber: find(FIBER_COL),
            kcal: find(KCAL_COL),
            price: find(PRICE_COL),
        })
    }
}

fn cell<'r>(record: &'r StringRecord, idx: Option<usize>) -> &'r str {
    idx.and_then(|i| record.get(i)).unwrap_or("")
}

fn list(record: &StringRecord, idx: Option<usize>) -> Vec<String> {
    parse_list(cell(record, idx))
}

fn number(record: &StringRecord, idx: Option<usize>) -> f64 {
    parse_number(cell(record, idx))
}

fn text_or_other(record: &StringRecord, idx: Option<usize>) -> String {
    let s = cell(record, idx).trim();
    if s.is_empty() { "other".to_string() } else { s.to_string() }
}

pub fn load_ingredients_csv(csv_path: &Path) -> Result<Vec<IngredientRecord>> {
    if !csv_path.exists() {
        return Err(anyhow::anyhow!("Ingredient CSV file not found at: {:?}", csv_path));
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open ingredient CSV file at {:?}", csv_path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(file);

    let headers = rdr.headers()?.clone();
    let cols = Columns::resolve(&headers)?;

    let mut records = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let row = result.with_context(|| format!("Failed to read record at row index {}", row_index))?;

        let name = cell(&row, Some(cols.name)).trim().to_string();
        if name.is_empty() {
            debug!(row_index, "skipping ingredient row with empty name");
            continue;
        }
        let id = match cell(&row, cols.id).trim() {
            "" => format!("row-{}", row_index),
            id => id.to_string(),
        };

        records.push(IngredientRecord {
            id,
            name,
            role: Role::from_label(cell(&row, cols.role)),
            category: text_or_other(&row, cols.category),
            cuisines: list(&row, cols.cuisine),
            meal_slots: list(&row, cols.meal_types),
            diet_tags: list(&row, cols.diet_tags),
            allergens: list(&row, cols.allergens),
            macros: Macros {
                protein: number(&row, cols.protein),
                carbs: number(&row, cols.carbs),
                fat: number(&row, cols.fat),
                sugar: number(&row, cols.sugar),
                fiber: number(&row, cols.fiber),
                kcal: number(&row, cols.kcal),
            },
            price_per_serving: number(&row, cols.price),
        });
    }

    if records.is_empty() {
        return Err(anyhow::anyhow!("No valid ingredient data loaded from {:?}", csv_path));
    }

    info!(count = records.len(), path = ?csv_path, "loaded ingredient catalog");
    Ok(records)
}

/// Loads a name-based pairing table (`ingredient_a,ingredient_b,pairing_score`),
/// keeping rows whose score is at least `min_score`.
pub fn load_pairings_csv(csv_path: &Path, min_score: i64) -> Result<PairingSet> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open pairing CSV file at {:?}", csv_path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = rdr.headers()?.clone();
    let find = |col: &str| {
        headers
            .iter()
            .position(|h| h.trim() == col)
            .ok_or_else(|| anyhow::anyhow!("Column '{}' not found", col))
    };
    let a_idx = find(PAIR_A_COL)?;
    let b_idx = find(PAIR_B_COL)?;
    let score_idx = find(PAIR_SCORE_COL)?;

    let mut pairings = PairingSet::default();
    for (row_index, result) in rdr.records().enumerate() {
        let row = result.with_context(|| format!("Failed to read pairing at row index {}", row_index))?;
        let score = parse_number(cell(&row, Some(score_idx))) as i64;
        if score < min_score {
            continue;
        }
        pairings.insert(cell(&row, Some(a_idx)), cell(&row, Some(b_idx)));
    }

    info!(count = pairings.len(), min_score, "loaded validated pairings");
    Ok(pairings)
}
