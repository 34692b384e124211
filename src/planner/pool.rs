use std::collections::{HashMap, HashSet};

use crate::catalog::{IngredientRecord, Role, UNIVERSAL};
use crate::planner::composition::Slot;

/// Lowercased, trimmed, non-empty allergen strings.
pub fn normalize_allergens<S: AsRef<str>>(allergens: &[S]) -> HashSet<String> {
    allergens
        .iter()
        .map(|a| a.as_ref().trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect()
}

fn usable_in_slot(record: &IngredientRecord, slot: Slot) -> bool {
    record.meal_slots.is_empty()
        || record.meal_slots.iter().any(|s| {
            let s = s.trim();
            s.eq_ignore_ascii_case(slot.as_str()) || s.eq_ignore_ascii_case(UNIVERSAL)
        })
}

fn allergen_free(record: &IngredientRecord, avoid: &HashSet<String>) -> bool {
    avoid.is_empty()
        || !record
            .allergens
            .iter()
            .any(|a| avoid.contains(&a.trim().to_lowercase()))
}

/// Records usable in `slot` that carry none of the `avoid` allergens.
pub fn filter_pool<'a>(
    catalog: &'a [IngredientRecord],
    slot: Slot,
    avoid: &HashSet<String>,
) -> Vec<&'a IngredientRecord> {
    catalog
        .iter()
        .filter(|r| usable_in_slot(r, slot) && allergen_free(r, avoid))
        .collect()
}

/// A filtered pool with a role index built once, so role groups are looked up
/// without rescanning the pool for every candidate.
#[derive(Debug, Clone)]
pub struct SlotPool<'a> {
    items: Vec<&'a IngredientRecord>,
    by_role: HashMap<Role, Vec<usize>>,
}

impl<'a> SlotPool<'a> {
    pub fn new(items: Vec<&'a IngredientRecord>) -> Self {
        let mut by_role: HashMap<Role, Vec<usize>> = HashMap::new();
        for (idx, item) in items.iter().enumerate() {
            by_role.entry(item.role).or_default().push(idx);
        }
        Self { items, by_role }
    }

    pub fn build(catalog: &'a [IngredientRecord], slot: Slot, avoid: &HashSet<String>) -> Self {
        Self::new(filter_pool(catalog, slot, avoid))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, idx: usize) -> &'a IngredientRecord {
        self.items[idx]
    }

    /// Pool indices of every record with `role`, in pool order.
    pub fn role_indices(&self, role: Role) -> &[usize] {
        self.by_role.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }
}
