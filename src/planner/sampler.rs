use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use tracing::warn;

use crate::catalog::{IngredientRecord, Role};
use crate::planner::candidate::{majority_cuisine, Candidate};
use crate::planner::composition::{contains_banned_pair, CompositionRule, Slot};
use crate::planner::pool::SlotPool;

/// Mutable assembly state for one sampling attempt.
struct Assembly<'p, 'a> {
    pool: &'p SlotPool<'a>,
    picks: Vec<usize>,
    used: HashSet<usize>,
}

impl<'p, 'a> Assembly<'p, 'a> {
    fn new(pool: &'p SlotPool<'a>) -> Self {
        Self { pool, picks: Vec::new(), used: HashSet::new() }
    }

    fn unused_with_role(&self, role: Role) -> Vec<usize> {
        self.pool
            .role_indices(role)
            .iter()
            .copied()
            .filter(|i| !self.used.contains(i))
            .collect()
    }

    fn has_dressing(&self) -> bool {
        self.picks
            .iter()
            .any(|&i| self.pool.get(i).role == Role::DressingSauce)
    }

    fn take<R: Rng + ?Sized>(&mut self, from: &[usize], k: usize, rng: &mut R) {
        if k == 0 {
            return;
        }
        let chosen: Vec<usize> = from.choose_multiple(rng, k).copied().collect();
        for idx in chosen {
            self.used.insert(idx);
            self.picks.push(idx);
        }
    }

    /// Items tagged with the target cuisine (or universal) when any exist, else all.
    fn prefer_cuisine(&self, candidates: Vec<usize>, cuisine: &str) -> Vec<usize> {
        let preferred: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| self.pool.get(i).matches_cuisine(cuisine))
            .collect();
        if preferred.is_empty() { candidates } else { preferred }
    }

    fn records(&self) -> Vec<&'a IngredientRecord> {
        self.picks.iter().map(|&i| self.pool.get(i)).collect()
    }
}

/// Assembles one candidate meal from `pool` under `rule`.
///
/// Returns `None` on any local failure (missing required role, unresolvable
/// cuisine, banned keyword pair, size out of range); callers retry.
pub fn sample_candidate<R: Rng + ?Sized>(
    pool: &SlotPool<'_>,
    rule: &CompositionRule,
    rng: &mut R,
) -> Option<Candidate> {
    if pool.is_empty() || rule.min_items > rule.max_items {
        return None;
    }
    let target = rng.gen_range(rule.min_items..=rule.max_items);
    let mut asm = Assembly::new(pool);

    for &(role, count) in &rule.required {
        if count == 0 {
            continue;
        }
        let avail = asm.unused_with_role(role);
        if avail.is_empty() {
            return None;
        }
        asm.take(&avail, count, rng);
    }

    let target_cuisine = majority_cuisine(asm.records().iter().map(|r| r.cuisines.as_slice()))
        .or_else(|| majority_cuisine((0..pool.len()).map(|i| pool.get(i).cuisines.as_slice())))?;

    for &(role, cap) in &rule.optional_max {
        if asm.picks.len() >= target {
            break;
        }
        let k = cap.min(target - asm.picks.len());
        if k == 0 {
            continue;
        }
        let avail = asm.unused_with_role(role);
        let avail = asm.prefer_cuisine(avail, &target_cuisine);
        asm.take(&avail, k, rng);
    }

    if asm.picks.len() < rule.min_items {
        let skip_dressing = asm.has_dressing();
        let left: Vec<usize> = (0..pool.len())
            .filter(|i| !asm.used.contains(i))
            .filter(|&i| !(skip_dressing && pool.get(i).role == Role::DressingSauce))
            .collect();
        let left = asm.prefer_cuisine(left, &target_cuisine);
        let missing = rule.min_items - asm.picks.len();
        asm.take(&left, missing, rng);
    }

    let mut picks = asm.records();
    let names: Vec<&str> = picks.iter().map(|r| r.name.as_str()).collect();
    if contains_banned_pair(&names) {
        return None;
    }

    let dressings = picks.iter().filter(|r| r.role == Role::DressingSauce).count();
    if dressings > 1 {
        let keep = rng.gen_range(0..dressings);
        let mut seen = 0;
        picks.retain(|r| {
            if r.role != Role::DressingSauce {
                return true;
            }
            seen += 1;
            seen - 1 == keep
        });
    }

    if !rule.contains_count(picks.len()) {
        return None;
    }

    Candidate::from_picks(&picks)
}

/// Result of filling one slot's candidate batch.
#[derive(Debug, Default)]
pub struct Batch {
    pub candidates: Vec<Candidate>,
    pub attempts: usize,
}

/// Calls the sampler until `size` candidates exist or `size * attempts_factor`
/// attempts were spent. A short batch is logged, not treated as an error.
pub fn generate_batch<R: Rng + ?Sized>(
    pool: &SlotPool<'_>,
    rule: &CompositionRule,
    slot: Slot,
    size: usize,
    attempts_factor: usize,
    rng: &mut R,
) -> Batch {
    let cap = size.saturating_mul(attempts_factor);
    let mut batch = Batch { candidates: Vec::with_capacity(size), attempts: 0 };

    while batch.candidates.len() < size && batch.attempts < cap {
        batch.attempts += 1;
        if let Some(candidate) = sample_candidate(pool, rule, rng) {
            batch.candidates.push(candidate);
        }
    }

    if batch.candidates.len() < size {
        warn!(
            slot = %slot,
            produced = batch.candidates.len(),
            target = size,
            attempts = batch.attempts,
            "candidate batch below target after exhausting attempts"
        );
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Macros;
    use crate::planner::composition::Composition;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(name: &str, role: Role, cuisines: &[&str]) -> IngredientRecord {
        IngredientRecord {
            id: name.to_string(),
            name: name.to_string(),
            role,
            category: "other".to_string(),
            cuisines: cuisines.iter().map(|s| s.to_string()).collect(),
            meal_slots: vec![],
            diet_tags: vec![],
            allergens: vec![],
            macros: Macros { protein: 5.0, carbs: 5.0, fat: 2.0, kcal: 58.0, ..Default::default() },
            price_per_serving: 1.0,
        }
    }

    fn rich_catalog() -> Vec<IngredientRecord> {
        let mut out = Vec::new();
        let roles = [
            Role::BaseProtein,
            Role::SecondaryProtein,
            Role::BaseCarb,
            Role::LeafyGreen,
            Role::Vegetable,
            Role::FatSource,
            Role::DressingSauce,
            Role::Topping,
            Role::Garnish,
        ];
        for cuisine in ["thai", "italian"] {
            for role in roles {
                for n in 0..3 {
                    out.push(record(&format!("{} {} {}", cuisine, role, n), role, &[cuisine]));
                }
            }
        }
        out
    }

    #[test]
    fn test_sampled_candidates_respect_rule() {
        let catalog = rich_catalog();
        let comp = Composition::default();
        let mut rng = StdRng::seed_from_u64(7);
        for slot in Slot::ALL {
            let pool = SlotPool::build(&catalog, slot, &HashSet::new());
            let rule = comp.rule(slot);
            for _ in 0..200 {
                if let Some(c) = sample_candidate(&pool, rule, &mut rng) {
                    assert!(rule.contains_count(c.item_count()), "{} items for {}", c.item_count(), slot);
                    assert!(c.role_count(Role::DressingSauce) <= 1);
                    if slot.wants_dressing() {
                        assert!(c.has_role(Role::BaseProtein));
                        assert_eq!(c.role_count(Role::DressingSauce), 1);
                    }
                    let unique: HashSet<&String> = c.names.iter().collect();
                    assert_eq!(unique.len(), c.names.len());
                }
            }
        }
    }

    #[test]
    fn test_missing_required_role_yields_none() {
        let catalog: Vec<IngredientRecord> = rich_catalog()
            .into_iter()
            .filter(|r| r.role != Role::DressingSauce)
            .collect();
        let comp = Composition::default();
        let pool = SlotPool::build(&catalog, Slot::Lunch, &HashSet::new());
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert!(sample_candidate(&pool, &comp.lunch, &mut rng).is_none());
        }
    }

    #[test]
    fn test_untagged_pool_yields_none() {
        let catalog: Vec<IngredientRecord> = rich_catalog()
            .into_iter()
            .map(|mut r| {
                r.cuisines.clear();
                r
            })
            .collect();
        let comp = Composition::default();
        let pool = SlotPool::build(&catalog, Slot::Breakfast, &HashSet::new());
        let mut rng = StdRng::seed_from_u64(3);
        assert!(sample_candidate(&pool, &comp.breakfast, &mut rng).is_none());
    }

    #[test]
    fn test_banned_pair_is_never_emitted() {
        let mut catalog = rich_catalog();
        catalog.push(record("Whey Protein", Role::SecondaryProtein, &["universal"]));
        catalog.push(record("Blueberry", Role::Topping, &["universal"]));
        let comp = Composition::default();
        let pool = SlotPool::build(&catalog, Slot::Breakfast, &HashSet::new());
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..300 {
            if let Some(c) = sample_candidate(&pool, &comp.breakfast, &mut rng) {
                assert!(!contains_banned_pair(&c.names));
            }
        }
    }

    #[test]
    fn test_same_seed_same_candidate() {
        let catalog = rich_catalog();
        let comp = Composition::default();
        let pool = SlotPool::build(&catalog, Slot::Dinner, &HashSet::new());
        let a = sample_candidate(&pool, &comp.dinner, &mut StdRng::seed_from_u64(99)).map(|c| c.names);
        let b = sample_candidate(&pool, &comp.dinner, &mut StdRng::seed_from_u64(99)).map(|c| c.names);
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_batch_respects_attempt_cap() {
        let catalog: Vec<IngredientRecord> = rich_catalog()
            .into_iter()
            .filter(|r| r.role != Role::BaseProtein)
            .collect();
        let comp = Composition::default();
        let pool = SlotPool::build(&catalog, Slot::Lunch, &HashSet::new());
        let mut rng = StdRng::seed_from_u64(5);
        let batch = generate_batch(&pool, &comp.lunch, Slot::Lunch, 10, 40, &mut rng);
        assert!(batch.candidates.is_empty());
        assert_eq!(batch.attempts, 400);
    }

    #[test]
    fn test_generate_batch_fills_target() {
        let catalog = rich_catalog();
        let comp = Composition::default();
        let pool = SlotPool::build(&catalog, Slot::Breakfast, &HashSet::new());
        let mut rng = StdRng::seed_from_u64(5);
        let batch = generate_batch(&pool, &comp.breakfast, Slot::Breakfast, 25, 40, &mut rng);
        assert_eq!(batch.candidates.len(), 25);
    }
}
