use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::catalog::{IngredientRecord, PairingSet};
use crate::planner::candidate::{Candidate, Signature};
use crate::planner::composition::{Composition, Slot};
use crate::planner::error::PlannerError;
use crate::planner::pool::SlotPool;
use crate::planner::sampler::generate_batch;
use crate::planner::scorer::{score_candidate, MacroTargets};
use crate::planner::state::WeekState;

const CUISINE_FATIGUE: f64 = 0.15;
const INGREDIENT_FATIGUE: f64 = 0.12;
const PAIRING_BONUS: f64 = 0.25;
const DIVERSITY_BONUS_PER_CUISINE: f64 = 0.04;
const ERROR_WEIGHT: f64 = 0.65;
const QUALITY_WEIGHT: f64 = 0.35;

fn distinct_cuisines(a: &str, b: &str, c: &str) -> usize {
    1 + usize::from(b != a) + usize::from(c != a && c != b)
}

/// Knobs for one day's search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionSettings {
    /// Candidates sampled per slot (B).
    pub batch_size: usize,
    /// Candidates kept per slot for the combination search (K).
    pub top_k: usize,
    /// Sampling attempts allowed per requested candidate.
    pub attempts_factor: usize,
    /// Upper bound on triples evaluated; lists shrink evenly when exceeded.
    pub max_combinations: Option<usize>,
}

/// A candidate with its week-adjusted score.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
    pub signature: Signature,
}

#[derive(Debug)]
struct RankedSlot {
    slot: Slot,
    entries: Vec<ScoredCandidate>,
    scored: usize,
}

/// The committed triple for one day.
#[derive(Debug, Clone)]
pub struct DaySelection {
    pub breakfast: ScoredCandidate,
    pub lunch: ScoredCandidate,
    pub dinner: ScoredCandidate,
    pub relative_error: f64,
    pub quality: f64,
    pub candidates_scored: usize,
    pub combinations_evaluated: usize,
}

impl DaySelection {
    pub fn meals(&self) -> [(Slot, &ScoredCandidate); 3] {
        [
            (Slot::Breakfast, &self.breakfast),
            (Slot::Lunch, &self.lunch),
            (Slot::Dinner, &self.dinner),
        ]
    }
}

/// Builds one day at a time against shared week state.
pub struct DaySelector<'a> {
    composition: &'a Composition,
    pools: [SlotPool<'a>; 3],
    targets: MacroTargets,
    settings: SelectionSettings,
    pairings: &'a PairingSet,
}

impl<'a> DaySelector<'a> {
    pub fn new(
        catalog: &'a [IngredientRecord],
        composition: &'a Composition,
        avoid_allergens: &HashSet<String>,
        targets: MacroTargets,
        settings: SelectionSettings,
        pairings: &'a PairingSet,
    ) -> Self {
        let pools = Slot::ALL.map(|slot| SlotPool::build(catalog, slot, avoid_allergens));
        for (slot, pool) in Slot::ALL.iter().zip(pools.iter()) {
            debug!(slot = %slot, size = pool.len(), "filtered slot pool");
        }
        Self { composition, pools, targets, settings, pairings }
    }

    fn pool(&self, slot: Slot) -> &SlotPool<'a> {
        &self.pools[slot as usize]
    }

    /// Week-adjusted score: base score minus cuisine and ingredient fatigue,
    /// plus the pairing bonus.
    pub fn adjusted_score(&self, candidate: &Candidate, slot: Slot, state: &WeekState) -> f64 {
        let rule = self.composition.rule(slot);
        let slot_targets = self.targets.scaled(&rule.split);
        let mut score = score_candidate(candidate, slot, rule, &slot_targets);

        score -= CUISINE_FATIGUE * state.cuisine_count(candidate.primary_cuisine()) as f64;
        score -= INGREDIENT_FATIGUE * state.ingredient_fatigue(candidate) as f64;
        if !self.pairings.is_empty() && self.pairings.any_contained_in(&candidate.name_keys()) {
            score += PAIRING_BONUS;
        }
        score
    }

    fn rank_slot(&self, slot: Slot, state: &WeekState, rng: &mut StdRng) -> RankedSlot {
        let rule = self.composition.rule(slot);
        let batch = generate_batch(
            self.pool(slot),
            rule,
            slot,
            self.settings.batch_size,
            self.settings.attempts_factor,
            rng,
        );
        let mut candidates = batch.candidates;
        candidates.shuffle(rng);

        let mut scored = 0;
        let mut entries: Vec<ScoredCandidate> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let signature = candidate.signature();
            if state.is_used(&signature) {
                continue;
            }
            let score = self.adjusted_score(&candidate, slot, state);
            scored += 1;
            entries.push(ScoredCandidate { candidate, score, signature });
        }

        entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        let mut seen: HashSet<Signature> = HashSet::new();
        entries.retain(|e| seen.insert(e.signature.clone()));
        entries.truncate(self.settings.top_k);

        debug!(slot = %slot, sampled = batch.attempts, scored, kept = entries.len(), "ranked slot candidates");
        RankedSlot { slot, entries, scored }
    }

    /// Shrinks every slot list to `floor(cbrt(budget))` entries. A signature
    /// kept for an earlier slot is skipped in later slots so the shortened
    /// lists still hold a same-day distinct triple. Lists are left whole when
    /// a slot would keep nothing.
    fn apply_combination_budget(&self, ranked: &mut [RankedSlot]) {
        let Some(budget) = self.settings.max_combinations else {
            return;
        };
        let total: usize = ranked.iter().map(|r| r.entries.len()).product();
        if total <= budget {
            return;
        }
        let per_slot = ((budget as f64).cbrt().floor() as usize).max(1);

        let mut kept: HashSet<&Signature> = HashSet::new();
        let mut plan: Vec<Vec<usize>> = Vec::with_capacity(ranked.len());
        for r in ranked.iter() {
            let picks: Vec<usize> = r
                .entries
                .iter()
                .enumerate()
                .filter(|(_, e)| !kept.contains(&e.signature))
                .map(|(idx, _)| idx)
                .take(per_slot)
                .collect();
            if picks.is_empty() {
                warn!(slot = %r.slot, budget, "combination budget leaves no distinct entry, searching full lists");
                return;
            }
            kept.extend(picks.iter().map(|&idx| &r.entries[idx].signature));
            plan.push(picks);
        }

        warn!(total, budget, per_slot, "combination budget exceeded, shrinking per-slot lists");
        for (r, picks) in ranked.iter_mut().zip(plan) {
            let mut idx = 0;
            r.entries.retain(|_| {
                let keep = picks.contains(&idx);
                idx += 1;
                keep
            });
        }
    }

    /// Generates, ranks and searches one day, then commits the winner to `state`.
    pub fn select_day<R: Rng + ?Sized>(
        &self,
        day: u8,
        state: &mut WeekState,
        rng: &mut R,
    ) -> Result<DaySelection, PlannerError> {
        // One child generator per slot, seeded in slot order, keeps the
        // parallel batches reproducible.
        let jobs: Vec<(Slot, u64)> = Slot::ALL.iter().map(|&slot| (slot, rng.gen())).collect();
        let shared: &WeekState = state;
        let mut ranked: Vec<RankedSlot> = jobs
            .into_par_iter()
            .map(|(slot, seed)| self.rank_slot(slot, shared, &mut StdRng::seed_from_u64(seed)))
            .collect();

        if let Some(empty) = ranked.iter().find(|r| r.entries.is_empty()) {
            return Err(PlannerError::NoCandidates { day, slot: empty.slot });
        }
        self.apply_combination_budget(&mut ranked);

        let candidates_scored = ranked.iter().map(|r| r.scored).sum();
        let (b_list, l_list, d_list) = (&ranked[0].entries, &ranked[1].entries, &ranked[2].entries);

        let mut best: Option<(usize, usize, usize, f64, f64)> = None;
        let mut best_cost = f64::INFINITY;
        let mut combinations_evaluated = 0;

        for (bi, b) in b_list.iter().enumerate() {
            for (li, l) in l_list.iter().enumerate() {
                if l.signature == b.signature {
                    continue;
                }
                for (di, d) in d_list.iter().enumerate() {
                    if d.signature == b.signature || d.signature == l.signature {
                        continue;
                    }
                    combinations_evaluated += 1;

                    let (bm, lm, dm) = (&b.candidate.macros, &l.candidate.macros, &d.candidate.macros);
                    let rel = self.targets.relative_error(
                        bm.protein + lm.protein + dm.protein,
                        bm.carbs + lm.carbs + dm.carbs,
                        bm.fat + lm.fat + dm.fat,
                    );
                    let distinct = distinct_cuisines(
                        b.candidate.primary_cuisine(),
                        l.candidate.primary_cuisine(),
                        d.candidate.primary_cuisine(),
                    );
                    let quality = (b.score + l.score + d.score) / 3.0
                        + DIVERSITY_BONUS_PER_CUISINE * distinct as f64;
                    let cost = ERROR_WEIGHT * rel - QUALITY_WEIGHT * quality;

                    if cost < best_cost {
                        best_cost = cost;
                        best = Some((bi, li, di, rel, quality));
                    }
                }
            }
        }

        let (bi, li, di, relative_error, quality) =
            best.ok_or(PlannerError::NoDistinctCombination { day })?;

        let selection = DaySelection {
            breakfast: b_list[bi].clone(),
            lunch: l_list[li].clone(),
            dinner: d_list[di].clone(),
            relative_error,
            quality,
            candidates_scored,
            combinations_evaluated,
        };

        for (_, meal) in selection.meals() {
            state.commit(&meal.candidate);
        }
        debug!(day, relative_error, quality, combinations_evaluated, "committed day");
        Ok(selection)
    }
}
