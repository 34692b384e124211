use serde::Serialize;

use crate::catalog::Role;
use crate::planner::candidate::Candidate;
use crate::planner::composition::{CompositionRule, MacroSplit, Slot};

const EPS: f64 = 1e-6;

/// Daily protein/carbs/fat targets in grams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroTargets {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroTargets {
    pub fn scaled(&self, split: &MacroSplit) -> MacroTargets {
        MacroTargets {
            protein: self.protein * split.protein,
            carbs: self.carbs * split.carbs,
            fat: self.fat * split.fat,
        }
    }

    /// Mean of the three `|actual - target| / target` ratios.
    pub fn relative_error(&self, protein: f64, carbs: f64, fat: f64) -> f64 {
        ((protein - self.protein).abs() / (self.protein + EPS)
            + (carbs - self.carbs).abs() / (self.carbs + EPS)
            + (fat - self.fat).abs() / (self.fat + EPS))
            / 3.0
    }
}

/// Component scores, kept for debugging and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub macro_fit: f64,
    pub cuisine_focus: f64,
    pub role_coverage: f64,
    pub count_fit: f64,
    pub dressing_penalty: f64,
    pub total: f64,
}

pub fn macro_fit(candidate: &Candidate, slot_targets: &MacroTargets) -> f64 {
    let m = &candidate.macros;
    (1.0 - slot_targets.relative_error(m.protein, m.carbs, m.fat)).max(0.0)
}

/// 1 for a single cuisine, falling towards 0 as tags spread evenly over
/// more cuisines; 0.5 when nothing but universal tags are present.
/// Entropy runs over every item's tags, not the majority-reduced
/// `cuisines` list, which holds at most one entry and would always score 1.
pub fn cuisine_focus(candidate: &Candidate) -> f64 {
    let tags = &candidate.cuisine_tags;
    if tags.is_empty() {
        return 0.5;
    }
    // Insertion-ordered counts keep the float sum reproducible.
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for tag in tags {
        match counts.iter_mut().find(|(c, _)| *c == tag.as_str()) {
            Some((_, n)) => *n += 1,
            None => counts.push((tag.as_str(), 1)),
        }
    }
    let n = tags.len() as f64;
    let entropy: f64 = counts
        .iter()
        .map(|&(_, c)| {
            let p = c as f64 / n;
            -p * (p + 1e-9).ln()
        })
        .sum();
    (1.0 - entropy / 1.5).clamp(0.0, 1.0)
}

pub fn role_coverage(candidate: &Candidate, rule: &CompositionRule) -> f64 {
    let total = rule.required.len().max(1) as f64;
    let satisfied = rule
        .required
        .iter()
        .filter(|(role, count)| *count == 0 || candidate.has_role(*role))
        .count() as f64;

    let mut bonus = 0.0;
    if candidate.has_role(Role::LeafyGreen) {
        bonus += 0.15;
    }
    if candidate.has_role(Role::Vegetable) {
        bonus += 0.10;
    }
    if candidate.has_role(Role::FatSource) {
        bonus += 0.10;
    }
    (satisfied / total + bonus).min(1.0)
}

pub fn count_fit(candidate: &Candidate, rule: &CompositionRule) -> f64 {
    let n = candidate.item_count();
    if n < rule.min_items {
        return (1.0 - (rule.min_items - n) as f64 * 0.3).max(0.0);
    }
    if n > rule.max_items {
        return (1.0 - (n - rule.max_items) as f64 * 0.2).max(0.0);
    }
    let spread = (rule.max_items - rule.min_items) as f64 + EPS;
    (1.0 - (n as f64 - rule.midpoint()).abs() / spread).max(0.0)
}

pub fn dressing_penalty(candidate: &Candidate, slot: Slot) -> f64 {
    if !slot.wants_dressing() {
        return 0.0;
    }
    match candidate.role_count(Role::DressingSauce) {
        0 => 0.2,
        1 => 0.0,
        _ => 0.3,
    }
}

/// Weighted composite in [0, 1].
pub fn score_breakdown(
    candidate: &Candidate,
    slot: Slot,
    rule: &CompositionRule,
    slot_targets: &MacroTargets,
) -> ScoreBreakdown {
    let macro_fit = macro_fit(candidate, slot_targets);
    let cuisine_focus = cuisine_focus(candidate);
    let role_coverage = role_coverage(candidate, rule);
    let count_fit = count_fit(candidate, rule);
    let dressing_penalty = dressing_penalty(candidate, slot);

    let total = 0.45 * macro_fit + 0.20 * cuisine_focus + 0.20 * role_coverage + 0.10 * count_fit
        - 0.05 * dressing_penalty;

    ScoreBreakdown {
        macro_fit,
        cuisine_focus,
        role_coverage,
        count_fit,
        dressing_penalty,
        total: total.clamp(0.0, 1.0),
    }
}

pub fn score_candidate(
    candidate: &Candidate,
    slot: Slot,
    rule: &CompositionRule,
    slot_targets: &MacroTargets,
) -> f64 {
    score_breakdown(candidate, slot, rule, slot_targets).total
}
