use std::collections::{HashMap, HashSet};

use crate::planner::candidate::{Candidate, Signature};

/// Diversity bookkeeping carried from one day to the next.
///
/// Read during scoring, written only by [`WeekState::commit`] once a day's
/// triple has been chosen.
#[derive(Debug, Clone, Default)]
pub struct WeekState {
    used_signatures: HashSet<Signature>,
    cuisine_usage: HashMap<String, usize>,
    ingredient_usage: HashMap<String, usize>,
}

impl WeekState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_used(&self, signature: &Signature) -> bool {
        self.used_signatures.contains(signature)
    }

    pub fn cuisine_count(&self, cuisine: &str) -> usize {
        self.cuisine_usage.get(cuisine).copied().unwrap_or(0)
    }

    pub fn ingredient_count(&self, name_key: &str) -> usize {
        self.ingredient_usage.get(name_key).copied().unwrap_or(0)
    }

    /// Sum of prior uses over every ingredient in the candidate.
    pub fn ingredient_fatigue(&self, candidate: &Candidate) -> usize {
        candidate
            .names
            .iter()
            .map(|n| self.ingredient_count(&n.trim().to_lowercase()))
            .sum()
    }

    pub fn used_signature_count(&self) -> usize {
        self.used_signatures.len()
    }

    pub fn commit(&mut self, candidate: &Candidate) {
        self.used_signatures.insert(candidate.signature());
        *self
            .cuisine_usage
            .entry(candidate.primary_cuisine().to_string())
            .or_insert(0) += 1;
        for name in &candidate.names {
            *self
                .ingredient_usage
                .entry(name.trim().to_lowercase())
                .or_insert(0) += 1;
        }
    }
}
