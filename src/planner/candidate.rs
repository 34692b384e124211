use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use crate::catalog::{IngredientRecord, Macros, Role, UNIVERSAL};

/// Sorted lowercase ingredient names; identifies a meal for no-repeat checks.
pub type Signature = Vec<String>;

/// Majority cuisine across a set of tag lists.
///
/// Non-universal tags are counted; the highest count wins and exact ties go
/// to the cuisine seen first. "universal" is returned only when no other
/// cuisine received a vote. Returns `None` when nothing is tagged.
pub fn majority_cuisine<'a, I>(tag_lists: I) -> Option<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    let mut has_universal = false;

    for tags in tag_lists {
        for tag in tags {
            if tag == UNIVERSAL {
                has_universal = true;
                continue;
            }
            match counts.iter_mut().find(|(c, _)| *c == tag.as_str()) {
                Some((_, n)) => *n += 1,
                None => counts.push((tag.as_str(), 1)),
            }
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (cuisine, n) in counts {
        if best.map_or(true, |(_, top)| n > top) {
            best = Some((cuisine, n));
        }
    }

    match best {
        Some((cuisine, _)) => Some(cuisine.to_string()),
        None if has_universal => Some(UNIVERSAL.to_string()),
        None => None,
    }
}

/// One assembled meal for one slot.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub names: Vec<String>,
    pub roles: Vec<Role>,
    /// Majority-reduced cuisine list; the first entry is the primary cuisine.
    pub cuisines: Vec<String>,
    /// Every non-universal cuisine tag carried by the items, with repeats.
    #[serde(skip)]
    pub cuisine_tags: Vec<String>,
    pub macros: Macros,
    pub price: f64,
    pub allergens: Vec<String>,
}

impl Candidate {
    /// Aggregates picked records. `None` when no cuisine can be resolved.
    pub fn from_picks(picks: &[&IngredientRecord]) -> Option<Self> {
        let primary = majority_cuisine(picks.iter().map(|r| r.cuisines.as_slice()))?;

        let mut macros = Macros::default();
        let mut price = 0.0;
        let mut allergens = BTreeSet::new();
        for rec in picks {
            macros.add(&rec.macros);
            price += rec.price_per_serving;
            for a in &rec.allergens {
                let a = a.trim().to_lowercase();
                if !a.is_empty() {
                    allergens.insert(a);
                }
            }
        }

        Some(Self {
            names: picks.iter().map(|r| r.name.clone()).collect(),
            roles: picks.iter().map(|r| r.role).collect(),
            cuisines: vec![primary],
            cuisine_tags: picks
                .iter()
                .flat_map(|r| r.cuisines.iter())
                .filter(|c| c.as_str() != UNIVERSAL)
                .cloned()
                .collect(),
            macros,
            price,
            allergens: allergens.into_iter().collect(),
        })
    }

    pub fn item_count(&self) -> usize {
        self.names.len()
    }

    pub fn primary_cuisine(&self) -> &str {
        self.cuisines.first().map(String::as_str).unwrap_or(UNIVERSAL)
    }

    pub fn role_count(&self, role: Role) -> usize {
        self.roles.iter().filter(|r| **r == role).count()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn name_keys(&self) -> HashSet<String> {
        self.names.iter().map(|n| n.trim().to_lowercase()).collect()
    }

    pub fn signature(&self) -> Signature {
        let mut sig: Vec<String> = self.names.iter().map(|n| n.trim().to_lowercase()).collect();
        sig.sort();
        sig
    }
}
