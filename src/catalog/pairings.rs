use std::collections::HashSet;

/// Externally validated ingredient pairs, stored as lowercase names.
/// Only pairs that passed the caller's score threshold end up here.
#[derive(Debug, Clone, Default)]
pub struct PairingSet {
    pairs: Vec<(String, String)>,
}

impl PairingSet {
    pub fn insert(&mut self, a: &str, b: &str) {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        if a.is_empty() || b.is_empty() {
            return;
        }
        self.pairs.push((a, b));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// True if both members of at least one pair are in `names` (lowercase keys).
    pub fn any_contained_in(&self, names: &HashSet<String>) -> bool {
        self.pairs
            .iter()
            .any(|(a, b)| names.contains(a) && names.contains(b))
    }
}

impl<S: AsRef<str>> FromIterator<(S, S)> for PairingSet {
    fn from_iter<I: IntoIterator<Item = (S, S)>>(iter: I) -> Self {
        let mut set = PairingSet::default();
        for (a, b) in iter {
            set.insert(a.as_ref(), b.as_ref());
        }
        set
    }
}
