use tracing::trace;

use crate::{
    automaton::StateIndex,
    math::StateSet,
    transition_system::{Deterministic, Product, ProductIndex},
    Dfa,
};

impl Dfa {
    /// Computes the negation of `self` by swapping accepting and non-accepting states. The result
    /// accepts precisely the words over the alphabet of `self` that `self` rejects.
    pub fn negation(&self) -> Dfa {
        let accepting: StateSet = self.rejecting_states().collect();
        Dfa::from_parts(
            self.alphabet().clone(),
            self.state_indices()
                .map(|q| self.state_name(q).unwrap_or_default().to_string())
                .collect(),
            self.table.clone(),
            self.initial,
            accepting,
        )
    }

    /// Computes the union of `self` with `other` through a product construction over the union
    /// of both alphabets.
    pub fn union(&self, other: &Dfa) -> Dfa {
        Product::new(self, other).collect(|l, r| l || r)
    }

    /// Computes the intersection of `self` with `other` through a product construction.
    pub fn intersection(&self, other: &Dfa) -> Dfa {
        Product::new(self, other).collect(|l, r| l && r)
    }

    /// Computes an automaton accepting the words that are accepted by precisely one of `self` and
    /// `other`. Its language is empty if and only if the two automata are equivalent.
    pub fn symmetric_difference(&self, other: &Dfa) -> Dfa {
        Product::new(self, other).collect(|l, r| l != r)
    }

    /// Returns the length-lexicographically minimal word that is accepted (if `accepted` is
    /// `true`) or rejected (otherwise), or `None` if there is no such word.
    pub fn give_word(&self, accepted: bool) -> Option<String> {
        self.minimal_representatives()
            .find(|(_, q)| self.is_accepting(*q) == accepted)
            .map(|(word, _)| word)
    }

    /// Returns true if and only if the accepted language is empty.
    pub fn is_empty_language(&self) -> bool {
        self.give_word(true).is_none()
    }

    /// Attempts to separate the state `left` from the state `right` by finding a word that leads
    /// one of them to an accepting and the other to a rejecting state. The returned word is the
    /// length-lexicographically minimal one.
    pub fn separate(&self, left: StateIndex, right: StateIndex) -> Option<String> {
        if left >= self.size() || right >= self.size() {
            return None;
        }
        let product = Product::new(self, self);
        let word = product
            .minimal_representatives_from(ProductIndex(Some(left), Some(right)))
            .find(|(_, q)| product.disagrees(*q))
            .map(|(word, _)| word);
        trace!(left, right, ?word, "separating states");
        word
    }
}
