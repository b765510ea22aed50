use crate::{
    alphabet::{CharAlphabet, Symbol},
    automaton::StateIndex,
    math::{Map, StateSet},
    transition_system::Deterministic,
    Dfa, Show,
};

/// Name used for the implicit state that a side of a [`Product`] moves to when it reads a symbol
/// that is not in its alphabet.
pub const ABSENT: &str = "∅";

/// A state of a [`Product`]. Each component is either a state of the respective automaton or
/// `None`, which stands for the implicit absent state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductIndex(pub Option<StateIndex>, pub Option<StateIndex>);

/// The product of two automata over the union of their alphabets. Both automata are run
/// simultaneously; if one of them reads a symbol that is not part of its own alphabet, it moves to
/// an absent state that is non-accepting and is never left again. The product is total over the
/// union alphabet.
///
/// Only the states that are reachable from the pair of initial states are ever explored, so the
/// product is never built explicitly unless [`Product::collect`] is called.
#[derive(Debug, Clone)]
pub struct Product<'a> {
    left: &'a Dfa,
    right: &'a Dfa,
    alphabet: CharAlphabet,
}

impl<'a> Product<'a> {
    /// Creates the product of `left` and `right`.
    pub fn new(left: &'a Dfa, right: &'a Dfa) -> Self {
        Self {
            alphabet: left.alphabet().union(right.alphabet()),
            left,
            right,
        }
    }

    /// Returns the left component.
    pub fn left(&self) -> &'a Dfa {
        self.left
    }

    /// Returns the right component.
    pub fn right(&self) -> &'a Dfa {
        self.right
    }

    /// Returns whether the left and the right component of `state` are accepting. The absent
    /// state is never accepting.
    pub fn acceptance(&self, state: ProductIndex) -> (bool, bool) {
        let ProductIndex(l, r) = state;
        (
            l.is_some_and(|q| self.left.is_accepting(q)),
            r.is_some_and(|q| self.right.is_accepting(q)),
        )
    }

    /// Returns `true` if precisely one of the components of `state` is accepting.
    pub fn disagrees(&self, state: ProductIndex) -> bool {
        let (l, r) = self.acceptance(state);
        l != r
    }

    /// Gives a name to `state`, which is the pair of the names of its components.
    pub fn state_name(&self, state: ProductIndex) -> String {
        let ProductIndex(l, r) = state;
        let component = |dfa: &Dfa, q: Option<StateIndex>| {
            q.and_then(|q| dfa.state_name(q))
                .unwrap_or(ABSENT)
                .to_string()
        };
        format!(
            "({}, {})",
            component(self.left, l),
            component(self.right, r)
        )
    }

    /// Builds the reachable part of the product as a [`Dfa`]. A state is accepting if `accepting`
    /// returns `true` when given whether the left and the right component are accepting.
    pub fn collect<F>(&self, accepting: F) -> Dfa
    where
        F: Fn(bool, bool) -> bool,
    {
        let states: Vec<ProductIndex> = self.reachable_state_indices().collect();
        let index: Map<ProductIndex, StateIndex> = states
            .iter()
            .enumerate()
            .map(|(i, state)| (*state, i))
            .collect();

        let mut table = Vec::with_capacity(states.len() * self.alphabet.size());
        for state in &states {
            for sym in self.alphabet.universe() {
                let target = self
                    .successor(*state, sym)
                    .expect("product is total over its alphabet");
                table.push(index[&target]);
            }
        }

        let accepting: StateSet = states
            .iter()
            .enumerate()
            .filter(|(_, state)| {
                let (l, r) = self.acceptance(**state);
                accepting(l, r)
            })
            .map(|(i, _)| i)
            .collect();

        Dfa::from_parts(
            self.alphabet.clone(),
            states.iter().map(|state| self.state_name(*state)).collect(),
            table,
            0,
            accepting,
        )
    }
}

impl Deterministic for Product<'_> {
    type StateIndex = ProductIndex;

    fn alphabet(&self) -> &CharAlphabet {
        &self.alphabet
    }

    fn initial(&self) -> ProductIndex {
        ProductIndex(Some(self.left.initial()), Some(self.right.initial()))
    }

    fn successor(&self, state: ProductIndex, symbol: Symbol) -> Option<ProductIndex> {
        if !self.alphabet.contains(symbol) {
            return None;
        }
        let ProductIndex(l, r) = state;
        Some(ProductIndex(
            l.and_then(|q| self.left.successor(q, symbol)),
            r.and_then(|q| self.right.successor(q, symbol)),
        ))
    }
}

impl Show for ProductIndex {
    fn show(&self) -> String {
        let component = |q: Option<StateIndex>| q.map_or(ABSENT.to_string(), |q| q.to_string());
        format!("({}, {})", component(self.0), component(self.1))
    }
}
