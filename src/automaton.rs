use itertools::Itertools;
use owo_colors::OwoColorize;

use crate::{
    alphabet::{CharAlphabet, Symbol},
    definition::{AutomatonDefinition, TransitionsDefinition},
    math::{Bijection, InsertionOrderedMap, StateSet},
    transition_system::Deterministic,
};

mod run;
pub use run::{RunResult, SimulationError};

mod dfa;

/// States of a [`Dfa`] are identified by their position in the list of states.
pub type StateIndex = usize;

/// A validated deterministic finite automaton.
///
/// Values of this type can only be obtained through validation (see
/// [`crate::definition::RawAutomaton::validate`]) or through operations on other automata, and
/// they can not be modified afterwards. Every value therefore satisfies
/// - the initial state is a state,
/// - the accepting states are states,
/// - for every state and every symbol of the alphabet there is precisely one transition, and it
///   leads to a state.
///
/// Internally, states are numbered in the order in which they were declared and the transitions
/// are stored as a table with one row per state and one column per symbol.
#[derive(Clone)]
pub struct Dfa {
    alphabet: CharAlphabet,
    names: Bijection<String, StateIndex>,
    table: Vec<StateIndex>,
    initial: StateIndex,
    accepting: StateSet,
}

impl Dfa {
    /// Assembles an automaton from its parts. The caller guarantees that `table` has one entry
    /// for every state and symbol and that all indices are in range. Should two names coincide,
    /// the later one is made unique by appending primes.
    pub(crate) fn from_parts(
        alphabet: CharAlphabet,
        names: Vec<String>,
        table: Vec<StateIndex>,
        initial: StateIndex,
        accepting: StateSet,
    ) -> Self {
        debug_assert_eq!(table.len(), names.len() * alphabet.size());
        let mut bijection = Bijection::new();
        for (idx, mut name) in names.into_iter().enumerate() {
            while bijection.contains_left(&name) {
                name.push('\'');
            }
            bijection.insert(name, idx);
        }
        Self {
            alphabet,
            names: bijection,
            table,
            initial,
            accepting,
        }
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.names.len()
    }

    /// Iterates over the indices of all states in the order in which they were declared.
    pub fn state_indices(&self) -> std::ops::Range<StateIndex> {
        0..self.size()
    }

    /// Gives the name of the state with the given index.
    pub fn state_name(&self, state: StateIndex) -> Option<&str> {
        self.names.get_by_right(&state).map(String::as_str)
    }

    /// Looks up the index of the state with the given name.
    pub fn state_index(&self, name: &str) -> Option<StateIndex> {
        self.names.get_by_left(name).copied()
    }

    /// Returns whether the given state is accepting.
    pub fn is_accepting(&self, state: StateIndex) -> bool {
        self.accepting.contains(state)
    }

    /// Returns the indices of all states that are accepting.
    pub fn accepting_states(&self) -> impl Iterator<Item = StateIndex> + '_ {
        self.accepting.iter()
    }

    /// Returns the indices of all states that are rejecting.
    pub fn rejecting_states(&self) -> impl Iterator<Item = StateIndex> + '_ {
        self.state_indices().filter(|q| !self.is_accepting(*q))
    }

    /// Turns `self` back into a definition, with the transitions written as a table.
    pub fn to_definition(&self) -> AutomatonDefinition {
        let name = |q: StateIndex| self.state_name(q).unwrap_or_default().to_string();
        let transitions: InsertionOrderedMap<_, _> = self
            .state_indices()
            .map(|q| {
                let row: InsertionOrderedMap<String, String> = self
                    .alphabet
                    .universe()
                    .filter_map(|sym| Some((sym.to_string(), name(self.successor(q, sym)?))))
                    .collect();
                (name(q), row)
            })
            .collect();
        AutomatonDefinition {
            alphabet: self.alphabet.universe().map(String::from).collect(),
            states: self.state_indices().map(name).collect(),
            start: name(self.initial),
            accepting: self.accepting_states().map(name).collect(),
            transitions: TransitionsDefinition::Table(transitions),
        }
    }

    /// Returns a string representation of the transition table. The initial state is marked
    /// with `->` and accepting states with `*`.
    pub fn build_transition_table(&self) -> String {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string()).chain(self.alphabet.universe().map(String::from)),
        );
        for q in self.state_indices() {
            let marker = match (q == self.initial, self.is_accepting(q)) {
                (true, true) => "->*",
                (true, false) => "->",
                (false, true) => "*",
                (false, false) => "",
            };
            let name = self.state_name(q).unwrap_or_default();
            let head = if self.is_accepting(q) {
                format!("{marker} {}", name.bold())
            } else {
                format!("{marker} {name}")
            };
            builder.push_record(std::iter::once(head.trim_start().to_string()).chain(
                self.alphabet.universe().map(|sym| {
                    self.successor(q, sym)
                        .and_then(|p| self.state_name(p))
                        .unwrap_or("-")
                        .to_string()
                }),
            ));
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}

impl Deterministic for Dfa {
    type StateIndex = StateIndex;

    fn alphabet(&self) -> &CharAlphabet {
        &self.alphabet
    }

    fn initial(&self) -> StateIndex {
        self.initial
    }

    fn successor(&self, state: StateIndex, symbol: Symbol) -> Option<StateIndex> {
        if state >= self.size() {
            return None;
        }
        let position = self.alphabet.position(symbol)?;
        self.table
            .get(state * self.alphabet.size() + position)
            .copied()
    }
}

impl std::fmt::Debug for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DFA over {} with accepting states {{{}}}\n{}",
            self.alphabet,
            self.accepting_states()
                .filter_map(|q| self.state_name(q))
                .join(", "),
            self.build_transition_table()
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::tests::odd_ones;

    #[test]
    fn accessors() {
        let dfa = odd_ones();
        assert_eq!(dfa.size(), 2);
        assert_eq!(dfa.state_index("q1"), Some(1));
        assert_eq!(dfa.state_index("q2"), None);
        assert_eq!(dfa.successor(0, '1'), Some(1));
        assert_eq!(dfa.successor(0, '2'), None);
        assert_eq!(dfa.successor(5, '0'), None);
        assert_eq!(dfa.rejecting_states().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn definition_round_trip() {
        let dfa = odd_ones();
        let text = dfa.to_definition().to_yaml().unwrap();
        let reloaded = load_yaml(&text).unwrap().validate().unwrap();
        assert!(dfa.equivalent(&reloaded).is_equal());
        assert_eq!(reloaded.state_name(reloaded.initial()), Some("q0"));
    }

    #[test]
    fn transition_table() {
        let table = odd_ones().build_transition_table();
        assert!(table.contains("State"));
        assert!(table.contains("->"));
        assert!(table.contains("q1"));
    }

    #[test]
    fn shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Dfa>();
    }
}
