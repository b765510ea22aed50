use tracing::{debug, trace};

use crate::{
    transition_system::{Deterministic, Product},
    Dfa, Show,
};

/// The outcome of comparing two automata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EquivalenceResult {
    /// Both automata accept the same language.
    Equal,
    /// The automata disagree on `witness`, which is the length-lexicographically minimal word
    /// that one of them accepts and the other one rejects.
    Different {
        /// A word in the symmetric difference of both languages.
        witness: String,
    },
}

impl EquivalenceResult {
    /// Returns `true` if the languages coincide.
    pub fn is_equal(&self) -> bool {
        matches!(self, EquivalenceResult::Equal)
    }

    /// Returns the distinguishing word, if there is one.
    pub fn witness(&self) -> Option<&str> {
        match self {
            EquivalenceResult::Equal => None,
            EquivalenceResult::Different { witness } => Some(witness),
        }
    }
}

impl std::fmt::Display for EquivalenceResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EquivalenceResult::Equal => write!(f, "equivalent"),
            EquivalenceResult::Different { witness } => {
                write!(f, "not equivalent, they disagree on {}", witness.show())
            }
        }
    }
}

/// Decides whether `left` and `right` accept the same language.
///
/// The product of both automata is explored breadth-first over the union of their alphabets,
/// starting from the pair of initial states. An automaton that reads a symbol which is not part of
/// its own alphabet moves to an absent state, which is rejecting and never left, so a word that
/// contains such a symbol is never accepted by it.
///
/// The first pair of states (in breadth-first order) on which the two automata disagree yields the
/// witness. Because successors are visited in the order of the alphabet, that witness is the
/// length-lexicographically minimal word in the symmetric difference, and swapping `left` and
/// `right` produces the same word. At most `(|left| + 1) * (|right| + 1)` pairs are visited.
///
/// # Example
/// ```
/// use automata_grader::prelude::*;
///
/// let contains = |pattern: [char; 2]| {
///     let (x, y) = (pattern[0].to_string(), pattern[1].to_string());
///     RawAutomaton::new(['0', '1'])
///         .with_states(["init", "seen", "found"])
///         .with_start("init")
///         .with_accepting(["found"])
///         .with_transitions([
///             ("init", x.as_str(), "seen"),
///             ("init", y.as_str(), "init"),
///             ("seen", x.as_str(), "seen"),
///             ("seen", y.as_str(), "found"),
///             ("found", "0", "found"),
///             ("found", "1", "found"),
///         ])
///         .validate()
///         .unwrap()
/// };
/// let result = equivalent(&contains(['0', '1']), &contains(['1', '0']));
/// assert_eq!(result.witness(), Some("01"));
/// ```
pub fn equivalent(left: &Dfa, right: &Dfa) -> EquivalenceResult {
    let product = Product::new(left, right);
    debug!(
        "comparing automata with {} and {} states over {}",
        left.size(),
        right.size(),
        product.alphabet()
    );

    let mut explored = 0usize;
    let found = product.minimal_representatives().find(|(word, q)| {
        explored += 1;
        trace!("visiting {} via {}", product.state_name(*q), word.show());
        product.disagrees(*q)
    });

    match found {
        Some((witness, q)) => {
            debug!(
                "automata disagree on {} in {} after {explored} pairs",
                witness.show(),
                product.state_name(q)
            );
            EquivalenceResult::Different { witness }
        }
        None => {
            debug!("automata are equivalent, explored {explored} pairs");
            EquivalenceResult::Equal
        }
    }
}

impl Dfa {
    /// Checks whether `self` and `other` accept the same language, see [`equivalent`].
    pub fn equivalent(&self, other: &Dfa) -> EquivalenceResult {
        equivalent(self, other)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::tests::{binary_dfa, odd_ones};

    fn ends_in_zero() -> Dfa {
        binary_dfa(
            &["n", "z"],
            &["z"],
            &[("n", '0', "z"), ("n", '1', "n"), ("z", '0', "z"), ("z", '1', "n")],
        )
    }

    fn contains(first: char, second: char) -> Dfa {
        let other = |c: char| if c == '0' { '1' } else { '0' };
        binary_dfa(
            &["init", "seen", "found"],
            &["found"],
            &[
                ("init", first, "seen"),
                ("init", other(first), "init"),
                ("seen", first, "seen"),
                ("seen", second, "found"),
                ("found", '0', "found"),
                ("found", '1', "found"),
            ],
        )
    }

    #[test_log::test]
    fn reflexive() {
        for dfa in [odd_ones(), ends_in_zero(), contains('0', '1')] {
            assert_eq!(equivalent(&dfa, &dfa), EquivalenceResult::Equal);
        }
    }

    #[test_log::test]
    fn redundant_states_do_not_matter() {
        let redundant = binary_dfa(
            &["a", "b", "c"],
            &["c"],
            &[
                ("a", '0', "c"),
                ("a", '1', "b"),
                ("b", '0', "c"),
                ("b", '1', "a"),
                ("c", '0', "c"),
                ("c", '1', "b"),
            ],
        );
        assert!(redundant.equivalent(&ends_in_zero()).is_equal());
        assert_eq!(redundant.equivalent(&ends_in_zero()).to_string(), "equivalent");
    }

    #[test_log::test]
    fn witness_is_shortest_and_symmetric() {
        let left = contains('0', '1');
        let right = contains('1', '0');
        let result = equivalent(&left, &right);
        assert_eq!(result.witness(), Some("01"));
        assert_eq!(equivalent(&right, &left), result);
        assert_eq!(
            result.to_string(),
            "not equivalent, they disagree on \"01\""
        );

        let witness = result.witness().unwrap();
        assert_ne!(left.accepts(witness), right.accepts(witness));
    }

    #[test]
    fn empty_word_as_witness() {
        let result = odd_ones().equivalent(&odd_ones().negation());
        assert_eq!(result.witness(), Some(""));
    }

    #[test_log::test]
    fn differing_alphabets() {
        let only_a = RawAutomaton::new(['a'])
            .with_states(["x"])
            .with_start("x")
            .with_accepting(["x"])
            .with_transitions([("x", 'a', "x")])
            .validate()
            .unwrap();
        let nothing = RawAutomaton::new(['0'])
            .with_states(["y"])
            .with_start("y")
            .with_transitions([("y", '0', "y")])
            .validate()
            .unwrap();
        let result = equivalent(&only_a, &nothing);
        assert_eq!(result.witness(), Some(""));

        let epsilon_over_zero = RawAutomaton::new(['0'])
            .with_states(["e", "y"])
            .with_start("e")
            .with_accepting(["e"])
            .with_transitions([("e", '0', "y"), ("y", '0', "y")])
            .validate()
            .unwrap();
        // both accept only the empty word
        let epsilon_over_a = RawAutomaton::new(['a'])
            .with_states(["e", "y"])
            .with_start("e")
            .with_accepting(["e"])
            .with_transitions([("e", 'a', "y"), ("y", 'a', "y")])
            .validate()
            .unwrap();
        assert!(equivalent(&epsilon_over_zero, &epsilon_over_a).is_equal());
    }

    #[test]
    fn agrees_with_symmetric_difference() {
        let pairs = [
            (odd_ones(), ends_in_zero()),
            (contains('0', '1'), contains('1', '0')),
            (ends_in_zero(), ends_in_zero()),
        ];
        for (left, right) in pairs {
            assert_eq!(
                equivalent(&left, &right).witness().map(str::to_string),
                left.symmetric_difference(&right).give_word(true)
            );
        }
    }

    #[cfg(feature = "random")]
    #[test]
    fn random_automata() {
        use crate::random::{random_dfa, random_word};

        fastrand::seed(0x5eed);
        let alphabet = CharAlphabet::of_size(2);
        for _ in 0..50 {
            let left = random_dfa(&alphabet, fastrand::usize(1..6));
            let right = random_dfa(&alphabet, fastrand::usize(1..6));

            assert!(left.equivalent(&left).is_equal());
            let result = equivalent(&left, &right);
            assert_eq!(result, equivalent(&right, &left));
            match result.witness() {
                Some(witness) => assert_ne!(left.accepts(witness), right.accepts(witness)),
                None => {
                    for _ in 0..20 {
                        let word = random_word(&alphabet, 0, 8);
                        assert_eq!(left.accepts(&word), right.accepts(&word));
                    }
                }
            }
        }
    }
}
