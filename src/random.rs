use tracing::trace;

use crate::{alphabet::CharAlphabet, automaton::StateIndex, math, math::StateSet, Dfa};

fn assemble(alphabet: &CharAlphabet, rows: Vec<Vec<StateIndex>>) -> Dfa {
    let size = rows.len();
    let accepting: StateSet = (0..size).filter(|_| fastrand::bool()).collect();
    Dfa::from_parts(
        alphabet.clone(),
        (0..size).map(|q| format!("q{q}")).collect(),
        rows.into_iter().flatten().collect(),
        0,
        accepting,
    )
}

/// Generates a random DFA with `size` states over `alphabet` by drawing the target of every
/// transition uniformly and coloring every state accepting with probability one half. The states
/// are named `q0` to `q{size-1}` and `q0` is initial. Depending on the drawn transitions some
/// states may be unreachable.
///
/// Panics if `size` is zero.
pub fn random_dfa(alphabet: &CharAlphabet, size: usize) -> Dfa {
    assert!(size > 0, "an automaton needs at least one state");
    let rows = (0..size)
        .map(|_| {
            alphabet
                .universe()
                .map(|_| fastrand::usize(..size))
                .collect()
        })
        .collect();
    let dfa = assemble(alphabet, rows);
    trace!("generated random automaton\n{:?}", dfa);
    dfa
}

/// Uses a sprout-like algorithm to generate a random DFA in which every state is reachable.
/// `probability` determines the probability of a back edge to some existing state being
/// inserted. The algorithm is as follows:
/// 1. Start with a single state.
/// 2. For each symbol, go through the existing states in order and with probability `probability`
///    add an edge to that state.
/// 3. If no edge to an existing state was added, insert an edge to a new state.
/// 4. Repeat until all states and symbols have been treated.
///
/// Finally, every state is made accepting with probability one half.
///
/// # Panics
/// If `probability` is not in the interval `(0, 1]`, as no back edge would ever be drawn.
pub fn random_sprout_dfa(alphabet: &CharAlphabet, probability: f64) -> Dfa {
    assert!(
        probability > 0.0 && probability <= 1.0,
        "probability of a back edge must be in (0, 1], got {probability}"
    );
    let mut rows: Vec<Vec<StateIndex>> = vec![Vec::with_capacity(alphabet.size())];
    let mut current = 0;
    while current < rows.len() {
        for _ in alphabet.universe() {
            let target = (0..rows.len())
                .find(|_| fastrand::f64() < probability)
                .unwrap_or_else(|| {
                    rows.push(Vec::with_capacity(alphabet.size()));
                    rows.len() - 1
                });
            rows[current].push(target);
        }
        current += 1;
    }
    assemble(alphabet, rows)
}

/// Generate a random `String` over the universe of the `alphabet`.
/// The length of the `String` is drawn uniformly from the range `min_len..=max_len`.
pub fn random_word(alphabet: &CharAlphabet, min_len: usize, max_len: usize) -> String {
    if alphabet.is_empty() {
        return String::new();
    }
    let length = fastrand::usize(min_len..=max_len);
    (0..length)
        .map(|_| alphabet[fastrand::usize(..alphabet.size())])
        .collect()
}

/// Generate a set of `number` distinct random `String`s over the universe of the `alphabet`.
/// The length for each sampled word is drawn uniformly from the range `min_len..=max_len`, the
/// caller has to make sure that there are enough words of these lengths.
pub fn random_words(
    alphabet: &CharAlphabet,
    min_len: usize,
    max_len: usize,
    number: usize,
) -> math::Set<String> {
    let mut words = math::Set::default();
    while words.len() < number {
        words.insert(random_word(alphabet, min_len, max_len));
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition_system::Deterministic;

    #[test]
    fn sized_automaton() {
        fastrand::seed(7);
        let alphabet = CharAlphabet::of_size(3);
        let dfa = random_dfa(&alphabet, 5);
        assert_eq!(dfa.size(), 5);
        assert_eq!(dfa.state_name(4), Some("q4"));
        for q in dfa.state_indices() {
            for sym in alphabet.universe() {
                assert!(dfa.successor(q, sym).is_some());
            }
        }
    }

    #[test]
    fn sprouted_automaton_is_reachable() {
        fastrand::seed(11);
        let alphabet = CharAlphabet::of_size(2);
        for _ in 0..20 {
            let dfa = random_sprout_dfa(&alphabet, 0.5);
            assert_eq!(dfa.reachable_state_indices().count(), dfa.size());
        }
    }

    #[test]
    fn certain_back_edges() {
        let dfa = random_sprout_dfa(&CharAlphabet::of_size(3), 1.0);
        assert_eq!(dfa.size(), 1);
    }

    #[test]
    #[should_panic(expected = "must be in (0, 1]")]
    fn sprouting_without_back_edges() {
        random_sprout_dfa(&CharAlphabet::of_size(2), 0.0);
    }

    #[test]
    fn words() {
        let alphabet = CharAlphabet::of_size(2);
        let word = random_word(&alphabet, 2, 4);
        assert!((2..=4).contains(&word.len()));
        assert!(word.chars().all(|c| alphabet.contains(c)));
        assert_eq!(random_words(&alphabet, 3, 3, 8).len(), 8);
    }
}
