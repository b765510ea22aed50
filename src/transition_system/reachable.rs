use crate::{math::Set, transition_system::Deterministic};
use std::collections::VecDeque;

/// Type alias for a minimal representative of a state which is its length-lexicographically minimal
/// access sequence and its state index.
pub type MinimalRepresentative<Ts> = (String, <Ts as Deterministic>::StateIndex);

/// Struct that can return the minimal representatives of a transition system. A minimal representative
/// for a state `q` of some transition system is the length-lexicographically minimal string with which
/// `q` can be reached from a given state.
///
/// States are produced in breadth-first order and successors are explored in the order of the
/// alphabet, so the representatives come out ordered length-lexicographically as well. Every state
/// is produced at most once.
#[derive(Debug, Clone)]
pub struct MinimalRepresentatives<Ts: Deterministic> {
    ts: Ts,
    seen: Set<Ts::StateIndex>,
    queue: VecDeque<MinimalRepresentative<Ts>>,
}

#[allow(missing_docs)]
impl<Ts> MinimalRepresentatives<Ts>
where
    Ts: Deterministic,
{
    pub fn new(ts: Ts, origin: Ts::StateIndex) -> Self {
        let seen = Set::from_iter([origin]);
        let queue = [(String::new(), origin)].into_iter().collect();
        Self { ts, seen, queue }
    }
}

impl<Ts> Iterator for MinimalRepresentatives<Ts>
where
    Ts: Deterministic,
{
    type Item = MinimalRepresentative<Ts>;

    fn next(&mut self) -> Option<Self::Item> {
        let (access, q) = self.queue.pop_front()?;
        for sym in self.ts.alphabet().universe() {
            if let Some(p) = self.ts.successor(q, sym) {
                if self.seen.insert(p) {
                    let mut new_access = access.clone();
                    new_access.push(sym);
                    self.queue.push_back((new_access, p));
                }
            }
        }
        Some((access, q))
    }
}

/// Allows iterating over the indices of all reachable states in a [`Deterministic`] system.
#[derive(Debug, Clone)]
pub struct ReachableStateIndices<Ts: Deterministic>(MinimalRepresentatives<Ts>);

impl<Ts> Iterator for ReachableStateIndices<Ts>
where
    Ts: Deterministic,
{
    type Item = Ts::StateIndex;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, q)| q)
    }
}

#[allow(missing_docs)]
impl<Ts> ReachableStateIndices<Ts>
where
    Ts: Deterministic,
{
    pub fn new(ts: Ts, origin: Ts::StateIndex) -> Self {
        Self(MinimalRepresentatives::new(ts, origin))
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::prelude::*;
    use crate::tests::binary_dfa;

    #[test]
    fn reachable_states() {
        let dfa = binary_dfa(
            &["s", "t", "u", "dead"],
            &["u"],
            &[
                ("s", '0', "t"),
                ("s", '1', "s"),
                ("t", '0', "u"),
                ("t", '1', "s"),
                ("u", '0', "u"),
                ("u", '1', "u"),
                ("dead", '0', "s"),
                ("dead", '1', "dead"),
            ],
        );

        assert_eq!(
            dfa.minimal_representatives().collect_vec(),
            vec![
                (String::new(), 0),
                ("0".to_string(), 1),
                ("00".to_string(), 2)
            ]
        );
        assert_eq!(dfa.reachable_state_indices().collect_vec(), vec![0, 1, 2]);
        assert_eq!(
            dfa.minimal_representatives_from(3)
                .map(|(rep, _)| rep)
                .collect_vec(),
            vec!["", "0", "00", "000"]
        );
    }
}
