use thiserror::Error;

use crate::{
    alphabet::Symbol, automaton::StateIndex, transition_system::Deterministic, Dfa, Show,
};

/// The outcome of running a word on a [`Dfa`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Names of the visited states, beginning with the initial state. For a word of length `n`,
    /// this contains `n + 1` states.
    pub trace: Vec<String>,
    /// Whether the last state of the trace is accepting.
    pub accepted: bool,
}

/// Raised when a word can not be run on an automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The symbol at the given (zero based) position is not part of the alphabet.
    #[error("symbol {} at position {position} is not in the alphabet", .symbol.show())]
    UnknownSymbol {
        /// The offending symbol.
        symbol: Symbol,
        /// Position of the symbol in the input, counted in characters.
        position: usize,
    },
}

impl Dfa {
    /// Computes the sequence of states that is visited when reading `word`, starting in the
    /// initial state.
    pub fn state_sequence(&self, word: &str) -> Result<Vec<StateIndex>, SimulationError> {
        let mut current = self.initial();
        let mut sequence = Vec::with_capacity(word.len() + 1);
        sequence.push(current);
        for (position, symbol) in word.chars().enumerate() {
            current = self
                .successor(current, symbol)
                .ok_or(SimulationError::UnknownSymbol { symbol, position })?;
            sequence.push(current);
        }
        Ok(sequence)
    }

    /// Returns the state that is reached after reading `word` from the initial state.
    pub fn reached(&self, word: &str) -> Result<StateIndex, SimulationError> {
        word.chars()
            .enumerate()
            .try_fold(self.initial(), |current, (position, symbol)| {
                self.successor(current, symbol)
                    .ok_or(SimulationError::UnknownSymbol { symbol, position })
            })
    }

    /// Runs `word` on `self`, producing the trace of visited states and the verdict.
    ///
    /// # Example
    /// ```
    /// use automata_grader::prelude::*;
    ///
    /// let dfa = RawAutomaton::new(['a', 'b'])
    ///     .with_states(["p", "q"])
    ///     .with_start("p")
    ///     .with_accepting(["q"])
    ///     .with_transitions([("p", 'a', "q"), ("p", 'b', "p"), ("q", 'a', "q"), ("q", 'b', "p")])
    ///     .validate()
    ///     .unwrap();
    /// let run = dfa.run("aba").unwrap();
    /// assert_eq!(run.trace, ["p", "q", "p", "q"]);
    /// assert!(run.accepted);
    /// assert_eq!(
    ///     dfa.run("abc"),
    ///     Err(SimulationError::UnknownSymbol { symbol: 'c', position: 2 })
    /// );
    /// ```
    pub fn run(&self, word: &str) -> Result<RunResult, SimulationError> {
        let sequence = self.state_sequence(word)?;
        let accepted = sequence
            .last()
            .is_some_and(|q| self.is_accepting(*q));
        Ok(RunResult {
            trace: sequence
                .into_iter()
                .map(|q| self.state_name(q).unwrap_or_default().to_string())
                .collect(),
            accepted,
        })
    }

    /// Returns whether `word` is accepted. A word that contains a symbol outside of the alphabet
    /// is not accepted.
    pub fn accepts(&self, word: &str) -> bool {
        self.reached(word)
            .is_ok_and(|q| self.is_accepting(q))
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::tests::odd_ones;

    #[test]
    fn odd_number_of_ones() {
        let dfa = odd_ones();
        assert!(dfa.run("1").unwrap().accepted);
        assert!(!dfa.run("11").unwrap().accepted);
        let run = dfa.run("101").unwrap();
        assert!(!run.accepted);
        assert_eq!(run.trace, vec!["q0", "q1", "q1", "q0"]);
        assert!(dfa.run("1011").unwrap().accepted);
    }

    #[test]
    fn empty_word() {
        let dfa = odd_ones();
        let run = dfa.run("").unwrap();
        assert_eq!(run.trace, vec!["q0"]);
        assert!(!run.accepted);
        assert_eq!(dfa.state_sequence("").unwrap(), vec![dfa.initial()]);
    }

    #[test]
    fn trace_has_one_more_state_than_the_word_has_symbols() {
        let dfa = odd_ones();
        for word in ["", "0", "01", "0110", "1111111"] {
            assert_eq!(dfa.run(word).unwrap().trace.len(), word.len() + 1);
        }
    }

    #[test]
    fn unknown_symbol() {
        let dfa = odd_ones();
        let err = dfa.run("0120").unwrap_err();
        assert_eq!(
            err,
            SimulationError::UnknownSymbol {
                symbol: '2',
                position: 2
            }
        );
        assert_eq!(
            err.to_string(),
            "symbol '2' at position 2 is not in the alphabet"
        );
        assert_eq!(dfa.reached("0120"), Err(err));
        assert!(!dfa.accepts("0120"));
        assert!(!dfa.accepts("12"));
    }
}
