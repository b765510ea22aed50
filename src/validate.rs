use std::fmt::Display;

use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    alphabet::{CharAlphabet, Symbol},
    automaton::StateIndex,
    definition::{RawAutomaton, RawTransition},
    math::{InsertionOrderedMap, Set, StateSet},
    Dfa, Show,
};

/// Names the part of a transition that refers to something which does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// The source is not a state.
    Source(String),
    /// The symbol is not part of the alphabet.
    Symbol(String),
    /// The target is not a state.
    Target(String),
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Source(q) => write!(f, "source state {}", q.show()),
            Endpoint::Symbol(a) => write!(f, "symbol {}", a.show()),
            Endpoint::Target(q) => write!(f, "target state {}", q.show()),
        }
    }
}

/// The ways in which a loaded automaton can fail to be a DFA. Such an automaton is invalid, it
/// can neither be run nor compared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The alphabet has no symbols.
    #[error("the alphabet must contain at least one symbol")]
    EmptyAlphabet,
    /// The start state is not one of the states.
    #[error("start state {} is not a state", .state.show())]
    UnknownStart {
        /// Name of the supposed start state.
        state: String,
    },
    /// An accepting state is not one of the states.
    #[error("accepting state {} is not a state", .state.show())]
    UnknownAccepting {
        /// Name of the supposed accepting state.
        state: String,
    },
    /// A transition mentions a state or symbol that does not exist.
    #[error("transition {} refers to an unknown {endpoint}", .transition.show())]
    UnknownTransitionEndpoint {
        /// The offending transition.
        transition: RawTransition,
        /// Which part of it is unknown.
        endpoint: Endpoint,
    },
    /// More than one transition leaves `state` on `symbol`.
    #[error(
        "state {} has {} transitions on symbol {}, leading to {}",
        .state.show(),
        .targets.len(),
        .symbol.show(),
        .targets.iter().map(Show::show).join(", ")
    )]
    Nondeterministic {
        /// The source state.
        state: String,
        /// The symbol.
        symbol: Symbol,
        /// All targets in the order in which the transitions were given.
        targets: Vec<String>,
    },
    /// No transition leaves `state` on `symbol`.
    #[error("state {} has no transition on symbol {}", .state.show(), .symbol.show())]
    Incomplete {
        /// The state that lacks a transition.
        state: String,
        /// The symbol for which the transition is missing.
        symbol: Symbol,
    },
}

/// Validates the given automaton, see [`RawAutomaton::validate`].
pub fn validate(raw: RawAutomaton) -> Result<Dfa, ValidationError> {
    raw.validate()
}

impl RawAutomaton {
    /// Lists every reason why `self` is not a valid DFA. The checks are performed in the following
    /// order, and within each check states, accepting states and transitions are examined in the
    /// order in which they were given while symbols are examined in the order of the alphabet:
    /// 1. [`ValidationError::EmptyAlphabet`]
    /// 2. [`ValidationError::UnknownStart`]
    /// 3. [`ValidationError::UnknownAccepting`]
    /// 4. [`ValidationError::UnknownTransitionEndpoint`], at most one per transition
    /// 5. [`ValidationError::Nondeterministic`], once for every ambiguous pair of state and symbol
    /// 6. [`ValidationError::Incomplete`], once for every missing pair of state and symbol
    ///
    /// Transitions that were reported in step 4 are ignored by the remaining steps.
    pub fn diagnose(&self) -> Vec<ValidationError> {
        let alphabet: CharAlphabet = self.alphabet.iter().copied().collect();
        let states: Set<&str> = self.states.iter().map(String::as_str).collect();
        let mut problems = vec![];

        if self.alphabet.is_empty() {
            problems.push(ValidationError::EmptyAlphabet);
        }

        if !states.contains(self.start.as_str()) {
            problems.push(ValidationError::UnknownStart {
                state: self.start.clone(),
            });
        }

        problems.extend(
            self.accepting
                .iter()
                .filter(|q| !states.contains(q.as_str()))
                .map(|q| ValidationError::UnknownAccepting { state: q.clone() }),
        );

        let mut outgoing: InsertionOrderedMap<(&str, Symbol), Vec<&str>> = Default::default();
        for transition in &self.transitions {
            match known_symbol(&alphabet, &transition.symbol) {
                _ if !states.contains(transition.source.as_str()) => {
                    problems.push(unknown(transition, Endpoint::Source(transition.source.clone())))
                }
                None => {
                    problems.push(unknown(transition, Endpoint::Symbol(transition.symbol.clone())))
                }
                Some(_) if !states.contains(transition.target.as_str()) => {
                    problems.push(unknown(transition, Endpoint::Target(transition.target.clone())))
                }
                Some(sym) => outgoing
                    .entry((transition.source.as_str(), sym))
                    .or_default()
                    .push(transition.target.as_str()),
            }
        }

        problems.extend(
            outgoing
                .iter()
                .filter(|(_, targets)| targets.len() > 1)
                .map(|((state, symbol), targets)| ValidationError::Nondeterministic {
                    state: state.to_string(),
                    symbol: *symbol,
                    targets: targets.iter().map(|q| q.to_string()).collect(),
                }),
        );

        problems.extend(
            self.states
                .iter()
                .unique()
                .cartesian_product(alphabet.universe().collect_vec())
                .filter(|(q, sym)| !outgoing.contains_key(&(q.as_str(), *sym)))
                .map(|(q, sym)| ValidationError::Incomplete {
                    state: q.clone(),
                    symbol: sym,
                }),
        );

        problems
    }

    /// Checks that `self` is a well-formed, total and deterministic automaton and turns it into a
    /// [`Dfa`]. On failure, the first problem that [`RawAutomaton::diagnose`] would list is returned.
    pub fn validate(self) -> Result<Dfa, ValidationError> {
        if let Some(problem) = self.diagnose().into_iter().next() {
            debug!("validation failed: {problem}");
            return Err(problem);
        }

        let alphabet: CharAlphabet = self.alphabet.iter().copied().collect();
        let names: Vec<String> = self.states.into_iter().unique().collect();
        let index = |name: &str| -> Option<StateIndex> { names.iter().position(|q| q == name) };

        let mut cells: Vec<Option<StateIndex>> = vec![None; names.len() * alphabet.size()];
        for RawTransition {
            source,
            symbol,
            target,
        } in &self.transitions
        {
            if let (Some(q), Some(sym), Some(p)) = (
                index(source.as_str()),
                known_symbol(&alphabet, symbol).and_then(|sym| alphabet.position(sym)),
                index(target.as_str()),
            ) {
                cells[q * alphabet.size() + sym] = Some(p);
            }
        }
        let table = cells
            .into_iter()
            .enumerate()
            .map(|(i, cell)| {
                cell.ok_or_else(|| ValidationError::Incomplete {
                    state: names[i / alphabet.size()].clone(),
                    symbol: alphabet[i % alphabet.size()],
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let initial = index(self.start.as_str()).ok_or_else(|| ValidationError::UnknownStart {
            state: self.start.clone(),
        })?;
        let accepting: StateSet = self.accepting.iter().filter_map(|q| index(q.as_str())).collect();

        trace!(
            "validated automaton with states {} over {}",
            names.iter().map(Show::show).join(", "),
            alphabet
        );
        Ok(Dfa::from_parts(alphabet, names, table, initial, accepting))
    }
}

fn unknown(transition: &RawTransition, endpoint: Endpoint) -> ValidationError {
    ValidationError::UnknownTransitionEndpoint {
        transition: transition.clone(),
        endpoint,
    }
}

/// Returns the symbol if `text` is a single character that belongs to `alphabet`.
fn known_symbol(alphabet: &CharAlphabet, text: &str) -> Option<Symbol> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(sym), None) if alphabet.contains(sym) => Some(sym),
        _ => None,
    }
}
