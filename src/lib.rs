//! Library for loading, validating, running and comparing deterministic finite automata (DFAs),
//! together with a thin layer that grades a submitted automaton against a challenge.
//!
//! The pipeline is as follows. An automaton definition (usually a small YAML document produced
//! by an editor) is turned into a [`definition::RawAutomaton`] by the loader. This record only
//! has the right *shape*, nothing about it is known to be meaningful. The validator then checks
//! that the start and accepting states exist, that every transition refers to existing states and
//! symbols and that there is precisely one transition for every state and symbol. If all of that
//! holds, it produces a [`Dfa`], which is immutable from then on.
//!
//! A [`Dfa`] can be run on an input (see [`Dfa::run`]), which yields the sequence of visited states
//! and whether the input is accepted. Two automata can be compared with
//! [`equivalence::equivalent`], which explores the product of both automata breadth-first and
//! either reports that they accept the same language or returns a shortest word on which they
//! disagree.
//!
//! The [`grading`] module combines these steps: it checks a submission against the sample words
//! and the reference automaton of a [`grading::Challenge`] and produces a [`grading::Verdict`].
//!
//! Further traits that are of importance are
//! - [`transition_system::Deterministic`], which abstracts over anything that has an initial state and a
//!   (partial) successor function. Both [`Dfa`] and the [`transition_system::Product`] of two automata
//!   implement it, which allows the breadth-first search in [`transition_system::reachable`] to be shared.
//! - [`transition_system::Dottable`] for producing a Graphviz representation.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use automata_grader::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet::{CharAlphabet, Symbol},
        automaton::{Dfa, RunResult, SimulationError, StateIndex},
        definition::{
            load, load_yaml, AutomatonDefinition, LoadError, Malformed, RawAutomaton,
            RawTransition, TransitionsDefinition,
        },
        equivalence::{equivalent, EquivalenceResult},
        grading::{
            AlphabetPolicy, Catalog, Challenge, ChallengeError, ChallengeSource, Failure, Grader,
            GraderConfig, GradingError, Sample, SubmissionLog, Verdict,
        },
        math,
        transition_system::{Deterministic, Dottable, Product, ProductIndex},
        validate::{validate, Endpoint, ValidationError},
        Show,
    };
}

/// This module contains some type aliases for collections which are used throughout the crate.
pub mod math;

/// Module that contains definitions for dealing with alphabets.
pub mod alphabet;

/// Reads automaton definitions into a structural record.
pub mod definition;

/// Turns a structural record into a validated [`Dfa`].
pub mod validate;

/// Defines the validated deterministic finite automaton and how words are run on it.
pub mod automaton;
pub use automaton::Dfa;

/// This module defines the successor abstraction, reachability and products.
pub mod transition_system;

/// Decides whether two automata accept the same language.
pub mod equivalence;

/// Grading of submitted automata against challenges.
pub mod grading;

/// Implements the generation of random automata and words.
#[cfg(feature = "random")]
pub mod random;

/// Helper trait which can be used to display states, words and such.
pub trait Show {
    /// Returns a human readable representation of `self`, for a word that should be
    /// for example "abba", for a pair of states it should be (q0, q1).
    /// Just use something that makes sense. This is mainly used for debugging purposes
    /// and for messages that are presented to a user.
    fn show(&self) -> String;
}

impl Show for str {
    fn show(&self) -> String {
        if self.is_empty() {
            "ε".to_string()
        } else {
            format!("\"{self}\"")
        }
    }
}

impl Show for String {
    fn show(&self) -> String {
        self.as_str().show()
    }
}

impl Show for char {
    fn show(&self) -> String {
        format!("'{self}'")
    }
}

impl<S: Show, T: Show> Show for (S, T) {
    fn show(&self) -> String {
        format!("({}, {})", self.0.show(), self.1.show())
    }
}

impl<S: Show + ?Sized> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}
