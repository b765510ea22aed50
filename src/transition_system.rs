use std::{fmt::Debug, hash::Hash};

use crate::alphabet::{CharAlphabet, Symbol};

/// Implements breadth-first exploration of the reachable part of a [`Deterministic`] system.
pub mod reachable;
use reachable::{MinimalRepresentatives, ReachableStateIndices};

mod product;
pub use product::{Product, ProductIndex};

mod dot;
pub use dot::{DotStateAttribute, DotTransitionAttribute, Dottable};

/// A deterministic transition system: it has one designated initial state and for each state
/// and symbol at most one successor.
///
/// This trait only provides access to the successor function, everything else (like
/// exploring which states can be reached and how) is built on top of it. A [`crate::Dfa`]
/// implements it, as does the [`Product`] of two automata.
pub trait Deterministic {
    /// The type of the state indices.
    type StateIndex: Copy + Eq + Hash + Debug;

    /// The symbols on which successors may be defined. Exploration visits them in the order
    /// of [`CharAlphabet::universe`].
    fn alphabet(&self) -> &CharAlphabet;

    /// Returns the initial state.
    fn initial(&self) -> Self::StateIndex;

    /// Returns the state that is reached from `state` on `symbol`, or `None` if there is none.
    fn successor(&self, state: Self::StateIndex, symbol: Symbol) -> Option<Self::StateIndex>;

    /// Returns an iterator over the minimal representatives (i.e. the length-lexicographically
    /// minimal words) of all states reachable from the initial state, see
    /// [`MinimalRepresentatives`].
    fn minimal_representatives(&self) -> MinimalRepresentatives<&Self>
    where
        Self: Sized,
    {
        self.minimal_representatives_from(self.initial())
    }

    /// Works like [`Deterministic::minimal_representatives`], but starts from `origin`.
    fn minimal_representatives_from(&self, origin: Self::StateIndex) -> MinimalRepresentatives<&Self>
    where
        Self: Sized,
    {
        MinimalRepresentatives::new(self, origin)
    }

    /// Iterates over the indices of all states that are reachable from the initial state, in
    /// breadth-first order.
    fn reachable_state_indices(&self) -> ReachableStateIndices<&Self>
    where
        Self: Sized,
    {
        ReachableStateIndices::new(self, self.initial())
    }
}

impl<D: Deterministic> Deterministic for &D {
    type StateIndex = D::StateIndex;

    fn alphabet(&self) -> &CharAlphabet {
        D::alphabet(self)
    }

    fn initial(&self) -> Self::StateIndex {
        D::initial(self)
    }

    fn successor(&self, state: Self::StateIndex, symbol: Symbol) -> Option<Self::StateIndex> {
        D::successor(self, state, symbol)
    }
}
