use itertools::Itertools;

use crate::Show;

/// A symbol is a single character. Every symbol of an automaton is taken from its
/// [`CharAlphabet`].
pub type Symbol = char;

/// Represents an alphabet where a [`Symbol`] is just a single `char`.
///
/// The symbols are kept sorted and free of duplicates. This order is the one in which
/// tables are printed, in which breadth-first searches explore successors and therefore
/// the order that decides which of several shortest words is returned as a witness.
///
/// # Example
/// ```
/// use automata_grader::prelude::*;
///
/// let alphabet = CharAlphabet::from_iter(['b', 'a', 'b']);
/// assert_eq!(alphabet.universe().collect::<String>(), "ab");
/// assert_eq!(alphabet.position('b'), Some(1));
/// ```
#[derive(Clone, Hash, PartialEq, Eq, Debug, PartialOrd, Ord, Default)]
pub struct CharAlphabet(Vec<Symbol>);

impl CharAlphabet {
    /// Creates a new [`CharAlphabet`] alphabet of the given size. The symbols are just the first `size` letters
    /// of the alphabet, i.e. 'a' to 'z'.
    pub fn of_size(size: usize) -> Self {
        assert!(size <= 26, "Alphabet is too large");
        Self((0..size).map(|i| (b'a' + i as u8) as char).collect())
    }

    /// Returns the number of symbols.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the alphabet has no symbols at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all symbols in ascending order.
    pub fn universe(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.0.iter().copied()
    }

    /// Returns whether `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: Symbol) -> bool {
        self.position(symbol).is_some()
    }

    /// Gives the position of `symbol` in the ascending order of symbols, if it is present.
    pub fn position(&self, symbol: Symbol) -> Option<usize> {
        self.0.binary_search(&symbol).ok()
    }

    /// Computes the alphabet that contains every symbol of `self` and of `other`.
    pub fn union(&self, other: &CharAlphabet) -> CharAlphabet {
        self.universe().chain(other.universe()).collect()
    }

    /// Returns the symbols of `self` that do not occur in `other`.
    pub fn difference<'a>(&'a self, other: &'a CharAlphabet) -> impl Iterator<Item = Symbol> + 'a {
        self.universe().filter(|sym| !other.contains(*sym))
    }
}

impl std::ops::Index<usize> for CharAlphabet {
    type Output = char;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl FromIterator<char> for CharAlphabet {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        Self(iter.into_iter().unique().sorted().collect())
    }
}

impl Show for CharAlphabet {
    fn show(&self) -> String {
        format!("{{{}}}", self.universe().join(", "))
    }
}

impl std::fmt::Display for CharAlphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.show())
    }
}
