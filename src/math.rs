/// Type alias for sets, we use this to hide which type of `HashSet` we are actually using.
pub type Set<S> = fxhash::FxHashSet<S>;
/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// Represents a bijective mapping between `L` and `R`, that is a mapping which associates
/// each `L` with precisely one `R` and vice versa.
pub type Bijection<L, R> = bimap::BiBTreeMap<L, R>;

/// A set of state indices, used for example to store which states of an automaton are accepting.
pub type StateSet = bit_set::BitSet;

/// Type alias for maps that remember the order in which their keys were inserted. Definitions
/// are read into these so that problems can be reported in the order in which they were written.
pub type InsertionOrderedMap<K, V> = indexmap::IndexMap<K, V>;
