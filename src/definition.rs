use std::fmt;

use itertools::Itertools;
use serde::{
    de::{self, DeserializeOwned, MapAccess, SeqAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use thiserror::Error;
use tracing::{debug, trace};

use crate::{alphabet::Symbol, math::InsertionOrderedMap, math::Set, Show};

/// Raised by the loader if a definition does not have the expected shape. Nothing is loaded
/// partially: either the whole definition has the right shape or this error is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Some field is missing, has the wrong type or violates a shape constraint.
    #[error("malformed automaton definition: {0}")]
    MalformedInput(#[from] Malformed),
}

/// Describes in which way a definition is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Malformed {
    /// The text could not be parsed, or some field is missing or of the wrong type. The message
    /// is the one reported by the parser and usually contains the path to the offending field.
    #[error("{0}")]
    Syntax(String),
    /// The alphabet has no symbols.
    #[error("the alphabet must contain at least one symbol")]
    EmptyAlphabet,
    /// A symbol of the alphabet is not a single character.
    #[error("symbol {} is not a single character", .0.show())]
    SymbolNotSingleCharacter(String),
    /// A symbol is listed twice in the alphabet.
    #[error("symbol {} is listed more than once", .0.show())]
    DuplicateSymbol(Symbol),
    /// A state is listed twice.
    #[error("state {} is listed more than once", .0.show())]
    DuplicateState(String),
}

impl Malformed {
    fn syntax(error: serde_yaml::Error) -> Self {
        Malformed::Syntax(error.to_string())
    }
}

/// The external description of an automaton as it is written by a user or produced by an editor.
///
/// # Example
/// ```
/// use automata_grader::prelude::*;
///
/// let definition = AutomatonDefinition::from_yaml(
///     r#"
/// alphabet: [a, b]
/// states: [even, odd]
/// initial_state: even
/// accepting_states: [odd]
/// transitions:
///   even: {a: odd, b: even}
///   odd: {a: even, b: odd}
/// "#,
/// )
/// .unwrap();
/// assert_eq!(definition.start, "even");
/// let dfa = load(definition).unwrap().validate().unwrap();
/// assert!(dfa.accepts("ab"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutomatonDefinition {
    /// The symbols, each of which must be a single character.
    pub alphabet: Vec<String>,
    /// Names of all states.
    pub states: Vec<String>,
    /// The name of the initial state.
    #[serde(alias = "initial_state")]
    pub start: String,
    /// Names of the accepting states.
    #[serde(alias = "accepting_states")]
    pub accepting: Vec<String>,
    /// The transitions.
    pub transitions: TransitionsDefinition,
}

/// The two ways in which transitions may be written down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TransitionsDefinition {
    /// A table that maps each source state to a mapping from symbols to target states.
    Table(InsertionOrderedMap<String, InsertionOrderedMap<String, String>>),
    /// A list of individual transitions. Unlike a table, this can mention the same pair of
    /// state and symbol more than once.
    List(Vec<TransitionEntry>),
}

impl<'de> Deserialize<'de> for TransitionsDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TransitionsVisitor;

        impl<'de> Visitor<'de> for TransitionsVisitor {
            type Value = TransitionsDefinition;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a table of transitions or a list of transitions")
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                let rows: InsertionOrderedMap<String, DistinctKeys<String>> = distinct_entries(map)?;
                Ok(TransitionsDefinition::Table(
                    rows.into_iter().map(|(source, row)| (source, row.0)).collect(),
                ))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut list = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(entry) = seq.next_element()? {
                    list.push(entry);
                }
                Ok(TransitionsDefinition::List(list))
            }
        }

        // Deserializing the shapes directly (instead of buffering them as an untagged enum would)
        // hands every scalar to `String` exactly as it was written.
        deserializer.deserialize_any(TransitionsVisitor)
    }
}

/// A mapping with string keys in which no key may occur twice.
struct DistinctKeys<V>(InsertionOrderedMap<String, V>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for DistinctKeys<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DistinctKeysVisitor<V>(std::marker::PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for DistinctKeysVisitor<V> {
            type Value = DistinctKeys<V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a mapping")
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                distinct_entries(map).map(DistinctKeys)
            }
        }

        deserializer.deserialize_map(DistinctKeysVisitor(std::marker::PhantomData))
    }
}

fn distinct_entries<'de, A, V>(mut map: A) -> Result<InsertionOrderedMap<String, V>, A::Error>
where
    A: MapAccess<'de>,
    V: Deserialize<'de>,
{
    let mut entries = InsertionOrderedMap::default();
    while let Some((key, value)) = map.next_entry::<String, V>()? {
        if entries.contains_key(&key) {
            return Err(de::Error::custom(format!(
                "key {} is listed more than once",
                key.show()
            )));
        }
        entries.insert(key, value);
    }
    Ok(entries)
}

/// A single transition in the list form of [`TransitionsDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionEntry {
    /// Source state.
    pub from: String,
    /// The symbol that is read.
    pub on: String,
    /// Target state.
    pub to: String,
}

impl AutomatonDefinition {
    /// Parses a definition from YAML text. Every scalar is read as the text it is written as, so
    /// `alphabet: [0, 1]` is the alphabet consisting of the characters `'0'` and `'1'` and a
    /// state written `007` is called `"007"`.
    pub fn from_yaml(text: &str) -> Result<Self, LoadError> {
        Ok(from_yaml_text(text)?)
    }

    /// Writes the definition as YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Deserializes `T` from YAML text. Text fields receive the literal text of their scalar, plain
/// numbers, booleans and nulls included.
pub(crate) fn from_yaml_text<T: DeserializeOwned>(text: &str) -> Result<T, Malformed> {
    serde_yaml::from_str(text).map_err(Malformed::syntax)
}

/// A transition as it was written down, before anything about it is checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawTransition {
    /// Name of the source state.
    pub source: String,
    /// The symbol, which need not be a single character or part of the alphabet yet.
    pub symbol: String,
    /// Name of the target state.
    pub target: String,
}

impl<S: Into<String>, X: Into<String>, T: Into<String>> From<(S, X, T)> for RawTransition {
    fn from((source, symbol, target): (S, X, T)) -> Self {
        Self {
            source: source.into(),
            symbol: symbol.into(),
            target: target.into(),
        }
    }
}

impl Show for RawTransition {
    fn show(&self) -> String {
        format!("({}, {}, {})", self.source, self.symbol, self.target)
    }
}

/// The structural record produced by the loader. Its fields have the right shape, but they may
/// still refer to states or symbols that do not exist, and the transitions may be partial or
/// ambiguous. Use [`RawAutomaton::validate`] to obtain a [`crate::Dfa`].
///
/// Apart from being produced by [`load`], a `RawAutomaton` can be assembled directly.
/// ```
/// use automata_grader::prelude::*;
///
/// let dfa = RawAutomaton::new(['a'])
///     .with_states(["q"])
///     .with_start("q")
///     .with_accepting(["q"])
///     .with_transitions([("q", 'a', "q")])
///     .validate()
///     .unwrap();
/// assert!(dfa.accepts("aaa"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawAutomaton {
    /// The alphabet symbols in the order in which they were listed.
    pub alphabet: Vec<Symbol>,
    /// The state names in the order in which they were listed.
    pub states: Vec<String>,
    /// The transitions in the order in which they were listed.
    pub transitions: Vec<RawTransition>,
    /// The name of the initial state.
    pub start: String,
    /// The names of the accepting states.
    pub accepting: Vec<String>,
}

impl RawAutomaton {
    /// Creates an automaton over the given symbols that has no states and no transitions yet.
    pub fn new(alphabet: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            alphabet: alphabet.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Adds the given states.
    pub fn with_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Sets the initial state.
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = start.into();
        self
    }

    /// Adds the given accepting states.
    pub fn with_accepting<I, S>(mut self, accepting: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepting.extend(accepting.into_iter().map(Into::into));
        self
    }

    /// Adds a list of transitions, given as triples of source, symbol and target.
    pub fn with_transitions<I, T>(mut self, transitions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RawTransition>,
    {
        self.transitions
            .extend(transitions.into_iter().map(Into::into));
        self
    }
}

/// Checks that `alphabet` is non-empty and consists of distinct single characters, which are
/// returned in the order in which they were listed.
pub(crate) fn parse_alphabet(alphabet: Vec<String>) -> Result<Vec<Symbol>, Malformed> {
    if alphabet.is_empty() {
        return Err(Malformed::EmptyAlphabet);
    }
    let mut symbols = Vec::with_capacity(alphabet.len());
    for symbol in alphabet {
        let mut chars = symbol.chars();
        let sym = match (chars.next(), chars.next()) {
            (Some(sym), None) => sym,
            _ => return Err(Malformed::SymbolNotSingleCharacter(symbol)),
        };
        if symbols.contains(&sym) {
            return Err(Malformed::DuplicateSymbol(sym));
        }
        symbols.push(sym);
    }
    Ok(symbols)
}

/// Turns a definition into a [`RawAutomaton`], checking only constraints on its shape: the
/// alphabet must be non-empty and consist of distinct single characters, and no state may be
/// listed twice.
pub fn load(definition: AutomatonDefinition) -> Result<RawAutomaton, LoadError> {
    let AutomatonDefinition {
        alphabet,
        states,
        start,
        accepting,
        transitions,
    } = definition;

    let symbols = parse_alphabet(alphabet)?;

    let mut seen = Set::default();
    for state in &states {
        if !seen.insert(state.as_str()) {
            return Err(Malformed::DuplicateState(state.clone()).into());
        }
    }

    let transitions: Vec<RawTransition> = match transitions {
        TransitionsDefinition::Table(table) => table
            .into_iter()
            .flat_map(|(source, row)| {
                row.into_iter()
                    .map(move |(symbol, target)| RawTransition::from((source.clone(), symbol, target)))
            })
            .collect(),
        TransitionsDefinition::List(list) => list
            .into_iter()
            .map(|TransitionEntry { from, on, to }| RawTransition::from((from, on, to)))
            .collect(),
    };

    debug!(
        "loaded definition with {} states, {} symbols and {} transitions",
        states.len(),
        symbols.len(),
        transitions.len()
    );
    trace!("transitions {}", transitions.iter().map(Show::show).join(", "));

    Ok(RawAutomaton {
        alphabet: symbols,
        states,
        transitions,
        start,
        accepting,
    })
}

/// Parses YAML text and loads it, see [`AutomatonDefinition::from_yaml`] and [`load`].
pub fn load_yaml(text: &str) -> Result<RawAutomaton, LoadError> {
    load(AutomatonDefinition::from_yaml(text)?)
}
