use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    alphabet::{CharAlphabet, Symbol},
    definition::{from_yaml_text, load, parse_alphabet, AutomatonDefinition, LoadError, Malformed},
    math::InsertionOrderedMap,
    transition_system::Deterministic,
    validate::ValidationError,
    Dfa, Show,
};

/// Raised when a challenge can not be built from its record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    /// The catalog text does not have the expected shape.
    #[error("malformed challenge catalog: {0}")]
    Malformed(#[from] Malformed),
    /// The alphabet of the challenge is empty or contains something other than single characters.
    #[error("challenge {} has an invalid alphabet: {error}", .id.show())]
    Alphabet {
        /// Identifier of the challenge.
        id: String,
        /// What is wrong with the alphabet.
        error: Malformed,
    },
    /// The reference automaton does not have the right shape.
    #[error("reference automaton of challenge {} could not be loaded: {error}", .id.show())]
    ReferenceLoad {
        /// Identifier of the challenge.
        id: String,
        /// The problem reported by the loader.
        error: LoadError,
    },
    /// The reference automaton is not a valid DFA.
    #[error("reference automaton of challenge {} is invalid: {error}", .id.show())]
    ReferenceInvalid {
        /// Identifier of the challenge.
        id: String,
        /// The problem reported by the validator.
        error: ValidationError,
    },
    /// The reference automaton uses a different alphabet than the challenge.
    #[error("reference automaton of challenge {} is over {found} instead of {expected}", .id.show())]
    ReferenceAlphabet {
        /// Identifier of the challenge.
        id: String,
        /// The alphabet of the challenge.
        expected: CharAlphabet,
        /// The alphabet of the reference automaton.
        found: CharAlphabet,
    },
    /// A sample word contains a symbol that is not in the alphabet of the challenge.
    #[error("sample {} of challenge {} contains symbol {} which is not in the alphabet", .input.show(), .id.show(), .symbol.show())]
    SampleSymbol {
        /// Identifier of the challenge.
        id: String,
        /// The sample word.
        input: String,
        /// The offending symbol.
        symbol: Symbol,
    },
    /// Neither a reference automaton nor samples are given.
    #[error("challenge {} has neither a reference automaton nor samples", .id.show())]
    NothingToCheck {
        /// Identifier of the challenge.
        id: String,
    },
    /// Two challenges of a catalog share the same identifier.
    #[error("challenge {} is defined more than once", .id.show())]
    DuplicateId {
        /// The identifier in question.
        id: String,
    },
}

/// A word together with the verdict that a correct automaton gives on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sample {
    /// The word.
    pub input: String,
    /// Whether the word must be accepted.
    #[serde(deserialize_with = "boolean_text")]
    pub accept: bool,
}

impl Sample {
    /// Creates a new sample.
    pub fn new(input: impl Into<String>, accept: bool) -> Self {
        Self {
            input: input.into(),
            accept,
        }
    }
}

/// Reads the literal text of the scalar, so `true` and `"true"` are both accepted.
fn boolean_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let text = String::deserialize(deserializer)?;
    text.parse()
        .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&text), &"true or false"))
}

/// A challenge as it is written down in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChallengeRecord {
    /// Identifies the challenge within its catalog.
    pub id: String,
    /// Text that is presented to the user.
    #[serde(default)]
    pub description: String,
    /// The symbols a submission has to use.
    pub alphabet: Vec<String>,
    /// An automaton that accepts precisely the intended language.
    #[serde(default)]
    pub reference: Option<AutomatonDefinition>,
    /// Words that a submission has to classify correctly.
    #[serde(default)]
    pub samples: Vec<Sample>,
}

/// A challenge whose reference automaton (if any) has been validated and whose samples are known
/// to be words over its alphabet. Challenges are immutable and may be shared between threads.
#[derive(Debug, Clone)]
pub struct Challenge {
    id: String,
    description: String,
    alphabet: CharAlphabet,
    reference: Option<Dfa>,
    samples: Vec<Sample>,
}

impl Challenge {
    /// Builds a challenge from its record. The reference automaton must load, validate and use
    /// precisely the alphabet of the challenge, every sample must be a word over that alphabet and
    /// at least one of reference and samples has to be present.
    pub fn from_record(record: ChallengeRecord) -> Result<Self, ChallengeError> {
        let ChallengeRecord {
            id,
            description,
            alphabet,
            reference,
            samples,
        } = record;

        let alphabet: CharAlphabet = match parse_alphabet(alphabet) {
            Ok(symbols) => symbols.into_iter().collect(),
            Err(error) => return Err(ChallengeError::Alphabet { id, error }),
        };

        let reference = match reference {
            Some(definition) => Some(Self::load_reference(&id, definition)?),
            None => None,
        };

        Self::new(id, description, alphabet, reference, samples)
    }

    fn load_reference(id: &str, definition: AutomatonDefinition) -> Result<Dfa, ChallengeError> {
        let raw = load(definition).map_err(|error| ChallengeError::ReferenceLoad {
            id: id.to_string(),
            error,
        })?;
        raw.validate()
            .map_err(|error| ChallengeError::ReferenceInvalid {
                id: id.to_string(),
                error,
            })
    }

    /// Assembles a challenge from its parts, performing the same checks as
    /// [`Challenge::from_record`].
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        alphabet: CharAlphabet,
        reference: Option<Dfa>,
        samples: Vec<Sample>,
    ) -> Result<Self, ChallengeError> {
        let id = id.into();
        if alphabet.is_empty() {
            return Err(ChallengeError::Alphabet {
                id,
                error: Malformed::EmptyAlphabet,
            });
        }
        if let Some(found) = reference.as_ref().map(|dfa| dfa.alphabet()) {
            if found != &alphabet {
                return Err(ChallengeError::ReferenceAlphabet {
                    found: found.clone(),
                    expected: alphabet,
                    id,
                });
            }
        }
        if reference.is_none() && samples.is_empty() {
            return Err(ChallengeError::NothingToCheck { id });
        }
        for sample in &samples {
            if let Some(symbol) = sample.input.chars().find(|c| !alphabet.contains(*c)) {
                return Err(ChallengeError::SampleSymbol {
                    id,
                    input: sample.input.clone(),
                    symbol,
                });
            }
        }
        if let Some(reference) = &reference {
            for sample in samples.iter().filter(|s| reference.accepts(&s.input) != s.accept) {
                warn!(
                    "reference of challenge {} disagrees with sample {}",
                    id.show(),
                    sample.input.show()
                );
            }
        }

        Ok(Self {
            id,
            description: description.into(),
            alphabet,
            reference,
            samples,
        })
    }

    /// The identifier of the challenge.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The description that is shown to the user.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The alphabet over which submissions are expected.
    pub fn alphabet(&self) -> &CharAlphabet {
        &self.alphabet
    }

    /// The reference automaton, if there is one.
    pub fn reference(&self) -> Option<&Dfa> {
        self.reference.as_ref()
    }

    /// The samples in the order in which they are checked.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

/// Provides read-only access to challenges. The grader is handed an implementation of this instead
/// of reaching out to some global catalog.
pub trait ChallengeSource {
    /// Looks up the challenge with the given identifier.
    fn challenge(&self, id: &str) -> Option<&Challenge>;
}

impl<S: ChallengeSource + ?Sized> ChallengeSource for &S {
    fn challenge(&self, id: &str) -> Option<&Challenge> {
        S::challenge(self, id)
    }
}

/// A collection of challenges, indexed by their identifier and kept in the order in which they
/// were listed.
#[derive(Debug, Clone, Default)]
pub struct Catalog(InsertionOrderedMap<String, Challenge>);

impl Catalog {
    /// Builds a catalog, failing if two challenges share an identifier.
    pub fn from_challenges(
        challenges: impl IntoIterator<Item = Challenge>,
    ) -> Result<Self, ChallengeError> {
        let mut map = InsertionOrderedMap::default();
        for challenge in challenges {
            if map.contains_key(challenge.id()) {
                return Err(ChallengeError::DuplicateId {
                    id: challenge.id().to_string(),
                });
            }
            map.insert(challenge.id().to_string(), challenge);
        }
        Ok(Self(map))
    }

    /// Parses a catalog from a YAML list of challenge records. Scalars are read as text, just like
    /// in automaton definitions.
    pub fn from_yaml(text: &str) -> Result<Self, ChallengeError> {
        let records: Vec<ChallengeRecord> = from_yaml_text(text)?;
        let catalog = Self::from_challenges(
            records
                .into_iter()
                .map(Challenge::from_record)
                .collect::<Result<Vec<_>, _>>()?,
        )?;
        debug!("loaded catalog with {} challenges", catalog.len());
        Ok(catalog)
    }

    /// Returns the number of challenges.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no challenges.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all challenges in the order in which they were listed.
    pub fn iter(&self) -> impl Iterator<Item = &Challenge> + '_ {
        self.0.values()
    }
}

impl ChallengeSource for Catalog {
    fn challenge(&self, id: &str) -> Option<&Challenge> {
        self.0.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::odd_ones;

    pub const CATALOG: &str = include_str!("../../challenges/catalog.yaml");

    fn record(text: &str) -> ChallengeRecord {
        from_yaml_text(text).unwrap()
    }

    #[test_log::test]
    fn load_catalog() {
        let catalog = Catalog::from_yaml(CATALOG).unwrap();
        assert_eq!(
            catalog.iter().map(Challenge::id).collect::<Vec<_>>(),
            vec!["odd-ones", "ends-in-ab", "even-length"]
        );

        let odd = catalog.challenge("odd-ones").unwrap();
        assert_eq!(odd.alphabet().to_string(), "{0, 1}");
        assert!(odd.reference().unwrap().equivalent(&odd_ones()).is_equal());
        assert_eq!(odd.samples()[2], Sample::new("0110", false));

        let even = catalog.challenge("even-length").unwrap();
        assert!(even.reference().is_none());
        assert_eq!(even.samples().len(), 5);

        assert!(catalog.challenge("missing").is_none());
    }

    #[test]
    fn sample_verdicts_must_be_booleans() {
        let err = Catalog::from_yaml(
            "- {id: x, alphabet: [a], samples: [{input: a, accept: maybe}]}",
        )
        .unwrap_err();
        assert!(matches!(err, ChallengeError::Malformed(Malformed::Syntax(_))));
    }

    #[test]
    fn invalid_alphabet() {
        let err = Challenge::from_record(record(
            "{id: x, alphabet: [ab], samples: [{input: '', accept: true}]}",
        ))
        .unwrap_err();
        assert_eq!(
            err,
            ChallengeError::Alphabet {
                id: "x".into(),
                error: Malformed::SymbolNotSingleCharacter("ab".into())
            }
        );
    }

    #[test]
    fn reference_is_validated() {
        let err = Challenge::from_record(record(
            r#"
id: broken
alphabet: [0, 1]
reference:
  alphabet: [0, 1]
  states: [q0]
  start: q0
  accepting: []
  transitions:
    q0: {0: q0}
"#,
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            ChallengeError::ReferenceInvalid {
                error: ValidationError::Incomplete { .. },
                ..
            }
        ));
        assert!(err
            .to_string()
            .starts_with("reference automaton of challenge \"broken\" is invalid"));
    }

    #[test]
    fn reference_uses_challenge_alphabet() {
        let err = Challenge::new(
            "odd",
            "",
            "012".chars().collect(),
            Some(odd_ones()),
            vec![],
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "reference automaton of challenge \"odd\" is over {0, 1} instead of {0, 1, 2}"
        );
    }

    #[test]
    fn samples_are_over_the_alphabet() {
        let err = Challenge::new(
            "odd",
            "",
            "01".chars().collect(),
            Some(odd_ones()),
            vec![Sample::new("0120", true)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ChallengeError::SampleSymbol {
                id: "odd".into(),
                input: "0120".into(),
                symbol: '2'
            }
        );
    }

    #[test]
    fn something_to_check() {
        let err = Challenge::new("empty", "", "01".chars().collect(), None, vec![]).unwrap_err();
        assert_eq!(err, ChallengeError::NothingToCheck { id: "empty".into() });
    }

    #[test]
    fn duplicate_ids() {
        let challenge = || {
            Challenge::new("twice", "", "01".chars().collect(), Some(odd_ones()), vec![]).unwrap()
        };
        let err = Catalog::from_challenges([challenge(), challenge()]).unwrap_err();
        assert_eq!(err, ChallengeError::DuplicateId { id: "twice".into() });
    }

    #[test]
    fn shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Challenge>();
        assert_send_sync::<Catalog>();
    }
}
