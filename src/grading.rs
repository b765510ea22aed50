use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    alphabet::CharAlphabet,
    automaton::{RunResult, SimulationError},
    definition::{from_yaml_text, load, load_yaml, AutomatonDefinition, LoadError, Malformed},
    equivalence::{equivalent, EquivalenceResult},
    transition_system::Deterministic,
    validate::ValidationError,
    Dfa, Show,
};

mod challenge;
pub use challenge::{Catalog, Challenge, ChallengeError, ChallengeRecord, ChallengeSource, Sample};

/// Decides what happens when the alphabet of a submission differs from the one of the challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlphabetPolicy {
    /// The submission fails with [`Failure::AlphabetMismatch`].
    #[default]
    Exact,
    /// The submission is compared over the union of both alphabets. A word containing a symbol
    /// that one automaton does not know is rejected by that automaton.
    Union,
}

impl FromStr for AlphabetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(AlphabetPolicy::Exact),
            "union" => Ok(AlphabetPolicy::Union),
            other => Err(format!("unknown alphabet policy \"{other}\", use exact or union")),
        }
    }
}

/// Configuration of a [`Grader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct GraderConfig {
    /// How a submission over a different alphabet is treated.
    pub alphabet_policy: AlphabetPolicy,
}

impl GraderConfig {
    /// Reads a configuration from YAML, missing fields take their default value.
    pub fn from_yaml(text: &str) -> Result<Self, Malformed> {
        from_yaml_text(text)
    }

    /// Sets the alphabet policy.
    pub fn with_alphabet_policy(self, alphabet_policy: AlphabetPolicy) -> Self {
        Self { alphabet_policy }
    }
}

/// Explains why a submission did not pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The submission does not have the shape of an automaton definition.
    Load(LoadError),
    /// The submission is not a valid DFA.
    Invalid(ValidationError),
    /// The submission is over a different alphabet than the challenge.
    AlphabetMismatch {
        /// The alphabet of the challenge.
        expected: CharAlphabet,
        /// The alphabet of the submission.
        found: CharAlphabet,
    },
    /// The submission classifies a sample word incorrectly.
    Sample {
        /// The sample word.
        input: String,
        /// Whether the word should be accepted.
        expected: bool,
        /// Whether the submission accepts the word.
        actual: bool,
    },
    /// The submission and the reference automaton disagree on `witness`.
    Witness {
        /// A shortest word on which submission and reference disagree.
        witness: String,
        /// Whether the reference accepts the witness.
        expected: bool,
    },
}

fn acceptance(accepted: bool) -> &'static str {
    if accepted {
        "accepted"
    } else {
        "rejected"
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Load(error) => write!(f, "the submission could not be loaded: {error}"),
            Failure::Invalid(error) => write!(f, "the submission is not a valid DFA: {error}"),
            Failure::AlphabetMismatch { expected, found } => write!(
                f,
                "the submission is over the alphabet {found}, but {expected} is expected"
            ),
            Failure::Sample {
                input,
                expected,
                actual,
            } => write!(
                f,
                "the word {} should be {} but is {}",
                input.show(),
                acceptance(*expected),
                acceptance(*actual)
            ),
            Failure::Witness { witness, expected } => write!(
                f,
                "the word {} should be {} but is {}",
                witness.show(),
                acceptance(*expected),
                acceptance(!*expected)
            ),
        }
    }
}

impl From<LoadError> for Failure {
    fn from(value: LoadError) -> Self {
        Failure::Load(value)
    }
}

impl From<ValidationError> for Failure {
    fn from(value: ValidationError) -> Self {
        Failure::Invalid(value)
    }
}

/// The result of grading a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The submission solves the challenge.
    Pass,
    /// The submission does not solve the challenge.
    Fail(Failure),
}

impl Verdict {
    /// Returns `true` if the submission passed.
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Returns the reason for failing, if the submission did not pass.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail(failure) => Some(failure),
        }
    }
}

impl From<Result<(), Failure>> for Verdict {
    fn from(value: Result<(), Failure>) -> Self {
        match value {
            Ok(()) => Verdict::Pass,
            Err(failure) => Verdict::Fail(failure),
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Fail(failure) => write!(f, "fail: {failure}"),
        }
    }
}

/// Raised by [`Grader::simulate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradingError {
    /// The definition could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The definition is not a valid DFA.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// The input could not be run.
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Records successful submissions. What that means (writing to a database, a file, ...) is up to
/// the implementation, the grader only calls it.
pub trait SubmissionLog {
    /// Called once for every submission that passes `challenge`.
    fn record_success(&mut self, challenge: &Challenge, submission: &AutomatonDefinition);
}

/// Checks submitted automata against challenges.
///
/// # Example
/// ```
/// use automata_grader::prelude::*;
///
/// let challenge = Challenge::new(
///     "contains-a",
///     "Accept all words that contain an a.",
///     CharAlphabet::of_size(2),
///     None,
///     vec![Sample::new("b", false), Sample::new("ab", true)],
/// )
/// .unwrap();
/// let submission = r#"
/// alphabet: [a, b]
/// states: [no, yes]
/// start: no
/// accepting: [yes]
/// transitions:
///   no: {a: yes, b: no}
///   yes: {a: yes, b: no}
/// "#;
/// assert_eq!(
///     Grader::default().check(submission, &challenge).to_string(),
///     "fail: the word \"ab\" should be accepted but is rejected"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Grader {
    config: GraderConfig,
}

impl Grader {
    /// Creates a grader with the given configuration.
    pub fn new(config: GraderConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GraderConfig {
        &self.config
    }

    /// Loads and validates a submission given as YAML text and grades it, see
    /// [`Grader::check_dfa`].
    pub fn check(&self, definition: &str, challenge: &Challenge) -> Verdict {
        match AutomatonDefinition::from_yaml(definition) {
            Ok(definition) => self.check_definition(definition, challenge),
            Err(error) => self.conclude(challenge, Err(error.into())),
        }
    }

    /// Loads, validates and grades an already deserialized submission.
    pub fn check_definition(
        &self,
        definition: AutomatonDefinition,
        challenge: &Challenge,
    ) -> Verdict {
        let outcome = load(definition)
            .map_err(Failure::from)
            .and_then(|raw| Ok(raw.validate()?))
            .and_then(|dfa| self.grade(&dfa, challenge));
        self.conclude(challenge, outcome)
    }

    /// Grades a validated automaton: the alphabet policy is applied, then the samples are checked
    /// in order and finally the automaton is compared to the reference.
    pub fn check_dfa(&self, dfa: &Dfa, challenge: &Challenge) -> Verdict {
        self.conclude(challenge, self.grade(dfa, challenge))
    }

    /// Works like [`Grader::check`], but hands passing submissions to `log`.
    pub fn submit<L: SubmissionLog + ?Sized>(
        &self,
        definition: &str,
        challenge: &Challenge,
        log: &mut L,
    ) -> Verdict {
        let definition = match AutomatonDefinition::from_yaml(definition) {
            Ok(definition) => definition,
            Err(error) => return self.conclude(challenge, Err(error.into())),
        };
        let verdict = self.check_definition(definition.clone(), challenge);
        if verdict.is_pass() {
            debug!("recording successful submission for {}", challenge.id().show());
            log.record_success(challenge, &definition);
        }
        verdict
    }

    /// Loads and validates a definition and runs `input` on it.
    pub fn simulate(&self, definition: &str, input: &str) -> Result<RunResult, GradingError> {
        let dfa = load_yaml(definition)?.validate()?;
        let run = dfa.run(input)?;
        debug!(
            "{} is {} via {}",
            input.show(),
            acceptance(run.accepted),
            run.trace.join(" -> ")
        );
        Ok(run)
    }

    fn grade(&self, dfa: &Dfa, challenge: &Challenge) -> Result<(), Failure> {
        if dfa.alphabet() != challenge.alphabet() {
            match self.config.alphabet_policy {
                AlphabetPolicy::Exact => {
                    return Err(Failure::AlphabetMismatch {
                        expected: challenge.alphabet().clone(),
                        found: dfa.alphabet().clone(),
                    })
                }
                AlphabetPolicy::Union => debug!(
                    "comparing over the union of {} and {}",
                    dfa.alphabet(),
                    challenge.alphabet()
                ),
            }
        }

        for sample in challenge.samples() {
            let actual = dfa.accepts(&sample.input);
            if actual != sample.accept {
                return Err(Failure::Sample {
                    input: sample.input.clone(),
                    expected: sample.accept,
                    actual,
                });
            }
        }
        debug!("all {} samples are classified correctly", challenge.samples().len());

        if let Some(reference) = challenge.reference() {
            if let EquivalenceResult::Different { witness } = equivalent(reference, dfa) {
                let expected = reference.accepts(&witness);
                return Err(Failure::Witness { witness, expected });
            }
        }
        Ok(())
    }

    fn conclude(&self, challenge: &Challenge, outcome: Result<(), Failure>) -> Verdict {
        let verdict = Verdict::from(outcome);
        info!("submission for {}: {}", challenge.id().show(), verdict);
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tests::ODD_ONES, validate::Endpoint};

    const CATALOG: &str = include_str!("../challenges/catalog.yaml");

    fn catalog() -> Catalog {
        Catalog::from_yaml(CATALOG).unwrap()
    }

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl SubmissionLog for Recorder {
        fn record_success(&mut self, challenge: &Challenge, submission: &AutomatonDefinition) {
            self.0
                .push(format!("{}: {} states", challenge.id(), submission.states.len()));
        }
    }

    const EVEN_LENGTH: &str = r#"
alphabet: [a, b]
states: [even, odd]
start: even
accepting: [even]
transitions:
  even: {a: odd, b: odd}
  odd: {a: even, b: even}
"#;

    #[test_log::test]
    fn correct_submission_passes() {
        let catalog = catalog();
        let grader = Grader::default();
        assert_eq!(
            grader.check(ODD_ONES, catalog.challenge("odd-ones").unwrap()),
            Verdict::Pass
        );
        assert!(grader
            .check(EVEN_LENGTH, catalog.challenge("even-length").unwrap())
            .is_pass());
    }

    #[test_log::test]
    fn witness_from_reference() {
        let catalog = catalog();
        let challenge = catalog.challenge("ends-in-ab").unwrap();
        // accepts all words ending in b
        let ends_in_b = r#"
alphabet: [a, b]
states: [other, b]
start: other
accepting: [b]
transitions:
  other: {a: other, b: b}
  b: {a: other, b: b}
"#;
        let verdict = Grader::default().check(ends_in_b, challenge);
        assert_eq!(
            verdict,
            Verdict::Fail(Failure::Witness {
                witness: "b".into(),
                expected: false
            })
        );
        assert_eq!(
            verdict.to_string(),
            "fail: the word \"b\" should be rejected but is accepted"
        );
    }

    #[test]
    fn samples_are_checked_in_order() {
        let catalog = catalog();
        let challenge = catalog.challenge("odd-ones").unwrap();
        let verdict = Grader::default().check(&ODD_ONES.replace("[q1]", "[q0]"), challenge);
        assert_eq!(
            verdict.failure(),
            Some(&Failure::Sample {
                input: String::new(),
                expected: false,
                actual: true
            })
        );
        assert_eq!(
            verdict.failure().unwrap().to_string(),
            "the word ε should be rejected but is accepted"
        );
    }

    #[test]
    fn load_and_validation_failures() {
        let catalog = catalog();
        let challenge = catalog.challenge("odd-ones").unwrap();
        let grader = Grader::default();

        let verdict = grader.check("alphabet: [0, 1]\nstates: [q0]", challenge);
        assert!(matches!(
            verdict,
            Verdict::Fail(Failure::Load(LoadError::MalformedInput(Malformed::Syntax(_))))
        ));

        let verdict = grader.check(&ODD_ONES.replace("1: q0", "2: q0"), challenge);
        assert_eq!(
            verdict.failure(),
            Some(&Failure::Invalid(ValidationError::UnknownTransitionEndpoint {
                transition: ("q1", "2", "q0").into(),
                endpoint: Endpoint::Symbol("2".into())
            }))
        );
    }

    #[test_log::test]
    fn alphabet_policies() {
        let catalog = catalog();
        let challenge = catalog.challenge("even-length").unwrap();
        let over_abc = r#"
alphabet: [a, b, c]
states: [even, odd]
start: even
accepting: [even]
transitions:
  even: {a: odd, b: odd, c: odd}
  odd: {a: even, b: even, c: even}
"#;
        let verdict = Grader::default().check(over_abc, challenge);
        assert_eq!(
            verdict.to_string(),
            "fail: the submission is over the alphabet {a, b, c}, but {a, b} is expected"
        );

        let lenient = Grader::new(GraderConfig::default().with_alphabet_policy(AlphabetPolicy::Union));
        assert!(lenient.check(over_abc, challenge).is_pass());

        // over the union the extra symbol matters once there is a reference
        let odd = catalog.challenge("odd-ones").unwrap();
        let with_two = r#"
alphabet: [0, 1, 2]
states: [q0, q1]
start: q0
accepting: [q1]
transitions:
  q0: {0: q0, 1: q1, 2: q1}
  q1: {0: q1, 1: q0, 2: q0}
"#;
        assert_eq!(
            lenient.check(with_two, odd).failure(),
            Some(&Failure::Witness {
                witness: "2".into(),
                expected: false
            })
        );
    }

    #[test]
    fn submissions_are_recorded_on_success() {
        let catalog = catalog();
        let challenge = catalog.challenge("odd-ones").unwrap();
        let grader = Grader::default();
        let mut log = Recorder::default();

        assert!(grader.submit(ODD_ONES, challenge, &mut log).is_pass());
        assert!(!grader
            .submit(EVEN_LENGTH, challenge, &mut log)
            .is_pass());
        assert!(!grader.submit("{", challenge, &mut log).is_pass());
        assert_eq!(log.0, vec!["odd-ones: 2 states"]);
    }

    #[test]
    fn simulate() {
        let grader = Grader::default();
        let run = grader.simulate(ODD_ONES, "011").unwrap();
        assert_eq!(run.trace, vec!["q0", "q0", "q1", "q0"]);
        assert!(!run.accepted);

        assert_eq!(
            grader.simulate(ODD_ONES, "0a"),
            Err(GradingError::Simulation(SimulationError::UnknownSymbol {
                symbol: 'a',
                position: 1
            }))
        );
        assert!(matches!(
            grader.simulate("alphabet: []", ""),
            Err(GradingError::Load(_))
        ));
        assert!(matches!(
            grader.simulate(&ODD_ONES.replace("start: q0", "start: q7"), ""),
            Err(GradingError::Invalid(ValidationError::UnknownStart { .. }))
        ));
    }

    #[test]
    fn configuration() {
        assert_eq!(GraderConfig::from_yaml("{}").unwrap(), GraderConfig::default());
        assert_eq!(
            GraderConfig::from_yaml("alphabet-policy: union")
                .unwrap()
                .alphabet_policy,
            AlphabetPolicy::Union
        );
        assert!(GraderConfig::from_yaml("alphabet-policy: loose").is_err());
        assert_eq!("exact".parse::<AlphabetPolicy>(), Ok(AlphabetPolicy::Exact));
        assert!("strict".parse::<AlphabetPolicy>().is_err());
    }

    #[test]
    fn shared_reference() {
        let catalog = catalog();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let challenge = catalog.challenge("odd-ones").unwrap();
                    assert!(Grader::default().check(ODD_ONES, challenge).is_pass());
                });
            }
        });
    }
}
