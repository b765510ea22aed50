use std::process::ExitCode;

use automata_grader::prelude::*;

use tracing::{debug, trace};
use tracing_subscriber::{filter, prelude::*};

use clap::{Arg, ArgAction, ArgMatches, Command};

/// Exit code for a rejected word, a failed submission or two different automata.
const NEGATIVE: u8 = 1;
/// Exit code for files that can not be read, loaded or validated.
const BROKEN: u8 = 2;

fn cli() -> clap::Command {
    Command::new("grade")
    .about("Load, run, compare and grade deterministic finite automata")
    .subcommand_required(true)
    .arg(
        Arg::new("verbosity")
        .short('v')
        .long("verbosity")
        .global(true)
        .num_args(0..=1)
        .require_equals(true)
        .value_parser(["info", "debug", "trace"])
        .default_missing_value("info")
    )
    .subcommand(
        Command::new("run")
        .about("runs a word on an automaton and prints the visited states")
        .arg(Arg::new("definition").required(true).help("YAML file containing the automaton"))
        .arg(Arg::new("input").default_value("").help("the word that is run"))
    )
    .subcommand(
        Command::new("compare")
        .about("checks whether two automata accept the same language")
        .arg(Arg::new("left").required(true))
        .arg(Arg::new("right").required(true))
    )
    .subcommand(
        Command::new("check")
        .about("grades a submitted automaton against a challenge of a catalog")
        .arg(Arg::new("catalog").required(true).help("YAML file containing a list of challenges"))
        .arg(Arg::new("challenge").required(true).help("identifier of the challenge"))
        .arg(Arg::new("definition").required(true).help("YAML file containing the submission"))
        .arg(
            Arg::new("alphabet-policy")
            .long("alphabet-policy")
            .value_parser(clap::value_parser!(AlphabetPolicy))
            .default_value("exact")
        )
    )
    .subcommand(
        Command::new("show")
        .about("prints the transition table of an automaton")
        .arg(Arg::new("definition").required(true))
        .arg(
            Arg::new("dot")
            .long("dot")
            .action(ArgAction::SetTrue)
            .help("print a graphviz representation instead")
        )
    )
}

fn setup_logging(matches: &ArgMatches) {
    let Ok(Some(verbosity)) = matches.try_get_one::<String>("verbosity") else {
        return;
    };

    let level = match verbosity.as_str() {
        "trace" => filter::LevelFilter::TRACE,
        "debug" => filter::LevelFilter::DEBUG,
        _ => filter::LevelFilter::INFO,
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn read(path: &str) -> Result<String, ExitCode> {
    debug!("reading {path}");
    std::fs::read_to_string(path).map_err(|e| {
        eprintln!("could not read {path}: {e}");
        ExitCode::from(BROKEN)
    })
}

fn read_dfa(path: &str) -> Result<Dfa, ExitCode> {
    let text = read(path)?;
    let raw = load_yaml(&text).map_err(|e| {
        eprintln!("{path}: {e}");
        ExitCode::from(BROKEN)
    })?;
    let problems = raw.diagnose();
    if !problems.is_empty() {
        for problem in problems {
            eprintln!("{path}: {problem}");
        }
        return Err(ExitCode::from(BROKEN));
    }
    raw.validate().map_err(|e| {
        eprintln!("{path}: {e}");
        ExitCode::from(BROKEN)
    })
}

fn outcome(positive: bool) -> ExitCode {
    if positive {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(NEGATIVE)
    }
}

fn run(matches: &ArgMatches) -> Result<ExitCode, ExitCode> {
    match matches.subcommand() {
        Some(("run", sub_matches)) => {
            let dfa = read_dfa(required(sub_matches, "definition"))?;
            let input = required(sub_matches, "input");
            match dfa.run(input) {
                Ok(run) => {
                    println!("{}", run.trace.join(" -> "));
                    println!("{}", if run.accepted { "accepted" } else { "rejected" });
                    Ok(outcome(run.accepted))
                }
                Err(e) => {
                    eprintln!("{e}");
                    Ok(ExitCode::from(NEGATIVE))
                }
            }
        }
        Some(("compare", sub_matches)) => {
            let left = read_dfa(required(sub_matches, "left"))?;
            let right = read_dfa(required(sub_matches, "right"))?;
            let result = left.equivalent(&right);
            println!("{result}");
            Ok(outcome(result.is_equal()))
        }
        Some(("check", sub_matches)) => {
            let catalog = Catalog::from_yaml(&read(required(sub_matches, "catalog"))?).map_err(|e| {
                eprintln!("{e}");
                ExitCode::from(BROKEN)
            })?;
            let id = required(sub_matches, "challenge");
            let Some(challenge) = catalog.challenge(id) else {
                eprintln!("there is no challenge {}", id.show());
                return Err(ExitCode::from(BROKEN));
            };
            let policy = sub_matches
                .get_one::<AlphabetPolicy>("alphabet-policy")
                .copied()
                .unwrap_or_default();
            let grader = Grader::new(GraderConfig::default().with_alphabet_policy(policy));
            let verdict = grader.check(&read(required(sub_matches, "definition"))?, challenge);
            println!("{verdict}");
            Ok(outcome(verdict.is_pass()))
        }
        Some(("show", sub_matches)) => {
            let dfa = read_dfa(required(sub_matches, "definition"))?;
            if sub_matches.get_flag("dot") {
                println!("{}", dfa.dot_representation());
            } else {
                println!("{:?}", dfa);
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => unreachable!(),
    }
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_default()
}

pub fn main() -> ExitCode {
    let matches = cli().get_matches();

    setup_logging(&matches);

    run(&matches).unwrap_or_else(|code| code)
}
