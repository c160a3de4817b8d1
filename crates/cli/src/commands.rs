//! Clap command tree definition.

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

/// Log levels accepted by `--log-level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("clir")
        .about("Fuse and evaluate cross-lingual retrieval runs")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Experiment config (default: ./clir.toml if present)")
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .value_parser(LOG_LEVELS)
                .help("Log verbosity (default: $CLIR_LOG_LEVEL or info)")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Fail on the first malformed input line")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_fuse())
        .subcommand(build_evaluate())
        .subcommand(build_normalize())
        .subcommand(build_check())
        .subcommand(build_init_config())
}

fn output_arg() -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Write the run here instead of stdout")
}

fn qrels_arg() -> Arg {
    Arg::new("qrels")
        .long("qrels")
        .short('q')
        .required(true)
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Relevance judgments (3- or 4-column)")
}

fn runs_arg() -> Arg {
    Arg::new("runs")
        .required(true)
        .num_args(1..)
        .value_name("RUN")
        .value_parser(value_parser!(PathBuf))
        .help("Run file(s) in TREC format")
}

// =========================================================================
// fuse
// =========================================================================

fn build_fuse() -> Command {
    Command::new("fuse")
        .about("Fuse two runs into a hybrid run")
        .arg(
            Arg::new("run-a")
                .long("run-a")
                .required(true)
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("First run (weighted by alpha)"),
        )
        .arg(
            Arg::new("run-b")
                .long("run-b")
                .required(true)
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Second run (weighted by 1 - alpha)"),
        )
        .arg(
            Arg::new("alpha")
                .long("alpha")
                .short('a')
                .value_parser(value_parser!(f64))
                .help("Weight of the first run, in [0, 1]"),
        )
        .arg(
            Arg::new("top-k")
                .long("top-k")
                .short('k')
                .value_parser(value_parser!(usize))
                .help("Documents kept per topic (0 = all)"),
        )
        .arg(
            Arg::new("method")
                .long("method")
                .short('m')
                .value_parser(["linear", "rrf"])
                .help("Fusion method"),
        )
        .arg(
            Arg::new("tag")
                .long("tag")
                .short('t')
                .help("Method tag for the fused run"),
        )
        .arg(output_arg())
}

// =========================================================================
// evaluate
// =========================================================================

fn build_evaluate() -> Command {
    Command::new("evaluate")
        .about("Score runs against relevance judgments")
        .arg(qrels_arg())
        .arg(
            Arg::new("missing")
                .long("missing")
                .value_parser(["skip", "zero"])
                .help("Judged topics with no results: leave out or score 0"),
        )
        .arg(
            Arg::new("per-topic")
                .long("per-topic")
                .action(ArgAction::SetTrue)
                .help("Include per-topic scores"),
        )
        .arg(runs_arg())
}

// =========================================================================
// normalize
// =========================================================================

fn build_normalize() -> Command {
    Command::new("normalize")
        .about("Min-max normalize a run's scores per topic")
        .arg(
            Arg::new("run")
                .required(true)
                .value_name("RUN")
                .value_parser(value_parser!(PathBuf))
                .help("Run file in TREC format"),
        )
        .arg(output_arg())
}

// =========================================================================
// check
// =========================================================================

fn build_check() -> Command {
    Command::new("check")
        .about("Check runs, qrels and collection ids line up")
        .arg(qrels_arg())
        .arg(
            Arg::new("collection")
                .long("collection")
                .value_name("IDS")
                .value_parser(value_parser!(PathBuf))
                .help("Document id list of the indexed collection"),
        )
        .arg(runs_arg())
}

// =========================================================================
// init-config
// =========================================================================

fn build_init_config() -> Command {
    Command::new("init-config")
        .about("Write a default clir.toml")
        .arg(
            Arg::new("path")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Destination (default: ./clir.toml)"),
        )
}
