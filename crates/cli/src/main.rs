//! clir: batch driver for CLIR fusion and evaluation experiments.
//!
//! Every command reads its inputs fully, does one thing and exits:
//! - `clir fuse`: combine two runs into a hybrid run
//! - `clir evaluate`: score runs against relevance judgments
//! - `clir normalize`: min-max normalize a run
//! - `clir check`: topic/document alignment diagnostics
//! - `clir init-config`: write a default `clir.toml`

mod commands;
mod format;
mod parse;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clir_core::logging::{level_from_env, parse_level};
use clir_core::{
    load_id_list, load_qrels, load_run, save_run, write_run, ClirResult, ExperimentConfig,
    ParseMode, RankedResultSet, CONFIG_FILE_NAME,
};
use clir_fusion::{fuser_from_config, normalize_run, Fuser};
use clir_metrics::{judged_coverage, run_summary, topic_overlap, EvalConfig, Evaluator};
use tracing::Level;

use commands::build_cli;
use format::{
    format_check, format_error, format_evaluations, format_write_summary, CheckReport,
    OutputMode, RunCheck, WriteSummary,
};
use parse::{apply_overrides, matches_to_action, CliAction};

fn main() {
    let matches = build_cli().get_matches();

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    init_tracing(matches.get_one::<String>("log-level").map(String::as_str));

    let exit_code = match run(&matches, output_mode) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", format_error(&e, output_mode));
            1
        }
    };
    process::exit(exit_code);
}

/// Install the stderr subscriber: `--log-level`, then `CLIR_LOG_LEVEL`, then info
fn init_tracing(flag: Option<&str>) {
    let level = flag
        .and_then(parse_level)
        .unwrap_or_else(|| level_from_env(Level::INFO));
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

/// Explicit `--config`, else `./clir.toml` when present, else defaults
fn load_config(explicit: Option<&PathBuf>) -> ClirResult<ExperimentConfig> {
    match explicit {
        Some(path) => ExperimentConfig::from_file(path),
        None => {
            let local = Path::new(CONFIG_FILE_NAME);
            if local.exists() {
                ExperimentConfig::from_file(local)
            } else {
                Ok(ExperimentConfig::default())
            }
        }
    }
}

fn run(matches: &clap::ArgMatches, mode: OutputMode) -> ClirResult<()> {
    let action = matches_to_action(matches).map_err(clir_core::ClirError::InvalidConfig)?;

    if let CliAction::InitConfig { path } = &action {
        return run_init_config(path);
    }

    let mut config = load_config(matches.get_one::<PathBuf>("config"))?;
    apply_overrides(&mut config, &action, matches.get_flag("strict"));
    config.validate()?;
    let parse_mode = ParseMode::from_strict(config.strict_parsing);

    match action {
        CliAction::Fuse {
            run_a,
            run_b,
            output,
            ..
        } => run_fuse(&config, &run_a, &run_b, output.as_deref(), parse_mode, mode),
        CliAction::Evaluate {
            qrels,
            runs,
            per_topic,
            ..
        } => run_evaluate(&config, &qrels, &runs, per_topic, parse_mode, mode),
        CliAction::Normalize { run, output } => {
            run_normalize(&run, output.as_deref(), parse_mode, mode)
        }
        CliAction::Check {
            qrels,
            collection,
            runs,
        } => run_check(&qrels, collection.as_deref(), &runs, parse_mode, mode),
        CliAction::InitConfig { .. } => Ok(()),
    }
}

/// Write to a file and print a summary, or stream the run to stdout
fn emit_run(
    run: &RankedResultSet,
    operation: &str,
    output: Option<&Path>,
    mode: OutputMode,
) -> ClirResult<()> {
    match output {
        Some(path) => {
            save_run(run, path)?;
            let summary = WriteSummary {
                operation: operation.to_string(),
                tag: run.tag().to_string(),
                path: path.to_path_buf(),
                topic_count: run.topic_count(),
                entry_count: run.entry_count(),
            };
            println!("{}", format_write_summary(&summary, mode));
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write_run(run, &mut lock)?;
            lock.flush()?;
        }
    }
    Ok(())
}

fn run_fuse(
    config: &ExperimentConfig,
    run_a: &Path,
    run_b: &Path,
    output: Option<&Path>,
    parse_mode: ParseMode,
    mode: OutputMode,
) -> ClirResult<()> {
    let fuser = fuser_from_config(&config.fusion)?;
    let (a, _) = load_run(run_a, parse_mode)?;
    let (b, _) = load_run(run_b, parse_mode)?;

    let fused = fuser.fuse(&a, &b)?;
    emit_run(&fused, fuser.name(), output, mode)
}

fn run_evaluate(
    config: &ExperimentConfig,
    qrels_path: &Path,
    runs: &[PathBuf],
    per_topic: bool,
    parse_mode: ParseMode,
    mode: OutputMode,
) -> ClirResult<()> {
    let (qrels, _) = load_qrels(qrels_path, parse_mode)?;
    let evaluator = Evaluator::new(EvalConfig::from_section(&config.evaluation));

    let mut evaluations = Vec::with_capacity(runs.len());
    for path in runs {
        let (run, _) = load_run(path, parse_mode)?;
        evaluations.push(evaluator.evaluate(&run, &qrels)?);
    }

    println!("{}", format_evaluations(&evaluations, per_topic, mode));
    Ok(())
}

fn run_normalize(
    path: &Path,
    output: Option<&Path>,
    parse_mode: ParseMode,
    mode: OutputMode,
) -> ClirResult<()> {
    let (run, _) = load_run(path, parse_mode)?;
    let normalized = normalize_run(&run);
    emit_run(&normalized, "normalize", output, mode)
}

fn run_check(
    qrels_path: &Path,
    collection: Option<&Path>,
    runs: &[PathBuf],
    parse_mode: ParseMode,
    mode: OutputMode,
) -> ClirResult<()> {
    let (qrels, qrels_load) = load_qrels(qrels_path, parse_mode)?;

    let coverage = match collection {
        Some(path) => {
            let ids = load_id_list(path)?;
            Some(judged_coverage(&qrels, &ids))
        }
        None => None,
    };

    let mut checks = Vec::with_capacity(runs.len());
    for path in runs {
        let (run, load) = load_run(path, parse_mode)?;
        checks.push(RunCheck {
            path: path.clone(),
            load,
            summary: run_summary(&run),
            overlap: topic_overlap(&run, &qrels),
        });
    }

    let report = CheckReport {
        qrels_load,
        qrels: qrels.summary(),
        coverage,
        runs: checks,
    };
    println!("{}", format_check(&report, mode));
    Ok(())
}

fn run_init_config(path: &Path) -> ClirResult<()> {
    if ExperimentConfig::write_default_if_missing(path)? {
        println!("Wrote default config to {}", path.display());
    } else {
        println!("{} already exists, left unchanged", path.display());
    }
    Ok(())
}
