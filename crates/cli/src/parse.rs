//! ArgMatches → CliAction conversion, and flag overrides onto the config.

use std::path::PathBuf;

use clap::ArgMatches;
use clir_core::{ExperimentConfig, FusionMethod, MissingTopicPolicy, CONFIG_FILE_NAME};

/// The result of parsing the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum CliAction {
    /// Fuse two runs
    Fuse {
        run_a: PathBuf,
        run_b: PathBuf,
        alpha: Option<f64>,
        top_k: Option<usize>,
        method: Option<FusionMethod>,
        tag: Option<String>,
        output: Option<PathBuf>,
    },
    /// Evaluate runs against qrels
    Evaluate {
        qrels: PathBuf,
        runs: Vec<PathBuf>,
        missing: Option<MissingTopicPolicy>,
        per_topic: bool,
    },
    /// Normalize one run
    Normalize { run: PathBuf, output: Option<PathBuf> },
    /// Alignment diagnostics
    Check {
        qrels: PathBuf,
        collection: Option<PathBuf>,
        runs: Vec<PathBuf>,
    },
    /// Write a default config file
    InitConfig { path: PathBuf },
}

fn path(m: &ArgMatches, name: &str) -> Result<PathBuf, String> {
    m.get_one::<PathBuf>(name)
        .cloned()
        .ok_or_else(|| format!("missing required argument '{}'", name))
}

fn paths(m: &ArgMatches, name: &str) -> Vec<PathBuf> {
    m.get_many::<PathBuf>(name)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn parsed<T: std::str::FromStr>(m: &ArgMatches, name: &str) -> Result<Option<T>, String>
where
    T::Err: std::fmt::Display,
{
    m.get_one::<String>(name)
        .map(|s| s.parse::<T>().map_err(|e| e.to_string()))
        .transpose()
}

/// Convert clap matches into an action.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    match matches.subcommand() {
        Some(("fuse", m)) => Ok(CliAction::Fuse {
            run_a: path(m, "run-a")?,
            run_b: path(m, "run-b")?,
            alpha: m.get_one::<f64>("alpha").copied(),
            top_k: m.get_one::<usize>("top-k").copied(),
            method: parsed(m, "method")?,
            tag: m.get_one::<String>("tag").cloned(),
            output: m.get_one::<PathBuf>("output").cloned(),
        }),
        Some(("evaluate", m)) => Ok(CliAction::Evaluate {
            qrels: path(m, "qrels")?,
            runs: paths(m, "runs"),
            missing: parsed(m, "missing")?,
            per_topic: m.get_flag("per-topic"),
        }),
        Some(("normalize", m)) => Ok(CliAction::Normalize {
            run: path(m, "run")?,
            output: m.get_one::<PathBuf>("output").cloned(),
        }),
        Some(("check", m)) => Ok(CliAction::Check {
            qrels: path(m, "qrels")?,
            collection: m.get_one::<PathBuf>("collection").cloned(),
            runs: paths(m, "runs"),
        }),
        Some(("init-config", m)) => Ok(CliAction::InitConfig {
            path: m
                .get_one::<PathBuf>("path")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)),
        }),
        Some((other, _)) => Err(format!("unknown command '{}'", other)),
        None => Err("no command given".to_string()),
    }
}

/// Apply command-line overrides on top of the loaded config
pub fn apply_overrides(config: &mut ExperimentConfig, action: &CliAction, strict: bool) {
    if strict {
        config.strict_parsing = true;
    }
    match action {
        CliAction::Fuse {
            alpha,
            top_k,
            method,
            tag,
            ..
        } => {
            if let Some(alpha) = alpha {
                config.fusion.alpha = *alpha;
            }
            if let Some(top_k) = top_k {
                config.fusion.top_k = *top_k;
            }
            if let Some(method) = method {
                config.fusion.method = *method;
            }
            if let Some(tag) = tag {
                config.fusion.tag = tag.clone();
            }
        }
        CliAction::Evaluate {
            missing: Some(policy),
            ..
        } => {
            config.evaluation.missing_topics = *policy;
        }
        _ => {}
    }
}
