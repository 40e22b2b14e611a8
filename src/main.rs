use std::{num::NonZeroUsize, path::PathBuf, process::ExitCode};

use clap::Parser;
use env_logger::Env;
use log::debug;
use orchestrator::{
    EvalConfig,
    configs::{DEFAULT_METRIC, worker_timeout_from_env},
};

/// Evaluates a k-nearest-neighbour classifier over a testing data set and
/// prints how many items it classified correctly.
#[derive(Parser, Debug)]
#[command(name = "classifier")]
#[command(version)]
struct Cli {
    /// Number of neighbours taking part in each vote
    #[arg(short = 'K', default_value = "1")]
    k: NonZeroUsize,

    /// Distance metric, any prefix of euclidean or cosine
    #[arg(short = 'd', default_value = DEFAULT_METRIC)]
    metric: String,

    /// Number of workers the testing items are split among
    #[arg(short = 'p', default_value = "1")]
    workers: NonZeroUsize,

    /// Log progress to stderr
    #[arg(short = 'v')]
    verbose: bool,

    /// Labeled data set the predictions are drawn from
    training: PathBuf,

    /// Labeled data set whose items are classified
    testing: PathBuf,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if let Err(print_err) = e.print() {
                eprintln!("{print_err}");
            }
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
    debug!("{cli:?}");

    let config = EvalConfig::new(cli.training, cli.testing)
        .with_k(cli.k)
        .with_metric(cli.metric)
        .with_workers(cli.workers)
        .with_worker_timeout(worker_timeout_from_env());

    match orchestrator::evaluate(config) {
        Ok(correct) => {
            println!("{correct}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
