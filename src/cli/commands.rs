//! CLI command definitions for symbench.
//!
//! `run` benchmarks every configured tool over the case corpus, `cases`
//! lists the corpus, and `graphs` turns persisted results into plot tables.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::aggregate::{write_tables, Aggregator};
use crate::catalog::{shuffle_cases, CaseCatalog};
use crate::config::{
    default_tools, load_tools, BenchConfig, DEFAULT_CURVE_HORIZON_SECS, DEFAULT_SOLC_VERSION,
    DEFAULT_TIMEOUT_SECS,
};
use crate::coordinator::{RunCoordinator, RunSummary};
use crate::runner::{LimiterConfig, ResourceLimitedRunner};
use crate::store::{ResultStore, LATEST_STEM};
use crate::tools::{create_pipeline, BuildSystem};

/// Default directory for generated plot tables.
const DEFAULT_GRAPHS_DIR: &str = "graphs";

/// Benchmark harness for symbolic-execution and SMT verification tools.
#[derive(Parser)]
#[command(name = "symbench")]
#[command(about = "Run verification tools over a case corpus and compare them")]
#[command(version)]
#[command(
    long_about = "symbench runs every configured verification tool over the cases found in a forge build, \
classifies each verdict against the expected outcome, and writes JSON/CSV results.\n\n\
Example usage:\n  symbench run -t 60 --limit 50\n  symbench graphs --results results-latest.json"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    /// Log full tool output for every case.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Build, discover cases and run every tool over them.
    #[command(alias = "bench")]
    Run(RunArgs),

    /// List the cases found in the build output.
    Cases(CasesArgs),

    /// Validate persisted results and write cumulative, pairwise and per-instance tables.
    Graphs(GraphsArgs),
}

/// Arguments for `symbench run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Seed for the case shuffle.
    #[arg(short = 's', long, default_value = "1")]
    pub seed: u64,

    /// solc version used to compile contracts.
    #[arg(long = "solcv", default_value = DEFAULT_SOLC_VERSION)]
    pub solc_version: String,

    /// Wall-clock limit per case, in seconds.
    #[arg(short = 't', long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Maximum number of cases to run.
    #[arg(long, default_value = "100000")]
    pub limit: usize,

    /// YAML file describing the tools to run (defaults to the built-in set).
    #[arg(long)]
    pub tools: Option<PathBuf>,

    /// Benchmark project directory.
    #[arg(short = 'p', long, default_value = ".")]
    pub project: PathBuf,

    /// Directory receiving result files.
    #[arg(short = 'o', long, default_value = ".")]
    pub results_dir: PathBuf,

    /// Directory for telemetry scratch files (defaults to the build output).
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,

    /// GNU time executable.
    #[arg(long, default_value = "time")]
    pub time_cmd: String,

    /// runlim executable.
    #[arg(long, default_value = "runlim")]
    pub runlim_cmd: String,

    /// Print per-tool summaries as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `symbench cases`.
#[derive(Parser, Debug)]
pub struct CasesArgs {
    /// Benchmark project directory.
    #[arg(short = 'p', long, default_value = ".")]
    pub project: PathBuf,

    /// Run the forge build before discovering.
    #[arg(long)]
    pub build: bool,

    /// solc version used when building.
    #[arg(long = "solcv", default_value = DEFAULT_SOLC_VERSION)]
    pub solc_version: String,
}

/// Arguments for `symbench graphs`.
#[derive(Parser, Debug)]
pub struct GraphsArgs {
    /// JSON result files to aggregate.
    #[arg(short = 'r', long = "results", num_args = 1.., default_value = "results-latest.json")]
    pub results: Vec<PathBuf>,

    /// Directory receiving the tables.
    #[arg(short = 'o', long, default_value = DEFAULT_GRAPHS_DIR)]
    pub output: PathBuf,

    /// Exclusive upper bound of the cumulative curves, in seconds.
    #[arg(long, default_value_t = DEFAULT_CURVE_HORIZON_SECS)]
    pub horizon: u64,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_bench_command(args, cli.verbose).await,
        Commands::Cases(args) => run_cases_command(args).await,
        Commands::Graphs(args) => run_graphs_command(args),
    }
}

impl RunArgs {
    fn to_config(&self, verbose: bool) -> anyhow::Result<BenchConfig> {
        let tools = match &self.tools {
            Some(path) => load_tools(path)?,
            None => default_tools(),
        };
        let mut config = BenchConfig::new(&self.project)
            .with_seed(self.seed)
            .with_solc_version(&self.solc_version)
            .with_timeout(self.timeout)
            .with_limit(self.limit)
            .with_results_dir(&self.results_dir)
            .with_limiter(LimiterConfig::new(&self.time_cmd, &self.runlim_cmd))
            .with_tools(tools)
            .with_verbose(verbose);
        if let Some(dir) = &self.scratch_dir {
            config = config.with_scratch_dir(dir);
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
struct RunOutput {
    timestamp: String,
    results_json: PathBuf,
    results_csv: PathBuf,
    runs: Vec<RunSummary>,
}

async fn run_bench_command(args: RunArgs, verbose: bool) -> anyhow::Result<()> {
    let config = args.to_config(verbose)?;

    create_pipeline(BuildSystem::Forge).build(&config).await?;
    let cases = CaseCatalog::new(&config).discover()?;
    info!("Cases gathered:");
    for case in &cases {
        info!("-> {}", case);
    }
    let cases = shuffle_cases(cases, config.seed);

    let runner = ResourceLimitedRunner::new(&config)?;
    let coordinator = RunCoordinator::new(&config, Box::new(runner));
    let batch = coordinator.run_matrix(&config.tools, &cases).await?;
    let written = ResultStore::new(&config).write_batch(&batch)?;

    let output = RunOutput {
        timestamp: batch.timestamp.clone(),
        results_json: written.json,
        results_csv: written.csv,
        runs: batch.runs.iter().map(|run| run.summary()).collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("\n=== Benchmark Results ({}) ===", output.timestamp);
        for s in &output.runs {
            println!(
                "  {} total={} safe={} unsafe={} unknown={} correct={} incorrect={} avg={:.2}s",
                s.run_id,
                s.total,
                s.safe,
                s.unsafe_,
                s.unknown,
                s.correct,
                s.incorrect,
                s.avg_solved_time_secs
            );
        }
        println!("Generated file {}", output.results_csv.display());
        println!("Generated file {}", output.results_json.display());
        println!("Copied to {LATEST_STEM}.json and {LATEST_STEM}.csv");
    }
    Ok(())
}

async fn run_cases_command(args: CasesArgs) -> anyhow::Result<()> {
    let config = BenchConfig::new(&args.project).with_solc_version(&args.solc_version);
    if args.build {
        create_pipeline(BuildSystem::Forge).build(&config).await?;
    }
    let cases = CaseCatalog::new(&config).discover()?;
    for case in &cases {
        println!("{}\t{}\t{}", case.name(), case.mode, case.expected);
    }
    Ok(())
}

fn run_graphs_command(args: GraphsArgs) -> anyhow::Result<()> {
    let config = BenchConfig::default().with_curve_horizon(args.horizon);
    let rows = ResultStore::load(&args.results)?;
    let aggregator = Aggregator::new(&config, rows)?;

    let written = write_tables(&args.output, &aggregator)?;
    println!("Solvers: {}", aggregator.solvers().join(", "));
    for path in &written {
        println!("Generated {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        // Verify CLI definition is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_command_defaults() {
        let cli = Cli::try_parse_from(["symbench", "run"]).expect("should parse");
        assert_eq!(cli.log_level, "info");
        assert!(!cli.verbose);

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.seed, 1);
                assert_eq!(args.solc_version, "0.8.19");
                assert_eq!(args.timeout, 25);
                assert_eq!(args.limit, 100_000);
                assert!(args.tools.is_none());
                assert_eq!(args.time_cmd, "time");
                assert_eq!(args.runlim_cmd, "runlim");
                assert!(args.scratch_dir.is_none());
                assert!(!args.json);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_command_with_options() {
        let cli = Cli::try_parse_from([
            "symbench", "-v", "run", "-s", "7", "--solcv", "0.8.21", "-t", "60", "--limit",
            "10", "--tools", "tools.yaml", "-p", "bench", "-j",
        ])
        .expect("should parse");
        assert!(cli.verbose);

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.seed, 7);
                assert_eq!(args.solc_version, "0.8.21");
                assert_eq!(args.timeout, 60);
                assert_eq!(args.limit, 10);
                assert_eq!(args.tools, Some(PathBuf::from("tools.yaml")));
                assert_eq!(args.project, PathBuf::from("bench"));
                assert!(args.json);

                let config = RunArgs {
                    tools: None,
                    ..args
                }
                .to_config(true)
                .unwrap();
                assert_eq!(config.timeout_secs, 60);
                assert_eq!(config.seed, 7);
                assert!(config.verbose);
                assert_eq!(config.tools.len(), 3);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_scratch_dir_option() {
        let cli = Cli::try_parse_from([
            "symbench",
            "run",
            "-p",
            "bench",
            "--scratch-dir",
            "/tmp/shard-2",
        ])
        .expect("should parse");
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.scratch_dir, Some(PathBuf::from("/tmp/shard-2")));
                let config = args.to_config(false).unwrap();
                assert_eq!(config.scratch_path(), PathBuf::from("/tmp/shard-2"));
                assert_eq!(config.build_path(), PathBuf::from("bench/out"));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_rejects_positional_arguments() {
        assert!(Cli::try_parse_from(["symbench", "run", "extra"]).is_err());
    }

    #[test]
    fn test_run_zero_timeout_is_rejected() {
        let cli = Cli::try_parse_from(["symbench", "run", "-t", "0"]).expect("should parse");
        match cli.command {
            Commands::Run(args) => assert!(args.to_config(false).is_err()),
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_graphs_command_defaults() {
        let cli = Cli::try_parse_from(["symbench", "graphs"]).expect("should parse");
        match cli.command {
            Commands::Graphs(args) => {
                assert_eq!(args.results, vec![PathBuf::from("results-latest.json")]);
                assert_eq!(args.output, PathBuf::from("graphs"));
                assert_eq!(args.horizon, 3600);
            }
            _ => panic!("Expected Graphs command"),
        }
    }

    #[test]
    fn test_graphs_accepts_multiple_result_files() {
        let cli = Cli::try_parse_from([
            "symbench",
            "graphs",
            "--results",
            "a.json",
            "b.json",
        ])
        .expect("should parse");
        match cli.command {
            Commands::Graphs(args) => assert_eq!(args.results.len(), 2),
            _ => panic!("Expected Graphs command"),
        }
    }

    #[test]
    fn test_bench_alias() {
        let cli = Cli::try_parse_from(["symbench", "bench", "--limit", "3"]).expect("should parse");
        match cli.command {
            Commands::Run(args) => assert_eq!(args.limit, 3),
            _ => panic!("Expected Run command"),
        }
    }
}
