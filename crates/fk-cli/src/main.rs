//! fidkin CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fk_analysis::{
    Analysis, AnalysisConfig, RunInfo, Runner, correct_eft_weights, run_parallel,
};
use fk_core::Event;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fidkin")]
#[command(about = "fidkin - fiducial kinematics and observable binning")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analysis over an event file and write the finalized outputs
    Run {
        /// Events: a JSON array or whitespace-separated JSON records
        #[arg(short, long)]
        events: PathBuf,

        /// Analysis name (see `fidkin list`)
        #[arg(short, long)]
        analysis: String,

        /// Analysis config (JSON, tagged with "analysis"); overrides `--analysis` defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Cross section for the normalization. Omit to scale by 1/N.
        #[arg(long)]
        cross_section: Option<f64>,

        /// Threads (0 = auto). Use 1 for the sequential path.
        #[arg(long, default_value = "1")]
        threads: usize,

        /// Use `weights[i]` as the event weight.
        #[arg(long)]
        weight_index: Option<usize>,

        /// Convert EFT reweighting points into coefficients before picking the weight.
        #[arg(long)]
        correct_eft_weights: bool,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the available analyses
    List,

    /// Print the default configuration of an analysis
    Defaults {
        /// Analysis name
        analysis: String,
    },

    /// Print version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    match cli.command {
        Commands::Run {
            events,
            analysis,
            config,
            cross_section,
            threads,
            weight_index,
            correct_eft_weights,
            output,
        } => cmd_run(&RunArgs {
            events: &events,
            analysis: &analysis,
            config: config.as_deref(),
            cross_section,
            threads,
            weight_index,
            correct_eft_weights,
            output: output.as_deref(),
        }),
        Commands::List => {
            for name in AnalysisConfig::names() {
                println!("{name}");
            }
            Ok(())
        }
        Commands::Defaults { analysis } => {
            let cfg = AnalysisConfig::default_for(&analysis)?;
            write_json(None, serde_json::to_value(&cfg)?)
        }
        Commands::Version => {
            println!("fidkin {}", fk_core::VERSION);
            Ok(())
        }
    }
}

struct RunArgs<'a> {
    events: &'a Path,
    analysis: &'a str,
    config: Option<&'a Path>,
    cross_section: Option<f64>,
    threads: usize,
    weight_index: Option<usize>,
    correct_eft_weights: bool,
    output: Option<&'a Path>,
}

fn cmd_run(args: &RunArgs<'_>) -> Result<()> {
    let config = load_config(args.analysis, args.config)?;
    let prototype = config.build()?;

    let mut events = load_events(args.events)?;
    if args.correct_eft_weights || args.weight_index.is_some() {
        events = select_weights(events, args.correct_eft_weights, args.weight_index)?;
    }

    let info = match args.cross_section {
        Some(xs) => RunInfo { cross_section: xs },
        None => RunInfo::UNKNOWN,
    };

    let mut runner = if args.threads == 1 {
        let mut runner = Runner::new(prototype);
        for ev in &events {
            runner.process(ev);
        }
        runner
    } else {
        if args.threads > 0 {
            configure_threads(args.threads);
        }
        run_parallel(&prototype, &events)?
    };

    let summary = runner.finalize(&info);
    let cut_flow = runner.cut_flow();
    tracing::info!(
        analysis = runner.analysis().name(),
        events = summary.n_events,
        accepted = cut_flow.accepted,
        sum_of_weights = summary.sum_of_weights,
        "run finished"
    );

    let output_json = serde_json::json!({
        "analysis": runner.analysis().name(),
        "cross_section": summary.cross_section,
        "n_events": summary.n_events,
        "sum_of_weights": summary.sum_of_weights,
        "scale": summary.cross_section_scale(),
        "cut_flow": cut_flow,
        "outputs": runner.analysis().outputs(),
    });
    write_json(args.output, output_json)
}

/// Install the global rayon pool. Returns `false` (and warns) if one already exists.
fn configure_threads(threads: usize) -> bool {
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(threads, error = %e, "keeping the existing thread pool");
            false
        }
    }
}

fn load_config(analysis: &str, path: Option<&Path>) -> Result<AnalysisConfig> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default_for(analysis)?);
    };
    tracing::info!(path = %path.display(), "loading analysis config");
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: AnalysisConfig = serde_json::from_str(&json)?;
    if config.name() != analysis {
        anyhow::bail!("config is for '{}' but --analysis is '{analysis}'", config.name());
    }
    Ok(config)
}

fn load_events(path: &Path) -> Result<Vec<Event>> {
    tracing::info!(path = %path.display(), "loading events");
    let events = fk_core::read_events(path)
        .with_context(|| format!("reading events {}", path.display()))?;
    tracing::info!(events = events.len(), "events loaded");
    Ok(events)
}

fn select_weights(events: Vec<Event>, correct: bool, index: Option<usize>) -> Result<Vec<Event>> {
    events
        .into_iter()
        .enumerate()
        .map(|(i, mut ev)| {
            if correct {
                correct_eft_weights(&mut ev.weights).with_context(|| format!("event {i}"))?;
            }
            match index {
                Some(k) => ev.with_weight_index(k).with_context(|| {
                    format!("event {i} has {} weights, no index {k}", ev.weights.len())
                }),
                None => Ok(ev),
            }
        })
        .collect()
}

fn write_json(output: Option<&Path>, value: serde_json::Value) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&value)?)?;
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
