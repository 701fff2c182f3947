// Execution Monitor - CLI
// Single entry point for execution-quality analytics over event snapshots

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use execution_monitor::{
    AnalyticsError, AnalyticsService, Config, InMemoryEventStore, SampleConfig, SampleGenerator, SeriesKind,
};

// Load command modules from cli directory
#[path = "../cli/analysis_commands.rs"]
mod analysis_commands;
#[path = "../cli/scenario_commands.rs"]
mod scenario_commands;

#[derive(Parser)]
#[command(name = "exec-monitor")]
#[command(version = "0.1.0")]
#[command(about = "Execution quality analytics for trading strategies", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "exec-monitor.toml")]
    config: String,

    /// Event snapshot (JSON) to analyse
    #[arg(short, long, global = true, default_value = "data/events.json")]
    events: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Generate a sample event snapshot
    Generate {
        /// Output path (defaults to --events)
        #[arg(short, long)]
        output: Option<String>,

        #[arg(long, default_value = "42")]
        seed: u64,

        /// Hours of history to generate
        #[arg(long, default_value = "24")]
        hours: i64,

        #[arg(long, default_value = "3")]
        strategies: usize,

        #[arg(long, default_value = "40")]
        orders_per_hour: usize,
    },

    /// Performance metrics for one strategy or the whole snapshot
    Metrics {
        /// Strategy id; omit for all events combined
        #[arg(short, long)]
        strategy: Option<String>,
    },

    /// Windowed metric series (fillRate, latency, volume, pnl)
    Timeseries {
        kind: SeriesKind,

        #[arg(short, long)]
        strategy: Option<String>,

        /// Window width in minutes
        #[arg(short, long)]
        window: Option<u32>,
    },

    /// Detect anomalies
    Anomalies {
        #[arg(short, long)]
        strategy: Option<String>,

        /// Write detected anomalies back into the snapshot
        #[arg(long)]
        save: bool,
    },

    /// Project a strategy under alternate constraints
    Simulate {
        strategy: String,

        #[command(flatten)]
        params: scenario_commands::ParameterArgs,
    },

    /// Simulate several parameter sets and compare them
    Compare {
        strategy: String,

        /// JSON file holding an array of parameter sets; built-in presets otherwise
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Metrics for every strategy
    Report,
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging(cli.verbose, "info");
            error!("❌ {}", AnalyticsError::from(e).user_message());
            std::process::exit(1);
        }
    };

    init_logging(cli.verbose, &config.logging.level);
    info!("🚀 Execution Monitor v0.1.0");

    if let Err(e) = run(cli, config) {
        error!("❌ [{}] {}", e.category(), e.user_message());
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: Cli, config: Config) -> Result<(), AnalyticsError> {
    match cli.command {
        Commands::Init { force } => init_config(&cli.config, force),

        Commands::Generate { output, seed, hours, strategies, orders_per_hour } => {
            let path = output.unwrap_or(cli.events);
            generate_snapshot(&path, seed, hours, strategies, orders_per_hour)
        }

        Commands::Metrics { strategy } => {
            let service = load_service(&cli.events, config)?;
            analysis_commands::show_metrics(&service, strategy.as_deref(), cli.json)
        }

        Commands::Timeseries { kind, strategy, window } => {
            let service = load_service(&cli.events, config)?;
            analysis_commands::show_time_series(&service, kind, strategy.as_deref(), window, cli.json)
        }

        Commands::Anomalies { strategy, save } => {
            let mut service = load_service(&cli.events, config)?;
            analysis_commands::show_anomalies(&mut service, strategy.as_deref(), cli.json)?;
            if save {
                service.store().save_json(&cli.events)?;
                info!("💾 Anomalies saved to {}", cli.events);
            }
            Ok(())
        }

        Commands::Simulate { strategy, params } => {
            let service = load_service(&cli.events, config)?;
            scenario_commands::run_simulation(&service, &strategy, params.into(), cli.json)
        }

        Commands::Compare { strategy, file } => {
            let service = load_service(&cli.events, config)?;
            scenario_commands::run_comparison(&service, &strategy, file.as_deref(), cli.json)
        }

        Commands::Report => {
            let service = load_service(&cli.events, config)?;
            analysis_commands::show_report(&service, cli.json)
        }
    }
}

fn load_service(path: &str, config: Config) -> Result<AnalyticsService<InMemoryEventStore>, AnalyticsError> {
    let spinner = execution_monitor::progress::Spinner::new(&format!("Loading {}...", path));
    match InMemoryEventStore::load_json(path) {
        Ok(store) => {
            spinner.finish(&format!("Loaded {}", path));
            Ok(AnalyticsService::new(store, config))
        }
        Err(e) => {
            spinner.finish_with_error(&format!("Could not load {}", path));
            Err(e)
        }
    }
}

fn init_config(path: &str, force: bool) -> Result<(), AnalyticsError> {
    if std::path::Path::new(path).exists() && !force {
        warn!("⚠️  {} already exists, skipping (use --force to overwrite)", path);
        return Ok(());
    }
    Config::default().to_file(path)?;
    info!("📝 Created {}", path);
    Ok(())
}

fn generate_snapshot(
    path: &str,
    seed: u64,
    hours: i64,
    strategies: usize,
    orders_per_hour: usize,
) -> Result<(), AnalyticsError> {
    let config = SampleConfig { seed, hours, strategies, orders_per_hour, ..SampleConfig::default() };
    let snapshot = SampleGenerator::new(config).generate();

    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AnalyticsError::FileWrite(format!("{}: {}", parent.display(), e)))?;
        }
    }

    info!(
        "📦 Generated {} fills, {} cancels, {} rejects, {} latency samples",
        snapshot.fills.len(),
        snapshot.cancels.len(),
        snapshot.rejects.len(),
        snapshot.latency_samples.len()
    );
    InMemoryEventStore::from_snapshot(snapshot).save_json(path)?;
    info!("✅ Snapshot written to {}", path);
    Ok(())
}
