// What-if command handlers: single simulation and scenario comparison

use clap::Args;
use tracing::info;

use execution_monitor::{AnalyticsError, AnalyticsService, InMemoryEventStore, SimulationParameters, WhatIfScenario};

type Service = AnalyticsService<InMemoryEventStore>;

#[derive(Args, Debug, Default)]
pub struct ParameterArgs {
    /// Cap on the absolute net position (buys add, sells subtract)
    #[arg(long)]
    pub max_position: Option<f64>,

    /// Fills slower than this become timeout cancels
    #[arg(long)]
    pub timeout_ms: Option<f64>,

    /// Target fill rate (0-1), met with synthetic fills
    #[arg(long)]
    pub min_fill_rate: Option<f64>,

    /// Fills slower than this become high-latency cancels
    #[arg(long)]
    pub max_latency_ms: Option<f64>,

    /// Scales projected P&L and volume
    #[arg(long)]
    pub risk_multiplier: Option<f64>,
}

impl From<ParameterArgs> for SimulationParameters {
    fn from(args: ParameterArgs) -> Self {
        SimulationParameters {
            max_position_size: args.max_position,
            order_timeout_ms: args.timeout_ms,
            min_fill_rate: args.min_fill_rate,
            max_latency_ms: args.max_latency_ms,
            risk_multiplier: args.risk_multiplier,
        }
    }
}

/// Baseline plus one variant per constraint
fn preset_scenarios() -> Vec<SimulationParameters> {
    vec![
        SimulationParameters::default(),
        SimulationParameters { max_position_size: Some(1000.0), ..Default::default() },
        SimulationParameters { order_timeout_ms: Some(100.0), ..Default::default() },
        SimulationParameters { min_fill_rate: Some(0.9), ..Default::default() },
        SimulationParameters { max_latency_ms: Some(50.0), ..Default::default() },
        SimulationParameters { risk_multiplier: Some(1.5), ..Default::default() },
    ]
}

fn load_scenarios(path: &str) -> Result<Vec<SimulationParameters>, AnalyticsError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AnalyticsError::FileNotFound(path.to_string()),
        _ => AnalyticsError::FileRead(format!("{}: {}", path, e)),
    })?;
    Ok(serde_json::from_str(&content)?)
}

fn print_scenario(scenario: &WhatIfScenario) {
    let m = &scenario.projected_metrics;
    println!("🔮 {} [{}]", scenario.name, scenario.strategy_id);
    println!("   Orders: {} fills, {} cancels, {} rejects", m.total_fills, m.total_cancels, m.total_rejects);
    println!("   Fill rate {:.1}%  avg latency {:.1}ms  p99 {:.1}ms",
        m.fill_rate * 100.0, m.avg_latency_ms, m.p99_latency_ms);
    println!("   Volume {:.0}  P&L {:.2}  Sharpe {:.3}  Max DD {:.2}%",
        m.total_volume, m.total_pnl, m.sharpe_ratio, m.max_drawdown * 100.0);
}

pub fn run_simulation(
    service: &Service,
    strategy_id: &str,
    params: SimulationParameters,
    json: bool,
) -> Result<(), AnalyticsError> {
    let scenario = service.simulate(strategy_id, &params)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&scenario)?);
    } else {
        print_scenario(&scenario);
    }
    Ok(())
}

pub fn run_comparison(
    service: &Service,
    strategy_id: &str,
    file: Option<&str>,
    json: bool,
) -> Result<(), AnalyticsError> {
    let parameter_sets = match file {
        Some(path) => load_scenarios(path)?,
        None => preset_scenarios(),
    };
    info!("Comparing {} scenarios for {}", parameter_sets.len(), strategy_id);

    let (scenarios, comparison) = service.compare(strategy_id, &parameter_sets)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    for scenario in &scenarios {
        print_scenario(scenario);
    }

    println!();
    println!("{:<60} {:>12} {:>10} {:>12}", "Scenario", "ΔP&L", "ΔFill %", "ΔLatency ms");
    for diff in &comparison.comparison {
        println!(
            "{:<60} {:>12.2} {:>10.2} {:>12.2}",
            diff.name,
            diff.pnl_diff,
            diff.fill_rate_diff * 100.0,
            diff.latency_diff
        );
    }
    println!();
    println!("🏆 Best:  {} (P&L {:.2})", comparison.best.name, comparison.best.projected_metrics.total_pnl);
    println!("📉 Worst: {} (P&L {:.2})", comparison.worst.name, comparison.worst.projected_metrics.total_pnl);
    Ok(())
}
