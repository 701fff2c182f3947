// Analysis command handlers: metrics, series, anomalies, report

use execution_monitor::progress::ReportProgress;
use execution_monitor::{
    AnalyticsError, AnalyticsService, EventStore, InMemoryEventStore, SeriesKind, StrategyMetrics,
};

type Service = AnalyticsService<InMemoryEventStore>;

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AnalyticsError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn show_metrics(service: &Service, strategy: Option<&str>, json: bool) -> Result<(), AnalyticsError> {
    match strategy {
        Some(id) => {
            let metrics = service.strategy_metrics(id)?;
            if json {
                return print_json(&metrics);
            }
            print_strategy_metrics(&metrics);
        }
        None => {
            let metrics = service.performance_metrics(None)?;
            if json {
                return print_json(&metrics);
            }
            let orders = service.store().get_events(None).total_orders();
            println!("📊 All strategies ({} orders)", orders);
            println!("   Fill / cancel / reject: {:.1}% / {:.1}% / {:.1}%",
                metrics.fill_rate * 100.0, metrics.cancel_rate * 100.0, metrics.reject_rate * 100.0);
            println!("   Latency avg {:.1}ms  p50 {:.1}  p95 {:.1}  p99 {:.1}",
                metrics.avg_latency, metrics.p50_latency, metrics.p95_latency, metrics.p99_latency);
            println!("   Volume {:.0}  P&L {:.2}  Sharpe {:.3}  Max DD {:.2}%",
                metrics.total_volume, metrics.total_pnl, metrics.sharpe_ratio, metrics.max_drawdown * 100.0);
        }
    }
    Ok(())
}

pub fn print_strategy_metrics(metrics: &StrategyMetrics) {
    println!("📊 Strategy {} ({})", metrics.strategy_id, metrics.date);
    println!("   Orders: {} fills, {} cancels, {} rejects",
        metrics.total_fills, metrics.total_cancels, metrics.total_rejects);
    println!("   Fill / cancel / reject: {:.1}% / {:.1}% / {:.1}%",
        metrics.fill_rate * 100.0, metrics.cancel_rate * 100.0, metrics.reject_rate * 100.0);
    println!("   Latency avg {:.1}ms  p50 {:.1}  p95 {:.1}  p99 {:.1}",
        metrics.avg_latency_ms, metrics.p50_latency_ms, metrics.p95_latency_ms, metrics.p99_latency_ms);
    println!("   Volume {:.0}  P&L {:.2}  Sharpe {:.3}  Max DD {:.2}%",
        metrics.total_volume, metrics.total_pnl, metrics.sharpe_ratio, metrics.max_drawdown * 100.0);
}

pub fn show_time_series(
    service: &Service,
    kind: SeriesKind,
    strategy: Option<&str>,
    window: Option<u32>,
    json: bool,
) -> Result<(), AnalyticsError> {
    let series = service.time_series(strategy, kind, window)?;
    if json {
        return print_json(&series);
    }

    println!("📈 {} ({} windows)", kind, series.len());
    for point in &series {
        println!("   {}  {:>12.4}", point.timestamp.format("%Y-%m-%d %H:%M"), point.value);
    }
    Ok(())
}

pub fn show_anomalies(service: &mut Service, strategy: Option<&str>, json: bool) -> Result<(), AnalyticsError> {
    let anomalies = service.detect_and_record(strategy)?;
    if json {
        return print_json(&anomalies);
    }

    if anomalies.is_empty() {
        println!("✅ No anomalies detected");
        return Ok(());
    }

    println!("🚨 {} anomalies", anomalies.len());
    for anomaly in &anomalies {
        println!(
            "   {}  {:<8} {:<4} {:<16} {}",
            anomaly.timestamp.format("%Y-%m-%d %H:%M:%S"),
            anomaly.severity,
            anomaly.strategy_id,
            anomaly.anomaly_type,
            anomaly.description
        );
    }
    Ok(())
}

pub fn show_report(service: &Service, json: bool) -> Result<(), AnalyticsError> {
    let ids = service.strategy_ids();
    let progress = ReportProgress::new(ids.len());
    let report = service.all_strategy_metrics(|m| progress.strategy_done(&m.strategy_id, m.total_pnl));
    progress.finish(report.len());

    if json {
        return print_json(&report);
    }

    println!("{:<6} {:>7} {:>8} {:>8} {:>10} {:>12} {:>8}", "ID", "Orders", "Fill %", "p99 ms", "Volume", "P&L", "Sharpe");
    for m in &report {
        println!(
            "{:<6} {:>7} {:>8.1} {:>8.1} {:>10.0} {:>12.2} {:>8.3}",
            m.strategy_id,
            m.total_orders(),
            m.fill_rate * 100.0,
            m.p99_latency_ms,
            m.total_volume,
            m.total_pnl,
            m.sharpe_ratio
        );
    }
    Ok(())
}
