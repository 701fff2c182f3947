// Execution Monitor Library
//
// Execution-quality analytics for algorithmic trading strategies: windowed
// metrics, anomaly detection and what-if scenario projection

pub mod events;
pub mod analytics;
pub mod anomaly;
pub mod simulation;
pub mod api;
pub mod config;
pub mod error;       // Unified error handling
pub mod progress;

// Re-export the event model
pub use events::{
    Cancel, EventSnapshot, EventStore, ExecutionEvents, Fill, InMemoryEventStore, LatencyMetricType,
    LatencySample, Reject, SampleConfig, SampleGenerator, Side, Strategy, StrategyStatus,
};

// Re-export analytics types
pub use analytics::{
    LatencyProfile, PerformanceAnalyzer, PerformanceMetrics, SeriesKind, StrategyMetrics, TimeSeriesPoint,
};

// Re-export anomaly detection
pub use anomaly::{Anomaly, AnomalyDetector, AnomalyThresholds, AnomalyType, DetectorSettings, Severity};

// Re-export simulation
pub use simulation::{
    ScenarioComparison, ScenarioDiff, SeededFillGenerator, SimulationParameters, SyntheticFillConfig,
    SyntheticFillSource, WhatIfScenario, WhatIfSimulator,
};

// Re-export the core-exposed interface
pub use api::{
    compare_scenarios, compute_performance_metrics, compute_strategy_metrics, compute_time_series,
    detect_anomalies, simulate_scenario, AnalyticsService,
};

// Re-export configuration and errors
pub use config::{Config, ConfigError};
pub use error::{AnalyticsError, AnalyticsResult};
