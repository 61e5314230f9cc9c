pub mod analyzer;
pub mod metrics;
pub mod monte_carlo;
pub mod strategy;

pub use analyzer::{
    Advantage, BetReport, ChiSquareReport, FaceDistribution, FacePerformance, MetricComparison,
    ModeComparison, ProfitSeries, StatisticalAnalyzer, StreakReport, ZTestReport,
};
pub use metrics::{percentile, DistributionSummary, Histogram};
pub use monte_carlo::{
    BatchDistribution, BatchResult, BALANCE_CEILING, BatchStatistics, ConvergenceReport, MonteCarloSimulator,
    SimulationConfig, SimulationParameters, SimulationResult, SimulationSummary,
    TheoreticalSummary,
};
pub use strategy::{BetSizer, BetStrategy};
