//! Deterministic portfolio analytics over aligned daily return series.
//!
//! Modules are pure functions of their inputs: no I/O, no clocks, and no
//! randomness beyond an explicitly seeded generator. Preconditions fail fast
//! with named errors rather than degrading into defaults.

pub mod factors;
pub mod frontier;
pub mod metrics;
pub mod monte_carlo;
pub mod portfolio;
pub mod regression;
pub mod returns;
pub mod summary;

pub use factors::{
    align_portfolio_with_factors, AlignedFactorData, AlignedFactorMatrix, FactorAlignmentMeta,
};
pub use frontier::{efficient_frontier, EfficientFrontier, FrontierConfig, FrontierPoint};
pub use metrics::{
    annualized_return, annualized_volatility, compute_metrics, cumulative_return, max_drawdown,
    sharpe_ratio, PerformanceMetrics, TRADING_DAYS_PER_YEAR,
};
pub use monte_carlo::{
    simulate, MonteCarloSimulation, SimulationConfig, SimulationMeta, SimulationMethod,
};
pub use portfolio::{aggregate_weighted, PortfolioReturnSeries};
pub use regression::{
    run_factor_regression, run_factor_regression_with_min, CoefficientStats,
    FactorLoadings, FactorRegressionResults, RegressionStatistics, MIN_OBSERVATIONS,
};
pub use returns::{
    align_by_intersection, price_series_to_returns, AlignedReturns, ReturnBar, ReturnSeries,
};
pub use summary::{
    percentile, summarize, DrawdownDistribution, MonteCarloSummary, PathExtremes, Percentiles,
    DISCLAIMER,
};
