//! Behavior tests for the analytics engines against hand-checked scenarios.

use time::macros::date;

use folio_analytics::{
    aggregate_weighted, align_by_intersection, align_portfolio_with_factors, annualized_return,
    compute_metrics, cumulative_return, efficient_frontier, price_series_to_returns,
    run_factor_regression, simulate, summarize, FrontierConfig, SimulationConfig,
    SimulationMethod,
};
use folio_core::{Holding, Portfolio, ValidationError};
use folio_tests::{closes_from_returns, factor_series, price_series, two_asset_portfolio};

fn aligned_pair(aapl: &[f64], msft: &[f64]) -> folio_analytics::AlignedReturns {
    let series = vec![
        price_series_to_returns(&price_series("AAPL", &closes_from_returns(aapl)))
            .expect("aapl returns"),
        price_series_to_returns(&price_series("MSFT", &closes_from_returns(msft)))
            .expect("msft returns"),
    ];
    align_by_intersection(&series).expect("aligned")
}

#[test]
fn weighted_aggregation_matches_hand_computation() {
    let aligned = aligned_pair(
        &[0.01, 0.02, -0.01, 0.005, 0.0],
        &[-0.005, 0.01, 0.02, -0.01, 0.015],
    );
    let returns = aggregate_weighted(&aligned, &two_asset_portfolio(), None).expect("aggregate");

    let aapl = aligned.returns_for("AAPL").expect("aapl");
    let msft = aligned.returns_for("MSFT").expect("msft");
    for (index, value) in returns.values().iter().enumerate() {
        let expected = 0.6 * aapl[index] + 0.4 * msft[index];
        assert!((value - expected).abs() < 1e-12);
    }
}

#[test]
fn a_ticker_without_a_weight_is_an_error_not_zero() {
    let aligned = aligned_pair(&[0.01, 0.02], &[0.01, 0.02]);
    let aapl_only = Portfolio::new(
        vec![Holding::new("AAPL", 1.0).expect("holding")],
        date!(2023 - 01 - 01),
        date!(2023 - 12 - 31),
        None,
    )
    .expect("portfolio");

    let error = aggregate_weighted(&aligned, &aapl_only, None).expect_err("missing weight");
    assert_eq!(
        error,
        ValidationError::MissingWeight {
            ticker: String::from("MSFT")
        }
    );
}

#[test]
fn cumulative_return_compounds_the_documented_example() {
    let value = cumulative_return(&[0.01, -0.02, 0.03]).expect("cumulative");
    assert!((value - (1.01 * 0.98 * 1.03 - 1.0)).abs() < 1e-12);
}

#[test]
fn cumulative_return_composes_over_concatenation() {
    let first = [0.01, -0.02, 0.005];
    let second = [0.03, -0.01];
    let whole: Vec<f64> = first.iter().chain(&second).copied().collect();

    let combined = cumulative_return(&whole).expect("whole");
    let chained = (1.0 + cumulative_return(&first).expect("first"))
        * (1.0 + cumulative_return(&second).expect("second"))
        - 1.0;
    assert!((combined - chained).abs() < 1e-12);
}

#[test]
fn metrics_refuse_empty_and_degenerate_inputs() {
    assert!(matches!(
        annualized_return(&[]).expect_err("empty"),
        ValidationError::NonPositiveYears { .. }
    ));
    assert!(matches!(
        compute_metrics(&[0.01], 0.0).expect_err("one observation"),
        ValidationError::TooFewObservations { .. }
    ));
    assert_eq!(
        compute_metrics(&[0.01, 0.01, 0.01], 0.0).expect_err("constant"),
        ValidationError::ZeroVolatility
    );
}

#[test]
fn full_metric_set_over_a_real_series_is_internally_consistent() {
    let returns: Vec<f64> = (0..252).map(|i| 0.0005 * ((i % 9) as f64 - 4.0)).collect();
    let metrics = compute_metrics(&returns, 0.0).expect("metrics");

    assert_eq!(metrics.observations, 252);
    assert!(metrics.max_drawdown <= 0.0);
    assert!(metrics.annualized_volatility > 0.0);
    // One year of data: annualized return equals cumulative return.
    assert!((metrics.annualized_return - metrics.cumulative_return).abs() < 1e-9);
}

#[test]
fn identical_seeds_reproduce_simulations_and_summaries_exactly() {
    let historical: Vec<f64> = (0..120).map(|i| 0.001 * ((i % 11) as f64 - 5.0)).collect();
    let config = SimulationConfig {
        paths: 50,
        horizon_days: 30,
        method: SimulationMethod::Normal,
        seed: Some(99),
    };

    let first = simulate(&historical, &config).expect("first run");
    let second = simulate(&historical, &config).expect("second run");
    assert_eq!(first.paths(), second.paths());
    assert_eq!(
        summarize(&first).expect("first summary"),
        summarize(&second).expect("second summary")
    );
}

#[test]
fn bootstrap_of_a_constant_positive_sample_never_loses() {
    let simulation = simulate(
        &vec![0.01; 100],
        &SimulationConfig {
            paths: 10,
            horizon_days: 5,
            method: SimulationMethod::Bootstrap,
            seed: Some(1),
        },
    )
    .expect("simulate");
    let summary = summarize(&simulation).expect("summary");

    assert_eq!(summary.probability_of_loss, 0.0);
    assert!((summary.terminal_percentiles.p5 - 0.05).abs() < 1e-12);
    assert!((summary.terminal_percentiles.p95 - 0.05).abs() < 1e-12);
}

#[test]
fn simulation_without_a_seed_is_refused() {
    let error = simulate(
        &[0.01, -0.01, 0.02],
        &SimulationConfig {
            paths: 10,
            horizon_days: 5,
            method: SimulationMethod::Bootstrap,
            seed: None,
        },
    )
    .expect_err("no seed");
    assert_eq!(error, ValidationError::MissingSeed);
}

#[test]
fn regression_over_aligned_factors_reports_drop_counts_and_fit() {
    // 90 portfolio days, 100 factor days, portfolio lags by 5 days.
    let returns: Vec<f64> = (0..90).map(|i| 0.001 * ((i % 7) as f64 - 3.0)).collect();
    let mut dates = folio_tests::trading_dates(95);
    dates.drain(0..5);
    let portfolio = folio_analytics::PortfolioReturnSeries::new(dates, returns, None)
        .expect("portfolio series");
    let factors = factor_series(100);

    let aligned = align_portfolio_with_factors(&portfolio, &factors).expect("aligned");
    assert_eq!(aligned.meta.common_days, 90);
    assert_eq!(aligned.meta.portfolio_days_dropped, 0);
    assert_eq!(aligned.meta.factor_days_dropped, 10);

    let results = run_factor_regression(&aligned).expect("regression");
    assert!(results.statistics.r_squared >= 0.0 && results.statistics.r_squared <= 1.0);
    assert!(results.statistics.alpha.p_value >= 0.0 && results.statistics.alpha.p_value <= 1.0);
    assert_eq!(results.observations, 90);
}

#[test]
fn frontier_points_dominate_nothing_below_minimum_variance() {
    let aligned = aligned_pair(
        &(0..120).map(|i| 0.0015 * ((i % 7) as f64 - 3.0) + 0.0008).collect::<Vec<f64>>(),
        &(0..120).map(|i| 0.0006 * ((i % 5) as f64 - 2.0) + 0.0003).collect::<Vec<f64>>(),
    );

    let frontier = efficient_frontier(
        &aligned,
        &FrontierConfig {
            points: 12,
            risk_free: 0.0,
        },
    )
    .expect("frontier");

    assert!(!frontier.points.is_empty());
    for point in &frontier.points {
        assert!((point.weights.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        assert!(point.weights.iter().all(|w| *w >= 0.0));
        assert!(point.volatility + 1e-6 >= frontier.min_variance.volatility);
    }
    for pair in frontier.points.windows(2) {
        assert!(pair[0].volatility <= pair[1].volatility + 1e-12);
    }
}
