mod common;

use circuit_prioritizer::engine::{NettingContext, WorkerPool, run_batch};
use circuit_prioritizer::error::EngineError;
use circuit_prioritizer::model::{
    CircuitGroup, CircuitGroupPool, GroupDeclaration, Parcel, PeakHour, Profile, ProfileStore,
    SupplyProfile,
};

#[test]
fn scenario_a_single_parcel_spikes() {
    let ds = common::scenario_a();
    let ctx = NettingContext::new(&ds.supply, &ds.profiles, PeakHour::Export)
        .expect("profile lengths match");
    let outcome = run_batch(&ds.pool, &ctx, &WorkerPool::new(2)).expect("batch succeeds");

    assert_eq!(outcome.results.len(), 1);
    let r = &outcome.results[0];
    assert_eq!(r.id, "1");
    assert_eq!(r.hourly_net_supply.len(), common::HOURS);
    assert_eq!(r.hourly_net_supply[0], 1000.0);
    assert_eq!(r.hourly_net_supply[1], -2000.0);
    assert!(r.hourly_net_supply[2..].iter().all(|v| *v == 0.0));
    assert!((r.annual_net_supply - -1.0).abs() < 1e-12);
    assert!((r.max_hourly_net_supply - 1.0).abs() < 1e-12);
}

#[test]
fn scenario_b_empty_group_completes() {
    let supply = SupplyProfile::new(common::spike(0, 24));
    let profiles = ProfileStore::from_profiles([Profile::new("residential", common::spike(1, 24))])
        .expect("profiles");
    let pool = CircuitGroupPool::build(vec![GroupDeclaration::new("empty", 0)], vec![], &profiles)
        .expect("pool");
    let ctx = NettingContext::new(&supply, &profiles, PeakHour::Export)
        .expect("profile lengths match");

    let outcome = run_batch(&pool, &ctx, &WorkerPool::new(4)).expect("batch succeeds");
    let r = &outcome.results[0];
    assert_eq!(r.parcel_count, 0);
    assert_eq!(r.annual_net_supply, 0.0);
    assert_eq!(r.max_hourly_net_supply, 0.0);
    assert_eq!(r.hourly_net_supply, vec![0.0; 24]);
}

#[test]
fn import_peak_reports_most_adverse_hour() {
    let ds = common::scenario_a();
    let ctx = NettingContext::new(&ds.supply, &ds.profiles, PeakHour::Import)
        .expect("profile lengths match");
    let outcome = run_batch(&ds.pool, &ctx, &WorkerPool::new(1)).expect("batch succeeds");
    assert!((outcome.results[0].max_hourly_net_supply - -2.0).abs() < 1e-12);
}

#[test]
fn results_independent_of_worker_count() {
    let ds = common::synthetic_dataset(11);
    let ctx = NettingContext::new(&ds.supply, &ds.profiles, PeakHour::Export)
        .expect("profile lengths match");

    let single = run_batch(&ds.pool, &ctx, &WorkerPool::new(1)).expect("single worker");
    let many = run_batch(&ds.pool, &ctx, &WorkerPool::new(8)).expect("eight workers");

    assert_eq!(single.results.len(), ds.pool.len());
    assert_eq!(single.results, many.results);
    assert_eq!(many.report.completed(), ds.pool.len());
    for (i, r) in many.results.iter().enumerate() {
        assert_eq!(r.index, i, "results must be in pool order");
    }
}

#[test]
fn annual_matches_hourly_sum_and_peak_matches_max() {
    let ds = common::synthetic_dataset(3);
    let ctx = NettingContext::new(&ds.supply, &ds.profiles, PeakHour::Export)
        .expect("profile lengths match");
    let outcome = run_batch(&ds.pool, &ctx, &WorkerPool::new(4)).expect("batch succeeds");

    for r in &outcome.results {
        let hourly_sum: f64 = r.hourly_net_supply.iter().sum();
        let expected = hourly_sum / 1000.0;
        let tol = 1e-6 * expected.abs().max(1.0);
        assert!(
            (r.annual_net_supply - expected).abs() <= tol,
            "group {}: annual {} vs hourly sum {}",
            r.id,
            r.annual_net_supply,
            expected
        );

        let peak = r
            .hourly_net_supply
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let peak = if r.hourly_net_supply.is_empty() { 0.0 } else { peak };
        assert!((r.max_hourly_net_supply - peak / 1000.0).abs() <= 1e-12);
    }
}

#[test]
fn scrubbed_parcel_contributes_nothing() {
    let supply = SupplyProfile::new(vec![0.5, 0.5]);
    let profiles =
        ProfileStore::from_profiles([Profile::new("residential", vec![0.25, 0.75])]).expect("profiles");
    let ctx = NettingContext::new(&supply, &profiles, PeakHour::Export)
        .expect("profile lengths match");

    let (s, d) = circuit_prioritizer::model::ScrubPolicy::ClampNegative.apply(900.0, 0.0);
    let alone = CircuitGroup::new("g", vec![Parcel::new("a", "residential", "g", 100.0, 400.0)]);
    let with_scrubbed = CircuitGroup::new(
        "g",
        vec![
            Parcel::new("a", "residential", "g", 100.0, 400.0),
            Parcel::new("b", "residential", "g", s, d),
        ],
    );

    let a = ctx.net_supply(0, &alone).expect("alone");
    let b = ctx.net_supply(0, &with_scrubbed).expect("with scrubbed");
    assert_eq!(a.hourly_net_supply, b.hourly_net_supply);
    assert_eq!(a.annual_net_supply, b.annual_net_supply);
}

#[test]
fn missing_profile_aborts_batch() {
    let supply = SupplyProfile::new(vec![1.0]);
    let known = ProfileStore::from_profiles([Profile::new("residential", vec![1.0])]).expect("known");
    let pool = CircuitGroupPool::build(
        vec![GroupDeclaration::new("1", 1), GroupDeclaration::new("2", 1)],
        vec![
            Parcel::new("a", "residential", "1", 1.0, 1.0),
            Parcel::new("b", "residential", "2", 1.0, 1.0),
        ],
        &known,
    )
    .expect("pool");

    // Same pool, netted against a store that lacks the usetype.
    let empty = ProfileStore::default();
    let ctx = NettingContext::new(&supply, &empty, PeakHour::Export)
        .expect("profile lengths match");
    let err = run_batch(&pool, &ctx, &WorkerPool::new(2));
    assert!(matches!(err, Err(EngineError::MissingProfile(ref u)) if u == "residential"));
}
