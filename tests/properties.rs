//! Property tests over randomly generated horizons and constraints.

mod common;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use dispatch_engine::config::EngineConfig;
use dispatch_engine::evaluate::evaluate;
use dispatch_engine::model::{ConstraintParams, Constraints, TimeSeries};
use dispatch_engine::solver::StrategyKind;
use dispatch_engine::validate::{VALIDATION_EPSILON, validate};

fn series_strategy() -> impl Strategy<Value = TimeSeries> {
    (1usize..48).prop_flat_map(|n| {
        (
            prop::collection::vec(-0.2f64..0.8, n),
            prop::collection::vec(0.0f64..6.0, n),
            prop::collection::vec(0.0f64..6.0, n),
        )
            .prop_map(|(p, g, l)| TimeSeries::new(p, g, l).unwrap())
    })
}

fn constraints_strategy() -> impl Strategy<Value = Constraints> {
    (
        0.0f64..5.0,
        0.0f64..5.0,
        0.0f64..0.45,
        0.55f64..=1.0,
        0.5f64..=1.0,
        0.5f64..=1.0,
        prop::option::of(0.0f64..4.0),
        0.5f64..20.0,
        0.0f64..=1.0,
    )
        .prop_map(|(ch, dis, lo, hi, ec, ed, cap, capacity, soc0)| {
            Constraints::new(ConstraintParams {
                max_charge_power: ch,
                max_discharge_power: dis,
                soc_min: lo,
                soc_max: hi,
                charge_efficiency: ec,
                discharge_efficiency: ed,
                export_cap: cap,
                capacity,
                initial_soc: soc0,
            })
            .unwrap()
        })
}

fn kind_strategy() -> impl Strategy<Value = StrategyKind> {
    prop::sample::select(StrategyKind::ALL.to_vec())
}

proptest! {
    #[test]
    fn every_strategy_respects_limits(
        series in series_strategy(),
        constraints in constraints_strategy(),
        kind in kind_strategy(),
        seed in any::<u64>(),
    ) {
        let solver = kind.build(&EngineConfig::default());
        let out = solver.solve(&series, &constraints, &mut StdRng::seed_from_u64(seed));

        prop_assert_eq!(out.schedule.len(), series.len());
        for step in &out.schedule {
            prop_assert!(step.state_of_charge >= constraints.soc_min() - VALIDATION_EPSILON);
            prop_assert!(step.state_of_charge <= constraints.soc_max() + VALIDATION_EPSILON);
            prop_assert!(!(step.charge_power > 0.0 && step.discharge_power > 0.0));
            prop_assert!(step.charge_power >= 0.0 && step.discharge_power >= 0.0);
            prop_assert!(step.grid_import >= 0.0 && step.grid_export >= 0.0);
        }
        let report = validate(&out.schedule, &constraints);
        prop_assert!(report.satisfied, "{:?}", report.first_violation());
    }

    #[test]
    fn every_strategy_conserves_energy(
        series in series_strategy(),
        constraints in constraints_strategy(),
        kind in kind_strategy(),
        seed in any::<u64>(),
    ) {
        let solver = kind.build(&EngineConfig::default());
        let out = solver.solve(&series, &constraints, &mut StdRng::seed_from_u64(seed));
        let eval = evaluate(&out.schedule, &series);
        prop_assert!(eval.energy_balance.iter().all(|r| r.balanced));
    }

    #[test]
    fn same_seed_same_result(
        series in series_strategy(),
        constraints in constraints_strategy(),
        kind in kind_strategy(),
        seed in any::<u64>(),
    ) {
        let solver = kind.build(&EngineConfig::default());
        let a = solver.solve(&series, &constraints, &mut StdRng::seed_from_u64(seed));
        let b = solver.solve(&series, &constraints, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn deterministic_ignores_the_seed(
        series in series_strategy(),
        constraints in constraints_strategy(),
        s1 in any::<u64>(),
        s2 in any::<u64>(),
    ) {
        let solver = StrategyKind::Deterministic.build(&EngineConfig::default());
        let a = solver.solve(&series, &constraints, &mut StdRng::seed_from_u64(s1));
        let b = solver.solve(&series, &constraints, &mut StdRng::seed_from_u64(s2));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn validate_and_evaluate_are_idempotent(
        series in series_strategy(),
        constraints in constraints_strategy(),
        kind in kind_strategy(),
        seed in any::<u64>(),
    ) {
        let solver = kind.build(&EngineConfig::default());
        let out = solver.solve(&series, &constraints, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(
            validate(&out.schedule, &constraints),
            validate(&out.schedule, &constraints)
        );
        prop_assert_eq!(evaluate(&out.schedule, &series), evaluate(&out.schedule, &series));
    }
}

#[test]
fn fixtures_are_valid() {
    assert_eq!(common::spike_series().len(), 2);
    assert_eq!(common::mixed_series().len(), 12);
}
