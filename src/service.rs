//! Request orchestration: select a strategy, solve, validate, evaluate.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::DispatchError;
use crate::evaluate::{DispatchSummary, EnergyBalanceRecord, evaluate};
use crate::model::{ConstraintParams, Constraints, DispatchSchedule, TimeSeries};
use crate::solver::{Solver, StrategyKind, StrategyMetadata};
use crate::validate::{Violation, validate};

/// A dispatch request as received on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DispatchRequest {
    /// Price per energy unit at each step.
    pub prices: Vec<f64>,
    /// On-site generation at each step.
    #[serde(alias = "pv")]
    pub generation: Vec<f64>,
    /// Site load at each step.
    pub load: Vec<f64>,
    pub constraints: ConstraintParams,
    /// Strategy name; see [`StrategyKind`].
    pub strategy: String,
    /// Seed for the stochastic strategies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl DispatchRequest {
    /// Parses a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidInput`] for malformed JSON, missing
    /// fields, or unknown fields.
    pub fn from_json(body: &str) -> Result<Self, DispatchError> {
        serde_json::from_str(body)
            .map_err(|e| DispatchError::invalid("request", e.to_string()))
    }

    /// Builds the validated horizon.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidInput`] on misaligned or out-of-range series.
    pub fn series(&self) -> Result<TimeSeries, DispatchError> {
        TimeSeries::new(self.prices.clone(), self.generation.clone(), self.load.clone())
    }

    /// Builds the validated constraints.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidInput`] naming the offending constraint.
    pub fn constraints(&self) -> Result<Constraints, DispatchError> {
        Constraints::new(self.constraints.clone())
    }
}

/// Non-fatal finding attached to a successful response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Warning {
    /// The validator found a breached limit.
    ConstraintViolation { step: usize, field: String, message: String },
    /// A step's supply and demand differ by more than the tolerance.
    EnergyImbalance { step: usize, residual: f64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstraintViolation { message, .. } => {
                write!(f, "constraint violation: {message}")
            }
            Self::EnergyImbalance { step, residual } => {
                write!(f, "energy imbalance at step {step}: residual {residual:.6}")
            }
        }
    }
}

impl From<&Violation> for Warning {
    fn from(v: &Violation) -> Self {
        Self::ConstraintViolation {
            step: v.step,
            field: v.field.as_str().to_string(),
            message: v.to_string(),
        }
    }
}

impl From<&EnergyBalanceRecord> for Warning {
    fn from(r: &EnergyBalanceRecord) -> Self {
        Self::EnergyImbalance {
            step: r.t,
            residual: r.residual,
        }
    }
}

/// Result of one dispatch request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    pub schedule: DispatchSchedule,
    /// Net grid cost of `schedule`.
    pub objective_value: f64,
    pub constraints_satisfied: bool,
    pub energy_balance: Vec<EnergyBalanceRecord>,
    pub strategy_metadata: StrategyMetadata,
    pub violations: Vec<Violation>,
    pub warnings: Vec<Warning>,
    pub summary: DispatchSummary,
}

/// Lifecycle of one request.
///
/// `Received -> Solving -> Validating -> Evaluating -> Completed`, or
/// `Received -> Failed` when inputs are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunPhase {
    Received,
    Solving,
    Validating,
    Evaluating,
    Completed,
    Failed,
}

impl RunPhase {
    /// The phase that follows on success, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Received => Some(Self::Solving),
            Self::Solving => Some(Self::Validating),
            Self::Validating => Some(Self::Evaluating),
            Self::Evaluating => Some(Self::Completed),
            Self::Completed | Self::Failed => None,
        }
    }

    /// Whether `self -> to` is a legal transition.
    pub fn can_transition_to(self, to: Self) -> bool {
        self.next() == Some(to) || (self == Self::Received && to == Self::Failed)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Forward-only phase tracker for one request.
#[derive(Debug)]
struct RunTracker {
    phase: RunPhase,
}

impl RunTracker {
    fn new() -> Self {
        debug!(phase = ?RunPhase::Received, "dispatch request received");
        Self {
            phase: RunPhase::Received,
        }
    }

    fn advance(&mut self, to: RunPhase) {
        debug_assert!(
            self.phase.can_transition_to(to),
            "illegal phase transition {:?} -> {:?}",
            self.phase,
            to
        );
        debug!(from = ?self.phase, to = ?to, "dispatch phase");
        self.phase = to;
    }
}

/// Stateless dispatch orchestrator.
///
/// Holds configuration only, so one instance can serve concurrent
/// requests from many threads.
#[derive(Debug, Clone, Default)]
pub struct DispatchService {
    config: EngineConfig,
}

impl DispatchService {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Seed for a request: explicit, else configured, else fresh.
    pub fn resolve_seed(&self, requested: Option<u64>) -> u64 {
        requested
            .or(self.config.engine.seed)
            .unwrap_or_else(|| rand::rng().random())
    }

    /// Runs the full pipeline for one request.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownStrategy`] for an unregistered
    /// strategy name and [`DispatchError::InvalidInput`] for malformed
    /// series or constraints. No strategy runs in either case.
    pub fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchResponse, DispatchError> {
        let kind: StrategyKind = match request.strategy.parse() {
            Ok(kind) => kind,
            Err(e) => {
                warn!(strategy = %request.strategy, "rejected dispatch request: {e}");
                return Err(e);
            }
        };
        let solver = kind.build(&self.config);
        self.dispatch_with(request, solver.as_ref())
    }

    /// Like [`DispatchService::dispatch`] but with a caller-supplied solver;
    /// `request.strategy` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidInput`] for malformed series or
    /// constraints, before `solver` is invoked.
    pub fn dispatch_with(
        &self,
        request: &DispatchRequest,
        solver: &dyn Solver,
    ) -> Result<DispatchResponse, DispatchError> {
        let mut tracker = RunTracker::new();

        let inputs = request
            .series()
            .and_then(|s| request.constraints().map(|c| (s, c)));
        let (series, constraints) = match inputs {
            Ok(inputs) => inputs,
            Err(e) => {
                tracker.advance(RunPhase::Failed);
                warn!("rejected dispatch request: {e}");
                return Err(e);
            }
        };

        let seed = self.resolve_seed(request.seed);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut response =
            self.execute(&mut tracker, solver, &series, &constraints, &mut rng);
        if solver.kind().is_stochastic() {
            response.strategy_metadata = response.strategy_metadata.with_seed(seed);
        }
        Ok(response)
    }

    /// Strategy-agnostic core: solve, then validate and evaluate the result.
    pub fn run(
        &self,
        solver: &dyn Solver,
        series: &TimeSeries,
        constraints: &Constraints,
        rng: &mut dyn RngCore,
    ) -> DispatchResponse {
        let mut tracker = RunTracker::new();
        self.execute(&mut tracker, solver, series, constraints, rng)
    }

    fn execute(
        &self,
        tracker: &mut RunTracker,
        solver: &dyn Solver,
        series: &TimeSeries,
        constraints: &Constraints,
        rng: &mut dyn RngCore,
    ) -> DispatchResponse {
        tracker.advance(RunPhase::Solving);
        let output = solver.solve(series, constraints, rng);

        tracker.advance(RunPhase::Validating);
        let report = validate(&output.schedule, constraints);

        tracker.advance(RunPhase::Evaluating);
        let evaluation = evaluate(&output.schedule, series);

        let mut warnings: Vec<Warning> = report.violations.iter().map(Warning::from).collect();
        warnings.extend(evaluation.imbalanced().map(Warning::from));
        for w in &warnings {
            warn!(strategy = %solver.kind(), "{w}");
        }

        let summary =
            DispatchSummary::new(&output.schedule, &evaluation, constraints.capacity());
        tracker.advance(RunPhase::Completed);
        info!(
            strategy = %solver.kind(),
            steps = series.len(),
            objective = evaluation.objective.net_cost,
            satisfied = report.satisfied,
            warnings = warnings.len(),
            "dispatch completed"
        );

        DispatchResponse {
            schedule: output.schedule,
            objective_value: evaluation.objective.net_cost,
            constraints_satisfied: report.satisfied,
            energy_balance: evaluation.energy_balance,
            strategy_metadata: output.metadata,
            violations: report.violations,
            warnings,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::solver::SolverOutput;

    fn spike_request(strategy: &str) -> DispatchRequest {
        DispatchRequest {
            prices: vec![0.10, 0.45],
            generation: vec![0.0, 0.0],
            load: vec![1.0, 1.0],
            constraints: ConstraintParams {
                max_charge_power: 5.0,
                max_discharge_power: 5.0,
                soc_min: 0.1,
                soc_max: 1.0,
                charge_efficiency: 1.0,
                discharge_efficiency: 1.0,
                ..ConstraintParams::default()
            },
            strategy: strategy.to_string(),
            seed: Some(42),
        }
    }

    struct PanickingSolver;

    impl Solver for PanickingSolver {
        fn kind(&self) -> StrategyKind {
            StrategyKind::Deterministic
        }

        fn solve(&self, _: &TimeSeries, _: &Constraints, _: &mut dyn RngCore) -> SolverOutput {
            panic!("solver must not run on rejected input");
        }
    }

    #[test]
    fn price_spike_costs_0_37() {
        let service = DispatchService::default();
        let response = service.dispatch(&spike_request("deterministic")).unwrap();
        assert_relative_eq!(response.objective_value, 0.37, epsilon = 1e-9);
        assert!(response.constraints_satisfied);
        assert!(response.warnings.is_empty());
        assert_eq!(response.schedule.len(), 2);
    }

    #[test]
    fn unknown_strategy_is_fatal() {
        let err = DispatchService::default()
            .dispatch(&spike_request("qaoa"))
            .unwrap_err();
        assert_eq!(err, DispatchError::UnknownStrategy("qaoa".into()));
    }

    #[test]
    fn mismatched_lengths_never_reach_the_solver() {
        let mut request = spike_request("deterministic");
        request.load = vec![1.0];
        let err = DispatchService::default()
            .dispatch_with(&request, &PanickingSolver)
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn invalid_constraints_never_reach_the_solver() {
        let mut request = spike_request("deterministic");
        request.constraints.soc_min = 0.95;
        request.constraints.soc_max = 0.9;
        let err = DispatchService::default()
            .dispatch_with(&request, &PanickingSolver)
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidInput { .. }));
    }

    #[test]
    fn stochastic_metadata_reports_seed() {
        let service = DispatchService::default();
        for strategy in ["annealing", "sampling"] {
            let response = service.dispatch(&spike_request(strategy)).unwrap();
            let json = serde_json::to_value(&response.strategy_metadata).unwrap();
            assert_eq!(json["name"], strategy);
            assert_eq!(json["seed"], 42);
        }
    }

    #[test]
    fn unseeded_runs_report_a_replayable_seed() {
        let service = DispatchService::default();
        assert_eq!(service.config().engine.seed, None);

        for strategy in ["annealing", "sampling"] {
            let mut request = crate::scenario::tou_day();
            request.strategy = strategy.to_string();
            request.seed = None;

            let first = service.dispatch(&request).unwrap();
            let json = serde_json::to_value(&first.strategy_metadata).unwrap();
            let seed = json["seed"]
                .as_u64()
                .unwrap_or_else(|| panic!("{strategy} metadata has no seed: {json}"));

            request.seed = Some(seed);
            let replay = service.dispatch(&request).unwrap();
            assert_eq!(replay.schedule, first.schedule, "{strategy} replay diverged");
            assert_eq!(replay.strategy_metadata, first.strategy_metadata);
        }
    }

    #[test]
    fn configured_seed_applies_when_request_has_none() {
        let mut config = EngineConfig::default();
        config.engine.seed = Some(7);
        let service = DispatchService::new(config);
        assert_eq!(service.resolve_seed(None), 7);
        assert_eq!(service.resolve_seed(Some(3)), 3);
    }

    #[test]
    fn violations_become_warnings() {
        struct Overcharger;
        impl Solver for Overcharger {
            fn kind(&self) -> StrategyKind {
                StrategyKind::Deterministic
            }
            fn solve(
                &self,
                series: &TimeSeries,
                _: &Constraints,
                _: &mut dyn RngCore,
            ) -> SolverOutput {
                let mut step = crate::model::DispatchStep::idle(0, 0.5);
                step.charge_power = 9.0;
                step.grid_import = series.load()[0] + 9.0;
                SolverOutput {
                    schedule: DispatchSchedule::from_steps(vec![step]),
                    metadata: StrategyMetadata::Deterministic {
                        low_price_threshold: 0.0,
                        high_price_threshold: 0.0,
                    },
                }
            }
        }

        let series = TimeSeries::new(vec![0.1], vec![0.0], vec![1.0]).unwrap();
        let constraints = Constraints::new(ConstraintParams::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let response =
            DispatchService::default().run(&Overcharger, &series, &constraints, &mut rng);
        assert!(!response.constraints_satisfied);
        assert_eq!(response.violations.len(), 1);
        assert!(matches!(
            response.warnings[0],
            Warning::ConstraintViolation { step: 0, .. }
        ));
    }

    #[test]
    fn phases_only_move_forward() {
        let mut phase = RunPhase::Received;
        let mut visited = vec![phase];
        while let Some(next) = phase.next() {
            assert!(phase.can_transition_to(next));
            assert!(next > phase);
            phase = next;
            visited.push(phase);
        }
        assert_eq!(visited.last(), Some(&RunPhase::Completed));
        assert!(RunPhase::Received.can_transition_to(RunPhase::Failed));
        assert!(!RunPhase::Solving.can_transition_to(RunPhase::Failed));
        assert!(!RunPhase::Evaluating.can_transition_to(RunPhase::Solving));
        assert!(RunPhase::Failed.is_terminal());
    }

    #[test]
    fn request_parses_pv_alias_and_rejects_missing_fields() {
        let body = r#"{
            "prices": [0.1], "pv": [0.0], "load": [1.0],
            "constraints": {
                "maxChargePower": 1.0, "maxDischargePower": 1.0,
                "socMin": 0.1, "socMax": 0.9,
                "chargeEfficiency": 0.95, "dischargeEfficiency": 0.95
            },
            "strategy": "deterministic"
        }"#;
        let request = DispatchRequest::from_json(body).unwrap();
        assert_eq!(request.generation, vec![0.0]);
        assert_eq!(request.seed, None);

        let err = DispatchRequest::from_json(r#"{"prices": [0.1]}"#).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }
}
