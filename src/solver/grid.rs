//! Grid settlement of the per-step residual.

/// Grid-side flows for one step after the battery has acted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridFlow {
    /// Energy bought from the grid (>= 0).
    pub import: f64,
    /// Energy sold to the grid (>= 0, at most the export cap).
    pub export: f64,
    /// Surplus beyond the export cap that is dropped (>= 0).
    pub curtailment: f64,
}

/// Settles the step residual against the grid.
///
/// The residual is `load + charge - generation - discharge`: a positive
/// residual is imported, a negative one is exported up to `export_cap`
/// and the rest curtailed. By construction
/// `generation + discharge + import == load + charge + export + curtailment`.
///
/// # Arguments
///
/// * `generation` - On-site generation (>= 0)
/// * `load` - Site demand (>= 0)
/// * `charge` - Battery charge power (>= 0)
/// * `discharge` - Battery discharge power (>= 0)
/// * `export_cap` - Export limit (`f64::INFINITY` when unbounded)
pub fn settle(
    generation: f64,
    load: f64,
    charge: f64,
    discharge: f64,
    export_cap: f64,
) -> GridFlow {
    let residual = load + charge - generation - discharge;
    if residual >= 0.0 {
        GridFlow {
            import: residual,
            export: 0.0,
            curtailment: 0.0,
        }
    } else {
        let surplus = -residual;
        let export = surplus.min(export_cap);
        GridFlow {
            import: 0.0,
            export,
            curtailment: surplus - export,
        }
    }
}
