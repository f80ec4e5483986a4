//! Request inputs and solver outputs: series, constraints, and schedules.

/// Validated battery and grid limits.
pub mod constraints;
/// Dispatch steps and the schedule they form.
pub mod schedule;
/// Aligned price, generation, and load horizon.
pub mod series;

pub use constraints::{ConstraintParams, Constraints};
pub use schedule::{DispatchSchedule, DispatchStep};
pub use series::TimeSeries;
