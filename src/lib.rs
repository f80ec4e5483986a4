//! Battery dispatch optimization over a price, generation, and load horizon.
//!
//! A [`service::DispatchService`] takes a request, runs one of the
//! interchangeable [`solver`] strategies, checks the result with
//! [`validate::validate`], and scores it with [`evaluate::evaluate`].

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod io;
pub mod model;
pub mod scenario;
pub mod service;
/// Dispatch strategies and their shared stepping model.
pub mod solver;
pub mod telemetry;
pub mod validate;

pub use error::DispatchError;
pub use service::{DispatchRequest, DispatchResponse, DispatchService};
