//! File export.

pub mod export;
