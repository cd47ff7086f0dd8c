//! Employee performance review (EPR) scoring and review workflow.
//!
//! The [`scoring`] module owns the deterministic arithmetic that turns criterion achievements and
//! competency levels into a final score and rating band. Everything else in the crate feeds that
//! engine from the reference catalog and stored evaluations, and hands its output to callers.

pub mod catalog;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod identity;
pub mod scoring;
pub mod telemetry;
