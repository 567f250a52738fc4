//! Request-scoped business flows that span repositories and providers.
//!
//! - [`access`] -- ownership checks for user-scoped resources.
//! - [`usage`] -- the plan-based usage gate.
//! - [`generation`] -- the generate-email pipeline.

pub mod access;
pub mod generation;
pub mod usage;
