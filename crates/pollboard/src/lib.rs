//! Building blocks for the poll publication service: domain entities, the
//! date-driven visibility rules, the storage contract, the service facade,
//! and the HTTP router, plus configuration and telemetry plumbing shared by
//! the binaries.

pub mod config;
pub mod error;
pub mod polls;
pub mod telemetry;
