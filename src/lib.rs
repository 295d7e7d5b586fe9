//! monolith-versions: keep monolith package families on one version line.
//!
//! Packages released together from a monolith repository are grouped by name
//! patterns. Right before the resolver pool is built, every matched package is
//! restricted to the group's constraint through a synthetic metapackage that
//! the root package requires.

pub mod config;
pub mod domain;
pub mod service;
