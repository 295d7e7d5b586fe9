//! Domain layer containing core business logic.
//!
//! This module contains:
//! - Version constraint parsing
//! - The package pool model
//! - Package name patterns and monolith rule validation
//! - The constraint filter applied to the pool
//! - Reporting sinks and the logger

pub mod constraint;
pub mod environment;
mod error;
pub mod filter;
pub mod logger;
pub mod package;
pub mod pattern;
pub mod reporter;
pub mod rules;

pub use constraint::{Constraint, VersionParser};
pub use environment::{Environment, ProcessEnvironment};
pub use error::{ConstraintError, MonolithError, PatternError, Result};
pub use filter::{env_var_name, PackageFilter};
pub use package::{AliasPackage, CompletePackage, Dist, Link, Package, Requirements, RootPackage};
pub use pattern::{PackageMatcher, PackagePattern};
pub use reporter::{ConsoleReporter, Level, MemoryReporter, Reporter};
pub use rules::{GroupRule, RuleSet};
