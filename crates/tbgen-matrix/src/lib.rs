//! Test configuration matrices for the streaming testbench library.
//!
//! Each testbench entity is described by a [`Domain`]: axes of generic values, filters, an
//! optional baseline and per-test modes. [`build`] enumerates a domain into named
//! [`TestConfiguration`]s, generating any reference files they point at on the way.

#![forbid(unsafe_code)]

pub mod build;
pub mod domain;
pub mod error;
pub mod generic;
pub mod suites;

pub use build::{build, BuildContext, TestCatalog, TestConfiguration};
pub use domain::{Artifacts, Axis, Baseline, Constraint, Domain, Field, ModeRule, Modes};
pub use error::{MatrixError, Result};
pub use generic::{GenericValue, Generics};
pub use suites::{
    build_all, default_catalog, suite, ComponentMatrix, ARBITER_ENTITY, DEFAULT_ARBITER_TESTS,
};
