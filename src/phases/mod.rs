//! Implementation of the phases of a validation run.
//!
//! ## Overview
//!
//! A run follows 3 phases after its input has been normalized into a
//! repository list:
//! 1. Alias Resolution - Scan every non-skipped repository for repository
//!    declarations and grow the alias sets of the repositories they name
//! 2. Reference Collection - Extract every reference (and declaration marker)
//!    from every non-skipped repository
//! 3. Reference Validation - Give each reference exactly one verdict and
//!    fold failures into the report instead of aborting
//!
//! Every phase is fail-soft: a file or repository that cannot be read is
//! logged, counted and skipped. Each phase depends only on the previous
//! phases and the foundation modules.

pub mod aliases;
pub mod extraction;
pub mod orchestrator;
pub mod validation;

// Re-export phase modules by position
pub use aliases as phase1;
pub use extraction as phase2;
pub use validation as phase3;
