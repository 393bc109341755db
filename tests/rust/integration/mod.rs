//! Integration tests - full builds through the public API and build plans.
//!
//! These exercise the builder end to end: references, clauses, rendering and
//! the parameter table, plus plans loaded from disk.

mod builder_scenarios;
mod plan_files;
