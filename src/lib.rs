//! Cypher Builder - Parameterized Cypher construction for graph APIs
//!
//! This crate turns already-decided query operations into Cypher text through:
//! - An append-only statement tree (create, match, call, with, set, return)
//! - A per-build context that names every entity and parameter deterministically
//! - A side table of bound parameter values (values are never inlined as text)
//! - Declarative JSON/YAML build plans for driving the builder from outside Rust

pub mod utils;

pub mod build_plan;
pub mod config;
pub mod cypher_builder;
