//! Query-builder engine.
//!
//! A build goes through three steps:
//! 1. create references (nodes, relationships, variables, parameters) from a
//!    [`ReferenceArena`]
//! 2. append clauses that use them to a [`Query`]
//! 3. render with a fresh [`CypherContext`], which names every reference on
//!    first visit and records the bound parameter values
//!
//! ```
//! use cypher_builder::cypher_builder::{Query, ReferenceArena};
//!
//! let mut arena = ReferenceArena::new();
//! let person = arena.node(["Person"]);
//! let name = arena.param("Ada");
//!
//! let result = Query::new()
//!     .create(&person, [("name", &name)])
//!     .return_entity(&person, &["name"], Some("person"))
//!     .build(&arena)
//!     .unwrap();
//!
//! assert_eq!(
//!     result.cypher,
//!     "CREATE (this:`Person`)\nSET this.name = $param0\nRETURN this {.name} AS person"
//! );
//! assert_eq!(result.params["param0"], "Ada");
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

pub mod clauses;
pub mod context;
pub mod errors;
pub mod expressions;
pub mod pattern;
pub mod references;
pub mod scalar_functions;
mod to_cypher;


pub use clauses::{
    Clause, FinishedQuery, MatchClause, OrderItem, Query, ReturnAlias, ReturnClause, WithItem,
};
pub use context::CypherContext;
pub use errors::CypherBuilderError;
pub use expressions::{ComparisonOperator, Expr, Literal, Predicate, ProjectionField};
pub use pattern::{Direction, NodePattern, Pattern, RelationshipPattern};
pub use references::{
    AsReference, NodeRef, Param, Reference, ReferenceArena, RelationshipRef, VariableRef,
};
pub use scalar_functions::ScalarFunction;
pub use to_cypher::ToCypher;

/// Output of one build: query text plus the values to bind by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CypherResult {
    pub cypher: String,
    pub params: Map<String, Value>,
}
