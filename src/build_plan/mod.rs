//! Declarative build plans.
//!
//! A plan names its entities and parameters up front and then lists the
//! statements that use those names. It is the serialized form of a builder
//! session, for callers outside Rust:
//!
//! ```json
//! {
//!   "entities": { "person": { "kind": "node", "labels": ["Person"] } },
//!   "params": { "name": { "value": "Ada" } },
//!   "statements": [
//!     { "op": "create", "node": "person", "properties": { "name": { "param": "name" } } },
//!     { "op": "return", "entity": "person", "fields": ["name"], "alias": "person" }
//!   ]
//! }
//! ```
//!
//! Names only live in the plan. The rendered aliases are still allocated by
//! the context in visit order (`this`, `this0`, ...).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::BuilderConfig;
use crate::cypher_builder::clauses::SortDirection;
use crate::cypher_builder::{ComparisonOperator, CypherResult, Direction};

mod compiler;
pub mod errors;

pub use compiler::{compile, CompiledPlan};
pub use errors::PlanError;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityDecl {
    Node {
        #[serde(default)]
        labels: Vec<String>,
    },
    Relationship {
        #[serde(rename = "type", default)]
        rel_type: Option<String>,
    },
    Variable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub value: Value,
    #[serde(default)]
    pub point: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanExpr {
    /// `{"param": "name"}`
    Param(String),
    /// `{"ref": "movie"}`
    Ref(String),
    /// `{"property": {"of": "movie", "key": "title"}}`
    Property { of: String, key: String },
    /// Inline null, boolean, or number
    Literal(Value),
    List(Vec<PlanExpr>),
    /// `{"projection": {"of": "movie", "fields": ["title"]}}`
    Projection {
        of: String,
        #[serde(default)]
        fields: Vec<String>,
        #[serde(default)]
        entries: Map<String, Value>,
    },
    Coalesce {
        of: String,
        key: String,
        fallback: Box<PlanExpr>,
    },
    /// `source` must be a property or a function call
    Distance { source: Box<PlanExpr>, point: String },
    /// Single-argument functions: collect, count, min, max, avg, sum, size,
    /// toLower, toUpper
    Call { function: String, arg: Box<PlanExpr> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanPredicate {
    Compare {
        op: ComparisonOperator,
        lhs: PlanExpr,
        rhs: PlanExpr,
    },
    IsNull(PlanExpr),
    IsNotNull(PlanExpr),
    And(Vec<PlanPredicate>),
    Or(Vec<PlanPredicate>),
    Not(Box<PlanPredicate>),
    Exists(Vec<PlanStatement>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanNode {
    pub node: String,
    #[serde(default = "default_true")]
    pub labels: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanHop {
    pub relationship: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_true")]
    pub named: bool,
    pub to: PlanNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPattern {
    pub start: PlanNode,
    #[serde(default)]
    pub hops: Vec<PlanHop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanWithItem {
    pub expr: PlanExpr,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOrderItem {
    pub expr: PlanExpr,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PlanStatement {
    Create {
        node: String,
        /// Key order is kept: it is the SET order.
        #[serde(default)]
        properties: Map<String, Value>,
    },
    Match {
        pattern: PlanPattern,
        #[serde(default)]
        optional: bool,
        #[serde(rename = "where", default)]
        predicate: Option<PlanPredicate>,
    },
    Call {
        statements: Vec<PlanStatement>,
    },
    WithAll,
    With {
        items: Vec<PlanWithItem>,
    },
    Set {
        target: String,
        properties: Map<String, Value>,
    },
    OrderBy {
        items: Vec<PlanOrderItem>,
    },
    Skip {
        param: String,
    },
    Limit {
        param: String,
    },
    /// Exactly one of `entity` / `expr`, or neither for `RETURN *`.
    Return {
        #[serde(default)]
        entity: Option<String>,
        #[serde(default)]
        fields: Vec<String>,
        #[serde(default)]
        expr: Option<PlanExpr>,
        #[serde(default)]
        alias: Option<String>,
        /// Name of a declared variable to use as the output alias
        #[serde(default)]
        alias_variable: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BuildPlan {
    #[serde(default)]
    pub entities: HashMap<String, EntityDecl>,
    #[serde(default)]
    pub params: HashMap<String, ParamDecl>,
    pub statements: Vec<PlanStatement>,
}

impl BuildPlan {
    pub fn from_json_str(content: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, PlanError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load a plan; `.yaml`/`.yml` files are read as YAML, anything else as JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PlanError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }
}

/// Compile and render a plan with a fresh arena and context.
pub fn render_plan(plan: &BuildPlan, config: &BuilderConfig) -> Result<CypherResult, PlanError> {
    let compiled = compile(plan)?;
    compiled.build(config)
}
