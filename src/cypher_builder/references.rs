//! Identity tokens for pattern variables and bound parameters.
//!
//! A reference only knows *who* it is. The alias or parameter name it renders
//! as is decided later by [`CypherContext`](super::context::CypherContext), the
//! first time the renderer visits it. Two references are equal only if they
//! were handed out by the same [`ReferenceArena`] call; payloads never take
//! part in equality.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::config::BuilderConfig;

use super::context::CypherContext;

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies the build a reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaId(u64);

/// Stable handle of one reference: the owning build plus an index into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefId {
    arena: ArenaId,
    index: usize,
}

impl RefId {
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// What an alias-bearing reference stands for. Decides the alias prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Node,
    Relationship,
    Variable,
}

/// Untyped view of a node, relationship, or variable reference.
#[derive(Debug, Clone)]
pub struct Reference {
    id: RefId,
    kind: ReferenceKind,
}

impl Reference {
    pub fn id(&self) -> RefId {
        self.id
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Reference {}

impl Hash for Reference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Anything that renders as an alias: nodes, relationships, variables.
pub trait AsReference {
    fn reference(&self) -> &Reference;
}

impl AsReference for Reference {
    fn reference(&self) -> &Reference {
        self
    }
}

/// A node pattern variable with the labels emitted where it is declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef {
    reference: Reference,
    labels: Arc<[String]>,
}

impl NodeRef {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// A relationship pattern variable, optionally typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipRef {
    reference: Reference,
    rel_type: Option<Arc<str>>,
}

impl RelationshipRef {
    pub fn rel_type(&self) -> Option<&str> {
        self.rel_type.as_deref()
    }
}

/// An intermediate projection alias (`WITH collect(x) AS var1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableRef {
    reference: Reference,
}

macro_rules! impl_as_reference {
    ($($ty:ty),*) => {
        $(
            impl AsReference for $ty {
                fn reference(&self) -> &Reference {
                    &self.reference
                }
            }

            impl From<&$ty> for Reference {
                fn from(value: &$ty) -> Self {
                    value.reference.clone()
                }
            }
        )*
    };
}

impl_as_reference!(NodeRef, RelationshipRef, VariableRef);

/// A literal value bound by name at execution time.
///
/// Each call to [`ReferenceArena::param`] yields a distinct parameter, even
/// when two calls carry the same value.
#[derive(Debug, Clone)]
pub struct Param {
    id: RefId,
    value: Arc<Value>,
    point: bool,
}

impl Param {
    pub fn id(&self) -> RefId {
        self.id
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether the parameter renders wrapped as `point($param)`.
    pub fn is_point(&self) -> bool {
        self.point
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Param {}

impl Hash for Param {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Hands out every reference used by one query build.
///
/// An arena is confined to its build: rendering one of its references with a
/// context from another arena panics.
pub struct ReferenceArena {
    id: ArenaId,
    next_index: usize,
}

impl ReferenceArena {
    pub fn new() -> Self {
        Self {
            id: ArenaId(NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed)),
            next_index: 0,
        }
    }

    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// Number of references handed out so far.
    pub fn len(&self) -> usize {
        self.next_index
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    fn next_id(&mut self) -> RefId {
        let id = RefId {
            arena: self.id,
            index: self.next_index,
        };
        self.next_index += 1;
        id
    }

    fn next_reference(&mut self, kind: ReferenceKind) -> Reference {
        Reference {
            id: self.next_id(),
            kind,
        }
    }

    pub fn node<I, S>(&mut self, labels: I) -> NodeRef
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NodeRef {
            reference: self.next_reference(ReferenceKind::Node),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn relationship(&mut self, rel_type: Option<&str>) -> RelationshipRef {
        RelationshipRef {
            reference: self.next_reference(ReferenceKind::Relationship),
            rel_type: rel_type.map(Arc::from),
        }
    }

    pub fn variable(&mut self) -> VariableRef {
        VariableRef {
            reference: self.next_reference(ReferenceKind::Variable),
        }
    }

    pub fn param(&mut self, value: impl Into<Value>) -> Param {
        Param {
            id: self.next_id(),
            value: Arc::new(value.into()),
            point: false,
        }
    }

    /// A parameter holding point coordinates, rendered as `point($param)`.
    pub fn point_param(&mut self, value: impl Into<Value>) -> Param {
        Param {
            point: true,
            ..self.param(value)
        }
    }

    /// Fresh context for rendering this arena's references with default naming.
    pub fn context(&self) -> CypherContext {
        CypherContext::new(self.id, &BuilderConfig::default())
    }

    pub fn context_with_config(&self, config: &BuilderConfig) -> CypherContext {
        CypherContext::new(self.id, config)
    }
}

impl Default for ReferenceArena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReferenceArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceArena")
            .field("id", &self.id)
            .field("references", &self.next_index)
            .finish()
    }
}
