use serde::{Deserialize, Serialize};

use super::references::{NodeRef, RelationshipRef};

/// A node inside a pattern. Bound nodes skip their labels: `(this)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePattern {
    pub node: NodeRef,
    pub with_labels: bool,
}

impl NodePattern {
    pub fn new(node: &NodeRef) -> Self {
        Self {
            node: node.clone(),
            with_labels: true,
        }
    }

    /// Node already declared by an earlier clause.
    pub fn bound(node: &NodeRef) -> Self {
        Self {
            node: node.clone(),
            with_labels: false,
        }
    }
}

impl From<&NodeRef> for NodePattern {
    fn from(value: &NodeRef) -> Self {
        NodePattern::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Outgoing,
    Incoming,
    Undirected,
}

/// `-[alias:TYPE]->`, or `-[:TYPE]->` when anonymous.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipPattern {
    pub relationship: RelationshipRef,
    pub direction: Direction,
    pub named: bool,
}

impl RelationshipPattern {
    pub fn outgoing(relationship: &RelationshipRef) -> Self {
        Self::with_direction(relationship, Direction::Outgoing)
    }

    pub fn incoming(relationship: &RelationshipRef) -> Self {
        Self::with_direction(relationship, Direction::Incoming)
    }

    pub fn undirected(relationship: &RelationshipRef) -> Self {
        Self::with_direction(relationship, Direction::Undirected)
    }

    fn with_direction(relationship: &RelationshipRef, direction: Direction) -> Self {
        Self {
            relationship: relationship.clone(),
            direction,
            named: true,
        }
    }

    /// Render without an alias; the relationship is never referenced elsewhere.
    pub fn anonymous(mut self) -> Self {
        self.named = false;
        self
    }
}

/// `(a)-[r]->(b)<-[s]-(c)`: a start node and zero or more hops.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub start: NodePattern,
    pub hops: Vec<(RelationshipPattern, NodePattern)>,
}

impl Pattern {
    pub fn node(start: impl Into<NodePattern>) -> Self {
        Self {
            start: start.into(),
            hops: Vec::new(),
        }
    }

    pub fn related(mut self, relationship: RelationshipPattern, to: impl Into<NodePattern>) -> Self {
        self.hops.push((relationship, to.into()));
        self
    }
}

impl From<&NodeRef> for Pattern {
    fn from(value: &NodeRef) -> Self {
        Pattern::node(value)
    }
}

impl From<NodePattern> for Pattern {
    fn from(value: NodePattern) -> Self {
        Pattern::node(value)
    }
}
