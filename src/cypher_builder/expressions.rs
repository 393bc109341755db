//! Side-effect-free expression nodes: values, property access, function
//! calls, and boolean predicates.
//!
//! Strings are never inlined. A string value must be bound through a
//! [`Param`], which is what makes the rendered text injection-safe.

use serde::{Deserialize, Serialize};

use super::clauses::Query;
use super::references::{AsReference, NodeRef, Param, Reference, RelationshipRef, VariableRef};
use super::scalar_functions::ScalarFunction;

/// Values that are safe to inline into query text.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAccess {
    pub target: Reference,
    pub key: String,
}

/// One entry of a map projection: `.name` or `title: <expr>`.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionField {
    Shorthand(String),
    Entry(String, Expr),
}

impl From<&str> for ProjectionField {
    fn from(value: &str) -> Self {
        ProjectionField::Shorthand(value.to_string())
    }
}

impl From<String> for ProjectionField {
    fn from(value: String) -> Self {
        ProjectionField::Shorthand(value)
    }
}

/// `this {.name, title: var1}`
#[derive(Debug, Clone, PartialEq)]
pub struct MapProjection {
    pub target: Reference,
    pub fields: Vec<ProjectionField>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Param(Param),
    /// A bare alias (node, relationship, or variable)
    Reference(Reference),
    Property(PropertyAccess),
    Function(Box<ScalarFunction>),
    List(Vec<Expr>),
    /// Map literal: `{key: value, ...}`
    Map(Vec<(String, Expr)>),
    MapProjection(MapProjection),
}

impl Expr {
    pub fn property(target: &impl AsReference, key: impl Into<String>) -> Self {
        Expr::Property(PropertyAccess {
            target: target.reference().clone(),
            key: key.into(),
        })
    }

    pub fn reference(target: &impl AsReference) -> Self {
        Expr::Reference(target.reference().clone())
    }

    pub fn map_projection<I, F>(target: &impl AsReference, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<ProjectionField>,
    {
        Expr::MapProjection(MapProjection {
            target: target.reference().clone(),
            fields: fields.into_iter().map(Into::into).collect(),
        })
    }

    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }

    pub fn equals(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::compare(ComparisonOperator::Eq, self, rhs)
    }

    pub fn not_equals(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::compare(ComparisonOperator::Ne, self, rhs)
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::compare(ComparisonOperator::Lt, self, rhs)
    }

    pub fn lte(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::compare(ComparisonOperator::Lte, self, rhs)
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::compare(ComparisonOperator::Gt, self, rhs)
    }

    pub fn gte(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::compare(ComparisonOperator::Gte, self, rhs)
    }

    pub fn contains(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::compare(ComparisonOperator::Contains, self, rhs)
    }

    pub fn starts_with(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::compare(ComparisonOperator::StartsWith, self, rhs)
    }

    pub fn ends_with(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::compare(ComparisonOperator::EndsWith, self, rhs)
    }

    pub fn in_list(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::compare(ComparisonOperator::In, self, rhs)
    }

    pub fn matches(self, rhs: impl Into<Expr>) -> Predicate {
        Predicate::compare(ComparisonOperator::Matches, self, rhs)
    }

    pub fn is_null(self) -> Predicate {
        Predicate::IsNull(self)
    }

    pub fn is_not_null(self) -> Predicate {
        Predicate::IsNotNull(self)
    }
}

impl From<Literal> for Expr {
    fn from(value: Literal) -> Self {
        Expr::Literal(value)
    }
}

impl From<Param> for Expr {
    fn from(value: Param) -> Self {
        Expr::Param(value)
    }
}

impl From<&Param> for Expr {
    fn from(value: &Param) -> Self {
        Expr::Param(value.clone())
    }
}

impl From<ScalarFunction> for Expr {
    fn from(value: ScalarFunction) -> Self {
        Expr::Function(Box::new(value))
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Literal(Literal::Boolean(value))
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Literal(Literal::Integer(value))
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Literal(Literal::Float(value))
    }
}

macro_rules! expr_from_reference {
    ($($ty:ty),*) => {
        $(
            impl From<&$ty> for Expr {
                fn from(value: &$ty) -> Self {
                    Expr::reference(value)
                }
            }
        )*
    };
}

expr_from_reference!(NodeRef, RelationshipRef, VariableRef, Reference);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Contains,
    StartsWith,
    EndsWith,
    In,
    Matches,
}

impl ComparisonOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::Ne => "<>",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Lte => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Gte => ">=",
            ComparisonOperator::Contains => "CONTAINS",
            ComparisonOperator::StartsWith => "STARTS WITH",
            ComparisonOperator::EndsWith => "ENDS WITH",
            ComparisonOperator::In => "IN",
            ComparisonOperator::Matches => "=~",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Comparison {
        operator: ComparisonOperator,
        lhs: Expr,
        rhs: Expr,
    },
    IsNull(Expr),
    IsNotNull(Expr),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    /// `EXISTS { <subquery> }`, correlated with the enclosing aliases
    Exists(Box<Query>),
}

impl Predicate {
    pub fn compare(operator: ComparisonOperator, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Predicate::Comparison {
            operator,
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    pub fn and(operands: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::And(operands.into_iter().collect())
    }

    pub fn or(operands: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Or(operands.into_iter().collect())
    }

    pub fn not(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    pub fn exists(subquery: impl Into<Query>) -> Self {
        Predicate::Exists(Box::new(subquery.into()))
    }
}
