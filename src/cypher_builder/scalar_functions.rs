//! Scalar and aggregate function calls.
//!
//! Every variant owns its operation name and renders as `name(arg, ...)`; the
//! argument rendering lives in `to_cypher.rs`.

use super::expressions::Expr;
use super::references::{AsReference, Param, Reference};

/// First argument of `distance()`: a property or a nested function call.
#[derive(Debug, Clone, PartialEq)]
pub enum DistanceSource {
    Property(Reference, String),
    Function(Box<ScalarFunction>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarFunction {
    /// `coalesce(<alias>.<property>, <fallback>)`
    Coalesce {
        target: Reference,
        property: String,
        fallback: Expr,
    },
    /// `distance(<source>, point($param))`
    Distance { source: DistanceSource, point: Param },
    Collect(Expr),
    Count(Expr),
    Min(Expr),
    Max(Expr),
    Avg(Expr),
    Sum(Expr),
    Size(Expr),
    ToLower(Expr),
    ToUpper(Expr),
}

impl ScalarFunction {
    pub fn operation(&self) -> &'static str {
        match self {
            ScalarFunction::Coalesce { .. } => "coalesce",
            ScalarFunction::Distance { .. } => "distance",
            ScalarFunction::Collect(_) => "collect",
            ScalarFunction::Count(_) => "count",
            ScalarFunction::Min(_) => "min",
            ScalarFunction::Max(_) => "max",
            ScalarFunction::Avg(_) => "avg",
            ScalarFunction::Sum(_) => "sum",
            ScalarFunction::Size(_) => "size",
            ScalarFunction::ToLower(_) => "toLower",
            ScalarFunction::ToUpper(_) => "toUpper",
        }
    }

    /// Whether the function folds many rows into one.
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            ScalarFunction::Collect(_)
                | ScalarFunction::Count(_)
                | ScalarFunction::Min(_)
                | ScalarFunction::Max(_)
                | ScalarFunction::Avg(_)
                | ScalarFunction::Sum(_)
        )
    }
}

pub fn coalesce(
    target: &impl AsReference,
    property: impl Into<String>,
    fallback: impl Into<Expr>,
) -> ScalarFunction {
    ScalarFunction::Coalesce {
        target: target.reference().clone(),
        property: property.into(),
        fallback: fallback.into(),
    }
}

/// `distance(<alias>.<property>, <point>)`
pub fn distance(target: &impl AsReference, property: impl Into<String>, point: &Param) -> ScalarFunction {
    ScalarFunction::Distance {
        source: DistanceSource::Property(target.reference().clone(), property.into()),
        point: point.clone(),
    }
}

/// `distance(<function>, <point>)`, e.g. over a coalesced property.
pub fn distance_of(function: ScalarFunction, point: &Param) -> ScalarFunction {
    ScalarFunction::Distance {
        source: DistanceSource::Function(Box::new(function)),
        point: point.clone(),
    }
}

pub fn collect(expr: impl Into<Expr>) -> ScalarFunction {
    ScalarFunction::Collect(expr.into())
}

pub fn count(expr: impl Into<Expr>) -> ScalarFunction {
    ScalarFunction::Count(expr.into())
}

pub fn min(expr: impl Into<Expr>) -> ScalarFunction {
    ScalarFunction::Min(expr.into())
}

pub fn max(expr: impl Into<Expr>) -> ScalarFunction {
    ScalarFunction::Max(expr.into())
}

pub fn avg(expr: impl Into<Expr>) -> ScalarFunction {
    ScalarFunction::Avg(expr.into())
}

pub fn sum(expr: impl Into<Expr>) -> ScalarFunction {
    ScalarFunction::Sum(expr.into())
}

pub fn size(expr: impl Into<Expr>) -> ScalarFunction {
    ScalarFunction::Size(expr.into())
}

pub fn to_lower(expr: impl Into<Expr>) -> ScalarFunction {
    ScalarFunction::ToLower(expr.into())
}

pub fn to_upper(expr: impl Into<Expr>) -> ScalarFunction {
    ScalarFunction::ToUpper(expr.into())
}
