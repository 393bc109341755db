//! Statement tree: a [`Query`] is an ordered, append-only list of clauses.
//!
//! `RETURN` ends a query. [`Query::return_`] consumes the builder and yields
//! a [`FinishedQuery`], which has no append operations, so nothing can be
//! added after the projection.

use serde::{Deserialize, Serialize};

use crate::config::BuilderConfig;

use super::context::CypherContext;
use super::errors::CypherBuilderError;
use super::expressions::{Expr, Predicate};
use super::pattern::Pattern;
use super::references::{AsReference, NodeRef, Param, Reference, ReferenceArena, VariableRef};
use super::to_cypher::ToCypher;
use super::CypherResult;

/// `CREATE <pattern>` plus an optional `SET` for the initial properties.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateClause {
    pub node: NodeRef,
    pub properties: Vec<(String, Expr)>,
}

/// `[OPTIONAL] MATCH <pattern> [WHERE <predicate>]`
#[derive(Debug, Clone, PartialEq)]
pub struct MatchClause {
    pub pattern: Pattern,
    pub optional: bool,
    pub predicate: Option<Predicate>,
}

impl MatchClause {
    pub fn new(pattern: impl Into<Pattern>) -> Self {
        Self {
            pattern: pattern.into(),
            optional: false,
            predicate: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn where_(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }
}

impl From<Pattern> for MatchClause {
    fn from(value: Pattern) -> Self {
        MatchClause::new(value)
    }
}

impl From<&NodeRef> for MatchClause {
    fn from(value: &NodeRef) -> Self {
        MatchClause::new(value)
    }
}

/// `CALL { <subquery> }`
#[derive(Debug, Clone, PartialEq)]
pub struct CallClause {
    pub subquery: Box<Query>,
}

/// One projected item of a `WITH`: `expr` or `expr AS var`.
#[derive(Debug, Clone, PartialEq)]
pub struct WithItem {
    pub expr: Expr,
    pub alias: Option<VariableRef>,
}

impl WithItem {
    pub fn new(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            alias: None,
        }
    }

    pub fn aliased(expr: impl Into<Expr>, alias: &VariableRef) -> Self {
        Self {
            expr: expr.into(),
            alias: Some(alias.clone()),
        }
    }
}

impl<T> From<&T> for WithItem
where
    T: AsReference,
{
    fn from(value: &T) -> Self {
        WithItem::new(Expr::reference(value))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WithClause {
    /// `WITH *`
    All,
    Items(Vec<WithItem>),
}

/// Standalone `SET a.k = v, ...`
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    pub target: Reference,
    pub properties: Vec<(String, Expr)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub expr: Expr,
    pub direction: SortDirection,
}

impl OrderItem {
    pub fn asc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Output name of a `RETURN`: a plain name or a variable's alias.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnAlias {
    Name(String),
    Variable(VariableRef),
}

impl From<&str> for ReturnAlias {
    fn from(value: &str) -> Self {
        ReturnAlias::Name(value.to_string())
    }
}

impl From<String> for ReturnAlias {
    fn from(value: String) -> Self {
        ReturnAlias::Name(value)
    }
}

impl From<&VariableRef> for ReturnAlias {
    fn from(value: &VariableRef) -> Self {
        ReturnAlias::Variable(value.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReturnTarget {
    /// `RETURN <alias> {.field, ...}`
    Entity { target: Reference, fields: Vec<String> },
    Expr(Expr),
    /// `RETURN *`
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnClause {
    pub target: ReturnTarget,
    pub alias: Option<ReturnAlias>,
}

impl ReturnClause {
    pub fn entity(target: &impl AsReference) -> Self {
        Self::projection(target, Vec::<String>::new())
    }

    pub fn projection<I, S>(target: &impl AsReference, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target: ReturnTarget::Entity {
                target: target.reference().clone(),
                fields: fields.into_iter().map(Into::into).collect(),
            },
            alias: None,
        }
    }

    pub fn expr(expr: impl Into<Expr>) -> Self {
        Self {
            target: ReturnTarget::Expr(expr.into()),
            alias: None,
        }
    }

    pub fn all() -> Self {
        Self {
            target: ReturnTarget::All,
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<ReturnAlias>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Create(CreateClause),
    Match(MatchClause),
    Call(CallClause),
    With(WithClause),
    Set(SetClause),
    OrderBy(Vec<OrderItem>),
    Skip(Param),
    Limit(Param),
    Return(ReturnClause),
}

/// Root of a statement sequence. Also used for the body of `CALL { }` and
/// `EXISTS { }`, which share the outer build's aliases and parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    statements: Vec<Clause>,
}

fn collect_properties<I, K, V>(properties: I) -> Vec<(String, Expr)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Expr>,
{
    properties
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statements(&self) -> &[Clause] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    fn push(mut self, clause: Clause) -> Self {
        self.statements.push(clause);
        self
    }

    pub fn create<I, K, V>(self, node: &NodeRef, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Expr>,
    {
        self.push(Clause::Create(CreateClause {
            node: node.clone(),
            properties: collect_properties(properties),
        }))
    }

    pub fn match_(self, clause: impl Into<MatchClause>) -> Self {
        self.push(Clause::Match(clause.into()))
    }

    pub fn call(self, subquery: impl Into<Query>) -> Self {
        self.push(Clause::Call(CallClause {
            subquery: Box::new(subquery.into()),
        }))
    }

    pub fn with_all(self) -> Self {
        self.push(Clause::With(WithClause::All))
    }

    pub fn with<I>(self, items: I) -> Self
    where
        I: IntoIterator<Item = WithItem>,
    {
        self.push(Clause::With(WithClause::Items(items.into_iter().collect())))
    }

    pub fn set<I, K, V>(self, target: &impl AsReference, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Expr>,
    {
        self.push(Clause::Set(SetClause {
            target: target.reference().clone(),
            properties: collect_properties(properties),
        }))
    }

    pub fn order_by(self, items: impl IntoIterator<Item = OrderItem>) -> Self {
        self.push(Clause::OrderBy(items.into_iter().collect()))
    }

    pub fn skip(self, offset: &Param) -> Self {
        self.push(Clause::Skip(offset.clone()))
    }

    pub fn limit(self, limit: &Param) -> Self {
        self.push(Clause::Limit(limit.clone()))
    }

    /// Append the final projection. The returned query accepts no further
    /// statements.
    pub fn return_(self, clause: impl Into<ReturnClause>) -> FinishedQuery {
        FinishedQuery {
            query: self.push(Clause::Return(clause.into())),
        }
    }

    /// `RETURN <entity> {.f1, .f2} AS <alias>`; empty fields or alias are omitted.
    pub fn return_entity(
        self,
        entity: &impl AsReference,
        fields: &[&str],
        alias: Option<&str>,
    ) -> FinishedQuery {
        let mut clause = ReturnClause::projection(entity, fields.iter().copied());
        if let Some(alias) = alias {
            clause = clause.alias(alias);
        }
        self.return_(clause)
    }

    pub fn render(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        self.to_cypher(context)
    }

    /// Render with a fresh default-configured context.
    pub fn build(&self, arena: &ReferenceArena) -> Result<CypherResult, CypherBuilderError> {
        self.build_with_config(arena, &BuilderConfig::default())
    }

    pub fn build_with_config(
        &self,
        arena: &ReferenceArena,
        config: &BuilderConfig,
    ) -> Result<CypherResult, CypherBuilderError> {
        let mut context = arena.context_with_config(config);
        let cypher = self.to_cypher(&mut context)?;
        let params = context.into_params();
        log::debug!(
            "built query: {} statements, {} params",
            self.statements.len(),
            params.len()
        );
        Ok(CypherResult { cypher, params })
    }
}

/// A query terminated by `RETURN`.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedQuery {
    query: Query,
}

impl FinishedQuery {
    pub fn statements(&self) -> &[Clause] {
        self.query.statements()
    }

    pub fn into_query(self) -> Query {
        self.query
    }

    pub fn render(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        self.query.render(context)
    }

    pub fn build(&self, arena: &ReferenceArena) -> Result<CypherResult, CypherBuilderError> {
        self.query.build(arena)
    }

    pub fn build_with_config(
        &self,
        arena: &ReferenceArena,
        config: &BuilderConfig,
    ) -> Result<CypherResult, CypherBuilderError> {
        self.query.build_with_config(arena, config)
    }
}

impl From<FinishedQuery> for Query {
    fn from(value: FinishedQuery) -> Self {
        value.query
    }
}
