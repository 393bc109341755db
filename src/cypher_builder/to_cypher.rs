use super::clauses::{
    CallClause, Clause, CreateClause, MatchClause, OrderItem, Query, ReturnAlias, ReturnClause,
    ReturnTarget, SetClause, SortDirection, WithClause, WithItem,
};
use super::context::CypherContext;
use super::errors::CypherBuilderError;
use super::expressions::{Expr, Literal, MapProjection, Predicate, ProjectionField, PropertyAccess};
use super::pattern::{Direction, NodePattern, Pattern, RelationshipPattern};
use super::references::{AsReference, Param, Reference};
use super::scalar_functions::{DistanceSource, ScalarFunction};
use crate::utils::cypher_escaping::{escape_name, render_labels};

/// Render a tree node to Cypher text.
///
/// Aliases and parameter names are allocated in `context` in the order nodes
/// are visited: depth first, left to right.
pub trait ToCypher {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError>;
}

fn render_all<T: ToCypher>(
    items: &[T],
    context: &mut CypherContext,
) -> Result<Vec<String>, CypherBuilderError> {
    items.iter().map(|item| item.to_cypher(context)).collect()
}

/// Body of `CALL { }` / `EXISTS { }`. The depth is released even on error.
fn render_subquery(
    query: &Query,
    context: &mut CypherContext,
) -> Result<String, CypherBuilderError> {
    context.enter_subquery()?;
    let rendered = query.to_cypher(context);
    context.exit_subquery();
    rendered
}

/// Escaped property key; empty keys are rejected.
fn property_key(key: &str) -> Result<String, CypherBuilderError> {
    if key.is_empty() {
        return Err(CypherBuilderError::EmptyPropertyKey);
    }
    Ok(escape_name(key))
}

/// `a.k = v,\na.k2 = v2`; empty when there are no properties.
fn render_set_entries(
    target: &Reference,
    properties: &[(String, Expr)],
    context: &mut CypherContext,
) -> Result<String, CypherBuilderError> {
    let alias = context.alias_for(target);
    let mut entries = Vec::with_capacity(properties.len());
    for (key, value) in properties {
        let key = property_key(key)?;
        entries.push(format!("{}.{} = {}", alias, key, value.to_cypher(context)?));
    }
    Ok(entries.join(",\n"))
}

impl ToCypher for Query {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        Ok(render_all(self.statements(), context)?.join("\n"))
    }
}

impl ToCypher for Clause {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        match self {
            Clause::Create(create) => create.to_cypher(context),
            Clause::Match(match_clause) => match_clause.to_cypher(context),
            Clause::Call(call) => call.to_cypher(context),
            Clause::With(with) => with.to_cypher(context),
            Clause::Set(set) => set.to_cypher(context),
            Clause::OrderBy(items) => {
                if items.is_empty() {
                    return Err(CypherBuilderError::EmptyOrderBy);
                }
                Ok(format!("ORDER BY {}", render_all(items, context)?.join(", ")))
            }
            Clause::Skip(offset) => Ok(format!("SKIP {}", offset.to_cypher(context)?)),
            Clause::Limit(limit) => Ok(format!("LIMIT {}", limit.to_cypher(context)?)),
            Clause::Return(ret) => ret.to_cypher(context),
        }
    }
}

impl ToCypher for CreateClause {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        if self.node.labels().is_empty() {
            return Err(CypherBuilderError::MissingLabels);
        }
        let pattern = NodePattern::new(&self.node).to_cypher(context)?;
        let set = render_set_entries(self.node.reference(), &self.properties, context)?;
        if set.is_empty() {
            Ok(format!("CREATE {}", pattern))
        } else {
            Ok(format!("CREATE {}\nSET {}", pattern, set))
        }
    }
}

impl ToCypher for MatchClause {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        let keyword = if self.optional { "OPTIONAL MATCH" } else { "MATCH" };
        let pattern = self.pattern.to_cypher(context)?;
        match &self.predicate {
            Some(predicate) => Ok(format!(
                "{} {}\nWHERE {}",
                keyword,
                pattern,
                predicate.to_cypher(context)?
            )),
            None => Ok(format!("{} {}", keyword, pattern)),
        }
    }
}

impl ToCypher for CallClause {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        let body = render_subquery(&self.subquery, context)?;
        Ok(format!("CALL {{ {} }}", body))
    }
}

impl ToCypher for WithItem {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        let expr = self.expr.to_cypher(context)?;
        match &self.alias {
            Some(alias) => Ok(format!("{} AS {}", expr, context.alias_for(alias.reference()))),
            None => Ok(expr),
        }
    }
}

impl ToCypher for WithClause {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        match self {
            WithClause::All => Ok("WITH *".to_string()),
            WithClause::Items(items) if items.is_empty() => Err(CypherBuilderError::EmptyWithClause),
            WithClause::Items(items) => Ok(format!("WITH {}", render_all(items, context)?.join(", "))),
        }
    }
}

impl ToCypher for SetClause {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        if self.properties.is_empty() {
            return Err(CypherBuilderError::EmptySetClause);
        }
        let entries = render_set_entries(&self.target, &self.properties, context)?;
        Ok(format!("SET {}", entries))
    }
}

impl ToCypher for OrderItem {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        let direction = match self.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        Ok(format!("{} {}", self.expr.to_cypher(context)?, direction))
    }
}

impl ToCypher for ReturnClause {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        let target = match &self.target {
            ReturnTarget::Entity { target, fields } => {
                let alias = context.alias_for(target);
                if fields.is_empty() {
                    alias
                } else {
                    let projection = fields
                        .iter()
                        .map(|field| Ok(format!(".{}", property_key(field)?)))
                        .collect::<Result<Vec<_>, CypherBuilderError>>()?;
                    format!("{} {{{}}}", alias, projection.join(", "))
                }
            }
            ReturnTarget::Expr(expr) => expr.to_cypher(context)?,
            ReturnTarget::All => "*".to_string(),
        };

        let alias = match &self.alias {
            Some(ReturnAlias::Name(name)) if !name.is_empty() => format!(" AS {}", escape_name(name)),
            Some(ReturnAlias::Variable(variable)) => {
                format!(" AS {}", context.alias_for(variable.reference()))
            }
            _ => String::new(),
        };

        Ok(format!("RETURN {}{}", target, alias))
    }
}

impl ToCypher for NodePattern {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        if self.node.labels().iter().any(|label| label.is_empty()) {
            return Err(CypherBuilderError::EmptyLabel);
        }
        let alias = context.alias_for(self.node.reference());
        if self.with_labels {
            Ok(format!("({}{})", alias, render_labels(self.node.labels())))
        } else {
            Ok(format!("({})", alias))
        }
    }
}

impl ToCypher for RelationshipPattern {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        let mut inner = String::new();
        if self.named {
            inner.push_str(&context.alias_for(self.relationship.reference()));
        }
        if let Some(rel_type) = self.relationship.rel_type() {
            if rel_type.is_empty() {
                return Err(CypherBuilderError::EmptyLabel);
            }
            inner.push(':');
            inner.push_str(&escape_name(rel_type));
        }
        Ok(match self.direction {
            Direction::Outgoing => format!("-[{}]->", inner),
            Direction::Incoming => format!("<-[{}]-", inner),
            Direction::Undirected => format!("-[{}]-", inner),
        })
    }
}

impl ToCypher for Pattern {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        let mut rendered = self.start.to_cypher(context)?;
        for (relationship, node) in &self.hops {
            rendered.push_str(&relationship.to_cypher(context)?);
            rendered.push_str(&node.to_cypher(context)?);
        }
        Ok(rendered)
    }
}

impl ToCypher for Reference {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        Ok(context.alias_for(self))
    }
}

impl ToCypher for Param {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        let name = context.param_name_for(self);
        if self.is_point() {
            Ok(format!("point(${})", name))
        } else {
            Ok(format!("${}", name))
        }
    }
}

impl ToCypher for Literal {
    fn to_cypher(&self, _context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        match self {
            Literal::Null => Ok("NULL".to_string()),
            Literal::Boolean(b) => Ok(b.to_string()),
            Literal::Integer(i) => Ok(i.to_string()),
            // Debug keeps the decimal point: 1.0 stays a float in Cypher.
            Literal::Float(f) if f.is_finite() => Ok(format!("{:?}", f)),
            Literal::Float(f) => Err(CypherBuilderError::NonFiniteLiteral(*f)),
        }
    }
}

impl ToCypher for PropertyAccess {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        let key = property_key(&self.key)?;
        Ok(format!("{}.{}", context.alias_for(&self.target), key))
    }
}

impl ToCypher for ProjectionField {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        match self {
            ProjectionField::Shorthand(field) => Ok(format!(".{}", property_key(field)?)),
            ProjectionField::Entry(key, value) => {
                let key = property_key(key)?;
                Ok(format!("{}: {}", key, value.to_cypher(context)?))
            }
        }
    }
}

impl ToCypher for MapProjection {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        let alias = context.alias_for(&self.target);
        let fields = render_all(&self.fields, context)?;
        Ok(format!("{} {{{}}}", alias, fields.join(", ")))
    }
}

impl ToCypher for Expr {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        match self {
            Expr::Literal(literal) => literal.to_cypher(context),
            Expr::Param(param) => param.to_cypher(context),
            Expr::Reference(reference) => reference.to_cypher(context),
            Expr::Property(property) => property.to_cypher(context),
            Expr::Function(function) => function.to_cypher(context),
            Expr::List(items) => Ok(format!("[{}]", render_all(items, context)?.join(", "))),
            Expr::Map(entries) => {
                let mut rendered = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = property_key(key)?;
                    rendered.push(format!("{}: {}", key, value.to_cypher(context)?));
                }
                Ok(format!("{{{}}}", rendered.join(", ")))
            }
            Expr::MapProjection(projection) => projection.to_cypher(context),
        }
    }
}

impl ToCypher for ScalarFunction {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        let args = match self {
            ScalarFunction::Coalesce {
                target,
                property,
                fallback,
            } => {
                let key = property_key(property)?;
                let alias = context.alias_for(target);
                vec![format!("{}.{}", alias, key), fallback.to_cypher(context)?]
            }
            ScalarFunction::Distance { source, point } => {
                let source = match source {
                    DistanceSource::Function(function) => function.to_cypher(context)?,
                    DistanceSource::Property(target, property) => {
                        let key = property_key(property)?;
                        format!("{}.{}", context.alias_for(target), key)
                    }
                };
                vec![source, point.to_cypher(context)?]
            }
            ScalarFunction::Collect(expr)
            | ScalarFunction::Count(expr)
            | ScalarFunction::Min(expr)
            | ScalarFunction::Max(expr)
            | ScalarFunction::Avg(expr)
            | ScalarFunction::Sum(expr)
            | ScalarFunction::Size(expr)
            | ScalarFunction::ToLower(expr)
            | ScalarFunction::ToUpper(expr) => vec![expr.to_cypher(context)?],
        };
        Ok(format!("{}({})", self.operation(), args.join(", ")))
    }
}

/// What a predicate renders as once single-operand groups are unwrapped.
fn effective(predicate: &Predicate) -> &Predicate {
    match predicate {
        Predicate::And(operands) | Predicate::Or(operands) if operands.len() == 1 => {
            effective(&operands[0])
        }
        _ => predicate,
    }
}

/// Operand of AND/OR; nested groups get parentheses.
fn render_operand(
    predicate: &Predicate,
    context: &mut CypherContext,
) -> Result<String, CypherBuilderError> {
    let rendered = predicate.to_cypher(context)?;
    match effective(predicate) {
        Predicate::And(operands) | Predicate::Or(operands) if operands.len() > 1 => {
            Ok(format!("({})", rendered))
        }
        _ => Ok(rendered),
    }
}

fn render_group(
    keyword: &'static str,
    operands: &[Predicate],
    context: &mut CypherContext,
) -> Result<String, CypherBuilderError> {
    match operands {
        [] => Err(CypherBuilderError::EmptyPredicateGroup(keyword)),
        [single] => single.to_cypher(context),
        _ => {
            let mut rendered = Vec::with_capacity(operands.len());
            for operand in operands {
                rendered.push(render_operand(operand, context)?);
            }
            let separator = format!(" {} ", keyword);
            Ok(rendered.join(separator.as_str()))
        }
    }
}

impl ToCypher for Predicate {
    fn to_cypher(&self, context: &mut CypherContext) -> Result<String, CypherBuilderError> {
        match self {
            Predicate::Comparison { operator, lhs, rhs } => {
                let lhs = lhs.to_cypher(context)?;
                let rhs = rhs.to_cypher(context)?;
                Ok(format!("{} {} {}", lhs, operator.symbol(), rhs))
            }
            Predicate::IsNull(expr) => Ok(format!("{} IS NULL", expr.to_cypher(context)?)),
            Predicate::IsNotNull(expr) => Ok(format!("{} IS NOT NULL", expr.to_cypher(context)?)),
            Predicate::And(operands) => render_group("AND", operands, context),
            Predicate::Or(operands) => render_group("OR", operands, context),
            Predicate::Not(inner) => Ok(format!("NOT ({})", inner.to_cypher(context)?)),
            Predicate::Exists(subquery) => {
                let body = render_subquery(subquery, context)?;
                Ok(format!("EXISTS {{\n{}\n}}", body))
            }
        }
    }
}
