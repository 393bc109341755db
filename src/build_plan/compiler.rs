//! Turns a [`BuildPlan`] into a [`Query`] over a fresh [`ReferenceArena`].

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::config::BuilderConfig;
use crate::cypher_builder::expressions::Literal;
use crate::cypher_builder::scalar_functions::{self, ScalarFunction};
use crate::cypher_builder::{
    CypherResult, Direction, Expr, MatchClause, NodePattern, NodeRef, OrderItem, Param, Pattern,
    Predicate, ProjectionField, Query, Reference, ReferenceArena, RelationshipPattern,
    RelationshipRef, ReturnClause, VariableRef, WithItem,
};

use super::errors::PlanError;
use super::{
    BuildPlan, EntityDecl, PlanExpr, PlanNode, PlanPattern, PlanPredicate, PlanStatement,
    PlanWithItem,
};

/// A plan resolved into builder objects, ready to render.
#[derive(Debug)]
pub struct CompiledPlan {
    arena: ReferenceArena,
    query: Query,
}

impl CompiledPlan {
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn arena(&self) -> &ReferenceArena {
        &self.arena
    }

    pub fn build(&self, config: &BuilderConfig) -> Result<CypherResult, PlanError> {
        Ok(self.query.build_with_config(&self.arena, config)?)
    }
}

pub fn compile(plan: &BuildPlan) -> Result<CompiledPlan, PlanError> {
    let mut arena = ReferenceArena::new();
    let scope = Scope::declare(plan, &mut arena)?;
    let query = scope.statements(&plan.statements)?;
    log::debug!(
        "compiled plan: {} entities, {} params, {} statements",
        plan.entities.len(),
        plan.params.len(),
        plan.statements.len()
    );
    Ok(CompiledPlan { arena, query })
}

/// Plan names bound to arena references.
#[derive(Default)]
struct Scope {
    nodes: HashMap<String, NodeRef>,
    relationships: HashMap<String, RelationshipRef>,
    variables: HashMap<String, VariableRef>,
    params: HashMap<String, Param>,
}

impl Scope {
    fn declare(plan: &BuildPlan, arena: &mut ReferenceArena) -> Result<Self, PlanError> {
        let mut scope = Scope::default();

        // Sorted so arena indexes do not depend on map iteration order.
        let mut entity_names: Vec<&String> = plan.entities.keys().collect();
        entity_names.sort();
        for name in entity_names {
            match &plan.entities[name] {
                EntityDecl::Node { labels } => {
                    scope.nodes.insert(name.clone(), arena.node(labels.iter().cloned()));
                }
                EntityDecl::Relationship { rel_type } => {
                    scope
                        .relationships
                        .insert(name.clone(), arena.relationship(rel_type.as_deref()));
                }
                EntityDecl::Variable => {
                    scope.variables.insert(name.clone(), arena.variable());
                }
            }
        }

        let mut param_names: Vec<&String> = plan.params.keys().collect();
        param_names.sort();
        for name in param_names {
            if plan.entities.contains_key(name) {
                return Err(PlanError::DuplicateName(name.clone()));
            }
            let decl = &plan.params[name];
            let param = if decl.point {
                arena.point_param(decl.value.clone())
            } else {
                arena.param(decl.value.clone())
            };
            scope.params.insert(name.clone(), param);
        }

        Ok(scope)
    }

    fn node(&self, name: &str) -> Result<&NodeRef, PlanError> {
        self.nodes.get(name).ok_or_else(|| unknown("node", name, "entities"))
    }

    fn relationship(&self, name: &str) -> Result<&RelationshipRef, PlanError> {
        self.relationships
            .get(name)
            .ok_or_else(|| unknown("relationship", name, "entities"))
    }

    fn variable(&self, name: &str) -> Result<&VariableRef, PlanError> {
        self.variables
            .get(name)
            .ok_or_else(|| unknown("variable", name, "entities"))
    }

    fn param(&self, name: &str) -> Result<&Param, PlanError> {
        self.params.get(name).ok_or_else(|| unknown("param", name, "params"))
    }

    /// Any alias-bearing entity.
    fn reference(&self, name: &str) -> Result<Reference, PlanError> {
        if let Some(node) = self.nodes.get(name) {
            return Ok(node.into());
        }
        if let Some(relationship) = self.relationships.get(name) {
            return Ok(relationship.into());
        }
        if let Some(variable) = self.variables.get(name) {
            return Ok(variable.into());
        }
        Err(unknown("entity", name, "entities"))
    }

    fn statements(&self, statements: &[PlanStatement]) -> Result<Query, PlanError> {
        let mut query = Query::new();
        for (index, statement) in statements.iter().enumerate() {
            if let PlanStatement::Return { .. } = statement {
                if index + 1 != statements.len() {
                    return Err(PlanError::StatementAfterReturn { index: index + 1 });
                }
            }
            query = self.statement(query, statement)?;
        }
        Ok(query)
    }

    fn statement(&self, query: Query, statement: &PlanStatement) -> Result<Query, PlanError> {
        let query = match statement {
            PlanStatement::Create { node, properties } => {
                query.create(self.node(node)?, self.properties(properties)?)
            }
            PlanStatement::Match {
                pattern,
                optional,
                predicate,
            } => {
                let mut clause = MatchClause::new(self.pattern(pattern)?);
                if *optional {
                    clause = clause.optional();
                }
                if let Some(predicate) = predicate {
                    clause = clause.where_(self.predicate(predicate)?);
                }
                query.match_(clause)
            }
            PlanStatement::Call { statements } => query.call(self.statements(statements)?),
            PlanStatement::WithAll => query.with_all(),
            PlanStatement::With { items } => {
                let items = items
                    .iter()
                    .map(|item| self.with_item(item))
                    .collect::<Result<Vec<_>, _>>()?;
                query.with(items)
            }
            PlanStatement::Set { target, properties } => {
                query.set(&self.reference(target)?, self.properties(properties)?)
            }
            PlanStatement::OrderBy { items } => {
                let items = items
                    .iter()
                    .map(|item| {
                        Ok(OrderItem {
                            expr: self.expr(&item.expr)?,
                            direction: item.direction,
                        })
                    })
                    .collect::<Result<Vec<_>, PlanError>>()?;
                query.order_by(items)
            }
            PlanStatement::Skip { param } => query.skip(self.param(param)?),
            PlanStatement::Limit { param } => query.limit(self.param(param)?),
            PlanStatement::Return {
                entity,
                fields,
                expr,
                alias,
                alias_variable,
            } => {
                let mut clause = match (entity, expr) {
                    (Some(_), Some(_)) => {
                        return Err(PlanError::InvalidReturn(
                            "'entity' and 'expr' are mutually exclusive".to_string(),
                        ))
                    }
                    (Some(entity), None) => {
                        ReturnClause::projection(&self.reference(entity)?, fields.iter().cloned())
                    }
                    (None, Some(expr)) if fields.is_empty() => ReturnClause::expr(self.expr(expr)?),
                    (None, None) if fields.is_empty() => ReturnClause::all(),
                    (None, _) => {
                        return Err(PlanError::InvalidReturn(
                            "'fields' needs an 'entity'".to_string(),
                        ))
                    }
                };
                clause = match (alias, alias_variable) {
                    (Some(_), Some(_)) => {
                        return Err(PlanError::InvalidReturn(
                            "'alias' and 'alias_variable' are mutually exclusive".to_string(),
                        ))
                    }
                    (Some(alias), None) => clause.alias(alias.as_str()),
                    (None, Some(variable)) => clause.alias(self.variable(variable)?),
                    (None, None) => clause,
                };
                Query::from(query.return_(clause))
            }
        };
        Ok(query)
    }

    fn with_item(&self, item: &PlanWithItem) -> Result<WithItem, PlanError> {
        let expr = self.expr(&item.expr)?;
        Ok(match &item.alias {
            Some(alias) => WithItem::aliased(expr, self.variable(alias)?),
            None => WithItem::new(expr),
        })
    }

    fn node_pattern(&self, node: &PlanNode) -> Result<NodePattern, PlanError> {
        let node_ref = self.node(&node.node)?;
        Ok(if node.labels {
            NodePattern::new(node_ref)
        } else {
            NodePattern::bound(node_ref)
        })
    }

    fn pattern(&self, pattern: &PlanPattern) -> Result<Pattern, PlanError> {
        let mut compiled = Pattern::node(self.node_pattern(&pattern.start)?);
        for hop in &pattern.hops {
            let relationship = self.relationship(&hop.relationship)?;
            let mut edge = match hop.direction {
                Direction::Outgoing => RelationshipPattern::outgoing(relationship),
                Direction::Incoming => RelationshipPattern::incoming(relationship),
                Direction::Undirected => RelationshipPattern::undirected(relationship),
            };
            if !hop.named {
                edge = edge.anonymous();
            }
            compiled = compiled.related(edge, self.node_pattern(&hop.to)?);
        }
        Ok(compiled)
    }

    /// Property maps keep their key order, which is the rendered SET order.
    fn properties(&self, properties: &Map<String, Value>) -> Result<Vec<(String, Expr)>, PlanError> {
        properties
            .iter()
            .map(|(key, value)| Ok((key.clone(), self.expr(&embedded_expr(key, value)?)?)))
            .collect()
    }

    fn expr(&self, expr: &PlanExpr) -> Result<Expr, PlanError> {
        Ok(match expr {
            PlanExpr::Param(name) => Expr::Param(self.param(name)?.clone()),
            PlanExpr::Ref(name) => Expr::Reference(self.reference(name)?),
            PlanExpr::Property { of, key } => Expr::property(&self.reference(of)?, key.as_str()),
            PlanExpr::Literal(value) => Expr::Literal(literal(value)?),
            PlanExpr::List(items) => Expr::List(
                items
                    .iter()
                    .map(|item| self.expr(item))
                    .collect::<Result<_, _>>()?,
            ),
            PlanExpr::Projection {
                of,
                fields,
                entries,
            } => {
                let mut projected: Vec<ProjectionField> =
                    fields.iter().cloned().map(ProjectionField::Shorthand).collect();
                for (key, value) in entries {
                    let value = self.expr(&embedded_expr(key, value)?)?;
                    projected.push(ProjectionField::Entry(key.clone(), value));
                }
                Expr::map_projection(&self.reference(of)?, projected)
            }
            PlanExpr::Coalesce { of, key, fallback } => {
                Expr::from(scalar_functions::coalesce(
                    &self.reference(of)?,
                    key.as_str(),
                    self.expr(fallback)?,
                ))
            }
            PlanExpr::Distance { source, point } => {
                let point = self.param(point)?;
                match source.as_ref() {
                    PlanExpr::Property { of, key } => {
                        Expr::from(scalar_functions::distance(&self.reference(of)?, key.as_str(), point))
                    }
                    other => match self.expr(other)? {
                        Expr::Function(function) => {
                            Expr::from(scalar_functions::distance_of(*function, point))
                        }
                        _ => {
                            return Err(PlanError::InvalidExpression(
                                "distance source must be a property or a function".to_string(),
                            ))
                        }
                    },
                }
            }
            PlanExpr::Call { function, arg } => Expr::from(call(function, self.expr(arg)?)?),
        })
    }

    fn predicate(&self, predicate: &PlanPredicate) -> Result<Predicate, PlanError> {
        Ok(match predicate {
            PlanPredicate::Compare { op, lhs, rhs } => {
                Predicate::compare(*op, self.expr(lhs)?, self.expr(rhs)?)
            }
            PlanPredicate::IsNull(expr) => self.expr(expr)?.is_null(),
            PlanPredicate::IsNotNull(expr) => self.expr(expr)?.is_not_null(),
            PlanPredicate::And(operands) => Predicate::And(self.predicates(operands)?),
            PlanPredicate::Or(operands) => Predicate::Or(self.predicates(operands)?),
            PlanPredicate::Not(inner) => Predicate::not(self.predicate(inner)?),
            PlanPredicate::Exists(statements) => Predicate::exists(self.statements(statements)?),
        })
    }

    fn predicates(&self, operands: &[PlanPredicate]) -> Result<Vec<Predicate>, PlanError> {
        operands.iter().map(|operand| self.predicate(operand)).collect()
    }
}

fn unknown(kind: &'static str, name: &str, section: &'static str) -> PlanError {
    PlanError::UnknownReference {
        kind,
        name: name.to_string(),
        section,
    }
}

fn embedded_expr(key: &str, value: &Value) -> Result<PlanExpr, PlanError> {
    serde_json::from_value(value.clone())
        .map_err(|e| PlanError::InvalidExpression(format!("'{}': {}", key, e)))
}

fn literal(value: &Value) -> Result<Literal, PlanError> {
    match value {
        Value::Null => Ok(Literal::Null),
        Value::Bool(b) => Ok(Literal::Boolean(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Literal::Integer(i))
            } else if n.is_f64() {
                n.as_f64()
                    .map(Literal::Float)
                    .ok_or_else(|| PlanError::InlineValue(n.to_string()))
            } else {
                // Integers past i64 would lose precision as floats.
                Err(PlanError::InlineValue(n.to_string()))
            }
        }
        other => Err(PlanError::InlineValue(other.to_string())),
    }
}

fn call(function: &str, arg: Expr) -> Result<ScalarFunction, PlanError> {
    Ok(match function {
        "collect" => scalar_functions::collect(arg),
        "count" => scalar_functions::count(arg),
        "min" => scalar_functions::min(arg),
        "max" => scalar_functions::max(arg),
        "avg" => scalar_functions::avg(arg),
        "sum" => scalar_functions::sum(arg),
        "size" => scalar_functions::size(arg),
        "toLower" => scalar_functions::to_lower(arg),
        "toUpper" => scalar_functions::to_upper(arg),
        other => return Err(PlanError::UnknownFunction(other.to_string())),
    })
}
