use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CypherBuilderError {
    #[error("CREATE requires at least one label on the created node")]
    MissingLabels,

    #[error("Labels and relationship types cannot be empty strings")]
    EmptyLabel,

    #[error("SET clause is empty (must assign at least one property)")]
    EmptySetClause,

    #[error("WITH clause is empty (use WITH * to carry every variable)")]
    EmptyWithClause,

    #[error("ORDER BY clause is empty (must contain at least one sort item)")]
    EmptyOrderBy,

    #[error("{0} predicate group has no operands")]
    EmptyPredicateGroup(&'static str),

    #[error("Property key cannot be empty")]
    EmptyPropertyKey,

    #[error("Literal {0} cannot be inlined; bind it as a parameter")]
    NonFiniteLiteral(f64),

    #[error("Subquery nesting depth {depth} exceeds the configured maximum of {max}")]
    SubqueryTooDeep { depth: usize, max: usize },
}
