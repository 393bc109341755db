//! Properties every build must hold: deterministic names, identity-based
//! allocation, no alias collisions, and a complete parameter table.

use std::collections::HashSet;

use cypher_builder::config::{BuilderConfig, CliConfig};
use cypher_builder::cypher_builder::scalar_functions::collect;
use cypher_builder::cypher_builder::{
    Expr, MatchClause, NodePattern, Pattern, Predicate, Query, ReferenceArena,
    RelationshipPattern, ReturnClause, WithItem,
};
use serde_json::json;
use test_case::test_case;

/// A query mixing nodes, relationships, variables and params at two depths.
fn sample_query(arena: &mut ReferenceArena) -> Query {
    let movie = arena.node(["Movie"]);
    let actor = arena.node(["Actor"]);
    let acted_in = arena.relationship(Some("ACTED_IN"));
    let title = arena.param("Matrix");
    let born = arena.param(1964);
    let actors = arena.variable();

    let subquery = Query::new()
        .with([WithItem::from(&movie)])
        .match_(
            MatchClause::new(
                Pattern::node(NodePattern::bound(&movie))
                    .related(RelationshipPattern::incoming(&acted_in), &actor),
            )
            .where_(Expr::property(&actor, "born").gt(&born)),
        )
        .return_(ReturnClause::expr(collect(&actor)).alias(&actors));

    Query::new()
        .match_(MatchClause::new(&movie).where_(Expr::property(&movie, "title").equals(&title)))
        .call(subquery)
        .return_(ReturnClause::projection(&movie, ["title"]))
        .into()
}

#[test]
fn test_rendering_is_deterministic() {
    let mut arena = ReferenceArena::new();
    let query = sample_query(&mut arena);

    let first = query.build(&arena).unwrap();
    let second = query.build(&arena).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_same_shape_in_fresh_arenas_renders_identically() {
    let mut first_arena = ReferenceArena::new();
    let mut second_arena = ReferenceArena::new();
    let first = sample_query(&mut first_arena).build(&first_arena).unwrap();
    let second = sample_query(&mut second_arena).build(&second_arena).unwrap();
    assert_eq!(first.cypher, second.cypher);
    assert_eq!(first.params, second.params);
}

#[test]
fn test_equal_values_get_distinct_params() {
    let mut arena = ReferenceArena::new();
    let person = arena.node(["Person"]);
    let first = arena.param("same");
    let second = arena.param("same");

    let result = Query::new()
        .match_(MatchClause::new(&person).where_(Predicate::or([
            Expr::property(&person, "name").equals(&first),
            Expr::property(&person, "alias").equals(&second),
            Expr::property(&person, "nick").equals(&first),
        ])))
        .build(&arena)
        .unwrap();

    assert_eq!(
        result.cypher,
        "MATCH (this:`Person`)\nWHERE this.name = $param0 OR this.alias = $param1 OR this.nick = $param0"
    );
    assert_eq!(result.params.len(), 2);
}

#[test]
fn test_same_labels_get_distinct_aliases() {
    let mut arena = ReferenceArena::new();
    let a = arena.node(["Person"]);
    let b = arena.node(["Person"]);
    let knows = arena.relationship(Some("KNOWS"));

    let result = Query::new()
        .match_(Pattern::node(&a).related(RelationshipPattern::outgoing(&knows), &b))
        .build(&arena)
        .unwrap();
    assert_eq!(
        result.cypher,
        "MATCH (this:`Person`)-[this0:KNOWS]->(this1:`Person`)"
    );
}

#[test]
fn test_every_rendered_param_is_bound() {
    let mut arena = ReferenceArena::new();
    let query = sample_query(&mut arena);
    let result = query.build(&arena).unwrap();

    for name in result.params.keys() {
        assert!(result.cypher.contains(&format!("${}", name)), "{} is unused", name);
    }
    let mentioned = result.cypher.matches("$param").count();
    assert_eq!(mentioned, result.params.len());
    assert_eq!(result.params["param0"], json!("Matrix"));
    assert_eq!(result.params["param1"], json!(1964));
}

#[test]
fn test_aliases_do_not_collide() {
    let mut arena = ReferenceArena::new();
    let nodes: Vec<_> = (0..12).map(|_| arena.node(["N"])).collect();
    let vars: Vec<_> = (0..4).map(|_| arena.variable()).collect();

    let mut context = arena.context();
    let mut seen = HashSet::new();
    for node in &nodes {
        assert!(seen.insert(context.alias_for(&node.into())));
    }
    for var in &vars {
        assert!(seen.insert(context.alias_for(&var.into())));
    }
    assert_eq!(seen.len(), 16);
    assert_eq!(context.alias_count(), 16);
}

#[test_case("this", "var", "param" ; "defaults")]
#[test_case("n", "v", "p" ; "short prefixes")]
#[test_case("node_", "tmp_", "arg_" ; "underscored prefixes")]
fn test_configured_prefixes(alias: &str, variable: &str, param: &str) {
    let mut arena = ReferenceArena::new();
    let movie = arena.node(["Movie"]);
    let other = arena.node(["Movie"]);
    let titles = arena.variable();
    let title = arena.param("x");

    let config = BuilderConfig {
        alias_prefix: alias.to_string(),
        variable_prefix: variable.to_string(),
        param_prefix: param.to_string(),
        ..Default::default()
    };
    let result = Query::new()
        .match_(MatchClause::new(&movie).where_(Expr::property(&movie, "title").equals(&title)))
        .match_(&other)
        .with([WithItem::aliased(collect(&other), &titles)])
        .build_with_config(&arena, &config)
        .unwrap();

    assert_eq!(
        result.cypher,
        format!(
            "MATCH ({a}:`Movie`)\nWHERE {a}.title = ${p}0\nMATCH ({a}0:`Movie`)\nWITH collect({a}0) AS {v}1",
            a = alias,
            p = param,
            v = variable
        )
    );
}

#[test]
fn test_parallel_builds_are_independent() {
    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let mut arena = ReferenceArena::new();
                    let query = sample_query(&mut arena);
                    query.build(&arena).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for result in &results[1..] {
        assert_eq!(result, &results[0]);
    }
}

#[test]
#[should_panic(expected = "belongs to build")]
fn test_foreign_reference_panics() {
    let mut arena = ReferenceArena::new();
    let mut other = ReferenceArena::new();
    let stranger = other.node(["Person"]);
    let _ = arena.node(["Person"]);

    let _ = Query::new().match_(&stranger).build(&arena);
}

#[test_case("n", "n0" ; "variable extends alias")]
#[test_case("this0", "this" ; "alias extends variable")]
#[test_case("this", "this12" ; "multi digit suffix")]
fn test_colliding_prefix_pairs_are_rejected(alias: &str, variable: &str) {
    let cli = CliConfig {
        alias_prefix: Some(alias.to_string()),
        variable_prefix: Some(variable.to_string()),
        ..Default::default()
    };
    assert!(BuilderConfig::from_cli(cli).is_err());
}

#[test_case("n", "n" ; "same prefix")]
#[test_case("n", "n_0" ; "underscore suffix")]
#[test_case("node", "nodes" ; "letter suffix")]
fn test_accepted_prefix_pairs_never_collide(alias: &str, variable: &str) {
    let config = BuilderConfig::from_cli(CliConfig {
        alias_prefix: Some(alias.to_string()),
        variable_prefix: Some(variable.to_string()),
        ..Default::default()
    })
    .unwrap();

    let mut arena = ReferenceArena::new();
    let vars: Vec<_> = (0..15).map(|_| arena.variable()).collect();
    let nodes: Vec<_> = (0..15).map(|_| arena.node(["N"])).collect();

    // Interleave kinds, starting with a variable so it takes the bare name.
    let mut context = arena.context_with_config(&config);
    let mut seen = HashSet::new();
    for (var, node) in vars.iter().zip(&nodes) {
        assert!(seen.insert(context.alias_for(&var.into())));
        assert!(seen.insert(context.alias_for(&node.into())));
    }
    assert_eq!(seen.len(), 30);
}
