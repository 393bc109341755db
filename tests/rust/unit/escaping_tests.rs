//! Names reaching the query text are quoted; values never reach it.

use cypher_builder::cypher_builder::{Expr, MatchClause, Query, ReferenceArena};
use cypher_builder::utils::cypher_escaping::escape_name;
use test_case::test_case;

#[test_case("title", "title" ; "plain key")]
#[test_case("release year", "`release year`" ; "space")]
#[test_case("a`b", "`a``b`" ; "backtick doubled")]
#[test_case("1st", "`1st`" ; "leading digit")]
#[test_case("x}) DETACH DELETE (y", "`x}) DETACH DELETE (y`" ; "injection attempt")]
fn test_escape_name(input: &str, expected: &str) {
    assert_eq!(escape_name(input), expected);
}

#[test_case(&["Person"], "(this:`Person`)" ; "single label")]
#[test_case(&["Person", "Resource"], "(this:`Person`:`Resource`)" ; "two labels")]
#[test_case(&["Bad`Label"], "(this:`Bad``Label`)" ; "backtick in label")]
#[test_case(&[], "(this)" ; "no labels")]
fn test_node_labels_in_match(labels: &[&str], expected_pattern: &str) {
    let mut arena = ReferenceArena::new();
    let node = arena.node(labels.iter().copied());

    let result = Query::new().match_(&node).build(&arena).unwrap();
    assert_eq!(result.cypher, format!("MATCH {}", expected_pattern));
}

#[test]
fn test_string_values_stay_out_of_the_text() {
    let mut arena = ReferenceArena::new();
    let person = arena.node(["Person"]);
    let hostile = arena.param("'}) DETACH DELETE (n) //");

    let result = Query::new()
        .match_(MatchClause::new(&person).where_(Expr::property(&person, "name").equals(&hostile)))
        .build(&arena)
        .unwrap();
    assert!(!result.cypher.contains("DETACH"));
    assert_eq!(result.cypher, "MATCH (this:`Person`)\nWHERE this.name = $param0");
}
