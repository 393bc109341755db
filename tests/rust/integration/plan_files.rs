use std::io::Write;

use cypher_builder::build_plan::{render_plan, BuildPlan, PlanError};
use cypher_builder::config::{BuilderConfig, CliConfig};
use serde_json::json;
use tempfile::Builder;

const MOVIES_JSON: &str = r#"{
  "entities": {
    "movie": { "kind": "node", "labels": ["Movie"] },
    "actor": { "kind": "node", "labels": ["Actor"] },
    "acted_in": { "kind": "relationship", "type": "ACTED_IN" },
    "actors": { "kind": "variable" }
  },
  "params": {
    "title": { "value": "The Matrix" }
  },
  "statements": [
    { "op": "match", "pattern": { "start": { "node": "movie" } },
      "where": { "compare": { "op": "eq",
        "lhs": { "property": { "of": "movie", "key": "title" } },
        "rhs": { "param": "title" } } } },
    { "op": "call", "statements": [
      { "op": "with", "items": [{ "expr": { "ref": "movie" } }] },
      { "op": "match", "pattern": {
          "start": { "node": "movie", "labels": false },
          "hops": [{ "relationship": "acted_in", "direction": "incoming", "to": { "node": "actor" } }] } },
      { "op": "return", "expr": { "call": { "function": "collect", "arg": { "ref": "actor" } } },
        "alias_variable": "actors" }
    ] },
    { "op": "return", "expr": { "projection": { "of": "movie", "fields": ["title"],
        "entries": { "actors": { "ref": "actors" } } } }, "alias": "this" }
  ]
}"#;

const EXPECTED_MOVIES: &str = "MATCH (this:`Movie`)\nWHERE this.title = $param0\n\
CALL { WITH this\nMATCH (this)<-[this0:ACTED_IN]-(this1:`Actor`)\nRETURN collect(this1) AS var2 }\n\
RETURN this {.title, actors: var2} AS this";

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_json_plan_file() {
    let file = write_temp(".json", MOVIES_JSON);
    let plan = BuildPlan::from_file(file.path()).unwrap();
    let result = render_plan(&plan, &BuilderConfig::default()).unwrap();

    assert_eq!(result.cypher, EXPECTED_MOVIES);
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({ "cypher": EXPECTED_MOVIES, "params": { "param0": "The Matrix" } })
    );
}

#[test]
fn test_yaml_plan_matches_json_plan() {
    let yaml = r#"
entities:
  movie: { kind: node, labels: [Movie] }
  actor: { kind: node, labels: [Actor] }
  acted_in: { kind: relationship, type: ACTED_IN }
  actors: { kind: variable }
params:
  title: { value: The Matrix }
statements:
  - op: match
    pattern: { start: { node: movie } }
    where:
      compare:
        op: eq
        lhs: { property: { of: movie, key: title } }
        rhs: { param: title }
  - op: call
    statements:
      - op: with
        items: [{ expr: { ref: movie } }]
      - op: match
        pattern:
          start: { node: movie, labels: false }
          hops:
            - { relationship: acted_in, direction: incoming, to: { node: actor } }
      - op: return
        expr: { call: { function: collect, arg: { ref: actor } } }
        alias_variable: actors
  - op: return
    expr:
      projection:
        of: movie
        fields: [title]
        entries: { actors: { ref: actors } }
    alias: this
"#;
    let file = write_temp(".yaml", yaml);
    let from_yaml = BuildPlan::from_file(file.path()).unwrap();
    let from_json = BuildPlan::from_json_str(MOVIES_JSON).unwrap();
    assert_eq!(from_yaml, from_json);

    let result = render_plan(&from_yaml, &BuilderConfig::default()).unwrap();
    assert_eq!(result.cypher, EXPECTED_MOVIES);
}

#[test]
fn test_plan_with_file_config_and_cli_override() {
    let config_file = write_temp(
        ".yaml",
        "alias_prefix: node\nvariable_prefix: tmp\nmax_subquery_depth: 4\n",
    );
    let mut config = BuilderConfig::from_yaml_file(config_file.path()).unwrap();
    config
        .merge_cli(&CliConfig {
            param_prefix: Some("p".to_string()),
            ..Default::default()
        })
        .unwrap();

    let plan = BuildPlan::from_json_str(MOVIES_JSON).unwrap();
    let result = render_plan(&plan, &config).unwrap();
    assert!(result.cypher.starts_with("MATCH (node:`Movie`)\nWHERE node.title = $p0"));
    assert!(result.cypher.contains("RETURN collect(node1) AS tmp2 }"));
}

#[test]
fn test_depth_limit_applies_to_plans() {
    let plan = BuildPlan::from_json_str(MOVIES_JSON).unwrap();
    let config = BuilderConfig {
        max_subquery_depth: 1,
        ..Default::default()
    };
    assert!(render_plan(&plan, &config).is_ok());

    let nested = json!({
        "entities": { "n": { "kind": "node", "labels": ["N"] } },
        "statements": [
            { "op": "call", "statements": [
                { "op": "call", "statements": [
                    { "op": "match", "pattern": { "start": { "node": "n" } } }
                ] }
            ] }
        ]
    });
    let plan: BuildPlan = serde_json::from_value(nested).unwrap();
    assert!(matches!(
        render_plan(&plan, &config),
        Err(PlanError::Build(_))
    ));
}

#[test]
fn test_missing_plan_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = BuildPlan::from_file(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, PlanError::Io(_)));
}

#[test]
fn test_malformed_plan() {
    let err = BuildPlan::from_json_str(r#"{ "statements": [{ "op": "drop_database" }] }"#)
        .unwrap_err();
    assert!(matches!(err, PlanError::Json(_)));
}
