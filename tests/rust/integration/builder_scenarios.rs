use cypher_builder::cypher_builder::scalar_functions::{coalesce, collect, count, distance_of};
use cypher_builder::cypher_builder::{
    CypherBuilderError, Expr, MatchClause, NodePattern, OrderItem, Pattern, Predicate,
    ProjectionField, Query, ReferenceArena, RelationshipPattern, ReturnClause, WithItem,
};
use serde_json::json;

#[test]
fn test_create_person_and_return_projection() {
    let mut arena = ReferenceArena::new();
    let person = arena.node(["Person"]);
    let name = arena.param("Ada");

    let result = Query::new()
        .create(&person, [("name", &name)])
        .return_entity(&person, &["name"], Some("person"))
        .build(&arena)
        .unwrap();

    assert_eq!(
        result.cypher,
        "CREATE (this:`Person`)\nSET this.name = $param0\nRETURN this {.name} AS person"
    );
    assert_eq!(serde_json::to_value(&result.params).unwrap(), json!({"param0": "Ada"}));
}

#[test]
fn test_same_label_entities_in_one_return() {
    let mut arena = ReferenceArena::new();
    let author = arena.node(["Person"]);
    let reviewer = arena.node(["Person"]);
    let reviewed = arena.relationship(Some("REVIEWED"));

    let result = Query::new()
        .match_(Pattern::node(&author).related(
            RelationshipPattern::outgoing(&reviewed).anonymous(),
            &reviewer,
        ))
        .return_(ReturnClause::expr(Expr::List(vec![
            Expr::map_projection(&author, ["name"]),
            Expr::map_projection(&reviewer, ["name"]),
        ])))
        .build(&arena)
        .unwrap();

    assert_eq!(
        result.cypher,
        "MATCH (this:`Person`)-[:REVIEWED]->(this0:`Person`)\nRETURN [this {.name}, this0 {.name}]"
    );
}

#[test]
fn test_call_reuses_outer_parameter_name() {
    let mut arena = ReferenceArena::new();
    let movie = arena.node(["Movie"]);
    let actor = arena.node(["Actor"]);
    let acted_in = arena.relationship(Some("ACTED_IN"));
    let year = arena.param(1999);
    let total = arena.variable();

    let subquery = Query::new()
        .with([WithItem::from(&movie)])
        .match_(
            MatchClause::new(
                Pattern::node(NodePattern::bound(&movie))
                    .related(RelationshipPattern::incoming(&acted_in).anonymous(), &actor),
            )
            .where_(Expr::property(&actor, "debut").lte(&year)),
        )
        .return_(ReturnClause::expr(count(&actor)).alias(&total));

    let result = Query::new()
        .match_(MatchClause::new(&movie).where_(Expr::property(&movie, "released").equals(&year)))
        .call(subquery)
        .return_(ReturnClause::expr(Expr::map_projection(
            &movie,
            vec![
                ProjectionField::from("title"),
                ProjectionField::Entry("actorCount".to_string(), Expr::reference(&total)),
            ],
        )))
        .build(&arena)
        .unwrap();

    assert_eq!(
        result.cypher,
        "MATCH (this:`Movie`)\nWHERE this.released = $param0\n\
         CALL { WITH this\nMATCH (this)<-[:ACTED_IN]-(this0:`Actor`)\nWHERE this0.debut <= $param0\nRETURN count(this0) AS var1 }\n\
         RETURN this {.title, actorCount: var1}"
    );
    assert_eq!(result.params.len(), 1);
    assert_eq!(result.params["param0"], json!(1999));
}

#[test]
fn test_exists_filter_on_linked_property() {
    let mut arena = ReferenceArena::new();
    let work = arena.node(["frbr__Work", "Resource"]);
    let title_rel = arena.relationship(Some("dcterms__title"));
    let title = arena.node(["dcterms_title", "property"]);
    let needle = arena.param("0777");
    let offset = arena.param(0);
    let limit = arena.param(10);

    let exists = Query::new().match_(
        MatchClause::new(
            Pattern::node(NodePattern::bound(&work))
                .related(RelationshipPattern::outgoing(&title_rel).anonymous(), &title),
        )
        .where_(Expr::property(&title, "value").contains(&needle)),
    );

    let result = Query::new()
        .match_(MatchClause::new(&work).where_(Predicate::exists(exists)))
        .with_all()
        .skip(&offset)
        .limit(&limit)
        .return_entity(&work, &["iri"], Some("this"))
        .build(&arena)
        .unwrap();

    assert_eq!(
        result.cypher,
        "MATCH (this:`frbr__Work`:`Resource`)\n\
         WHERE EXISTS {\nMATCH (this)-[:dcterms__title]->(this0:`dcterms_title`:`property`)\nWHERE this0.value CONTAINS $param0\n}\n\
         WITH *\nSKIP $param1\nLIMIT $param2\n\
         RETURN this {.iri} AS this"
    );
    let names: Vec<_> = result.params.keys().cloned().collect();
    assert_eq!(names, ["param0", "param1", "param2"]);
}

#[test]
fn test_sort_by_distance_from_point() {
    let mut arena = ReferenceArena::new();
    let place = arena.node(["Place"]);
    let here = arena.point_param(json!({"longitude": 13.4, "latitude": 52.5}));
    let names = arena.variable();

    let result = Query::new()
        .match_(&place)
        .order_by([OrderItem::asc(distance_of(
            coalesce(&place, "location", Expr::null()),
            &here,
        ))])
        .with([WithItem::aliased(collect(Expr::property(&place, "name")), &names)])
        .return_(ReturnClause::expr(&names).alias("names"))
        .build(&arena)
        .unwrap();

    assert_eq!(
        result.cypher,
        "MATCH (this:`Place`)\nORDER BY distance(coalesce(this.location, NULL), point($param0)) ASC\n\
         WITH collect(this.name) AS var0\nRETURN var0 AS names"
    );
    assert_eq!(result.params["param0"]["longitude"], json!(13.4));
}

#[test]
fn test_failed_build_returns_no_text() {
    let mut arena = ReferenceArena::new();
    let movie = arena.node(["Movie"]);

    let result = Query::new()
        .match_(MatchClause::new(&movie).where_(Predicate::And(vec![])))
        .return_(ReturnClause::entity(&movie))
        .build(&arena);
    assert_eq!(result, Err(CypherBuilderError::EmptyPredicateGroup("AND")));

    let nan = Query::new()
        .match_(MatchClause::new(&movie).where_(Expr::property(&movie, "rating").gt(f64::NAN)))
        .build(&arena);
    assert!(matches!(nan, Err(CypherBuilderError::NonFiniteLiteral(_))));
}
