use datomic_flare::config::ClientConfig;
use datomic_flare::dsl::Mode;
use datomic_flare::ordered::OrderedMap;
use datomic_flare::overrides::{Basis, DatabaseOverride, OverridePolicy};
use datomic_flare::schema::{Attribute, Specification, QUERY};
use datomic_flare::transport::{Method, Request};
use datomic_flare::types::ValueType;
use datomic_flare::{Client, Value};
use serde_json::json;

const MOVIE_QUERY: &str = "[:find ?e ?title ?year ?genre
 :in $ ?title
 :where [?e :movie/title ?title]
        [?e :movie/release_year ?year]
        [?e :movie/genre ?genre]]";

fn setup() -> Client {
    datomic_flare::new(ClientConfig::new("://")).expect("client")
}

fn setup_purple() -> Client {
    let policy = OverridePolicy::new(DatabaseOverride {
        name: Some("purple".to_string()),
        as_of: Some(Basis::T(13_194_139_534_323)),
        latest: None,
    });
    datomic_flare::new(ClientConfig::new("://").with_override(policy)).expect("client")
}

fn post_schema() -> Specification {
    OrderedMap::new().with("post", OrderedMap::new().with("title", Attribute::new(ValueType::String)))
}

const POST_SCHEMA_EDN: &str = "[{:db/ident       :post/title
  :db/valueType   :db.type/string
  :db/cardinality :db.cardinality/one}]";

#[test]
fn database_management() {
    let flare = setup();
    let dsl = flare.dsl();
    assert_eq!(
        dsl.create_database_request("supernova").expect("request").to_json(),
        json!({ "method": "POST", "url": "://datomic/create-database", "body": { "name": "supernova" } })
    );
    assert_eq!(
        dsl.destroy_database_request("supernova").expect("request").to_json(),
        json!({ "method": "DELETE", "url": "://datomic/delete-database", "body": { "name": "supernova" } })
    );
    assert_eq!(
        dsl.databases_request(Mode::Peer).expect("request").to_json(),
        json!({ "method": "GET", "url": "://datomic/get-database-names" })
    );
    assert_eq!(
        dsl.databases_request(Mode::Client).expect("request").to_json(),
        json!({ "method": "GET", "url": "://datomic/list-databases" })
    );
    assert_eq!(flare.meta_request().expect("request").url, "://meta");
}

#[test]
fn schema_requests() {
    let flare = setup();
    let request = flare.dsl().transact_schema_request(&post_schema(), None).expect("request");
    assert_eq!(
        request,
        Request { method: Method::Post, url: "://datomic/transact".to_string(), body: Some(json!({ "data": POST_SCHEMA_EDN })) }
    );
    let request = flare.dsl().schema_request(None).expect("request");
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url, "://datomic/q");
    assert_eq!(request.body, Some(json!({ "inputs": [{ "database": { "latest": true } }], "query": QUERY })));
}

#[test]
fn named_database() {
    let flare = setup();
    let dsl = flare.dsl();
    assert_eq!(
        dsl.transact_schema_request(&post_schema(), Some("purple")).expect("request").body,
        Some(json!({ "data": POST_SCHEMA_EDN, "connection": { "database": { "name": "purple" } } }))
    );
    assert_eq!(
        dsl.schema_request(Some("purple")).expect("request").body,
        Some(json!({ "inputs": [{ "database": { "latest": true, "name": "purple" } }], "query": QUERY }))
    );
    assert_eq!(
        dsl.find_by_entity_id_request(17_592_186_045_430, Some("purple")).expect("request").body,
        Some(json!({ "database": { "latest": true, "name": "purple" }, "id": 17_592_186_045_430_i64 }))
    );
}

#[test]
fn assertions() {
    let flare = setup();
    let dsl = flare.dsl();
    let post = OrderedMap::new().with("title", Value::from("Hello World"));
    let request = dsl.assert_into_request("post", post.clone(), Some("purple")).expect("request");
    assert_eq!(
        request.body,
        Some(json!({
            "data": "[{:post/title \"Hello World\"\n  :db/id -1}]",
            "connection": { "database": { "name": "purple" } }
        }))
    );

    let posts = vec![post, OrderedMap::new().with("title", Value::from("Spring Update"))];
    let request = dsl.assert_into_request("post", posts, None).expect("request");
    assert_eq!(
        request.body,
        Some(json!({
            "data": "[{:post/title \"Hello World\"\n  :db/id -1}\n {:post/title \"Spring Update\"\n  :db/id -2}]"
        }))
    );

    let existing = OrderedMap::new()
        .with("_id", Value::from(17_592_186_045_429_i64))
        .with("title", Value::from("Hello World"));
    let request = dsl.assert_into_request("post", existing, None).expect("request");
    assert_eq!(
        request.body,
        Some(json!({ "data": "[{:db/id 17592186045429\n  :post/title \"Hello World\"}]" }))
    );
}

#[test]
fn retractions() {
    let flare = setup();
    let retraction = OrderedMap::new()
        .with("_id", Value::from(17_592_186_045_429_i64))
        .with("title", Value::Nil);
    let request = flare.dsl().retract_from_request("post", retraction, None).expect("request");
    assert_eq!(request.url, "://datomic/transact");
    assert_eq!(request.body, Some(json!({ "data": "[[:db/retract 17592186045429 :post/title]]" })));
}

#[test]
fn queries() {
    let flare = setup();
    let request = flare
        .dsl()
        .query_request(&format!("\n{}\n", MOVIE_QUERY), Some(vec![json!("Commando")]), None)
        .expect("request");
    assert_eq!(
        request.body,
        Some(json!({ "inputs": [{ "database": { "latest": true } }, "Commando"], "query": MOVIE_QUERY }))
    );
    let request = flare.dsl().find_by_entity_id_request(17_592_186_045_430, None).expect("request");
    assert_eq!(
        request.to_json(),
        json!({
            "method": "GET",
            "url": "://datomic/entity",
            "body": { "database": { "latest": true }, "id": 17_592_186_045_430_i64 }
        })
    );
}

#[test]
fn overridden_dsl_requests() {
    let flare = setup_purple();
    let database = flare.dangerously_override().database.as_ref().expect("override");
    assert_eq!(database.name.as_deref(), Some("purple"));
    assert!(setup().dangerously_override().database.is_none());
    let dsl = flare.dsl();
    let purple_input = json!({ "database": { "name": "purple", "as_of": 13_194_139_534_323_i64 } });
    assert_eq!(
        dsl.transact_schema_request(&post_schema(), None).expect("request").body,
        Some(json!({ "data": POST_SCHEMA_EDN, "connection": { "database": { "name": "purple" } } }))
    );
    assert_eq!(
        dsl.schema_request(None).expect("request").body,
        Some(json!({ "inputs": [purple_input.clone()], "query": QUERY }))
    );
    assert_eq!(
        dsl.query_request(MOVIE_QUERY, Some(vec![json!("Commando")]), None).expect("request").body,
        Some(json!({ "inputs": [purple_input.clone(), "Commando"], "query": MOVIE_QUERY }))
    );
    assert_eq!(
        dsl.find_by_entity_id_request(17_592_186_045_430, Some("green")).expect("request").body,
        Some(json!({ "database": purple_input["database"].clone(), "id": 17_592_186_045_430_i64 }))
    );
    let retraction = OrderedMap::new().with("_id", Value::from(17_592_186_045_429_i64)).with("title", Value::Nil);
    assert_eq!(
        dsl.retract_from_request("post", retraction, None).expect("request").body,
        Some(json!({
            "data": "[[:db/retract 17592186045429 :post/title]]",
            "connection": { "database": { "name": "purple" } }
        }))
    );
}

#[test]
fn overridden_api_requests() {
    let flare = setup_purple();
    let api = flare.api();
    let request = api
        .transact_request(json!({ "data": "[{:post/title \"Hello World\" :db/id -1}]" }))
        .expect("request");
    assert_eq!(
        request.to_json(),
        json!({
            "method": "POST",
            "url": "://datomic/transact",
            "body": {
                "connection": { "database": { "name": "purple" } },
                "data": "[{:post/title \"Hello World\" :db/id -1}]"
            }
        })
    );
    let request = api
        .q_request(json!({ "inputs": [{ "database": { "latest": true } }, "Commando"], "query": MOVIE_QUERY }))
        .expect("request");
    assert_eq!(
        request.body,
        Some(json!({
            "inputs": [{ "database": { "name": "purple", "as_of": 13_194_139_534_323_i64 } }, "Commando"],
            "query": MOVIE_QUERY
        }))
    );
    let request = api
        .entity_request(json!({ "database": { "latest": true }, "id": 17_592_186_045_430_i64 }))
        .expect("request");
    assert_eq!(
        request.body,
        Some(json!({
            "database": { "name": "purple", "as_of": 13_194_139_534_323_i64 },
            "id": 17_592_186_045_430_i64
        }))
    );
    // no database input to override
    assert!(api.q_request(json!({ "inputs": ["Commando"], "query": MOVIE_QUERY })).is_err());
}

#[test]
fn api_requests_pass_payloads_through() {
    let flare = setup();
    let api = flare.api();
    let payload = json!({ "database": { "latest": true }, "index": "eavt", "a": ":movie/title" });
    let request = api.datoms_request(payload.clone()).expect("request");
    assert_eq!(request.url, "://datomic/datoms");
    assert_eq!(request.body, Some(payload));
    assert_eq!(api.get_database_names_request().expect("request").body, None);
}
