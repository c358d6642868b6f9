use datomic_flare::ordered::OrderedMap;
use datomic_flare::schema::{datoms_to_specification, SchemaDatom};

#[test]
fn insert_keeps_the_first_position() {
    let mut map: OrderedMap<i64> = [("b", 1), ("a", 2), ("c", 3)].into_iter().collect();
    assert_eq!(map.insert("a", 20), Some(2));
    assert_eq!(map.keys().collect::<Vec<_>>(), ["b", "a", "c"]);
    assert_eq!(map.remove("b"), Some(1));
    assert_eq!(map.keys().collect::<Vec<_>>(), ["a", "c"]);
    assert!(map.contains_key("c"));
    *map.get_or_insert_with("d", || 0) += 4;
    assert_eq!(map.into_iter().collect::<Vec<_>>(), [("a".to_string(), 20), ("c".to_string(), 3), ("d".to_string(), 4)]);
}

#[test]
fn equality_ignores_order() {
    let left = OrderedMap::new().with("a", 1).with("b", 2);
    let right = OrderedMap::new().with("b", 2).with("a", 1);
    assert_eq!(left, right);
    assert_ne!(left, OrderedMap::new().with("a", 1));
}

#[test]
fn serde_keeps_the_order() {
    let map: OrderedMap<i64> = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).expect("valid map");
    assert_eq!(map.keys().collect::<Vec<_>>(), ["z", "a", "m"]);
    assert_eq!(serde_json::to_string(&map).expect("serializable"), r#"{"z":1,"a":2,"m":3}"#);
}

#[test]
fn large_namespaces_decode_in_row_order() {
    let datoms: Vec<SchemaDatom> = (0..20_000)
        .map(|i| SchemaDatom {
            entity: 100 + i,
            ident: format!("wide/attribute{}", i),
            value_type: "db.type/long".to_string(),
            cardinality: "db.cardinality/one".to_string(),
            doc: String::new(),
            unique: serde_json::Value::Bool(false),
            index: false,
            no_history: false,
        })
        .collect();
    let specification = datoms_to_specification(&datoms).expect("decodable");
    let wide = specification.get("wide").expect("namespace");
    assert_eq!(wide.len(), 20_000);
    assert_eq!(wide.keys().next(), Some("attribute0"));
    assert_eq!(wide.keys().last(), Some("attribute19999"));
}
