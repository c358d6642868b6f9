//! Reshapes flat entity results into the nested DSL form.
//!
//! `{":movie/title": "Repo Man", ":db/id": 17592186045430}` becomes
//! `{"movie": {"title": "Repo Man", "_id": 17592186045430}}`. Nested maps
//! (component and referenced entities) are reshaped the same way but are
//! not wrapped in their namespace.

use serde_json::{Map, Value};

/// Keys that carry the entity id. A bare `id` is accepted at every depth.
pub const IDENTITY_KEYS: [&str; 2] = [":db/id", "id"];

fn is_identity(key: &str) -> bool {
    IDENTITY_KEYS.contains(&key)
}

/// Returns `None` when the entity has nothing besides its id.
pub fn entity_to_nested(entity: &Map<String, Value>) -> Option<Value> {
    let key = entity.keys().find(|key| !is_identity(key))?;
    let namespace = namespace_of(key);
    let mut wrapped = Map::new();
    wrapped.insert(namespace.to_string(), Value::Object(keys_to_nested(entity)));
    Some(Value::Object(wrapped))
}

/// Same as [`entity_to_nested`] for a raw response value; anything that is
/// not a map reshapes to `None`.
pub fn value_to_nested(entity: &Value) -> Option<Value> {
    entity.as_object().and_then(entity_to_nested)
}

fn namespace_of(key: &str) -> &str {
    let namespace = key.split('/').next().unwrap_or(key);
    namespace.strip_prefix(':').unwrap_or(namespace)
}

fn attribute_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

fn keys_to_nested(entity: &Map<String, Value>) -> Map<String, Value> {
    entity
        .iter()
        .map(|(key, value)| {
            let key = if is_identity(key) { "_id" } else { attribute_of(key) };
            let value = match value {
                Value::Object(nested) => Value::Object(keys_to_nested(nested)),
                other => other.clone(),
            };
            (key.to_string(), value)
        })
        .collect()
}
