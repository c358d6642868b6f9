//! Dangerous overrides: database selector fields forced onto every
//! outgoing payload.
//!
//! Where the fields land depends on the shape of the operation:
//! * transact: only `name`, under `connection.database`;
//! * entity and datoms: `name`, `as_of` and `latest`, under `database`;
//! * q: the same fields, into the first input that holds a `database`;
//! * everything else is left alone.
//!
//! Setting `as_of` drops a `latest` already in the payload and setting
//! `latest` drops an `as_of`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{FlareError, Result};
use crate::transport::Operation;

/// Point in time a database value is read at: a basis `t` or an instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Basis {
    T(i64),
    Instant(DateTime<Utc>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<Basis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<bool>,
}

impl DatabaseOverride {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.as_of.is_none() && self.latest.is_none()
    }

    fn merge_into(&self, selector: &mut Map<String, Value>) {
        if self.as_of.is_some() {
            selector.remove("latest");
        }
        if self.latest.is_some() {
            selector.remove("as_of");
        }
        if let Some(name) = &self.name {
            selector.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(as_of) = &self.as_of {
            let as_of = match as_of {
                Basis::T(t) => Value::from(*t),
                Basis::Instant(instant) => Value::String(instant.to_rfc3339()),
            };
            selector.insert("as_of".to_string(), as_of);
        }
        if let Some(latest) = self.latest {
            selector.insert("latest".to_string(), Value::Bool(latest));
        }
    }
}

/// Fixed for the lifetime of a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverridePolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseOverride>,
}

impl OverridePolicy {
    pub fn new(database: DatabaseOverride) -> Self {
        Self { database: Some(database) }
    }

    /// Returns the payload as it must be sent for `operation`. The payload
    /// passed in is never modified.
    pub fn apply(&self, operation: Operation, payload: Option<&Value>) -> Result<Option<Value>> {
        match operation {
            Operation::CreateDatabase
            | Operation::DeleteDatabase
            | Operation::GetDatabaseNames
            | Operation::ListDatabases
            | Operation::Meta => Ok(payload.cloned()),
            Operation::Transact => self.inject_connection(payload),
            Operation::Entity | Operation::Datoms => self.inject_database(payload),
            Operation::Q => self.inject_into_inputs(payload),
        }
    }

    /// Same as [`apply`](Self::apply) for a raw operation path.
    pub fn apply_to_path(&self, path: &str, payload: Option<&Value>) -> Result<Option<Value>> {
        self.apply(path.parse()?, payload)
    }

    fn selector(&self) -> Option<&DatabaseOverride> {
        self.database.as_ref().filter(|database| !database.is_empty())
    }

    fn inject_connection(&self, payload: Option<&Value>) -> Result<Option<Value>> {
        let name = match self.database.as_ref().and_then(|database| database.name.as_ref()) {
            Some(name) => name,
            None => return Ok(payload.cloned()),
        };
        debug!(operation = "transact", "applying connection override");
        let mut shaped = object_or_empty(payload)?;
        let database = child_object(child_object(&mut shaped, "connection")?, "database")?;
        database.insert("name".to_string(), Value::String(name.clone()));
        Ok(Some(Value::Object(shaped)))
    }

    fn inject_database(&self, payload: Option<&Value>) -> Result<Option<Value>> {
        let selector = match self.selector() {
            Some(selector) => selector,
            None => return Ok(payload.cloned()),
        };
        debug!(operation = "database", "applying database override");
        let mut shaped = object_or_empty(payload)?;
        selector.merge_into(child_object(&mut shaped, "database")?);
        Ok(Some(Value::Object(shaped)))
    }

    fn inject_into_inputs(&self, payload: Option<&Value>) -> Result<Option<Value>> {
        let selector = match self.selector() {
            Some(selector) => selector,
            None => return Ok(payload.cloned()),
        };
        debug!(operation = "q", "applying database override to inputs");
        let mut shaped = object_or_empty(payload)?;
        let input = shaped
            .get_mut("inputs")
            .and_then(Value::as_array_mut)
            .and_then(|inputs| {
                inputs
                    .iter_mut()
                    .find(|input| input.get("database").is_some())
            })
            .ok_or_else(|| {
                FlareError::MalformedPayload("query has no input with a database".to_string())
            })?;
        let database = input
            .get_mut("database")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| {
                FlareError::MalformedPayload("query database input is not a map".to_string())
            })?;
        selector.merge_into(database);
        Ok(Some(Value::Object(shaped)))
    }
}

fn object_or_empty(payload: Option<&Value>) -> Result<Map<String, Value>> {
    match payload {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(FlareError::MalformedPayload(format!("payload is not a map: {}", other))),
    }
}

// Creates the nested map when it is missing.
fn child_object<'a>(parent: &'a mut Map<String, Value>, key: &str) -> Result<&'a mut Map<String, Value>> {
    parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| FlareError::MalformedPayload(format!("'{}' is not a map", key)))
}
