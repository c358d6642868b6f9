//! The data-structure DSL: schemas, facts and queries instead of EDN.
//!
//! `database: Some(name)` targets a named database; reads default to the
//! latest value of it. As with [`Api`](crate::api::Api), every operation has
//! a `*_request` twin for inspecting the request it would send.

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::client::{response_data, Client};
use crate::datatype::EntityId;
use crate::error::Result;
use crate::ordered::OrderedMap;
use crate::reshape::value_to_nested;
use crate::schema::{self, Specification};
use crate::transact::{self, Fact, Retraction, TemporaryIds};
use crate::transport::Request;

/// A single item or a list of them. Results keep the shape of the input.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Self::One(_))
    }

    // a single item collapses back to its only result
    fn collapse(one: bool, mut results: Vec<T>) -> Self {
        if one && results.len() == 1 {
            if let Some(result) = results.pop() {
                return Self::One(result);
            }
        }
        Self::Many(results)
    }
}

impl<V> From<OrderedMap<V>> for OneOrMany<OrderedMap<V>> {
    fn from(item: OrderedMap<V>) -> Self {
        Self::One(item)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Many(items)
    }
}

/// Which listing endpoint to use: peers list names, servers list databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Peer,
    Client,
}

impl Mode {
    pub fn from_meta(mode: &str) -> Self {
        if mode == "peer" { Self::Peer } else { Self::Client }
    }
}

pub struct Dsl<'a> {
    client: &'a Client,
}

fn database_input(database: Option<&str>) -> Value {
    let mut input = Map::new();
    input.insert("latest".to_string(), Value::Bool(true));
    if let Some(name) = database {
        input.insert("name".to_string(), Value::String(name.to_string()));
    }
    Value::Object(input)
}

fn transact_payload(data: String, database: Option<&str>) -> Value {
    let mut payload = json!({ "data": data });
    if let Some(name) = database {
        payload["connection"] = json!({ "database": { "name": name } });
    }
    payload
}

impl<'a> Dsl<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn create_database_request(&self, name: &str) -> Result<Request> {
        self.client.api().create_database_request(json!({ "name": name }))
    }
    pub fn create_database(&self, name: &str) -> Result<Value> {
        response_data(self.client.send(&self.create_database_request(name)?)?)
    }

    pub fn destroy_database_request(&self, name: &str) -> Result<Request> {
        self.client.api().delete_database_request(json!({ "name": name }))
    }
    pub fn destroy_database(&self, name: &str) -> Result<Value> {
        response_data(self.client.send(&self.destroy_database_request(name)?)?)
    }

    pub fn databases_request(&self, mode: Mode) -> Result<Request> {
        match mode {
            Mode::Peer => self.client.api().get_database_names_request(),
            Mode::Client => self.client.api().list_databases_request(),
        }
    }
    /// Without a mode, the server's `meta` decides.
    pub fn databases(&self, mode: Option<Mode>) -> Result<Value> {
        let mode = match mode {
            Some(mode) => mode,
            None => {
                let meta = self.client.meta()?;
                Mode::from_meta(meta["meta"]["mode"].as_str().unwrap_or_default())
            }
        };
        response_data(self.client.send(&self.databases_request(mode)?)?)
    }

    pub fn transact_schema_request(&self, specification: &Specification, database: Option<&str>) -> Result<Request> {
        let data = schema::specification_to_edn(specification)?;
        self.client.api().transact_request(transact_payload(data, database))
    }
    pub fn transact_schema(&self, specification: &Specification, database: Option<&str>) -> Result<()> {
        info!(namespaces = specification.len(), "transacting schema");
        self.client.send(&self.transact_schema_request(specification, database)?)?;
        Ok(())
    }

    pub fn schema_request(&self, database: Option<&str>) -> Result<Request> {
        self.client.api().q_request(json!({
            "inputs": [{ "database": database_input(database) }],
            "query": schema::QUERY,
        }))
    }
    pub fn schema(&self, database: Option<&str>) -> Result<Specification> {
        let data = response_data(self.client.send(&self.schema_request(database)?)?)?;
        schema::specification_from_response(&data)
    }

    fn prepare_assert(
        &self,
        namespace: &str,
        facts: Vec<Fact>,
        database: Option<&str>,
    ) -> Result<(Request, TemporaryIds)> {
        let (facts, temporary_ids) = TemporaryIds::assign(facts)?;
        let data = transact::transactions_to_edn(namespace, &facts)?;
        let request = self.client.api().transact_request(transact_payload(data, database))?;
        Ok((request, temporary_ids))
    }

    pub fn assert_into_request(
        &self,
        namespace: &str,
        facts: impl Into<OneOrMany<Fact>>,
        database: Option<&str>,
    ) -> Result<Request> {
        let (request, _) = self.prepare_assert(namespace, facts.into().into_vec(), database)?;
        Ok(request)
    }

    /// Asserts the facts and returns the entity id of each, in input order.
    /// New entities get their permanent id from the transaction's tempids.
    pub fn assert_into(
        &self,
        namespace: &str,
        facts: impl Into<OneOrMany<Fact>>,
        database: Option<&str>,
    ) -> Result<OneOrMany<Option<EntityId>>> {
        let facts = facts.into();
        let one = facts.is_one();
        let (request, temporary_ids) = self.prepare_assert(namespace, facts.into_vec(), database)?;
        info!(namespace, facts = temporary_ids.len(), "asserting facts");
        let data = response_data(self.client.send(&request)?)?;
        let ids = temporary_ids.resolve(&data["tempids"])?;
        Ok(OneOrMany::collapse(one, ids))
    }

    /// Asserts the facts and returns the transact response untouched.
    pub fn assert_into_raw(
        &self,
        namespace: &str,
        facts: impl Into<OneOrMany<Fact>>,
        database: Option<&str>,
    ) -> Result<Value> {
        self.client.send(&self.assert_into_request(namespace, facts, database)?)
    }

    pub fn retract_from_request(
        &self,
        namespace: &str,
        retractions: impl Into<OneOrMany<Retraction>>,
        database: Option<&str>,
    ) -> Result<Request> {
        let data = transact::retractions_to_edn(namespace, &retractions.into().into_vec())?;
        self.client.api().transact_request(transact_payload(data, database))
    }
    pub fn retract_from(
        &self,
        namespace: &str,
        retractions: impl Into<OneOrMany<Retraction>>,
        database: Option<&str>,
    ) -> Result<()> {
        info!(namespace, "retracting");
        self.client.send(&self.retract_from_request(namespace, retractions, database)?)?;
        Ok(())
    }

    /// The database is always the first input, `params` follow it.
    pub fn query_request(&self, datalog: &str, params: Option<Vec<Value>>, database: Option<&str>) -> Result<Request> {
        let mut inputs = vec![json!({ "database": database_input(database) })];
        inputs.extend(params.unwrap_or_default());
        self.client.api().q_request(json!({
            "inputs": inputs,
            "query": datalog.trim(),
        }))
    }
    pub fn query(&self, datalog: &str, params: Option<Vec<Value>>, database: Option<&str>) -> Result<Value> {
        response_data(self.client.send(&self.query_request(datalog, params, database)?)?)
    }

    pub fn find_by_entity_id_request(&self, id: EntityId, database: Option<&str>) -> Result<Request> {
        self.client.api().entity_request(json!({
            "database": database_input(database),
            "id": id,
        }))
    }
    /// `None` when the entity has no attributes.
    pub fn find_by_entity_id(&self, id: EntityId, database: Option<&str>) -> Result<Option<Value>> {
        let data = response_data(self.client.send(&self.find_by_entity_id_request(id, database)?)?)?;
        let entity = value_to_nested(&data);
        debug!(id, found = entity.is_some(), "entity lookup");
        Ok(entity)
    }
}
