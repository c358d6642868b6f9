//! Raw access to Flare's endpoints: JSON payload in, decoded JSON out.
//!
//! Each endpoint has a `*_request` twin returning the shaped request
//! without sending it.

use serde_json::Value;

use crate::client::Client;
use crate::error::Result;
use crate::transport::{Operation, Request};

pub struct Api<'a> {
    client: &'a Client,
}

impl<'a> Api<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn create_database(&self, payload: Value) -> Result<Value> {
        self.client.dispatch(Operation::CreateDatabase, Some(payload))
    }
    pub fn create_database_request(&self, payload: Value) -> Result<Request> {
        self.client.request(Operation::CreateDatabase, Some(payload))
    }

    pub fn delete_database(&self, payload: Value) -> Result<Value> {
        self.client.dispatch(Operation::DeleteDatabase, Some(payload))
    }
    pub fn delete_database_request(&self, payload: Value) -> Result<Request> {
        self.client.request(Operation::DeleteDatabase, Some(payload))
    }

    pub fn transact(&self, payload: Value) -> Result<Value> {
        self.client.dispatch(Operation::Transact, Some(payload))
    }
    pub fn transact_request(&self, payload: Value) -> Result<Request> {
        self.client.request(Operation::Transact, Some(payload))
    }

    pub fn entity(&self, payload: Value) -> Result<Value> {
        self.client.dispatch(Operation::Entity, Some(payload))
    }
    pub fn entity_request(&self, payload: Value) -> Result<Request> {
        self.client.request(Operation::Entity, Some(payload))
    }

    pub fn datoms(&self, payload: Value) -> Result<Value> {
        self.client.dispatch(Operation::Datoms, Some(payload))
    }
    pub fn datoms_request(&self, payload: Value) -> Result<Request> {
        self.client.request(Operation::Datoms, Some(payload))
    }

    pub fn get_database_names(&self) -> Result<Value> {
        self.client.dispatch(Operation::GetDatabaseNames, None)
    }
    pub fn get_database_names_request(&self) -> Result<Request> {
        self.client.request(Operation::GetDatabaseNames, None)
    }

    pub fn list_databases(&self) -> Result<Value> {
        self.client.dispatch(Operation::ListDatabases, None)
    }
    pub fn list_databases_request(&self) -> Result<Request> {
        self.client.request(Operation::ListDatabases, None)
    }

    pub fn q(&self, payload: Value) -> Result<Value> {
        self.client.dispatch(Operation::Q, Some(payload))
    }
    pub fn q_request(&self, payload: Value) -> Result<Request> {
        self.client.request(Operation::Q, Some(payload))
    }
}
