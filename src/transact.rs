//! Assertions and retractions as EDN transaction data.
//!
//! Facts and retractions are ordered maps from attribute name to [`Value`].
//! Two keys are special: `_id` names an existing entity and
//! `_temporary_id` carries the placeholder given to a new one. Both are
//! written as `:db/id`; every other key is qualified with the namespace.

use tracing::debug;

use crate::datatype::{encode, keyword_name, EntityId, Value};
use crate::error::{FlareError, Result};
use crate::ordered::OrderedMap;

pub const ID_KEY: &str = "_id";
pub const TEMPORARY_ID_KEY: &str = "_temporary_id";

/// Values of n from -1 to -1000000, inclusive, are reserved for
/// user-created temporary ids.
pub const MAX_TEMPORARY_IDS: usize = 1_000_000;

pub type Fact = OrderedMap<Value>;
pub type Retraction = OrderedMap<Value>;

fn is_identity(attribute: &str) -> bool {
    attribute == ID_KEY || attribute == TEMPORARY_ID_KEY
}

fn entity_id(value: &Value) -> Option<EntityId> {
    match value {
        Value::Long(id) | Value::Ref(id) => Some(*id),
        _ => None,
    }
}

pub fn transactions_to_edn(namespace: &str, facts: &[Fact]) -> Result<String> {
    let namespace = keyword_name(namespace)?;
    let mut maps = Vec::with_capacity(facts.len());
    for fact in facts {
        let mut pairs = Vec::with_capacity(fact.len());
        for (attribute, value) in fact.iter() {
            let ident = if is_identity(attribute) {
                ":db/id".to_string()
            } else {
                format!(":{}/{}", namespace, keyword_name(attribute)?)
            };
            pairs.push(format!("{} {}", ident, encode(value)?));
        }
        maps.push(format!("{{{}}}", pairs.join("\n  ")));
    }
    Ok(format!("[{}]", maps.join("\n ")))
}

pub fn retractions_to_edn(namespace: &str, retractions: &[Retraction]) -> Result<String> {
    let namespace = keyword_name(namespace)?;
    let mut statements = Vec::new();
    for retraction in retractions {
        let id = retraction
            .get(ID_KEY)
            .ok_or_else(|| FlareError::MissingReference { type_name: "retraction".to_string() })?;
        let id = encode(id)?;
        let mut attributes = retraction.iter().filter(|(attribute, _)| *attribute != ID_KEY).peekable();
        if attributes.peek().is_none() {
            // Built-In Transaction Functions
            // https://docs.datomic.com/transactions/transaction-functions.html#built-in
            statements.push(format!("[:db/retractEntity {}]", id));
            continue;
        }
        for (attribute, value) in attributes {
            let attribute = keyword_name(attribute)?;
            if value.is_nil() {
                statements.push(format!("[:db/retract {} :{}/{}]", id, namespace, attribute));
            } else {
                statements.push(format!(
                    "[:db/retract {} :{}/{} {}]",
                    id, namespace, attribute, encode(value)?
                ));
            }
        }
    }
    Ok(format!("[{}]", statements.join("\n ")))
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    temporary: Option<EntityId>,
    resolved: Option<EntityId>,
}

/// Ordered record of which fact got which temporary id, built fresh for
/// every assertion and consumed once the transaction result is back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemporaryIds {
    slots: Vec<Slot>,
}

impl TemporaryIds {
    /// Gives every fact without an `_id` a temporary id, -1, -2, ... by
    /// position in `facts`.
    pub fn assign(facts: Vec<Fact>) -> Result<(Vec<Fact>, Self)> {
        let mut slots = Vec::with_capacity(facts.len());
        let mut assigned = Vec::with_capacity(facts.len());
        for (i, fact) in facts.into_iter().enumerate() {
            match fact.get(ID_KEY) {
                Some(id) => {
                    slots.push(Slot { temporary: None, resolved: entity_id(id) });
                    assigned.push(fact);
                }
                None => {
                    if i >= MAX_TEMPORARY_IDS {
                        return Err(FlareError::MalformedPayload(format!(
                            "more than {} new entities in one transaction",
                            MAX_TEMPORARY_IDS
                        )));
                    }
                    let temporary_id = -(i as EntityId + 1);
                    slots.push(Slot { temporary: Some(temporary_id), resolved: None });
                    assigned.push(fact.with(TEMPORARY_ID_KEY, Value::Long(temporary_id)));
                }
            }
        }
        Ok((assigned, Self { slots }))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Resolves against the `tempids` table of a transact response
    /// (`{"-1": 17592186045430, ...}`), in the order of the input facts.
    /// Temporary ids missing from the table stay `None`.
    pub fn resolve(mut self, tempids: &serde_json::Value) -> Result<Vec<Option<EntityId>>> {
        let table = match tempids {
            serde_json::Value::Object(table) => table,
            serde_json::Value::Null => return Ok(self.into_resolved()),
            other => return Err(FlareError::Decode(format!("tempids is not a map: {}", other))),
        };
        for (temporary_id, entity_id) in table {
            let temporary_id = temporary_id
                .parse::<EntityId>()
                .map_err(|_| FlareError::Decode(format!("temporary id {}", temporary_id)))?;
            let entity_id = entity_id
                .as_i64()
                .ok_or_else(|| FlareError::Decode(format!("entity id {}", entity_id)))?;
            for slot in self.slots.iter_mut().filter(|slot| slot.temporary == Some(temporary_id)) {
                slot.resolved = Some(entity_id);
            }
        }
        let resolved = self.into_resolved();
        debug!(
            facts = resolved.len(),
            unresolved = resolved.iter().filter(|id| id.is_none()).count(),
            "resolved temporary ids"
        );
        Ok(resolved)
    }

    fn into_resolved(self) -> Vec<Option<EntityId>> {
        self.slots.into_iter().map(|slot| slot.resolved).collect()
    }
}
