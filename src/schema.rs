//! Schema specifications and their EDN transaction form.
//!
//! A [`Specification`] maps namespaces to attributes to [`Attribute`]
//! options. [`specification_to_edn`] writes one `:db/ident` map per
//! attribute; [`datoms_to_specification`] reads the rows of [`QUERY`] back
//! into the same shape, leaving out Datomic's own namespaces.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::datatype::{encode_string, keyword_name, EntityId};
use crate::error::{FlareError, Result};
use crate::ordered::OrderedMap;
use crate::types::{Cardinality, Unique, ValueType};

/// Introspection query listing every installed attribute.
pub const QUERY: &str = r#"[:find
    ?e ?ident ?value_type ?cardinality ?doc
    ?unique ?index ?no_history
 :in $
 :where
   [?e :db/ident ?ident]

   [?e :db/valueType ?value_type_id]
   [?value_type_id :db/ident ?value_type]

   [?e :db/cardinality ?cardinality_id]
   [?cardinality_id :db/ident ?cardinality]

   [(get-else $ ?e :db/doc "") ?doc]

   [(get-else $ ?e :db/unique -1) ?unique_id]
   [(get-else $ ?unique_id :db/ident false) ?unique]

   [(get-else $ ?e :db/index false) ?index]
   [(get-else $ ?e :db/noHistory false) ?no_history]]
"#;

/// Namespaces installed by Datomic itself.
pub const NON_SCHEMA_NAMESPACES: [&str; 15] = [
    "db",
    "db.alter", "db.attr", "db.bootstrap", "db.cardinality", "db.entity", "db.excise",
    "db.fn", "db.install", "db.lang", "db.part", "db.sys", "db.type", "db.unique",
    "fressian",
];

pub type Specification = OrderedMap<OrderedMap<Attribute>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default, with = "unique_or_false")]
    pub unique: Option<Unique>,
    #[serde(default)]
    pub index: bool,
    #[serde(default = "keep_history")]
    pub history: bool,
}

fn keep_history() -> bool {
    true
}

impl Attribute {
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            cardinality: Cardinality::One,
            doc: None,
            unique: None,
            index: false,
            history: true,
        }
    }
    pub fn cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
    pub fn unique(mut self, unique: Unique) -> Self {
        self.unique = Some(unique);
        self
    }
    pub fn indexed(mut self) -> Self {
        self.index = true;
        self
    }
    pub fn without_history(mut self) -> Self {
        self.history = false;
        self
    }
}

// A missing uniqueness constraint reads and writes as `false`.
mod unique_or_false {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::types::Unique;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Column {
        Unique(Unique),
        Flag(bool),
    }

    pub fn serialize<S: Serializer>(unique: &Option<Unique>, serializer: S) -> Result<S::Ok, S::Error> {
        match unique {
            Some(unique) => unique.serialize(serializer),
            None => serializer.serialize_bool(false),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Unique>, D::Error> {
        match Option::<Column>::deserialize(deserializer)? {
            Some(Column::Unique(unique)) => Ok(Some(unique)),
            Some(Column::Flag(false)) | None => Ok(None),
            Some(Column::Flag(true)) => Err(serde::de::Error::custom(
                "unique must be `value`, `identity` or false",
            )),
        }
    }
}

/// One row of [`QUERY`]:
/// `[entity, ident, value-type, cardinality, doc, unique, index, no-history]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchemaDatom {
    pub entity: EntityId,
    pub ident: String,
    pub value_type: String,
    pub cardinality: String,
    pub doc: String,
    pub unique: serde_json::Value,
    pub index: bool,
    pub no_history: bool,
}

impl SchemaDatom {
    /// Splits the ident into namespace and attribute name.
    pub fn split_ident(&self) -> Result<(&str, &str)> {
        let ident = self.ident.strip_prefix(':').unwrap_or(&self.ident);
        ident
            .split_once('/')
            .ok_or_else(|| FlareError::InvalidIdent(self.ident.clone()))
    }

    fn unique(&self) -> Result<Option<Unique>> {
        match &self.unique {
            serde_json::Value::String(ident) => Unique::from_datomic(ident).map(Some),
            serde_json::Value::Bool(false) | serde_json::Value::Null => Ok(None),
            other => Err(FlareError::UnknownUniqueness(other.to_string())),
        }
    }
}

pub fn is_schema_namespace(namespace: &str) -> bool {
    !NON_SCHEMA_NAMESPACES.contains(&namespace)
}

pub fn specification_to_edn(specification: &Specification) -> Result<String> {
    let mut maps = Vec::new();
    for (namespace, attributes) in specification.iter() {
        let namespace = keyword_name(namespace)?;
        for (i, (attribute, options)) in attributes.iter().enumerate() {
            let attribute = keyword_name(attribute)?;
            // the first map of each namespace starts flush
            let indent = if i == 0 { "" } else { " " };
            let mut fields = vec![
                format!("{}{{:db/ident       :{}/{}", indent, namespace, attribute),
                format!(":db/valueType   {}", options.value_type.to_datomic()?),
                format!(":db/cardinality {}", options.cardinality.to_datomic()?),
            ];
            if let Some(doc) = &options.doc {
                fields.push(format!(":db/doc         {}", encode_string(doc)));
            }
            if let Some(unique) = options.unique {
                fields.push(format!(":db/unique      {}", unique.to_datomic()?));
            }
            if options.index {
                fields.push(":db/index       true".to_string());
            }
            if !options.history {
                fields.push(":db/noHistory   true".to_string());
            }
            maps.push(format!("{}}}", fields.join("\n  ")));
        }
    }
    Ok(format!("[{}]", maps.join("\n\n")))
}

pub fn datoms_to_specification(datoms: &[SchemaDatom]) -> Result<Specification> {
    let mut specification = Specification::new();
    let mut kept = 0;
    for datom in datoms {
        let (namespace, attribute) = match datom.split_ident() {
            Ok(split) => split,
            // idents without a namespace can only be Datomic's own
            Err(_) => continue,
        };
        if !is_schema_namespace(namespace) {
            continue;
        }
        let options = Attribute {
            value_type: ValueType::from_datomic(&datom.value_type)?,
            cardinality: Cardinality::from_datomic(&datom.cardinality)?,
            doc: if datom.doc.is_empty() { None } else { Some(datom.doc.clone()) },
            unique: datom.unique()?,
            index: datom.index,
            history: !datom.no_history,
        };
        specification
            .get_or_insert_with(namespace, OrderedMap::new)
            .insert(attribute, options);
        kept += 1;
    }
    debug!(rows = datoms.len(), kept, "decoded schema datoms");
    Ok(specification)
}

/// Decodes the `data` of a schema query response.
pub fn specification_from_response(data: &serde_json::Value) -> Result<Specification> {
    let datoms = Vec::<SchemaDatom>::deserialize(data)?;
    datoms_to_specification(&datoms)
}
