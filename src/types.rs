//! Two-way mapping between the DSL's type, cardinality and uniqueness tags
//! and Datomic's built-in idents (`:db.type/string`, `:db.cardinality/one`,
//! `:db.unique/identity`, ...).
//!
//! Decoding accepts idents with or without the leading colon, since
//! Flare returns them bare (`db.type/string`).

// used to keep the one-to-one mapping between tags and idents
use bimap::BiMap;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::error::{FlareError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Long,
    Boolean,
    Double,
    Instant,
    Keyword,
    Uuid,
    Ref,
    BigDec,
    BigInt,
    Uri,
    // the following are only ever read back from a database
    Bytes,
    Float,
    Symbol,
    Tuple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    One,
    Many,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unique {
    Value,
    Identity,
}

lazy_static::lazy_static! {
    static ref VALUE_TYPES: BiMap<ValueType, &'static str> = {
        let mut types = BiMap::new();
        types.insert(ValueType::String, ":db.type/string");
        types.insert(ValueType::Long, ":db.type/long");
        types.insert(ValueType::Boolean, ":db.type/boolean");
        types.insert(ValueType::Double, ":db.type/double");
        types.insert(ValueType::Instant, ":db.type/instant");
        types.insert(ValueType::Keyword, ":db.type/keyword");
        types.insert(ValueType::Uuid, ":db.type/uuid");
        types.insert(ValueType::Ref, ":db.type/ref");
        types.insert(ValueType::BigDec, ":db.type/bigdec");
        types.insert(ValueType::BigInt, ":db.type/bigint");
        types.insert(ValueType::Uri, ":db.type/uri");
        types
    };
    // decode only, these cannot be declared through a specification
    static ref READ_ONLY_VALUE_TYPES: Vec<(&'static str, ValueType)> = vec![
        (":db.type/bytes", ValueType::Bytes),
        (":db.type/float", ValueType::Float),
        (":db.type/symbol", ValueType::Symbol),
        (":db.type/tuple", ValueType::Tuple),
    ];
    static ref CARDINALITIES: BiMap<Cardinality, &'static str> = {
        let mut cardinalities = BiMap::new();
        cardinalities.insert(Cardinality::One, ":db.cardinality/one");
        cardinalities.insert(Cardinality::Many, ":db.cardinality/many");
        cardinalities
    };
    static ref UNIQUENESS: BiMap<Unique, &'static str> = {
        let mut uniqueness = BiMap::new();
        uniqueness.insert(Unique::Value, ":db.unique/value");
        uniqueness.insert(Unique::Identity, ":db.unique/identity");
        uniqueness
    };
}

fn with_colon(ident: &str) -> String {
    if ident.starts_with(':') {
        ident.to_string()
    } else {
        format!(":{}", ident)
    }
}

impl ValueType {
    pub fn to_datomic(self) -> Result<&'static str> {
        VALUE_TYPES
            .get_by_left(&self)
            .copied()
            .ok_or_else(|| FlareError::UnknownType(self.to_string()))
    }
    pub fn from_datomic(ident: &str) -> Result<Self> {
        let ident = with_colon(ident);
        VALUE_TYPES
            .get_by_right(ident.as_str())
            .copied()
            .or_else(|| {
                READ_ONLY_VALUE_TYPES
                    .iter()
                    .find(|(known, _)| *known == ident)
                    .map(|(_, value_type)| *value_type)
            })
            .ok_or(FlareError::UnknownType(ident))
    }
    pub fn tag(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Long => "long",
            Self::Boolean => "boolean",
            Self::Double => "double",
            Self::Instant => "instant",
            Self::Keyword => "keyword",
            Self::Uuid => "uuid",
            Self::Ref => "ref",
            Self::BigDec => "bigdec",
            Self::BigInt => "bigint",
            Self::Uri => "uri",
            Self::Bytes => "bytes",
            Self::Float => "float",
            Self::Symbol => "symbol",
            Self::Tuple => "tuple",
        }
    }
}

impl Cardinality {
    pub fn to_datomic(self) -> Result<&'static str> {
        CARDINALITIES
            .get_by_left(&self)
            .copied()
            .ok_or_else(|| FlareError::UnknownCardinality(format!("{:?}", self)))
    }
    pub fn from_datomic(ident: &str) -> Result<Self> {
        let ident = with_colon(ident);
        CARDINALITIES
            .get_by_right(ident.as_str())
            .copied()
            .ok_or(FlareError::UnknownCardinality(ident))
    }
}

impl Unique {
    pub fn to_datomic(self) -> Result<&'static str> {
        UNIQUENESS
            .get_by_left(&self)
            .copied()
            .ok_or_else(|| FlareError::UnknownUniqueness(format!("{:?}", self)))
    }
    pub fn from_datomic(ident: &str) -> Result<Self> {
        let ident = with_colon(ident);
        UNIQUENESS
            .get_by_right(ident.as_str())
            .copied()
            .ok_or(FlareError::UnknownUniqueness(ident))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for ValueType {
    type Err = FlareError;
    fn from_str(s: &str) -> Result<Self> {
        let tag = s.strip_prefix(':').unwrap_or(s);
        [
            Self::String, Self::Long, Self::Boolean, Self::Double, Self::Instant,
            Self::Keyword, Self::Uuid, Self::Ref, Self::BigDec, Self::BigInt, Self::Uri,
            Self::Bytes, Self::Float, Self::Symbol, Self::Tuple,
        ]
        .into_iter()
        .find(|value_type| value_type.tag() == tag)
        .ok_or_else(|| FlareError::UnknownType(s.to_string()))
    }
}

impl FromStr for Cardinality {
    type Err = FlareError;
    fn from_str(s: &str) -> Result<Self> {
        match s.strip_prefix(':').unwrap_or(s) {
            "one" => Ok(Self::One),
            "many" => Ok(Self::Many),
            _ => Err(FlareError::UnknownCardinality(s.to_string())),
        }
    }
}

impl FromStr for Unique {
    type Err = FlareError;
    fn from_str(s: &str) -> Result<Self> {
        match s.strip_prefix(':').unwrap_or(s) {
            "value" => Ok(Self::Value),
            "identity" => Ok(Self::Identity),
            _ => Err(FlareError::UnknownUniqueness(s.to_string())),
        }
    }
}
