// used for instants
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
// used for decimal numbers
use bigdecimal::BigDecimal;
// used for integers beyond i64
use num_bigint::BigInt;
// used to validate keyword names before they are written out
use regex::Regex;

use crate::error::{FlareError, Result};

/// Identifier of an existing entity, or a temporary id inside a transaction.
pub type EntityId = i64;

/// Instants are always written in UTC with millisecond precision. The
/// fractional part is truncated, never rounded.
pub const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

lazy_static::lazy_static! {
    static ref KEYWORD: Regex = Regex::new(r"^[A-Za-z0-9*+!_?<>=.\-][A-Za-z0-9*+!_?<>=.:#/\-]*$").unwrap();
}

/// A value that can be written into EDN transaction data.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Long(i64),
    BigInt(BigInt),
    Double(f64),
    BigDec(BigDecimal),
    Boolean(bool),
    Instant(DateTime<Utc>),
    Keyword(String),
    Vector(Vec<Value>),
    Nil,
    Ref(EntityId),
}

impl Value {
    pub fn keyword(name: impl Into<String>) -> Self {
        Self::Keyword(name.into())
    }
    pub fn reference(id: EntityId) -> Self {
        Self::Ref(id)
    }
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Long(_) => "long",
            Self::BigInt(_) => "bigint",
            Self::Double(_) => "double",
            Self::BigDec(_) => "bigdec",
            Self::Boolean(_) => "boolean",
            Self::Instant(_) => "instant",
            Self::Keyword(_) => "keyword",
            Self::Vector(_) => "vector",
            Self::Nil => "nil",
            Self::Ref(_) => "ref",
        }
    }
    pub fn to_edn(&self) -> Result<String> {
        encode(self)
    }
}

/// Writes a single value as an EDN literal.
pub fn encode(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(encode_string(s)),
        Value::Long(n) => Ok(n.to_string()),
        Value::BigInt(n) => Ok(n.to_string()),
        Value::Double(d) => encode_double(*d),
        Value::BigDec(d) => Ok(encode_bigdec(d)),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Instant(t) => Ok(encode_instant(t)),
        Value::Keyword(k) => Ok(format!(":{}", keyword_name(k)?)),
        Value::Vector(items) => {
            let encoded = items.iter().map(encode).collect::<Result<Vec<_>>>()?;
            Ok(format!("[{}]", encoded.join(" ")))
        }
        Value::Nil => Ok("nil".to_string()),
        Value::Ref(id) => Ok(format!("{{:db/id {}}}", id)),
    }
}

/// Only `"` and `\` are escaped, everything else is written as is.
pub fn encode_string(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len() + 2);
    encoded.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            encoded.push('\\');
        }
        encoded.push(c);
    }
    encoded.push('"');
    encoded
}

pub fn encode_instant(t: &DateTime<Utc>) -> String {
    format!("#inst \"{}\"", t.format(INSTANT_FORMAT))
}

// Shortest round-trip digits, with the exponent form used below 1e-4 and
// from 1e16 upwards (e.g. 1.7976931348623157e+308, 1.0e-05).
fn encode_double(d: f64) -> Result<String> {
    if !d.is_finite() {
        return Err(FlareError::UnsupportedValue { type_name: format!("f64 ({})", d) });
    }
    let text = format!("{:?}", d);
    match text.split_once('e') {
        None => Ok(text),
        Some((mantissa, exponent)) => {
            let mantissa = if mantissa.contains('.') {
                mantissa.to_string()
            } else {
                format!("{}.0", mantissa)
            };
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            Ok(format!("{}e{}{:0>2}", mantissa, sign, digits))
        }
    }
}

// Fixed point, trailing zeros removed, at least one fractional digit.
fn encode_bigdec(d: &BigDecimal) -> String {
    let mut plain = d.normalized().to_plain_string();
    if !plain.contains('.') {
        plain.push_str(".0");
    }
    format!("{}M", plain)
}

/// Validates a keyword (or keyword part) and strips a leading colon.
pub fn keyword_name(name: &str) -> Result<&str> {
    let name = name.strip_prefix(':').unwrap_or(name);
    if KEYWORD.is_match(name) {
        Ok(name)
    } else {
        Err(FlareError::InvalidIdent(name.to_string()))
    }
}

// ------------- Conversions --------------
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}
impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Long(n)
    }
}
impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Long(n.into())
    }
}
impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Long(n.into())
    }
}
impl From<u64> for Value {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or_else(|_| Self::BigInt(n.into()), Self::Long)
    }
}
impl From<i128> for Value {
    fn from(n: i128) -> Self {
        i64::try_from(n).map_or_else(|_| Self::BigInt(n.into()), Self::Long)
    }
}
impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Self::BigInt(n)
    }
}
impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}
impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Self::BigDec(d)
    }
}
impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Instant(t)
    }
}
impl From<NaiveDateTime> for Value {
    fn from(t: NaiveDateTime) -> Self {
        Self::Instant(t.and_utc())
    }
}
impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Instant(d.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Vector(items.into_iter().map(Into::into).collect())
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map_or(Self::Nil, Into::into)
    }
}

impl TryFrom<&serde_json::Value> for Value {
    type Error = FlareError;

    fn try_from(json: &serde_json::Value) -> Result<Self> {
        use serde_json::Value as Json;
        match json {
            Json::Null => Ok(Self::Nil),
            Json::Bool(b) => Ok(Self::Boolean(*b)),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Long(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Self::from(u))
                } else {
                    n.as_f64().map(Self::Double).ok_or_else(|| FlareError::UnsupportedValue {
                        type_name: "number".to_string(),
                    })
                }
            }
            Json::String(s) => Ok(Self::String(s.clone())),
            Json::Array(items) => Ok(Self::Vector(
                items.iter().map(Value::try_from).collect::<Result<Vec<_>>>()?,
            )),
            Json::Object(map) => match map.get("_id") {
                Some(id) => id.as_i64().map(Self::Ref).ok_or_else(|| FlareError::UnsupportedValue {
                    type_name: format!("_id {}", id),
                }),
                None => Err(FlareError::MissingReference { type_name: "map".to_string() }),
            },
        }
    }
}
