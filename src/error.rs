use thiserror::Error;

use crate::transport::Request;

#[derive(Error, Debug)]
pub enum FlareError {
    #[error("Unsupported value type: {type_name}")]
    UnsupportedValue { type_name: String },
    #[error("Missing _id for reference: {type_name}")]
    MissingReference { type_name: String },
    #[error("Unknown type: {0}")]
    UnknownType(String),
    #[error("Unknown cardinality: {0}")]
    UnknownCardinality(String),
    #[error("Unknown uniqueness constraint: {0}")]
    UnknownUniqueness(String),
    #[error("Invalid ident: {0}")]
    InvalidIdent(String),
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Unrecognized operation: '{0}'")]
    UnrecognizedOperation(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("{message}")]
    Request {
        message: String,
        request: Box<Request>,
        payload: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, FlareError>;

// Helper conversions
impl From<serde_json::Error> for FlareError {
    fn from(e: serde_json::Error) -> Self { Self::Decode(e.to_string()) }
}
impl From<config::ConfigError> for FlareError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
