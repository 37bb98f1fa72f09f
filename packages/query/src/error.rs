use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Malformed query parameter: {0}")]
    MalformedPair(String),

    #[error("Could not decode query parameter: {0}")]
    Decode(String),

    #[error("Parameter '{key}' is not a number: {value}")]
    InvalidNumber { key: String, value: String },

    #[error("Parameter '{key}' is not a YYYY-MM-DD date: {value}")]
    InvalidDate { key: String, value: String },
}
