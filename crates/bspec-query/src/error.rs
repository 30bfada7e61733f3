use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("malformed query JSON: {0}")]
    MalformedJson(String),

    #[error("query must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("invalid field path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("unknown query operator: {0}")]
    UnknownOperator(String),

    #[error("invalid operand for {op}: {reason}")]
    InvalidOperand { op: String, reason: String },

    #[error("condition on {0:?} mixes operators and plain keys")]
    MixedCondition(String),

    #[error("{0} is only allowed at the top level of a query")]
    NestedOption(String),
}

pub type QueryParseResult<T> = Result<T, QueryError>;
