use std::fmt;

use crate::store::{RegistryStats, StackId, StoreError};

use super::ParseError;

/// One response line, rendered to plain text via `Display`.
///
/// Responses are deliberately plain text rather than structured
/// serialization: one line out per line in, readable with `nc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Acknowledgment for mutations with nothing else to say.
    Ok,
    /// Answer to `PING`.
    Pong,
    /// The identifier of a freshly created stack.
    Id(StackId),
    /// A single popped or peeked value.
    Value(String),
    /// Bulk-popped values, rendered comma-joined, top first.
    Values(Vec<String>),
    /// An element count.
    Size(usize),
    /// Registry occupancy for `LIST`.
    Stats(RegistryStats),
    /// A store-level failure, rendered as its wire token.
    Error(StoreError),
    /// A request rejected before reaching the store, rendered `ERR <reason>`.
    Invalid(String),
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ok => f.write_str("OK"),
            Response::Pong => f.write_str("PONG"),
            Response::Id(id) => write!(f, "{id}"),
            Response::Value(value) => f.write_str(value),
            Response::Values(values) => f.write_str(&values.join(",")),
            Response::Size(n) => write!(f, "{n}"),
            Response::Stats(stats) => {
                write!(f, "{}/{} stacks", stats.len(), stats.max_stacks)?;
                for (depth, cap) in &stats.depths {
                    write!(f, " {depth}/{cap}")?;
                }
                Ok(())
            }
            Response::Error(err) => f.write_str(wire_token(err)),
            Response::Invalid(reason) => write!(f, "ERR {reason}"),
        }
    }
}

/// Fixed wire tokens for store failures.
fn wire_token(err: &StoreError) -> &'static str {
    match err {
        StoreError::UnknownId(_) => "UNKNOWN_ID",
        StoreError::Empty => "EMPTY",
        StoreError::Overflow { .. } => "OVERFLOW",
        StoreError::RegistryFull { .. } => "FULL",
    }
}

impl From<StoreError> for Response {
    fn from(err: StoreError) -> Self {
        Response::Error(err)
    }
}

impl From<ParseError> for Response {
    fn from(err: ParseError) -> Self {
        Response::Invalid(err.to_string())
    }
}
