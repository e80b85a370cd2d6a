//! Errors of the GraphQL client.
//!
//! The application itself uses `anyhow`, but views need to tell apart why an
//! operation failed, so the client returns this error type. It implements
//! `std::error::Error` and thus converts into `anyhow::Error` with `?`.

use std::{fmt, time::Duration};

use hyper::StatusCode;


pub(crate) type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug)]
pub(crate) enum ClientError {
    /// The operation's variables were rejected before sending anything.
    InvalidInput(String),

    /// Connecting to or talking with the server failed.
    Transport(anyhow::Error),

    /// The server did not answer within the configured timeout.
    Timeout(Duration),

    /// The server answered with a non-success HTTP status.
    Http { status: StatusCode, body: String },

    /// The response body is not a GraphQL JSON response.
    Decode(serde_json::Error),

    /// The server reported errors for the operation.
    GraphQl(Vec<GraphQlError>),

    /// The response is valid GraphQL but does not have the shape declared by
    /// the operation document (e.g. a missing field).
    ContractViolation { operation: &'static str, msg: String },
}

/// A single entry of the `errors` list of a GraphQL response.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub(crate) struct GraphQlError {
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) path: Option<Vec<serde_json::Value>>,
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(path) = &self.path {
            let path = path.iter()
                .map(|segment| match segment {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".");
            write!(f, " (at '{path}')")?;
        }
        Ok(())
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::Transport(e) => write!(f, "request to GraphQL API failed: {e}"),
            Self::Timeout(d) => write!(f, "GraphQL API did not respond within {d:?}"),
            Self::Http { status, body } if body.is_empty() => {
                write!(f, "GraphQL API returned unexpected HTTP status {status}")
            }
            Self::Http { status, body } => {
                write!(f, "GraphQL API returned unexpected HTTP status {status}: {body}")
            }
            Self::Decode(e) => write!(f, "failed to decode GraphQL response: {e}"),
            Self::GraphQl(errors) => {
                f.write_str("GraphQL API returned errors: ")?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{e}")?;
                }
                Ok(())
            }
            Self::ContractViolation { operation, msg } => {
                write!(f, "response to '{operation}' violates its declared shape: {msg}")
            }
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(&**e),
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

/// Checks that a required text argument is not empty.
pub(crate) fn require_non_empty(name: &str, value: &str) -> ClientResult<()> {
    if value.trim().is_empty() {
        return Err(ClientError::InvalidInput(format!("argument '{name}' must not be empty")));
    }

    Ok(())
}
