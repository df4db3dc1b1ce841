//! Contract with the statement-execution collaborator.
//!
//! The collaborator takes `{ "query": ... }` and answers with
//! `{ "status", "message"?, "columns", "data" }`. This crate never executes
//! statements itself.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Command executed successfully!";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecRequest {
    pub query: String,
}

impl ExecRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    /// Read every row of `table`.
    pub fn select_all(table: &str) -> Self {
        Self::new(format!("SELECT * FROM {table}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecResponse {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default, deserialize_with = "rows_as_text")]
    pub data: Vec<Vec<String>>,
}

impl ExecResponse {
    pub fn from_json(json: &str) -> Result<Self, BackendError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Accept scalar cells of any JSON type; `null` reads as `NULL`.
fn rows_as_text<'de, D>(deserializer: D) -> Result<Vec<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = Vec::<Vec<Value>>::deserialize(deserializer)?;
    Ok(rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    Value::String(s) => s,
                    Value::Null => "NULL".to_string(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect())
}

/// Something that can run a statement and report back.
pub trait Backend {
    fn execute(&mut self, request: &ExecRequest) -> Result<ExecResponse, BackendError>;
}

/// What the learner sees after running a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Success without rows; kept apart from failure.
    NoData { message: String },
    Failed(String),
}

impl ResultView {
    pub fn from_result(result: Result<ExecResponse, BackendError>) -> Self {
        match result {
            Ok(response) if response.is_success() => {
                if response.data.is_empty() {
                    Self::NoData {
                        message: response
                            .message
                            .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()),
                    }
                } else {
                    Self::Rows {
                        columns: response.columns,
                        rows: response.data,
                    }
                }
            }
            Ok(response) => Self::Failed(
                response
                    .message
                    .unwrap_or_else(|| "Query failed".to_string()),
            ),
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// One-line message for the status area.
    pub fn summary(&self) -> String {
        match self {
            Self::Rows { rows, .. } => format!("{} row(s) returned", rows.len()),
            Self::NoData { message } => message.clone(),
            Self::Failed(message) => message.clone(),
        }
    }
}
